//! SOQL text for the two queries the dashboard needs.

use renewlens_core::period::DateRange;

/// Values of `New_Business_or_Renewal__c` that mark an opportunity as a renewal.
pub const RENEWAL_TYPES: [&str; 2] = ["Personal Lines - Renewal", "Commercial Lines - Renewal"];

const ACCOUNT_FIELDS: &str = "Id, Name, Account_Manager__c, Account_Manager__r.Name";
const OPPORTUNITY_FIELDS: &str = "Id, StageName, Type, AccountId, Account.Name, \
     New_Business_or_Renewal__c, CloseDate, Renewal_Policy_Premium__c";

pub fn accounts_query() -> String {
    format!("SELECT {ACCOUNT_FIELDS} FROM Account WHERE Account_Manager__c != null")
}

/// Renewal opportunities, optionally limited to an inclusive close-date range.
pub fn opportunities_query(range: Option<&DateRange>) -> String {
    let renewal_types =
        RENEWAL_TYPES.iter().map(|value| quote_literal(value)).collect::<Vec<_>>().join(", ");

    let mut query = format!(
        "SELECT {OPPORTUNITY_FIELDS} FROM Opportunity \
         WHERE New_Business_or_Renewal__c IN ({renewal_types})"
    );

    if let Some(range) = range {
        // SOQL date literals are bare ISO dates.
        query.push_str(&format!(
            " AND CloseDate >= {} AND CloseDate <= {}",
            range.start().format("%Y-%m-%d"),
            range.end().format("%Y-%m-%d")
        ));
    }

    query
}

fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}
