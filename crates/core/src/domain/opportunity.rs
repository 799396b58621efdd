use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::category::{BusinessCategory, OutcomeCategory};

pub const UNASSIGNED_MANAGER: &str = "Not Assigned";
pub const UNSPECIFIED_BUSINESS_TYPE: &str = "Not Specified";
pub const UNKNOWN_ACCOUNT: &str = "Unknown Account";

/// One renewal opportunity joined with its account manager, as handed over by
/// the record fetcher.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenewalRow {
    pub opportunity_id: String,
    pub stage: String,
    pub business_type: String,
    pub renewal_type: String,
    pub account_id: String,
    pub account_name: String,
    pub account_manager: String,
    pub close_date: Option<NaiveDate>,
    pub premium: Decimal,
}

/// Account id to manager name lookup. Built once per fetch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountManagerMap {
    managers: HashMap<String, String>,
}

impl AccountManagerMap {
    pub fn resolve(&self, account_id: &str) -> &str {
        self.managers.get(account_id).map(String::as_str).unwrap_or(UNASSIGNED_MANAGER)
    }

    pub fn len(&self) -> usize {
        self.managers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.managers.is_empty()
    }
}

impl FromIterator<(String, String)> for AccountManagerMap {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self { managers: iter.into_iter().collect() }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OpportunityRecord {
    pub row: RenewalRow,
    pub outcome_category: OutcomeCategory,
    pub business_category: BusinessCategory,
}

impl OpportunityRecord {
    pub fn account_manager(&self) -> &str {
        &self.row.account_manager
    }

    pub fn close_date(&self) -> Option<NaiveDate> {
        self.row.close_date
    }

    pub fn premium(&self) -> Decimal {
        self.row.premium
    }
}

#[cfg(test)]
mod tests {
    use super::{AccountManagerMap, UNASSIGNED_MANAGER};

    #[test]
    fn unresolved_accounts_fall_back_to_not_assigned() {
        let map: AccountManagerMap =
            [("001A".to_string(), "Jane Doe".to_string())].into_iter().collect();

        assert_eq!(map.resolve("001A"), "Jane Doe");
        assert_eq!(map.resolve("001B"), UNASSIGNED_MANAGER);
        assert_eq!(map.len(), 1);
    }
}
