//! Salesforce record shapes and the account-manager join.

use chrono::NaiveDate;
use renewlens_core::domain::opportunity::{
    AccountManagerMap, RenewalRow, UNKNOWN_ACCOUNT, UNSPECIFIED_BUSINESS_TYPE,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::warn;

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct NameRef {
    #[serde(rename = "Name")]
    pub name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SalesforceAccount {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Account_Manager__r", default)]
    pub account_manager: Option<NameRef>,
}

impl SalesforceAccount {
    pub fn manager_name(&self) -> Option<&str> {
        self.account_manager
            .as_ref()
            .and_then(|manager| manager.name.as_deref())
            .filter(|name| !name.trim().is_empty())
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SalesforceOpportunity {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "StageName", default)]
    pub stage_name: Option<String>,
    #[serde(rename = "Type", default)]
    pub business_type: Option<String>,
    #[serde(rename = "AccountId", default)]
    pub account_id: Option<String>,
    #[serde(rename = "Account", default)]
    pub account: Option<NameRef>,
    #[serde(rename = "New_Business_or_Renewal__c", default)]
    pub renewal_type: Option<String>,
    #[serde(rename = "CloseDate", default)]
    pub close_date: Option<NaiveDate>,
    #[serde(rename = "Renewal_Policy_Premium__c", default)]
    pub premium: Option<Decimal>,
}

/// Accounts without a resolvable manager name are left out of the map.
pub fn manager_map(accounts: &[SalesforceAccount]) -> AccountManagerMap {
    accounts
        .iter()
        .filter_map(|account| {
            account.manager_name().map(|name| (account.id.clone(), name.to_string()))
        })
        .collect()
}

pub fn join(
    opportunities: Vec<SalesforceOpportunity>,
    managers: &AccountManagerMap,
) -> Vec<RenewalRow> {
    opportunities.into_iter().map(|opportunity| to_row(opportunity, managers)).collect()
}

fn to_row(opportunity: SalesforceOpportunity, managers: &AccountManagerMap) -> RenewalRow {
    let account_id = opportunity.account_id.unwrap_or_default();
    let account_manager = managers.resolve(&account_id).to_string();
    let account_name = opportunity
        .account
        .and_then(|account| account.name)
        .unwrap_or_else(|| UNKNOWN_ACCOUNT.to_string());
    let premium = premium_or_zero(&opportunity.id, opportunity.premium);

    RenewalRow {
        opportunity_id: opportunity.id,
        stage: opportunity.stage_name.unwrap_or_default(),
        business_type: opportunity
            .business_type
            .unwrap_or_else(|| UNSPECIFIED_BUSINESS_TYPE.to_string()),
        renewal_type: opportunity.renewal_type.unwrap_or_default(),
        account_id,
        account_name,
        account_manager,
        close_date: opportunity.close_date,
        premium,
    }
}

fn premium_or_zero(opportunity_id: &str, premium: Option<Decimal>) -> Decimal {
    match premium {
        Some(value) if value.is_sign_negative() && !value.is_zero() => {
            warn!(
                event_name = "crm.premium.negative",
                opportunity_id,
                premium = %value,
                "negative renewal premium clamped to zero"
            );
            Decimal::ZERO
        }
        Some(value) => value,
        None => Decimal::ZERO,
    }
}
