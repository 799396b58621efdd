pub mod fetcher;
pub mod records;
pub mod salesforce;
pub mod soql;

pub use fetcher::{fetch_renewals, RecordFetcher, RecordSource};
pub use records::{SalesforceAccount, SalesforceOpportunity};
pub use salesforce::{SalesforceClient, SalesforceError, SalesforceSession};
