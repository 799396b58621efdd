//! The record fetch boundary. Everything that can go wrong talking to the CRM
//! is logged here and reduced to a single [`FetchFailure`].

use async_trait::async_trait;
use tracing::{error, info};

use renewlens_core::config::SalesforceConfig;
use renewlens_core::domain::opportunity::RenewalRow;
use renewlens_core::errors::FetchFailure;
use renewlens_core::period::DateRange;

use crate::records::{join, manager_map, SalesforceAccount, SalesforceOpportunity};
use crate::salesforce::{SalesforceClient, SalesforceError, SalesforceSession};
use crate::soql::{accounts_query, opportunities_query};

#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch_accounts(&self) -> Result<Vec<SalesforceAccount>, SalesforceError>;

    async fn fetch_opportunities(
        &self,
        range: Option<DateRange>,
    ) -> Result<Vec<SalesforceOpportunity>, SalesforceError>;
}

#[async_trait]
impl RecordSource for SalesforceSession {
    async fn fetch_accounts(&self) -> Result<Vec<SalesforceAccount>, SalesforceError> {
        self.query_all(&accounts_query()).await
    }

    async fn fetch_opportunities(
        &self,
        range: Option<DateRange>,
    ) -> Result<Vec<SalesforceOpportunity>, SalesforceError> {
        self.query_all(&opportunities_query(range.as_ref())).await
    }
}

pub struct RecordFetcher<S> {
    source: S,
}

impl<S: RecordSource> RecordFetcher<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub async fn fetch(
        &self,
        range: Option<DateRange>,
        correlation_id: &str,
    ) -> Result<Vec<RenewalRow>, FetchFailure> {
        let rows =
            self.fetch_rows(range).await.map_err(|error| fetch_failure(error, correlation_id))?;

        info!(
            event_name = "crm.fetch.completed",
            correlation_id,
            row_count = rows.len(),
            "renewal opportunities fetched"
        );
        Ok(rows)
    }

    async fn fetch_rows(
        &self,
        range: Option<DateRange>,
    ) -> Result<Vec<RenewalRow>, SalesforceError> {
        let accounts = self.source.fetch_accounts().await?;
        let managers = manager_map(&accounts);
        let opportunities = self.source.fetch_opportunities(range).await?;
        Ok(join(opportunities, &managers))
    }
}

/// Logs in and fetches in one step, so a rejected login surfaces through the
/// same boundary as a failed query.
pub async fn fetch_renewals(
    config: &SalesforceConfig,
    range: Option<DateRange>,
    correlation_id: &str,
) -> Result<Vec<RenewalRow>, FetchFailure> {
    let session = connect(config).await.map_err(|error| fetch_failure(error, correlation_id))?;

    RecordFetcher::new(session).fetch(range, correlation_id).await
}

async fn connect(config: &SalesforceConfig) -> Result<SalesforceSession, SalesforceError> {
    SalesforceClient::new(config)?.login().await
}

fn fetch_failure(error: SalesforceError, correlation_id: &str) -> FetchFailure {
    error!(
        event_name = "crm.fetch.failed",
        correlation_id,
        error_kind = error.kind(),
        error = %error,
        "salesforce fetch failed"
    );
    FetchFailure::new(error.to_string())
}
