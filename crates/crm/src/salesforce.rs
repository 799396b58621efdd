//! Minimal Salesforce REST client: username-password OAuth login and
//! paginated SOQL queries.

use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use renewlens_core::config::SalesforceConfig;

#[derive(Debug, Error)]
pub enum SalesforceError {
    #[error("salesforce request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("salesforce login rejected: {0}")]
    Auth(String),
    #[error("salesforce returned {status} for {context}: {body}")]
    Status { status: u16, context: &'static str, body: String },
    #[error("could not decode salesforce {context} response: {message}")]
    Decode { context: &'static str, message: String },
}

impl SalesforceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Auth(_) => "auth",
            Self::Status { .. } => "status",
            Self::Decode { .. } => "decode",
        }
    }
}

#[derive(Deserialize)]
struct OAuthTokenResponse {
    access_token: String,
    instance_url: String,
    token_type: Option<String>,
}

#[derive(Deserialize)]
struct OAuthErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryPage<T> {
    done: bool,
    total_size: Option<u64>,
    next_records_url: Option<String>,
    records: Vec<T>,
}

/// Unauthenticated client holding connection settings.
#[derive(Clone, Debug)]
pub struct SalesforceClient {
    http: Client,
    config: SalesforceConfig,
}

/// Authenticated session against one Salesforce instance.
#[derive(Clone)]
pub struct SalesforceSession {
    http: Client,
    instance_url: String,
    api_version: String,
    token_type: String,
    access_token: SecretString,
}

impl std::fmt::Debug for SalesforceSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SalesforceSession")
            .field("instance_url", &self.instance_url)
            .field("api_version", &self.api_version)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

impl SalesforceClient {
    pub fn new(config: &SalesforceConfig) -> Result<Self, SalesforceError> {
        let http = Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;
        Ok(Self { http, config: config.clone() })
    }

    pub fn token_url(&self) -> String {
        format!("{}/services/oauth2/token", self.config.login_url.trim_end_matches('/'))
    }

    pub async fn login(&self) -> Result<SalesforceSession, SalesforceError> {
        // The password grant expects the security token appended to the password.
        let password = format!(
            "{}{}",
            self.config.password.expose_secret(),
            self.config.security_token.expose_secret()
        );

        let response = self
            .http
            .post(self.token_url())
            .form(&[
                ("grant_type", "password"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.expose_secret()),
                ("username", self.config.username.as_str()),
                ("password", password.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() {
            let detail = match response.json::<OAuthErrorResponse>().await {
                Ok(payload) => payload
                    .error_description
                    .or(payload.error)
                    .unwrap_or_else(|| status.to_string()),
                Err(_) => status.to_string(),
            };
            return Err(SalesforceError::Auth(detail));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SalesforceError::Status { status: status.as_u16(), context: "login", body });
        }

        let token: OAuthTokenResponse = response.json().await.map_err(|error| {
            SalesforceError::Decode { context: "login", message: error.to_string() }
        })?;
        if token.access_token.is_empty() {
            return Err(SalesforceError::Auth("token endpoint returned empty access token".into()));
        }

        info!(
            event_name = "crm.salesforce.login",
            instance_url = %token.instance_url,
            "salesforce session established"
        );

        Ok(SalesforceSession {
            http: self.http.clone(),
            instance_url: token.instance_url.trim_end_matches('/').to_string(),
            api_version: self.config.api_version.clone(),
            token_type: token
                .token_type
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| "Bearer".to_string()),
            access_token: token.access_token.into(),
        })
    }
}

impl SalesforceSession {
    pub fn instance_url(&self) -> &str {
        &self.instance_url
    }

    /// Runs a SOQL query and follows `nextRecordsUrl` until the result set is done.
    pub async fn query_all<T: DeserializeOwned>(
        &self,
        soql: &str,
    ) -> Result<Vec<T>, SalesforceError> {
        let query_url =
            format!("{}/services/data/v{}/query", self.instance_url, self.api_version);
        let mut page: QueryPage<T> =
            self.get_page(self.http.get(&query_url).query(&[("q", soql)])).await?;

        debug!(
            event_name = "crm.salesforce.query",
            total_size = page.total_size.unwrap_or_default(),
            "salesforce query started"
        );

        let mut records = std::mem::take(&mut page.records);
        while !page.done {
            let next = match page.next_records_url.take() {
                Some(next) => next,
                None => {
                    return Err(SalesforceError::Decode {
                        context: "query",
                        message: "page is not done but has no nextRecordsUrl".to_string(),
                    })
                }
            };
            page = self.get_page(self.http.get(format!("{}{next}", self.instance_url))).await?;
            records.append(&mut page.records);
        }

        Ok(records)
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<QueryPage<T>, SalesforceError> {
        let auth = format!("{} {}", self.token_type, self.access_token.expose_secret());
        let response = request.header("Authorization", auth).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SalesforceError::Status { status: status.as_u16(), context: "query", body });
        }

        response.json::<QueryPage<T>>().await.map_err(|error| SalesforceError::Decode {
            context: "query",
            message: error.to_string(),
        })
    }
}
