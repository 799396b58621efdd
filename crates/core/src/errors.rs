use chrono::NaiveDate;
use thiserror::Error;

use crate::config::ConfigError;

/// The single failure outcome of the record fetch boundary. Transport, auth,
/// and query failures all collapse into this before reaching the reports.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("record fetch failed: {message}")]
pub struct FetchFailure {
    pub message: String,
}

impl FetchFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("start date {start} is after end date {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    #[error("minimum opportunity threshold must be at least 1 (got {0})")]
    InvalidThreshold(u32),
    #[error("no business lines selected")]
    EmptyLineSelection,
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Fetch(#[from] FetchFailure),
}

impl ApplicationError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "config_validation",
            Self::Selection(_) => "invalid_selection",
            Self::Fetch(_) => "fetch_failure",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Configuration(_) => {
                "Configuration is invalid. Run `renewlens config` to inspect effective values."
            }
            Self::Selection(_) => "The report selection is invalid. Check dates and filters.",
            Self::Fetch(_) => {
                "Could not load data from Salesforce. Verify credentials and connectivity."
            }
        }
    }
}
