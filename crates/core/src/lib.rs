pub mod classify;
pub mod config;
pub mod dashboard;
pub mod domain;
pub mod errors;
pub mod period;
pub mod reference;
pub mod reports;

pub use classify::{classify, classify_all};
pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use dashboard::{
    build_dashboard, DashboardOptions, DashboardOutcome, DashboardReport, Selection,
};
pub use domain::category::{BusinessCategory, OutcomeCategory};
pub use domain::opportunity::{AccountManagerMap, OpportunityRecord, RenewalRow};
pub use errors::{ApplicationError, FetchFailure, SelectionError};
pub use period::{DateRange, PeriodPreset, TimeGranularity};
pub use reports::{Cell, ReportTable, RetentionReport, WinRateReport, WorkloadReport};
