use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dashboard::DashboardOptions;
use crate::domain::category::BusinessCategory;
use crate::period::PeriodPreset;
use crate::reference::default_core_lines;

pub const DEFAULT_CONFIG_FILE: &str = "renewlens.toml";
pub const NESTED_CONFIG_FILE: &str = "config/renewlens.toml";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub salesforce: SalesforceConfig,
    pub dashboard: DashboardConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct SalesforceConfig {
    pub login_url: String,
    pub api_version: String,
    pub username: String,
    pub password: SecretString,
    pub security_token: SecretString,
    pub client_id: String,
    pub client_secret: SecretString,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct DashboardConfig {
    pub core_lines: Vec<BusinessCategory>,
    pub excluded_broad_line: BusinessCategory,
    pub narrow_scope_core_only: bool,
    pub track_premium: bool,
    pub min_opportunities: u32,
    pub show_data_tables: bool,
    pub default_period: PeriodPreset,
    pub workload_top_n: usize,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub show_data_tables: Option<bool>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            salesforce: SalesforceConfig {
                login_url: "https://login.salesforce.com".to_string(),
                api_version: "59.0".to_string(),
                username: String::new(),
                password: String::new().into(),
                security_token: String::new().into(),
                client_id: String::new(),
                client_secret: String::new().into(),
                timeout_secs: 30,
            },
            dashboard: DashboardConfig {
                core_lines: default_core_lines(),
                excluded_broad_line: BusinessCategory::Marine,
                narrow_scope_core_only: false,
                track_premium: true,
                min_opportunities: 3,
                show_data_tables: true,
                default_period: PeriodPreset::LastQuarter,
                workload_top_n: 10,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl DashboardConfig {
    pub fn options(&self) -> DashboardOptions {
        DashboardOptions {
            core_lines: self.core_lines.clone(),
            excluded_broad_line: self.excluded_broad_line,
            narrow_scope_core_only: self.narrow_scope_core_only,
            track_premium: self.track_premium,
            workload_top_n: self.workload_top_n,
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let config = Self::layered(options)?;
        config.validate()?;
        Ok(config)
    }

    /// Dashboard settings only. Salesforce credentials are not required.
    pub fn load_dashboard(options: LoadOptions) -> Result<DashboardConfig, ConfigError> {
        let config = Self::layered(options)?;
        validate_dashboard(&config.dashboard)?;
        Ok(config.dashboard)
    }

    fn layered(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(salesforce) = patch.salesforce {
            if let Some(login_url) = salesforce.login_url {
                self.salesforce.login_url = login_url;
            }
            if let Some(api_version) = salesforce.api_version {
                self.salesforce.api_version = api_version;
            }
            if let Some(username) = salesforce.username {
                self.salesforce.username = username;
            }
            if let Some(password) = salesforce.password {
                self.salesforce.password = secret_value(password);
            }
            if let Some(security_token) = salesforce.security_token {
                self.salesforce.security_token = secret_value(security_token);
            }
            if let Some(client_id) = salesforce.client_id {
                self.salesforce.client_id = client_id;
            }
            if let Some(client_secret) = salesforce.client_secret {
                self.salesforce.client_secret = secret_value(client_secret);
            }
            if let Some(timeout_secs) = salesforce.timeout_secs {
                self.salesforce.timeout_secs = timeout_secs;
            }
        }

        if let Some(dashboard) = patch.dashboard {
            if let Some(core_lines) = dashboard.core_lines {
                self.dashboard.core_lines = core_lines;
            }
            if let Some(excluded_broad_line) = dashboard.excluded_broad_line {
                self.dashboard.excluded_broad_line = excluded_broad_line;
            }
            if let Some(narrow_scope_core_only) = dashboard.narrow_scope_core_only {
                self.dashboard.narrow_scope_core_only = narrow_scope_core_only;
            }
            if let Some(track_premium) = dashboard.track_premium {
                self.dashboard.track_premium = track_premium;
            }
            if let Some(min_opportunities) = dashboard.min_opportunities {
                self.dashboard.min_opportunities = min_opportunities;
            }
            if let Some(show_data_tables) = dashboard.show_data_tables {
                self.dashboard.show_data_tables = show_data_tables;
            }
            if let Some(default_period) = dashboard.default_period {
                self.dashboard.default_period = default_period;
            }
            if let Some(workload_top_n) = dashboard.workload_top_n {
                self.dashboard.workload_top_n = workload_top_n;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("RENEWLENS_SALESFORCE_LOGIN_URL") {
            self.salesforce.login_url = value;
        }
        if let Some(value) = read_env("RENEWLENS_SALESFORCE_API_VERSION") {
            self.salesforce.api_version = value;
        }
        if let Some(value) = read_env("RENEWLENS_SALESFORCE_USERNAME") {
            self.salesforce.username = value;
        }
        if let Some(value) = read_env("RENEWLENS_SALESFORCE_PASSWORD") {
            self.salesforce.password = secret_value(value);
        }
        if let Some(value) = read_env("RENEWLENS_SALESFORCE_SECURITY_TOKEN") {
            self.salesforce.security_token = secret_value(value);
        }
        if let Some(value) = read_env("RENEWLENS_SALESFORCE_CLIENT_ID") {
            self.salesforce.client_id = value;
        }
        if let Some(value) = read_env("RENEWLENS_SALESFORCE_CLIENT_SECRET") {
            self.salesforce.client_secret = secret_value(value);
        }
        if let Some(value) = read_env("RENEWLENS_SALESFORCE_TIMEOUT_SECS") {
            self.salesforce.timeout_secs = parse_u64("RENEWLENS_SALESFORCE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("RENEWLENS_DASHBOARD_CORE_LINES") {
            self.dashboard.core_lines = parse_lines("RENEWLENS_DASHBOARD_CORE_LINES", &value)?;
        }
        if let Some(value) = read_env("RENEWLENS_DASHBOARD_EXCLUDED_BROAD_LINE") {
            self.dashboard.excluded_broad_line = value.parse().map_err(|_| {
                invalid_override("RENEWLENS_DASHBOARD_EXCLUDED_BROAD_LINE", &value)
            })?;
        }
        if let Some(value) = read_env("RENEWLENS_DASHBOARD_NARROW_SCOPE_CORE_ONLY") {
            self.dashboard.narrow_scope_core_only =
                parse_bool("RENEWLENS_DASHBOARD_NARROW_SCOPE_CORE_ONLY", &value)?;
        }
        if let Some(value) = read_env("RENEWLENS_DASHBOARD_TRACK_PREMIUM") {
            self.dashboard.track_premium = parse_bool("RENEWLENS_DASHBOARD_TRACK_PREMIUM", &value)?;
        }
        if let Some(value) = read_env("RENEWLENS_DASHBOARD_MIN_OPPORTUNITIES") {
            self.dashboard.min_opportunities =
                parse_u32("RENEWLENS_DASHBOARD_MIN_OPPORTUNITIES", &value)?;
        }
        if let Some(value) = read_env("RENEWLENS_DASHBOARD_SHOW_DATA_TABLES") {
            self.dashboard.show_data_tables =
                parse_bool("RENEWLENS_DASHBOARD_SHOW_DATA_TABLES", &value)?;
        }
        if let Some(value) = read_env("RENEWLENS_DASHBOARD_DEFAULT_PERIOD") {
            self.dashboard.default_period = value
                .parse()
                .map_err(|_| invalid_override("RENEWLENS_DASHBOARD_DEFAULT_PERIOD", &value))?;
        }
        if let Some(value) = read_env("RENEWLENS_DASHBOARD_WORKLOAD_TOP_N") {
            self.dashboard.workload_top_n =
                parse_usize("RENEWLENS_DASHBOARD_WORKLOAD_TOP_N", &value)?;
        }

        let log_level =
            read_env("RENEWLENS_LOGGING_LEVEL").or_else(|| read_env("RENEWLENS_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("RENEWLENS_LOGGING_FORMAT").or_else(|| read_env("RENEWLENS_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(show_data_tables) = overrides.show_data_tables {
            self.dashboard.show_data_tables = show_data_tables;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_salesforce(&self.salesforce)?;
        validate_dashboard(&self.dashboard)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// Config file that [`AppConfig::load`] would read, if any.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from(NESTED_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_salesforce(salesforce: &SalesforceConfig) -> Result<(), ConfigError> {
    let login_url = salesforce.login_url.trim();
    if !login_url.starts_with("http://") && !login_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "salesforce.login_url must start with http:// or https://".to_string(),
        ));
    }

    let version_ok = salesforce
        .api_version
        .split_once('.')
        .map(|(major, minor)| {
            !major.is_empty()
                && !minor.is_empty()
                && major.chars().all(|c| c.is_ascii_digit())
                && minor.chars().all(|c| c.is_ascii_digit())
        })
        .unwrap_or(false);
    if !version_ok {
        return Err(ConfigError::Validation(format!(
            "salesforce.api_version must look like `59.0` (got `{}`)",
            salesforce.api_version
        )));
    }

    if salesforce.username.trim().is_empty() {
        return Err(ConfigError::Validation(
            "salesforce.username is required (set RENEWLENS_SALESFORCE_USERNAME)".to_string(),
        ));
    }
    if salesforce.password.expose_secret().is_empty() {
        return Err(ConfigError::Validation(
            "salesforce.password is required (set RENEWLENS_SALESFORCE_PASSWORD)".to_string(),
        ));
    }
    if salesforce.client_id.trim().is_empty() {
        return Err(ConfigError::Validation(
            "salesforce.client_id is required. Get it from Setup > App Manager > your connected app"
                .to_string(),
        ));
    }
    if salesforce.client_secret.expose_secret().is_empty() {
        return Err(ConfigError::Validation(
            "salesforce.client_secret is required for the username-password OAuth flow"
                .to_string(),
        ));
    }

    if salesforce.timeout_secs == 0 || salesforce.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "salesforce.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_dashboard(dashboard: &DashboardConfig) -> Result<(), ConfigError> {
    if dashboard.core_lines.is_empty() {
        return Err(ConfigError::Validation(
            "dashboard.core_lines must name at least one business line".to_string(),
        ));
    }
    for (index, line) in dashboard.core_lines.iter().enumerate() {
        if dashboard.core_lines[..index].contains(line) {
            return Err(ConfigError::Validation(format!(
                "dashboard.core_lines lists `{line}` more than once"
            )));
        }
    }

    if dashboard.min_opportunities == 0 {
        return Err(ConfigError::Validation(
            "dashboard.min_opportunities must be at least 1".to_string(),
        ));
    }

    if dashboard.workload_top_n == 0 {
        return Err(ConfigError::Validation(
            "dashboard.workload_top_n must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn invalid_override(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() }
}

fn parse_lines(key: &str, value: &str) -> Result<Vec<BusinessCategory>, ConfigError> {
    value
        .split(',')
        .filter(|item| !item.trim().is_empty())
        .map(|item| item.parse::<BusinessCategory>().map_err(|_| invalid_override(key, value)))
        .collect()
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| invalid_override(key, value))
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| invalid_override(key, value))
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| invalid_override(key, value))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse::<bool>().map_err(|_| invalid_override(key, value))
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    salesforce: Option<SalesforcePatch>,
    dashboard: Option<DashboardPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct SalesforcePatch {
    login_url: Option<String>,
    api_version: Option<String>,
    username: Option<String>,
    password: Option<String>,
    security_token: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct DashboardPatch {
    core_lines: Option<Vec<BusinessCategory>>,
    excluded_broad_line: Option<BusinessCategory>,
    narrow_scope_core_only: Option<bool>,
    track_premium: Option<bool>,
    min_opportunities: Option<u32>,
    show_data_tables: Option<bool>,
    default_period: Option<PeriodPreset>,
    workload_top_n: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
