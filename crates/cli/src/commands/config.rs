use std::env;
use std::fs;
use std::path::Path;

use renewlens_core::config::{resolve_config_path, AppConfig, ConfigOverrides};
use renewlens_core::domain::category::BusinessCategory;
use secrecy::{ExposeSecret, SecretString};
use toml::Value;

use crate::commands::GlobalArgs;

struct Entry {
    key: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

pub fn run(global: &GlobalArgs) -> String {
    let config = match AppConfig::load(global.load_options(ConfigOverrides::default())) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(global.config.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec![
        "effective config (source precedence: flag > env > file > default):".to_string(),
    ];
    for entry in entries(&config) {
        let source = field_source(
            entry.key,
            entry.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(format!("- {} = {} (source: {source})", entry.key, entry.value));
    }

    lines.join("\n")
}

fn entries(config: &AppConfig) -> Vec<Entry> {
    let salesforce = &config.salesforce;
    let dashboard = &config.dashboard;
    let core_lines: Vec<&str> = dashboard.core_lines.iter().map(BusinessCategory::as_str).collect();

    vec![
        Entry {
            key: "salesforce.login_url",
            value: salesforce.login_url.clone(),
            env_keys: &["RENEWLENS_SALESFORCE_LOGIN_URL"],
        },
        Entry {
            key: "salesforce.api_version",
            value: salesforce.api_version.clone(),
            env_keys: &["RENEWLENS_SALESFORCE_API_VERSION"],
        },
        Entry {
            key: "salesforce.username",
            value: salesforce.username.clone(),
            env_keys: &["RENEWLENS_SALESFORCE_USERNAME"],
        },
        Entry {
            key: "salesforce.password",
            value: redact(&salesforce.password),
            env_keys: &["RENEWLENS_SALESFORCE_PASSWORD"],
        },
        Entry {
            key: "salesforce.security_token",
            value: redact(&salesforce.security_token),
            env_keys: &["RENEWLENS_SALESFORCE_SECURITY_TOKEN"],
        },
        Entry {
            key: "salesforce.client_id",
            value: salesforce.client_id.clone(),
            env_keys: &["RENEWLENS_SALESFORCE_CLIENT_ID"],
        },
        Entry {
            key: "salesforce.client_secret",
            value: redact(&salesforce.client_secret),
            env_keys: &["RENEWLENS_SALESFORCE_CLIENT_SECRET"],
        },
        Entry {
            key: "salesforce.timeout_secs",
            value: salesforce.timeout_secs.to_string(),
            env_keys: &["RENEWLENS_SALESFORCE_TIMEOUT_SECS"],
        },
        Entry {
            key: "dashboard.core_lines",
            value: core_lines.join(", "),
            env_keys: &["RENEWLENS_DASHBOARD_CORE_LINES"],
        },
        Entry {
            key: "dashboard.excluded_broad_line",
            value: dashboard.excluded_broad_line.to_string(),
            env_keys: &["RENEWLENS_DASHBOARD_EXCLUDED_BROAD_LINE"],
        },
        Entry {
            key: "dashboard.narrow_scope_core_only",
            value: dashboard.narrow_scope_core_only.to_string(),
            env_keys: &["RENEWLENS_DASHBOARD_NARROW_SCOPE_CORE_ONLY"],
        },
        Entry {
            key: "dashboard.track_premium",
            value: dashboard.track_premium.to_string(),
            env_keys: &["RENEWLENS_DASHBOARD_TRACK_PREMIUM"],
        },
        Entry {
            key: "dashboard.min_opportunities",
            value: dashboard.min_opportunities.to_string(),
            env_keys: &["RENEWLENS_DASHBOARD_MIN_OPPORTUNITIES"],
        },
        Entry {
            key: "dashboard.show_data_tables",
            value: dashboard.show_data_tables.to_string(),
            env_keys: &["RENEWLENS_DASHBOARD_SHOW_DATA_TABLES"],
        },
        Entry {
            key: "dashboard.default_period",
            value: dashboard.default_period.as_str().to_string(),
            env_keys: &["RENEWLENS_DASHBOARD_DEFAULT_PERIOD"],
        },
        Entry {
            key: "dashboard.workload_top_n",
            value: dashboard.workload_top_n.to_string(),
            env_keys: &["RENEWLENS_DASHBOARD_WORKLOAD_TOP_N"],
        },
        Entry {
            key: "logging.level",
            value: config.logging.level.clone(),
            env_keys: &["RENEWLENS_LOGGING_LEVEL", "RENEWLENS_LOG_LEVEL"],
        },
        Entry {
            key: "logging.format",
            value: format!("{:?}", config.logging.format),
            env_keys: &["RENEWLENS_LOGGING_FORMAT", "RENEWLENS_LOG_FORMAT"],
        },
    ]
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn redact(secret: &SecretString) -> String {
    if secret.expose_secret().trim().is_empty() {
        "<empty>".to_string()
    } else {
        "<redacted>".to_string()
    }
}
