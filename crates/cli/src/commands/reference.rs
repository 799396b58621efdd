use renewlens_core::config::{AppConfig, ConfigOverrides};
use renewlens_core::domain::category::{BusinessCategory, OutcomeCategory};
use renewlens_core::reference::{business_type_table, default_core_lines, stage_table};
use serde::Serialize;
use tracing::warn;

use crate::commands::GlobalArgs;

#[derive(Debug, Serialize)]
struct StageEntry {
    stage: &'static str,
    outcome: OutcomeCategory,
}

#[derive(Debug, Serialize)]
struct BusinessTypeEntry {
    business_type: &'static str,
    category: BusinessCategory,
}

#[derive(Debug, Serialize)]
struct ReferenceTables {
    stages: Vec<StageEntry>,
    business_types: Vec<BusinessTypeEntry>,
    core_lines: Vec<BusinessCategory>,
    core_lines_source: &'static str,
}

/// Core lines from the dashboard config, or the built-in defaults when the
/// config cannot be loaded.
fn core_lines(global: &GlobalArgs) -> (Vec<BusinessCategory>, &'static str) {
    match AppConfig::load_dashboard(global.load_options(ConfigOverrides::default())) {
        Ok(dashboard) => (dashboard.core_lines, "config"),
        Err(error) => {
            warn!(
                event_name = "reference.config_unavailable",
                error = %error,
                "listing default core lines"
            );
            (default_core_lines(), "default")
        }
    }
}

pub fn run(json_output: bool, global: &GlobalArgs) -> String {
    let (core_lines, core_lines_source) = core_lines(global);
    let tables = ReferenceTables {
        stages: stage_table()
            .iter()
            .map(|&(stage, outcome)| StageEntry { stage, outcome })
            .collect(),
        business_types: business_type_table()
            .iter()
            .map(|&(business_type, category)| BusinessTypeEntry { business_type, category })
            .collect(),
        core_lines,
        core_lines_source,
    };

    if json_output {
        return serde_json::to_string_pretty(&tables).unwrap_or_else(|error| {
            format!(
                "{{\"error\":\"reference serialization failed: {}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&tables)
}

fn render_human(tables: &ReferenceTables) -> String {
    let mut lines = vec!["stage -> outcome:".to_string()];
    lines.extend(
        tables.stages.iter().map(|entry| format!("- {} -> {}", entry.stage, entry.outcome)),
    );

    lines.push("business type -> business line:".to_string());
    lines.extend(
        tables
            .business_types
            .iter()
            .map(|entry| format!("- {} -> {}", entry.business_type, entry.category)),
    );

    let core_lines: Vec<&str> = tables.core_lines.iter().map(BusinessCategory::as_str).collect();
    lines.push(format!(
        "core lines: {} (source: {})",
        core_lines.join(", "),
        tables.core_lines_source
    ));
    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
