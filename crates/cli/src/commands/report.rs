use chrono::{Local, NaiveDate};
use clap::Args;
use renewlens_core::config::{AppConfig, ConfigOverrides};
use renewlens_core::dashboard::{build_dashboard, DashboardOutcome, Selection};
use renewlens_core::domain::category::BusinessCategory;
use renewlens_core::errors::{ApplicationError, FetchFailure, SelectionError};
use renewlens_core::period::{DateRange, PeriodPreset};
use renewlens_crm::fetch_renewals;
use tracing::{info, warn};
use uuid::Uuid;

use crate::commands::{CommandResult, GlobalArgs};
use crate::render::render_dashboard;

#[derive(Clone, Debug, Default, Args)]
pub struct ReportArgs {
    #[arg(
        long,
        value_name = "PRESET",
        conflicts_with_all = ["start", "end"],
        help = "Reporting period: last_7_days, last_30_days, last_quarter, year_to_date"
    )]
    pub preset: Option<PeriodPreset>,
    #[arg(long, value_name = "YYYY-MM-DD", requires = "end", help = "First close date to include")]
    pub start: Option<NaiveDate>,
    #[arg(long, value_name = "YYYY-MM-DD", requires = "start", help = "Last close date to include")]
    pub end: Option<NaiveDate>,
    #[arg(
        long,
        value_name = "LINES",
        value_delimiter = ',',
        help = "Comma-separated business lines (defaults to the configured core lines)"
    )]
    pub lines: Vec<BusinessCategory>,
    #[arg(long, value_name = "N", help = "Minimum opportunities per manager for win rates")]
    pub min_opportunities: Option<u32>,
    #[arg(long, overrides_with = "no_tables", help = "Include detailed data tables")]
    pub tables: bool,
    #[arg(long, overrides_with = "tables", help = "Omit detailed data tables")]
    pub no_tables: bool,
    #[arg(long, help = "Emit the dashboard as JSON")]
    pub json: bool,
}

impl ReportArgs {
    fn table_override(&self) -> Option<bool> {
        if self.no_tables {
            Some(false)
        } else if self.tables {
            Some(true)
        } else {
            None
        }
    }
}

pub fn run(args: ReportArgs, global: &GlobalArgs) -> CommandResult {
    run_on(args, global, Local::now().date_naive())
}

/// Renders the dashboard with presets resolved relative to `today`.
pub fn run_on(args: ReportArgs, global: &GlobalArgs, today: NaiveDate) -> CommandResult {
    let overrides =
        ConfigOverrides { show_data_tables: args.table_override(), ..ConfigOverrides::default() };
    let config = match AppConfig::load(global.load_options(overrides)) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "report",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };
    crate::init_logging(&config.logging);

    let selection = match build_selection(&args, &config, today) {
        Ok(selection) => selection,
        Err(error) => {
            let error = ApplicationError::from(error);
            return CommandResult::failure("report", error.error_class(), error.to_string(), 2);
        }
    };

    let correlation_id = Uuid::new_v4().to_string();
    info!(
        event_name = "report.render.start",
        correlation_id = %correlation_id,
        start = %selection.range.start(),
        end = %selection.range.end(),
        line_count = selection.lines.len(),
        min_opportunities = selection.min_opportunities,
        "rendering renewal dashboard"
    );

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "report",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let fetched = runtime.block_on(fetch_renewals(
        &config.salesforce,
        Some(selection.range),
        &correlation_id,
    ));
    let outcome = build_dashboard(fetched, &selection, &config.dashboard.options());

    info!(
        event_name = "report.render.finished",
        correlation_id = %correlation_id,
        outcome = outcome_label(&outcome),
        "renewal dashboard rendered"
    );

    match &outcome {
        DashboardOutcome::FetchFailed { message } => {
            let error = ApplicationError::from(FetchFailure::new(message.clone()));
            CommandResult::failure(
                "report",
                error.error_class(),
                format!("{} ({message})", error.user_message()),
                4,
            )
        }
        _ if args.json => match serde_json::to_string_pretty(&outcome) {
            Ok(output) => CommandResult { exit_code: 0, output },
            Err(error) => CommandResult::failure(
                "report",
                "serialization",
                format!("failed to serialize dashboard: {error}"),
                5,
            ),
        },
        DashboardOutcome::NoData { message } | DashboardOutcome::NoDataForSelection { message } => {
            CommandResult::success("report", message.clone())
        }
        DashboardOutcome::Ready(report) => {
            CommandResult { exit_code: 0, output: render_dashboard(report) }
        }
    }
}

fn build_selection(
    args: &ReportArgs,
    config: &AppConfig,
    today: NaiveDate,
) -> Result<Selection, SelectionError> {
    let range = match (args.start, args.end) {
        (Some(start), Some(end)) => {
            let (range, swapped) = DateRange::normalized(start, end);
            if swapped {
                warn!(
                    event_name = "report.range.swapped",
                    start = %start,
                    end = %end,
                    "start date is after end date; using the reversed range"
                );
            }
            range
        }
        _ => args.preset.unwrap_or(config.dashboard.default_period).resolve(today),
    };

    let mut lines = if args.lines.is_empty() {
        config.dashboard.core_lines.clone()
    } else {
        args.lines.clone()
    };
    lines.sort();
    lines.dedup();

    Selection::new(
        range,
        lines,
        args.min_opportunities.unwrap_or(config.dashboard.min_opportunities),
        config.dashboard.show_data_tables,
    )
}

fn outcome_label(outcome: &DashboardOutcome) -> &'static str {
    match outcome {
        DashboardOutcome::FetchFailed { .. } => "fetch_failed",
        DashboardOutcome::NoData { .. } => "no_data",
        DashboardOutcome::NoDataForSelection { .. } => "no_data_for_selection",
        DashboardOutcome::Ready(_) => "ready",
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use renewlens_core::config::AppConfig;
    use renewlens_core::domain::category::BusinessCategory;
    use renewlens_core::errors::SelectionError;
    use renewlens_core::period::PeriodPreset;

    use super::{build_selection, ReportArgs};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
    }

    #[test]
    fn reversed_custom_range_is_swapped() {
        let args = ReportArgs {
            start: Some(date(2024, 3, 31)),
            end: Some(date(2024, 1, 1)),
            ..ReportArgs::default()
        };

        let selection = build_selection(&args, &AppConfig::default(), date(2024, 6, 1))
            .expect("selection should build");

        assert_eq!(selection.range.start(), date(2024, 1, 1));
        assert_eq!(selection.range.end(), date(2024, 3, 31));
    }

    #[test]
    fn preset_and_defaults_come_from_config() {
        let config = AppConfig::default();
        let args =
            ReportArgs { preset: Some(PeriodPreset::LastSevenDays), ..ReportArgs::default() };

        let selection =
            build_selection(&args, &config, date(2024, 6, 15)).expect("selection should build");

        assert_eq!(selection.range.end(), date(2024, 6, 15));
        assert_eq!(selection.range.start(), date(2024, 6, 8));
        assert_eq!(selection.lines.len(), config.dashboard.core_lines.len());
        assert_eq!(selection.min_opportunities, 3);
        assert!(selection.include_tables);
    }

    #[test]
    fn explicit_lines_are_deduplicated() {
        let args = ReportArgs {
            lines: vec![BusinessCategory::Flood, BusinessCategory::Auto, BusinessCategory::Flood],
            ..ReportArgs::default()
        };

        let selection = build_selection(&args, &AppConfig::default(), date(2024, 6, 15))
            .expect("selection should build");

        assert_eq!(selection.lines, vec![BusinessCategory::Auto, BusinessCategory::Flood]);
    }

    #[test]
    fn zero_threshold_is_an_invalid_selection() {
        let args = ReportArgs { min_opportunities: Some(0), ..ReportArgs::default() };

        let error = build_selection(&args, &AppConfig::default(), date(2024, 6, 15))
            .expect_err("zero threshold should be rejected");

        assert_eq!(error, SelectionError::InvalidThreshold(0));
    }
}
