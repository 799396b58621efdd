//! End-to-end report assembly: classify fetched rows, apply the selection, and
//! run the three aggregators.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::classify::classify_all;
use crate::domain::category::BusinessCategory;
use crate::domain::opportunity::{OpportunityRecord, RenewalRow};
use crate::errors::{FetchFailure, SelectionError};
use crate::period::{DateRange, TimeGranularity};
use crate::reference::default_core_lines;
use crate::reports::{RetentionReport, WinRateReport, WorkloadReport};

pub const NO_DATA_MESSAGE: &str = "No data available for the selected date range.";
pub const NO_DATA_FOR_SELECTION_MESSAGE: &str =
    "No data available for the selected business lines and date range.";

/// What the operator asked for in one render.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub range: DateRange,
    pub lines: Vec<BusinessCategory>,
    pub min_opportunities: u32,
    pub include_tables: bool,
}

impl Selection {
    pub fn new(
        range: DateRange,
        lines: Vec<BusinessCategory>,
        min_opportunities: u32,
        include_tables: bool,
    ) -> Result<Self, SelectionError> {
        if min_opportunities == 0 {
            return Err(SelectionError::InvalidThreshold(min_opportunities));
        }
        if lines.is_empty() {
            return Err(SelectionError::EmptyLineSelection);
        }
        Ok(Self { range, lines, min_opportunities, include_tables })
    }

    pub fn includes(&self, category: BusinessCategory) -> bool {
        self.lines.contains(&category)
    }
}

/// Dashboard variant knobs. The all-lines and four-line dashboards differ only
/// in these values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DashboardOptions {
    pub core_lines: Vec<BusinessCategory>,
    pub excluded_broad_line: BusinessCategory,
    pub narrow_scope_core_only: bool,
    pub track_premium: bool,
    pub workload_top_n: usize,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            core_lines: default_core_lines(),
            excluded_broad_line: BusinessCategory::Marine,
            narrow_scope_core_only: false,
            track_premium: true,
            workload_top_n: 10,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub range: DateRange,
    pub granularity: TimeGranularity,
    pub record_count: usize,
    pub selected_count: usize,
    pub retention: RetentionReport,
    pub win_rate: Option<WinRateReport>,
    pub workload: WorkloadReport,
    pub workload_top_n: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DashboardOutcome {
    FetchFailed { message: String },
    NoData { message: String },
    NoDataForSelection { message: String },
    Ready(Box<DashboardReport>),
}

impl DashboardOutcome {
    pub fn report(&self) -> Option<&DashboardReport> {
        match self {
            Self::Ready(report) => Some(report.as_ref()),
            _ => None,
        }
    }
}

pub fn build_dashboard(
    fetched: Result<Vec<RenewalRow>, FetchFailure>,
    selection: &Selection,
    options: &DashboardOptions,
) -> DashboardOutcome {
    let rows = match fetched {
        Ok(rows) => rows,
        Err(failure) => {
            warn!(
                event_name = "dashboard.fetch_failed",
                error = %failure,
                "rendering dashboard without data"
            );
            return DashboardOutcome::FetchFailed { message: failure.to_string() };
        }
    };

    if rows.is_empty() {
        info!(event_name = "dashboard.no_data", "fetch returned no renewal opportunities");
        return DashboardOutcome::NoData { message: NO_DATA_MESSAGE.to_string() };
    }

    let record_count = rows.len();
    let selected: Vec<OpportunityRecord> = classify_all(rows)
        .into_iter()
        .filter(|record| selection.includes(record.business_category))
        .collect();

    if selected.is_empty() {
        info!(
            event_name = "dashboard.no_data_for_selection",
            record_count,
            "no records fall in the selected business lines"
        );
        return DashboardOutcome::NoDataForSelection {
            message: NO_DATA_FOR_SELECTION_MESSAGE.to_string(),
        };
    }

    let granularity = TimeGranularity::for_range(&selection.range);
    debug!(
        event_name = "dashboard.aggregate",
        record_count,
        selected_count = selected.len(),
        granularity = granularity.label(),
        "aggregating dashboard reports"
    );

    let retention_lines = retention_lines(selection, options);
    let retention = RetentionReport::build(
        &selected,
        &retention_lines,
        options.track_premium,
        selection.include_tables,
    );

    let win_rate = build_win_rate(&selected, selection, options);
    let workload = WorkloadReport::build(&selected, granularity, selection.include_tables);

    DashboardOutcome::Ready(Box::new(DashboardReport {
        range: selection.range,
        granularity,
        record_count,
        selected_count: selected.len(),
        retention,
        win_rate,
        workload,
        workload_top_n: options.workload_top_n,
    }))
}

/// Selected lines in core-line order, followed by any selected non-core lines
/// in selection order.
fn retention_lines(selection: &Selection, options: &DashboardOptions) -> Vec<BusinessCategory> {
    let mut lines: Vec<BusinessCategory> =
        options.core_lines.iter().copied().filter(|line| selection.includes(*line)).collect();
    for line in &selection.lines {
        if !lines.contains(line) {
            lines.push(*line);
        }
    }
    lines
}

/// Broad scope drops the excluded line; narrow scope keeps only dated records
/// (and optionally only core lines). No comparison when the narrow scope is
/// empty.
fn build_win_rate(
    selected: &[OpportunityRecord],
    selection: &Selection,
    options: &DashboardOptions,
) -> Option<WinRateReport> {
    let narrow: Vec<&OpportunityRecord> = selected
        .iter()
        .filter(|record| record.close_date().is_some())
        .filter(|record| {
            !options.narrow_scope_core_only
                || options.core_lines.contains(&record.business_category)
        })
        .collect();
    if narrow.is_empty() {
        return None;
    }

    let broad =
        selected.iter().filter(|record| record.business_category != options.excluded_broad_line);

    Some(WinRateReport::build(
        broad,
        narrow,
        selection.min_opportunities,
        selection.include_tables,
    ))
}
