//! Plain-text rendering of dashboard reports for terminal output.

use renewlens_core::dashboard::DashboardReport;
use renewlens_core::reports::{Cell, ReportTable, RetentionReport, WinRateReport, WorkloadReport};

pub fn render_dashboard(report: &DashboardReport) -> String {
    let mut lines = vec![
        format!(
            "Renewal dashboard: {} to {} ({} buckets)",
            report.range.start(),
            report.range.end(),
            report.granularity.label().to_ascii_lowercase()
        ),
        format!(
            "{} renewal opportunities fetched, {} in the selected business lines",
            report.record_count, report.selected_count
        ),
    ];

    lines.push(String::new());
    render_retention(&report.retention, &mut lines);
    lines.push(String::new());
    render_win_rate(report.win_rate.as_ref(), &mut lines);
    lines.push(String::new());
    render_workload(&report.workload, report.workload_top_n, &mut lines);

    lines.join("\n")
}

fn render_retention(retention: &RetentionReport, lines: &mut Vec<String>) {
    lines.push("== Retention by business line ==".to_string());

    let Some(summary) = &retention.summary else {
        lines.push("No closed renewals in the selected business lines.".to_string());
        return;
    };

    lines.push(format!("Highest retention: {} ({:.1}%)", summary.highest, summary.highest_rate));
    lines.push(format!("Lowest retention: {} ({:.1}%)", summary.lowest, summary.lowest_rate));
    lines.push(format!(
        "Average retention: {:.1}% across {} lines",
        summary.average_rate, summary.line_count
    ));
    lines.push(format!(
        "Overall retention: {:.1}% ({} won of {} closed)",
        summary.overall_rate, summary.total_won, summary.total_closed
    ));

    if let Some(premium) = &summary.premium {
        lines.push(format!("Total premium: ${:.2}", premium.total_premium));
        lines.push(format!(
            "Retained premium: ${:.2} ({:.1}%)",
            premium.retained_premium, premium.retained_share
        ));
        lines.push(format!(
            "Lost premium: ${:.2} ({:.1}%)",
            premium.lost_premium, premium.lost_share
        ));
        lines.push(format!("Premium retention rate: {:.1}%", premium.premium_retention_rate));
    }

    if let Some(table) = &retention.table {
        lines.push(String::new());
        lines.push(render_table(table));
    }
}

fn render_win_rate(win_rate: Option<&WinRateReport>, lines: &mut Vec<String>) {
    lines.push("== Win rate by account manager ==".to_string());

    let Some(win_rate) = win_rate else {
        lines.push("No dated renewals available for a win rate comparison.".to_string());
        return;
    };

    if let Some(notice) = win_rate.insufficient_data_notice() {
        lines.push(notice);
        return;
    }

    if let Some(summary) = &win_rate.summary {
        lines.push(format!(
            "Top performer: {} ({:.1}% on selected lines)",
            summary.top_performer, summary.top_rate
        ));
        lines.push(format!(
            "Average win rate: {:.1}% selected lines vs {:.1}% all lines ({:+.1} pts)",
            summary.average_narrow_rate, summary.average_broad_rate, summary.average_delta
        ));
        lines.push(format!(
            "Biggest selected-line advantage: {} ({:+.1} pts)",
            summary.biggest_advantage, summary.biggest_difference
        ));
    }

    if let Some(table) = &win_rate.table {
        lines.push(String::new());
        lines.push(render_table(table));
    }
}

fn render_workload(workload: &WorkloadReport, top_n: usize, lines: &mut Vec<String>) {
    lines.push(format!(
        "== Workload allocation ({}) ==",
        workload.granularity.label().to_ascii_lowercase()
    ));

    let summary = &workload.summary;
    match &summary.highest_manager {
        Some(manager) => lines.push(format!(
            "Highest workload: {manager} ({:.1} weighted policies)",
            summary.highest_weighted
        )),
        None => {
            lines.push("No account manager workload in the selected period.".to_string());
            return;
        }
    }
    lines.push(format!(
        "Average weighted workload: {:.1} across {} managers",
        summary.average_weighted, summary.manager_count
    ));
    lines.push(format!(
        "Flood policies: {} counted as {:.1} weighted (reduction {:.1})",
        summary.flood_policies, summary.flood_weighted, summary.total_reduction
    ));

    lines.push(format!("Top {} managers by weighted workload:", top_n));
    for (index, manager) in workload.ranking(top_n).iter().enumerate() {
        lines.push(format!(
            "  {}. {} {:.1} weighted ({} policies)",
            index + 1,
            manager.account_manager,
            manager.weighted,
            manager.count
        ));
    }

    for table in [&workload.summary_table, &workload.time_table].into_iter().flatten() {
        lines.push(String::new());
        lines.push(render_table(table));
    }
}

/// Left-aligned text table sized to the widest cell in each column.
pub fn render_table(table: &ReportTable) -> String {
    let formatted: Vec<Vec<String>> = table
        .columns
        .iter()
        .map(|column| column.values.iter().map(format_cell).collect())
        .collect();
    let widths: Vec<usize> = table
        .columns
        .iter()
        .zip(&formatted)
        .map(|(column, values)| {
            values.iter().map(String::len).chain([column.name.len()]).max().unwrap_or(0)
        })
        .collect();

    let render_row = |cells: &[&str]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let header: Vec<&str> = table.columns.iter().map(|column| column.name.as_str()).collect();
    let rules: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    let rules: Vec<&str> = rules.iter().map(String::as_str).collect();

    let mut lines = vec![render_row(&header), render_row(&rules)];
    for row in 0..table.row_count() {
        let cells: Vec<&str> = formatted.iter().map(|values| values[row].as_str()).collect();
        lines.push(render_row(&cells));
    }
    lines.join("\n")
}

fn format_cell(cell: &Cell) -> String {
    match cell {
        Cell::Text(value) => value.clone(),
        Cell::Count(value) => value.to_string(),
        Cell::Rate(value) => format!("{value:.1}"),
        Cell::Weight(value) => format!("{value:.1}"),
        Cell::Amount(value) => format!("${value:.2}"),
    }
}
