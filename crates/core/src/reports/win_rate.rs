//! Per-manager win rates, compared between a broad and a narrow scope of the
//! same selection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::category::OutcomeCategory;
use crate::domain::opportunity::OpportunityRecord;
use crate::reports::{mean, percentage, round1, Cell, ReportTable};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ManagerTally {
    pub won: u64,
    pub lost: u64,
    pub open: u64,
    pub unknown: u64,
}

impl ManagerTally {
    fn record(&mut self, outcome: OutcomeCategory) {
        match outcome {
            OutcomeCategory::Won => self.won += 1,
            OutcomeCategory::Lost => self.lost += 1,
            OutcomeCategory::Open => self.open += 1,
            OutcomeCategory::Unknown => self.unknown += 1,
        }
    }

    pub fn closed(&self) -> u64 {
        self.won + self.lost
    }

    pub fn total(&self) -> u64 {
        self.won + self.lost + self.open + self.unknown
    }

    /// Win rate rounded to one decimal; 0 when nothing has closed.
    pub fn win_rate(&self) -> f64 {
        round1(percentage(self.won, self.closed()))
    }
}

/// Outcome tallies keyed by account manager, in name order.
pub fn tally_by_manager<'a, I>(records: I) -> BTreeMap<String, ManagerTally>
where
    I: IntoIterator<Item = &'a OpportunityRecord>,
{
    let mut tallies: BTreeMap<String, ManagerTally> = BTreeMap::new();
    for record in records {
        tallies
            .entry(record.account_manager().to_string())
            .or_default()
            .record(record.outcome_category);
    }
    tallies
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WinRateComparison {
    pub account_manager: String,
    pub broad_win_rate: f64,
    pub narrow_win_rate: f64,
    /// Narrow minus broad, in percentage points.
    pub difference: f64,
    pub broad_total: u64,
    pub narrow_total: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WinRateSummary {
    pub top_performer: String,
    pub top_rate: f64,
    pub average_narrow_rate: f64,
    pub average_broad_rate: f64,
    pub average_delta: f64,
    pub biggest_advantage: String,
    pub biggest_difference: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WinRateReport {
    pub min_opportunities: u32,
    pub rows: Vec<WinRateComparison>,
    pub summary: Option<WinRateSummary>,
    pub table: Option<ReportTable>,
}

/// Managers present in both scopes with at least `min_opportunities` closed
/// in each, ordered by narrow-scope win rate, highest first.
pub fn compare(
    broad: &BTreeMap<String, ManagerTally>,
    narrow: &BTreeMap<String, ManagerTally>,
    min_opportunities: u32,
) -> Vec<WinRateComparison> {
    let threshold = u64::from(min_opportunities);
    let mut rows: Vec<WinRateComparison> = broad
        .iter()
        .filter_map(|(manager, broad_tally)| {
            let narrow_tally = narrow.get(manager)?;
            if broad_tally.closed() < threshold || narrow_tally.closed() < threshold {
                return None;
            }
            let broad_win_rate = broad_tally.win_rate();
            let narrow_win_rate = narrow_tally.win_rate();
            Some(WinRateComparison {
                account_manager: manager.clone(),
                broad_win_rate,
                narrow_win_rate,
                difference: narrow_win_rate - broad_win_rate,
                broad_total: broad_tally.total(),
                narrow_total: narrow_tally.total(),
            })
        })
        .collect();

    rows.sort_by(|a, b| b.narrow_win_rate.total_cmp(&a.narrow_win_rate));
    rows
}

pub fn summarize(rows: &[WinRateComparison]) -> Option<WinRateSummary> {
    let top = rows.first()?;
    let advantage = rows.iter().fold(top, |best, row| {
        if row.difference > best.difference {
            row
        } else {
            best
        }
    });

    let average_narrow_rate = mean(rows.iter().map(|row| row.narrow_win_rate));
    let average_broad_rate = mean(rows.iter().map(|row| row.broad_win_rate));

    Some(WinRateSummary {
        top_performer: top.account_manager.clone(),
        top_rate: top.narrow_win_rate,
        average_narrow_rate,
        average_broad_rate,
        average_delta: average_narrow_rate - average_broad_rate,
        biggest_advantage: advantage.account_manager.clone(),
        biggest_difference: advantage.difference,
    })
}

pub fn table(rows: &[WinRateComparison]) -> ReportTable {
    let mut table = ReportTable::with_columns([
        "Account Manager",
        "All Lines Win Rate (%)",
        "Selected Lines Win Rate (%)",
        "Difference (%)",
        "All Lines Total Opps",
        "Selected Lines Total Opps",
    ]);
    for row in rows {
        table.push_row(vec![
            Cell::Text(row.account_manager.clone()),
            Cell::Rate(round1(row.broad_win_rate)),
            Cell::Rate(round1(row.narrow_win_rate)),
            Cell::Rate(round1(row.difference)),
            Cell::Count(row.broad_total),
            Cell::Count(row.narrow_total),
        ]);
    }
    table
}

impl WinRateReport {
    pub fn build<'a, B, N>(
        broad: B,
        narrow: N,
        min_opportunities: u32,
        include_table: bool,
    ) -> Self
    where
        B: IntoIterator<Item = &'a OpportunityRecord>,
        N: IntoIterator<Item = &'a OpportunityRecord>,
    {
        let rows =
            compare(&tally_by_manager(broad), &tally_by_manager(narrow), min_opportunities);
        let summary = summarize(&rows);
        let table = include_table.then(|| table(&rows));
        Self { min_opportunities, rows, summary, table }
    }

    pub fn insufficient_data_notice(&self) -> Option<String> {
        self.rows.is_empty().then(|| {
            format!(
                "Not enough data for win rate comparison (minimum {} opportunities required).",
                self.min_opportunities
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::{compare, tally_by_manager, WinRateReport};
    use crate::domain::category::{BusinessCategory, OutcomeCategory};
    use crate::domain::opportunity::{OpportunityRecord, RenewalRow};

    fn record(manager: &str, outcome: OutcomeCategory) -> OpportunityRecord {
        OpportunityRecord {
            row: RenewalRow {
                opportunity_id: "006".to_string(),
                stage: String::new(),
                business_type: String::new(),
                renewal_type: "Commercial Lines - Renewal".to_string(),
                account_id: "001".to_string(),
                account_name: "Acct".to_string(),
                account_manager: manager.to_string(),
                close_date: NaiveDate::from_ymd_opt(2024, 4, 2),
                premium: Decimal::ZERO,
            },
            outcome_category: outcome,
            business_category: BusinessCategory::Auto,
        }
    }

    fn records(manager: &str, won: usize, lost: usize) -> Vec<OpportunityRecord> {
        let mut out = Vec::new();
        out.extend((0..won).map(|_| record(manager, OutcomeCategory::Won)));
        out.extend((0..lost).map(|_| record(manager, OutcomeCategory::Lost)));
        out
    }

    #[test]
    fn manager_below_broad_threshold_is_excluded() {
        let broad = records("Jane", 1, 1);
        let narrow = records("Jane", 3, 2);

        let rows = compare(&tally_by_manager(&broad), &tally_by_manager(&narrow), 3);
        assert!(rows.is_empty());
    }

    #[test]
    fn manager_in_only_one_scope_is_excluded() {
        let broad = [records("Jane", 4, 1), records("Omar", 5, 5)].concat();
        let narrow = records("Jane", 3, 1);

        let rows = compare(&tally_by_manager(&broad), &tally_by_manager(&narrow), 1);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].account_manager, "Jane");
    }

    #[test]
    fn difference_is_narrow_minus_broad() {
        let broad = records("Jane", 1, 3);
        let narrow = records("Jane", 3, 1);

        let rows = compare(&tally_by_manager(&broad), &tally_by_manager(&narrow), 3);
        assert_eq!(rows[0].broad_win_rate, 25.0);
        assert_eq!(rows[0].narrow_win_rate, 75.0);
        assert_eq!(rows[0].difference, 50.0);
    }

    #[test]
    fn open_and_unknown_count_toward_total_but_not_rate() {
        let mut scope = records("Jane", 2, 1);
        scope.push(record("Jane", OutcomeCategory::Open));
        scope.push(record("Jane", OutcomeCategory::Unknown));

        let tallies = tally_by_manager(&scope);
        let jane = &tallies["Jane"];
        assert_eq!(jane.total(), 5);
        assert_eq!(jane.closed(), 3);
        assert_eq!(jane.win_rate(), 66.7);
    }

    #[test]
    fn manager_with_nothing_closed_has_zero_rate() {
        let scope = vec![record("Lee", OutcomeCategory::Open)];
        assert_eq!(tally_by_manager(&scope)["Lee"].win_rate(), 0.0);
    }

    #[test]
    fn report_ranks_by_narrow_rate_and_summarizes() {
        let broad = [records("Ana", 2, 2), records("Ben", 3, 1), records("Cy", 1, 3)].concat();
        let narrow = [records("Ana", 3, 1), records("Ben", 2, 2), records("Cy", 4, 0)].concat();

        let report = WinRateReport::build(&broad, &narrow, 3, true);
        let order: Vec<_> = report.rows.iter().map(|row| row.account_manager.as_str()).collect();
        assert_eq!(order, vec!["Cy", "Ana", "Ben"]);

        let summary = report.summary.as_ref().expect("summary");
        assert_eq!(summary.top_performer, "Cy");
        assert_eq!(summary.biggest_advantage, "Cy");
        assert_eq!(summary.biggest_difference, 75.0);
        assert_eq!(summary.average_narrow_rate, 75.0);
        assert_eq!(summary.average_broad_rate, 50.0);
        assert!(report.insufficient_data_notice().is_none());
        assert_eq!(report.table.as_ref().map(|t| t.row_count()), Some(3));
    }

    #[test]
    fn empty_comparison_carries_threshold_notice() {
        let broad = records("Ana", 1, 0);
        let report = WinRateReport::build(&broad, &broad, 5, false);

        assert!(report.summary.is_none());
        assert!(report.table.is_none());
        let notice = report.insufficient_data_notice().expect("notice");
        assert!(notice.contains("minimum 5"));
    }
}
