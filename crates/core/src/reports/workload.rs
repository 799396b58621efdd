//! Weighted workload allocation per account manager and time bucket.
//!
//! Flood renewals weigh 0.5, every other line weighs 1.0. Weights are multiples
//! of one half, so the `f64` sums stay exact.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::category::BusinessCategory;
use crate::domain::opportunity::OpportunityRecord;
use crate::period::TimeGranularity;
use crate::reports::{mean, Cell, ReportTable};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BucketWorkload {
    pub account_manager: String,
    pub bucket: String,
    pub count: u64,
    pub weighted: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ManagerWorkload {
    pub account_manager: String,
    pub count: u64,
    pub weighted: f64,
    pub workload_reduction: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkloadSummary {
    pub highest_manager: Option<String>,
    pub highest_weighted: f64,
    pub total_reduction: f64,
    pub average_weighted: f64,
    pub manager_count: usize,
    pub flood_policies: u64,
    pub flood_weighted: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkloadReport {
    pub granularity: TimeGranularity,
    pub time_totals: Vec<BucketWorkload>,
    pub manager_totals: Vec<ManagerWorkload>,
    pub summary: WorkloadSummary,
    pub time_table: Option<ReportTable>,
    pub summary_table: Option<ReportTable>,
}

#[derive(Default)]
struct Totals {
    count: u64,
    weighted: f64,
}

impl Totals {
    fn add(&mut self, count: u64, weighted: f64) {
        self.count += count;
        self.weighted += weighted;
    }
}

/// Raw and weighted counts per (manager, bucket). Records without a close date
/// cannot be bucketed and are skipped.
pub fn time_totals(
    records: &[OpportunityRecord],
    granularity: TimeGranularity,
) -> Vec<BucketWorkload> {
    // Per-line subtotals first, so each line's weight is applied once per group.
    let mut by_line: BTreeMap<(String, String, BusinessCategory), u64> = BTreeMap::new();
    for record in records {
        let Some(close_date) = record.close_date() else {
            continue;
        };
        let key = (
            record.account_manager().to_string(),
            granularity.bucket(close_date),
            record.business_category,
        );
        *by_line.entry(key).or_default() += 1;
    }

    let mut by_bucket: BTreeMap<(String, String), Totals> = BTreeMap::new();
    for ((manager, bucket, category), count) in by_line {
        by_bucket
            .entry((manager, bucket))
            .or_default()
            .add(count, count as f64 * category.workload_weight());
    }

    by_bucket
        .into_iter()
        .map(|((account_manager, bucket), totals)| BucketWorkload {
            account_manager,
            bucket,
            count: totals.count,
            weighted: totals.weighted,
        })
        .collect()
}

/// Collapses buckets into one row per manager, heaviest weighted load first.
pub fn manager_totals(time_totals: &[BucketWorkload]) -> Vec<ManagerWorkload> {
    let mut by_manager: BTreeMap<&str, Totals> = BTreeMap::new();
    for bucket in time_totals {
        by_manager
            .entry(bucket.account_manager.as_str())
            .or_default()
            .add(bucket.count, bucket.weighted);
    }

    let mut rows: Vec<ManagerWorkload> = by_manager
        .into_iter()
        .map(|(manager, totals)| ManagerWorkload {
            account_manager: manager.to_string(),
            count: totals.count,
            weighted: totals.weighted,
            workload_reduction: totals.count as f64 - totals.weighted,
        })
        .collect();
    rows.sort_by(|a, b| b.weighted.total_cmp(&a.weighted));
    rows
}

pub fn summarize(records: &[OpportunityRecord], managers: &[ManagerWorkload]) -> WorkloadSummary {
    let flood_policies = records
        .iter()
        .filter(|record| record.business_category == BusinessCategory::Flood)
        .count() as u64;
    let highest = managers.first();

    WorkloadSummary {
        highest_manager: highest.map(|row| row.account_manager.clone()),
        highest_weighted: highest.map(|row| row.weighted).unwrap_or(0.0),
        total_reduction: managers.iter().map(|row| row.workload_reduction).sum(),
        average_weighted: mean(managers.iter().map(|row| row.weighted)),
        manager_count: managers.len(),
        flood_policies,
        flood_weighted: flood_policies as f64 * BusinessCategory::Flood.workload_weight(),
    }
}

impl WorkloadReport {
    pub fn build(
        records: &[OpportunityRecord],
        granularity: TimeGranularity,
        include_tables: bool,
    ) -> Self {
        let time_totals = time_totals(records, granularity);
        let manager_totals = manager_totals(&time_totals);
        let summary = summarize(records, &manager_totals);

        let time_table = include_tables.then(|| time_table(&time_totals, granularity));
        let summary_table = include_tables.then(|| summary_table(&manager_totals));

        Self { granularity, time_totals, manager_totals, summary, time_table, summary_table }
    }

    /// Top `n` managers by weighted workload.
    pub fn ranking(&self, n: usize) -> &[ManagerWorkload] {
        &self.manager_totals[..n.min(self.manager_totals.len())]
    }
}

fn time_table(rows: &[BucketWorkload], granularity: TimeGranularity) -> ReportTable {
    let mut table = ReportTable::with_columns([
        "Account Manager",
        granularity.label(),
        "Policies",
        "Weighted Policies",
    ]);
    for row in rows {
        table.push_row(vec![
            Cell::Text(row.account_manager.clone()),
            Cell::Text(row.bucket.clone()),
            Cell::Count(row.count),
            Cell::Weight(row.weighted),
        ]);
    }
    table
}

fn summary_table(rows: &[ManagerWorkload]) -> ReportTable {
    let mut table = ReportTable::with_columns([
        "Account Manager",
        "Total Policies",
        "Weighted Total",
        "Workload Reduction",
    ]);
    for row in rows {
        table.push_row(vec![
            Cell::Text(row.account_manager.clone()),
            Cell::Count(row.count),
            Cell::Weight(row.weighted),
            Cell::Weight(row.workload_reduction),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::{manager_totals, time_totals, WorkloadReport};
    use crate::domain::category::{BusinessCategory, OutcomeCategory};
    use crate::domain::opportunity::{OpportunityRecord, RenewalRow};
    use crate::period::TimeGranularity;

    fn record(
        manager: &str,
        category: BusinessCategory,
        close_date: Option<NaiveDate>,
    ) -> OpportunityRecord {
        OpportunityRecord {
            row: RenewalRow {
                opportunity_id: "006".to_string(),
                stage: "Binding".to_string(),
                business_type: String::new(),
                renewal_type: "Personal Lines - Renewal".to_string(),
                account_id: "001".to_string(),
                account_name: "Acct".to_string(),
                account_manager: manager.to_string(),
                close_date,
                premium: Decimal::ZERO,
            },
            outcome_category: OutcomeCategory::Open,
            business_category: category,
        }
    }

    fn day(d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2024, 3, d)
    }

    #[test]
    fn flood_rows_weigh_half() {
        let mut records = Vec::new();
        records.extend((0..100).map(|_| record("Jane", BusinessCategory::Flood, day(4))));
        records.extend((0..100).map(|_| record("Jane", BusinessCategory::Homeowners, day(5))));

        let buckets = time_totals(&records, TimeGranularity::Month);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].count, 200);
        assert_eq!(buckets[0].weighted, 150.0);

        let managers = manager_totals(&buckets);
        assert_eq!(managers[0].workload_reduction, 50.0);
    }

    #[test]
    fn weighted_sum_matches_per_row_weights() {
        let categories = [
            BusinessCategory::Flood,
            BusinessCategory::Auto,
            BusinessCategory::Flood,
            BusinessCategory::Commercial,
            BusinessCategory::Other,
            BusinessCategory::Flood,
        ];
        let records: Vec<_> = categories
            .iter()
            .enumerate()
            .map(|(i, category)| record(["Ana", "Ben"][i % 2], *category, day(1 + i as u32)))
            .collect();

        let expected: f64 = categories.iter().map(|c| c.workload_weight()).sum();
        let buckets = time_totals(&records, TimeGranularity::Day);
        let weighted: f64 = buckets.iter().map(|b| b.weighted).sum();
        assert_eq!(weighted, expected);
        assert_eq!(expected, 4.5);
    }

    #[test]
    fn undated_rows_are_skipped_for_buckets_but_counted_as_flood() {
        let records = vec![
            record("Jane", BusinessCategory::Flood, None),
            record("Jane", BusinessCategory::Flood, day(2)),
            record("Omar", BusinessCategory::Auto, None),
        ];

        let report = WorkloadReport::build(&records, TimeGranularity::Week, false);
        assert_eq!(report.time_totals.len(), 1);
        assert_eq!(report.manager_totals.len(), 1);
        assert_eq!(report.summary.flood_policies, 2);
        assert_eq!(report.summary.flood_weighted, 1.0);
        assert!(report.time_table.is_none());
    }

    #[test]
    fn managers_ranked_by_weighted_total() {
        let records = vec![
            record("Ana", BusinessCategory::Flood, day(1)),
            record("Ana", BusinessCategory::Flood, day(1)),
            record("Ana", BusinessCategory::Flood, day(20)),
            record("Ben", BusinessCategory::Auto, day(1)),
            record("Ben", BusinessCategory::Auto, day(1)),
        ];

        let report = WorkloadReport::build(&records, TimeGranularity::Week, true);

        assert_eq!(report.time_totals.len(), 3);
        assert_eq!(report.manager_totals[0].account_manager, "Ben");
        assert_eq!(report.manager_totals[0].weighted, 2.0);
        assert_eq!(report.manager_totals[1].account_manager, "Ana");
        assert_eq!(report.manager_totals[1].weighted, 1.5);
        assert_eq!(report.manager_totals[1].count, 3);

        assert_eq!(report.summary.highest_manager.as_deref(), Some("Ben"));
        assert_eq!(report.summary.total_reduction, 1.5);
        assert_eq!(report.summary.average_weighted, 1.75);
        assert_eq!(report.ranking(1).len(), 1);
        assert_eq!(report.ranking(10).len(), 2);

        let time_table = report.time_table.expect("tables requested");
        assert_eq!(time_table.columns[1].name, "Week");
    }

    #[test]
    fn reduction_is_never_negative() {
        let records = vec![
            record("Ana", BusinessCategory::Marine, day(3)),
            record("Ana", BusinessCategory::Flood, day(3)),
        ];
        for row in manager_totals(&time_totals(&records, TimeGranularity::Day)) {
            assert!(row.workload_reduction >= 0.0);
        }
    }
}
