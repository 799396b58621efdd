//! Retention by business line.
//!
//! Rates are computed over closed opportunities only (won + lost). Lines with
//! no closed opportunity carry no rate and are dropped from the ranking.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::category::{BusinessCategory, OutcomeCategory};
use crate::domain::opportunity::OpportunityRecord;
use crate::reports::{amount_percentage, mean, percentage, round1, Cell, ReportTable};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RetentionRow {
    pub business_category: BusinessCategory,
    pub total: u64,
    pub won: u64,
    pub lost: u64,
    pub open: u64,
    pub closed: u64,
    pub retention_rate: f64,
    pub total_premium: Decimal,
    pub won_premium: Decimal,
    pub lost_premium: Decimal,
    pub premium_retention_rate: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PremiumSummary {
    pub total_premium: Decimal,
    pub retained_premium: Decimal,
    pub retained_share: f64,
    pub lost_premium: Decimal,
    pub lost_share: f64,
    pub premium_retention_rate: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RetentionSummary {
    pub highest: BusinessCategory,
    pub highest_rate: f64,
    pub lowest: BusinessCategory,
    pub lowest_rate: f64,
    pub average_rate: f64,
    pub line_count: usize,
    pub overall_rate: f64,
    pub total_won: u64,
    pub total_closed: u64,
    pub premium: Option<PremiumSummary>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RetentionReport {
    pub rows: Vec<RetentionRow>,
    pub summary: Option<RetentionSummary>,
    pub table: Option<ReportTable>,
}

/// Per-line counts for every category in `categories` that has at least one
/// record, in the order given.
pub fn retention_rows(
    records: &[OpportunityRecord],
    categories: &[BusinessCategory],
) -> Vec<RetentionRow> {
    categories
        .iter()
        .filter_map(|category| {
            let in_line: Vec<&OpportunityRecord> =
                records.iter().filter(|record| record.business_category == *category).collect();
            if in_line.is_empty() {
                return None;
            }
            Some(line_row(*category, &in_line))
        })
        .collect()
}

fn line_row(category: BusinessCategory, records: &[&OpportunityRecord]) -> RetentionRow {
    let count = |outcome: OutcomeCategory| {
        records.iter().filter(|record| record.outcome_category == outcome).count() as u64
    };
    let premium = |outcome: OutcomeCategory| -> Decimal {
        records
            .iter()
            .filter(|record| record.outcome_category == outcome)
            .map(|record| record.premium())
            .sum()
    };

    let won = count(OutcomeCategory::Won);
    let lost = count(OutcomeCategory::Lost);
    let open = count(OutcomeCategory::Open);
    let closed = won + lost;
    let won_premium = premium(OutcomeCategory::Won);
    let lost_premium = premium(OutcomeCategory::Lost);

    RetentionRow {
        business_category: category,
        total: records.len() as u64,
        won,
        lost,
        open,
        closed,
        retention_rate: percentage(won, closed),
        total_premium: records.iter().map(|record| record.premium()).sum(),
        won_premium,
        lost_premium,
        premium_retention_rate: amount_percentage(won_premium, won_premium + lost_premium),
    }
}

/// Drops lines without closed opportunities and orders the rest by retention
/// rate, highest first. Ties keep their input order.
pub fn rank(rows: Vec<RetentionRow>) -> Vec<RetentionRow> {
    let mut ranked: Vec<RetentionRow> = rows.into_iter().filter(|row| row.closed > 0).collect();
    ranked.sort_by(|a, b| b.retention_rate.total_cmp(&a.retention_rate));
    ranked
}

pub fn summarize(rows: &[RetentionRow], track_premium: bool) -> Option<RetentionSummary> {
    let first = rows.first()?;
    let last = rows.last()?;

    let total_won: u64 = rows.iter().map(|row| row.won).sum();
    let total_closed: u64 = rows.iter().map(|row| row.closed).sum();

    let premium = track_premium.then(|| {
        let total_premium: Decimal = rows.iter().map(|row| row.total_premium).sum();
        let retained_premium: Decimal = rows.iter().map(|row| row.won_premium).sum();
        let lost_premium: Decimal = rows.iter().map(|row| row.lost_premium).sum();
        PremiumSummary {
            total_premium,
            retained_premium,
            retained_share: amount_percentage(retained_premium, total_premium),
            lost_premium,
            lost_share: amount_percentage(lost_premium, total_premium),
            premium_retention_rate: amount_percentage(
                retained_premium,
                retained_premium + lost_premium,
            ),
        }
    });

    Some(RetentionSummary {
        highest: first.business_category,
        highest_rate: first.retention_rate,
        lowest: last.business_category,
        lowest_rate: last.retention_rate,
        average_rate: mean(rows.iter().map(|row| row.retention_rate)),
        line_count: rows.len(),
        overall_rate: percentage(total_won, total_closed),
        total_won,
        total_closed,
        premium,
    })
}

pub fn table(rows: &[RetentionRow], track_premium: bool) -> ReportTable {
    let mut names = vec![
        "Business Line",
        "Total Opps",
        "Won",
        "Lost",
        "Open",
        "Closed Opps",
        "Retention Rate (%)",
    ];
    if track_premium {
        names.extend([
            "Total Premium",
            "Won Premium",
            "Lost Premium",
            "Premium Retention Rate (%)",
        ]);
    }

    let mut table = ReportTable::with_columns(names);
    for row in rows {
        let mut cells = vec![
            Cell::Text(row.business_category.to_string()),
            Cell::Count(row.total),
            Cell::Count(row.won),
            Cell::Count(row.lost),
            Cell::Count(row.open),
            Cell::Count(row.closed),
            Cell::Rate(round1(row.retention_rate)),
        ];
        if track_premium {
            cells.extend([
                Cell::Amount(row.total_premium),
                Cell::Amount(row.won_premium),
                Cell::Amount(row.lost_premium),
                Cell::Rate(round1(row.premium_retention_rate)),
            ]);
        }
        table.push_row(cells);
    }
    table
}

impl RetentionReport {
    pub fn build(
        records: &[OpportunityRecord],
        categories: &[BusinessCategory],
        track_premium: bool,
        include_table: bool,
    ) -> Self {
        let rows = rank(retention_rows(records, categories));
        let summary = summarize(&rows, track_premium);
        let table = include_table.then(|| table(&rows, track_premium));
        Self { rows, summary, table }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{rank, retention_rows, RetentionReport};
    use crate::domain::category::{BusinessCategory, OutcomeCategory};
    use crate::domain::opportunity::{OpportunityRecord, RenewalRow};
    use crate::reports::Cell;

    fn record(
        category: BusinessCategory,
        outcome: OutcomeCategory,
        premium: i64,
    ) -> OpportunityRecord {
        OpportunityRecord {
            row: RenewalRow {
                opportunity_id: "006".to_string(),
                stage: String::new(),
                business_type: String::new(),
                renewal_type: "Personal Lines - Renewal".to_string(),
                account_id: "001".to_string(),
                account_name: "Acct".to_string(),
                account_manager: "Jane".to_string(),
                close_date: None,
                premium: Decimal::new(premium, 0),
            },
            outcome_category: outcome,
            business_category: category,
        }
    }

    #[test]
    fn won_and_lost_auto_renewal_scenario() {
        let records = vec![
            record(BusinessCategory::Auto, OutcomeCategory::Won, 1000),
            record(BusinessCategory::Auto, OutcomeCategory::Lost, 500),
        ];

        let rows = retention_rows(&records, &[BusinessCategory::Auto]);
        let auto = &rows[0];

        assert_eq!(auto.total, 2);
        assert_eq!(auto.closed, 2);
        assert_eq!(auto.retention_rate, 50.0);
        assert!((auto.premium_retention_rate - 66.666_666).abs() < 0.001);
        assert_eq!(auto.total_premium, Decimal::new(1500, 0));
        assert_eq!(auto.won_premium, Decimal::new(1000, 0));
        assert_eq!(auto.lost_premium, Decimal::new(500, 0));
    }

    #[test]
    fn line_without_closed_opportunities_has_zero_rate_and_is_dropped() {
        let records = vec![
            record(BusinessCategory::Flood, OutcomeCategory::Open, 300),
            record(BusinessCategory::Flood, OutcomeCategory::Unknown, 100),
            record(BusinessCategory::Auto, OutcomeCategory::Won, 0),
        ];

        let rows = retention_rows(&records, &[BusinessCategory::Auto, BusinessCategory::Flood]);
        let flood = rows
            .iter()
            .find(|row| row.business_category == BusinessCategory::Flood)
            .expect("flood row before ranking");
        assert_eq!(flood.retention_rate, 0.0);
        assert_eq!(flood.premium_retention_rate, 0.0);
        assert_eq!(flood.total, 2);
        assert_eq!(flood.open, 1);

        let ranked = rank(rows);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].business_category, BusinessCategory::Auto);
    }

    #[test]
    fn zero_premium_gives_zero_premium_rate() {
        let records = vec![
            record(BusinessCategory::Umbrella, OutcomeCategory::Won, 0),
            record(BusinessCategory::Umbrella, OutcomeCategory::Lost, 0),
        ];
        let rows = retention_rows(&records, &[BusinessCategory::Umbrella]);
        assert_eq!(rows[0].premium_retention_rate, 0.0);
        assert_eq!(rows[0].retention_rate, 50.0);
    }

    #[test]
    fn categories_without_records_are_skipped() {
        let records = vec![record(BusinessCategory::Auto, OutcomeCategory::Won, 10)];
        let rows = retention_rows(&records, &[BusinessCategory::Marine, BusinessCategory::Auto]);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn report_ranks_descending_and_summarizes() {
        let records = vec![
            record(BusinessCategory::Auto, OutcomeCategory::Won, 100),
            record(BusinessCategory::Auto, OutcomeCategory::Lost, 100),
            record(BusinessCategory::Homeowners, OutcomeCategory::Won, 400),
            record(BusinessCategory::Homeowners, OutcomeCategory::Won, 400),
            record(BusinessCategory::Homeowners, OutcomeCategory::Open, 200),
            record(BusinessCategory::Marine, OutcomeCategory::Lost, 50),
        ];
        let categories =
            [BusinessCategory::Auto, BusinessCategory::Homeowners, BusinessCategory::Marine];

        let report = RetentionReport::build(&records, &categories, true, true);

        let order: Vec<_> = report.rows.iter().map(|row| row.business_category).collect();
        assert_eq!(
            order,
            vec![BusinessCategory::Homeowners, BusinessCategory::Auto, BusinessCategory::Marine]
        );

        let summary = report.summary.expect("summary for non-empty ranking");
        assert_eq!(summary.highest, BusinessCategory::Homeowners);
        assert_eq!(summary.lowest, BusinessCategory::Marine);
        assert_eq!(summary.average_rate, 50.0);
        assert_eq!(summary.total_won, 3);
        assert_eq!(summary.total_closed, 5);
        assert_eq!(summary.overall_rate, 60.0);

        let premium = summary.premium.expect("premium tracking enabled");
        assert_eq!(premium.total_premium, Decimal::new(1250, 0));
        assert_eq!(premium.retained_premium, Decimal::new(900, 0));
        assert_eq!(premium.lost_premium, Decimal::new(150, 0));

        let table = report.table.expect("table requested");
        assert_eq!(table.row_count(), 3);
        let rates = table.column("Retention Rate (%)").expect("rate column");
        assert_eq!(rates[1], Cell::Rate(50.0));
        assert!(table.column("Won Premium").is_some());
    }

    #[test]
    fn premium_columns_follow_tracking_toggle() {
        let records = vec![record(BusinessCategory::Auto, OutcomeCategory::Won, 100)];
        let report = RetentionReport::build(&records, &[BusinessCategory::Auto], false, true);

        assert!(report.summary.as_ref().and_then(|s| s.premium.as_ref()).is_none());
        let table = report.table.expect("table requested");
        assert!(table.column("Won Premium").is_none());
        assert_eq!(table.columns.len(), 7);
    }

    #[test]
    fn rates_stay_within_bounds() {
        let records = vec![
            record(BusinessCategory::Specialty, OutcomeCategory::Won, 10),
            record(BusinessCategory::Specialty, OutcomeCategory::Won, 20),
            record(BusinessCategory::Cpl, OutcomeCategory::Lost, 5),
        ];
        let rows = retention_rows(&records, &[BusinessCategory::Specialty, BusinessCategory::Cpl]);
        for row in rows {
            assert!((0.0..=100.0).contains(&row.retention_rate));
            assert!((0.0..=100.0).contains(&row.premium_retention_rate));
        }
    }
}
