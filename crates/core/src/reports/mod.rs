pub mod retention;
pub mod win_rate;
pub mod workload;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use retention::{RetentionReport, RetentionRow, RetentionSummary};
pub use win_rate::{WinRateComparison, WinRateReport, WinRateSummary};
pub use workload::{ManagerWorkload, WorkloadReport, WorkloadSummary};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Cell {
    Text(String),
    Count(u64),
    Rate(f64),
    Weight(f64),
    Amount(Decimal),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<Cell>,
}

/// Column-oriented table handed to the presentation layer: each column name
/// maps to one value per row.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportTable {
    pub columns: Vec<Column>,
}

impl ReportTable {
    pub fn with_columns<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: names
                .into_iter()
                .map(|name| Column { name: name.into(), values: Vec::new() })
                .collect(),
        }
    }

    /// Appends one row. Cells are matched to columns by position.
    pub fn push_row(&mut self, cells: Vec<Cell>) {
        debug_assert_eq!(cells.len(), self.columns.len(), "row width must match column count");
        for (column, cell) in self.columns.iter_mut().zip(cells) {
            column.values.push(cell);
        }
    }

    pub fn column(&self, name: &str) -> Option<&[Cell]> {
        self.columns
            .iter()
            .find(|column| column.name == name)
            .map(|column| column.values.as_slice())
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(|column| column.values.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }
}

/// `part / whole × 100`, or 0 when `whole` is zero.
pub(crate) fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

pub(crate) fn amount_percentage(part: Decimal, whole: Decimal) -> f64 {
    if whole <= Decimal::ZERO {
        return 0.0;
    }
    (part / whole * Decimal::ONE_HUNDRED).to_f64().unwrap_or(0.0)
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub(crate) fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values.into_iter().fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{amount_percentage, mean, percentage, round1, Cell, ReportTable};

    #[test]
    fn percentage_of_zero_is_zero() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(3, 0), 0.0);
        assert_eq!(amount_percentage(Decimal::ONE, Decimal::ZERO), 0.0);
    }

    #[test]
    fn rounds_to_one_decimal() {
        assert_eq!(round1(66.666_666), 66.7);
        assert_eq!(round1(33.333_333), 33.3);
        assert_eq!(round1(100.0), 100.0);
    }

    #[test]
    fn weight_cells_keep_their_own_kind() {
        let json = serde_json::to_value(Cell::Weight(3.5)).expect("serialize");
        assert_eq!(json, serde_json::json!({ "kind": "weight", "value": 3.5 }));
    }

    #[test]
    fn mean_of_nothing_is_zero() {
        assert_eq!(mean(Vec::<f64>::new()), 0.0);
        assert_eq!(mean(vec![50.0, 100.0]), 75.0);
    }

    #[test]
    fn table_rows_land_in_named_columns() {
        let mut table = ReportTable::with_columns(["Business Line", "Won"]);
        table.push_row(vec![Cell::Text("Auto".to_string()), Cell::Count(4)]);
        table.push_row(vec![Cell::Text("Flood".to_string()), Cell::Count(1)]);

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column("Won"), Some(&[Cell::Count(4), Cell::Count(1)][..]));
        assert!(table.column("Lost").is_none());
    }
}
