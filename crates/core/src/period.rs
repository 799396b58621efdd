//! Reporting periods and time buckets for workload allocation.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::SelectionError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, SelectionError> {
        if start > end {
            return Err(SelectionError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Builds a range from possibly reversed bounds. The flag reports whether
    /// the bounds had to be swapped.
    pub fn normalized(start: NaiveDate, end: NaiveDate) -> (Self, bool) {
        if start > end {
            (Self { start: end, end: start }, true)
        } else {
            (Self { start, end }, false)
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodPreset {
    #[serde(rename = "last_7_days")]
    LastSevenDays,
    #[serde(rename = "last_30_days")]
    LastThirtyDays,
    #[default]
    #[serde(rename = "last_quarter")]
    LastQuarter,
    #[serde(rename = "year_to_date")]
    YearToDate,
}

impl PeriodPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LastSevenDays => "last_7_days",
            Self::LastThirtyDays => "last_30_days",
            Self::LastQuarter => "last_quarter",
            Self::YearToDate => "year_to_date",
        }
    }

    pub fn resolve(&self, today: NaiveDate) -> DateRange {
        let start = match self {
            Self::LastSevenDays => today - Duration::days(7),
            Self::LastThirtyDays => today - Duration::days(30),
            Self::LastQuarter => today - Duration::days(90),
            Self::YearToDate => NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today),
        };
        DateRange { start, end: today }
    }
}

impl FromStr for PeriodPreset {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "last_7_days" => Ok(Self::LastSevenDays),
            "last_30_days" => Ok(Self::LastThirtyDays),
            "last_quarter" => Ok(Self::LastQuarter),
            "year_to_date" | "ytd" => Ok(Self::YearToDate),
            other => Err(format!(
                "unsupported period `{other}` (expected last_7_days|last_30_days|last_quarter|year_to_date)"
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeGranularity {
    Day,
    Week,
    Month,
    Quarter,
}

impl TimeGranularity {
    /// Chosen once per report from the overall range; row content never
    /// influences it.
    pub fn for_range(range: &DateRange) -> Self {
        match range.span_days() {
            days if days <= 7 => Self::Day,
            days if days <= 31 => Self::Week,
            days if days <= 365 => Self::Month,
            _ => Self::Quarter,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Day => "Day",
            Self::Week => "Week",
            Self::Month => "Month",
            Self::Quarter => "Quarter",
        }
    }

    /// Bucket key for a close date. Weeks start on Sunday.
    pub fn bucket(&self, date: NaiveDate) -> String {
        match self {
            Self::Day => date.format("%Y-%m-%d").to_string(),
            Self::Week => date.format("%Y-W%U").to_string(),
            Self::Month => date.format("%Y-%m").to_string(),
            Self::Quarter => format!("{}Q{}", date.year(), date.month0() / 3 + 1),
        }
    }
}

impl fmt::Display for TimeGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
