use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OutcomeCategory {
    Open,
    Won,
    Lost,
    Unknown,
}

impl OutcomeCategory {
    pub const ALL: [Self; 4] = [Self::Open, Self::Won, Self::Lost, Self::Unknown];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Won => "Won",
            Self::Lost => "Lost",
            Self::Unknown => "Unknown",
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl fmt::Display for OutcomeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Consolidated line of business. Closed set: CRM business types that are not
/// recognized land in `Other`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BusinessCategory {
    Auto,
    Homeowners,
    Flood,
    Commercial,
    Marine,
    Specialty,
    Umbrella,
    #[serde(rename = "CPL")]
    Cpl,
    Life,
    Other,
}

impl BusinessCategory {
    pub const ALL: [Self; 10] = [
        Self::Auto,
        Self::Homeowners,
        Self::Flood,
        Self::Commercial,
        Self::Marine,
        Self::Specialty,
        Self::Umbrella,
        Self::Cpl,
        Self::Life,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "Auto",
            Self::Homeowners => "Homeowners",
            Self::Flood => "Flood",
            Self::Commercial => "Commercial",
            Self::Marine => "Marine",
            Self::Specialty => "Specialty",
            Self::Umbrella => "Umbrella",
            Self::Cpl => "CPL",
            Self::Life => "Life",
            Self::Other => "Other",
        }
    }

    /// Effort multiplier applied when allocating workload.
    pub fn workload_weight(&self) -> f64 {
        match self {
            Self::Flood => 0.5,
            _ => 1.0,
        }
    }
}

impl fmt::Display for BusinessCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown business line `{0}`")]
pub struct UnknownBusinessLine(pub String);

/// Parses operator input (config files, CLI flags). CRM values never go through
/// here; they are classified by exact match in [`crate::reference`].
impl FromStr for BusinessCategory {
    type Err = UnknownBusinessLine;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().to_ascii_lowercase() == normalized)
            .ok_or_else(|| UnknownBusinessLine(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{BusinessCategory, OutcomeCategory};

    #[test]
    fn parses_operator_input_case_insensitively() {
        assert_eq!("cpl".parse::<BusinessCategory>(), Ok(BusinessCategory::Cpl));
        assert_eq!(" Homeowners ".parse::<BusinessCategory>(), Ok(BusinessCategory::Homeowners));
        assert!("Boats".parse::<BusinessCategory>().is_err());
    }

    #[test]
    fn only_flood_carries_reduced_weight() {
        for category in BusinessCategory::ALL {
            let expected = if category == BusinessCategory::Flood { 0.5 } else { 1.0 };
            assert_eq!(category.workload_weight(), expected, "{category}");
        }
    }

    #[test]
    fn closed_outcomes_are_won_and_lost() {
        let closed: Vec<_> = OutcomeCategory::ALL.into_iter().filter(|o| o.is_closed()).collect();
        assert_eq!(closed, vec![OutcomeCategory::Won, OutcomeCategory::Lost]);
    }

    #[test]
    fn cpl_serializes_with_canonical_label() {
        let json = serde_json::to_string(&BusinessCategory::Cpl).expect("serialize");
        assert_eq!(json, "\"CPL\"");
    }
}
