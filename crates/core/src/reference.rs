//! Static reference data: pipeline stages, business types, and the default
//! set of core lines.
//!
//! Lookups are exact string matches against CRM values. No trimming or case
//! folding is applied, so `"closed won"` is an unknown stage.

use crate::domain::category::{BusinessCategory, OutcomeCategory};

use BusinessCategory::*;
use OutcomeCategory::{Lost, Open, Won};

const STAGES: &[(&str, OutcomeCategory)] = &[
    ("New", Open),
    ("Information Gathering", Open),
    ("Rating", Open),
    ("Proposal Generation", Open),
    ("Decision Pending", Open),
    ("Pre-Bind Review", Open),
    ("Quote to Bind", Open),
    ("Binding", Open),
    ("Billing", Open),
    ("Post-Binding", Open),
    ("Closed Won", Won),
    ("Closed Lost", Lost),
];

const BUSINESS_TYPES: &[(&str, BusinessCategory)] = &[
    ("Bond", Commercial),
    ("Builders Risk/Installation - CL", Commercial),
    ("Bumbershoot", Commercial),
    ("Business Owners", Commercial),
    ("Commercial Auto", Commercial),
    ("Commercial Package", Commercial),
    ("Commercial Property", Commercial),
    ("Commercial Umbrella", Commercial),
    ("Crime", Commercial),
    ("Cyber & Privacy Liability", Commercial),
    ("Directors & Officers", Commercial),
    ("Dwelling Fire CL", Commercial),
    ("Errors and Omissions", Commercial),
    ("Flood - CL", Commercial),
    ("General Liability", Commercial),
    ("Inland Marine CL", Commercial),
    ("Marine Package", Commercial),
    ("Surety", Commercial),
    ("Workers Compensation", Commercial),
    ("Employment Practices Liability", Commercial),
    ("Liquor Liability", Commercial),
    ("Wind Only - CL", Commercial),
    ("Builders Risk/Installation - PL", Homeowners),
    ("Dwelling Fire - PL", Homeowners),
    ("Homeowners", Homeowners),
    ("Mobile Homeowners", Homeowners),
    ("Wind Only - PL", Homeowners),
    ("Charter Watercraft", Marine),
    ("Watercraft", Marine),
    ("Yacht", Marine),
    ("Flood - PL", Flood),
    ("Golf Cart", Specialty),
    ("Inland Marine PL", Specialty),
    ("Motorcycle/ATV", Specialty),
    ("Motorhome", Specialty),
    ("Recreational Vehicle", Specialty),
    ("Travel Trailer", Specialty),
    ("Life", Life),
    ("Personal Auto", Auto),
    ("Personal Liability", Cpl),
    ("Umbrella", Umbrella),
];

const CORE_LINES: &[BusinessCategory] =
    &[Auto, Cpl, Commercial, Flood, Homeowners, Marine, Specialty, Umbrella];

/// Outcome for a pipeline stage name; unrecognized stages are `Unknown`.
pub fn stage_outcome(stage: &str) -> OutcomeCategory {
    STAGES
        .iter()
        .find(|(name, _)| *name == stage)
        .map(|(_, outcome)| *outcome)
        .unwrap_or(OutcomeCategory::Unknown)
}

/// Consolidated line for a CRM business type; unrecognized types are `Other`.
pub fn business_category(business_type: &str) -> BusinessCategory {
    BUSINESS_TYPES
        .iter()
        .find(|(name, _)| *name == business_type)
        .map(|(_, category)| *category)
        .unwrap_or(BusinessCategory::Other)
}

pub fn stage_table() -> &'static [(&'static str, OutcomeCategory)] {
    STAGES
}

pub fn business_type_table() -> &'static [(&'static str, BusinessCategory)] {
    BUSINESS_TYPES
}

pub fn default_core_lines() -> Vec<BusinessCategory> {
    CORE_LINES.to_vec()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{business_category, business_type_table, default_core_lines, stage_outcome};
    use crate::domain::category::{BusinessCategory, OutcomeCategory};

    #[test]
    fn closed_stages_map_to_won_and_lost() {
        assert_eq!(stage_outcome("Closed Won"), OutcomeCategory::Won);
        assert_eq!(stage_outcome("Closed Lost"), OutcomeCategory::Lost);
        assert_eq!(stage_outcome("Quote to Bind"), OutcomeCategory::Open);
    }

    #[test]
    fn stage_lookup_is_exact_match() {
        assert_eq!(stage_outcome("closed won"), OutcomeCategory::Unknown);
        assert_eq!(stage_outcome(" Closed Won"), OutcomeCategory::Unknown);
        assert_eq!(stage_outcome(""), OutcomeCategory::Unknown);
    }

    #[test]
    fn business_type_lookup_falls_back_to_other() {
        assert_eq!(business_category("Flood - PL"), BusinessCategory::Flood);
        assert_eq!(business_category("Flood - CL"), BusinessCategory::Commercial);
        assert_eq!(business_category("Personal Liability"), BusinessCategory::Cpl);
        assert_eq!(business_category("Pet Insurance"), BusinessCategory::Other);
        assert_eq!(business_category("yacht"), BusinessCategory::Other);
        assert_eq!(business_category("Not Specified"), BusinessCategory::Other);
    }

    #[test]
    fn business_type_table_has_unique_keys() {
        let keys: HashSet<_> = business_type_table().iter().map(|(name, _)| *name).collect();
        assert_eq!(keys.len(), business_type_table().len());
    }

    #[test]
    fn default_core_lines_exclude_life_and_other() {
        let lines = default_core_lines();
        assert_eq!(lines.len(), 8);
        assert!(!lines.contains(&BusinessCategory::Life));
        assert!(!lines.contains(&BusinessCategory::Other));
        assert_eq!(lines.first(), Some(&BusinessCategory::Auto));
    }
}
