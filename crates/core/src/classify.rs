use crate::domain::opportunity::{OpportunityRecord, RenewalRow};
use crate::reference;

pub fn classify(row: RenewalRow) -> OpportunityRecord {
    let outcome_category = reference::stage_outcome(&row.stage);
    let business_category = reference::business_category(&row.business_type);
    OpportunityRecord { row, outcome_category, business_category }
}

pub fn classify_all(rows: Vec<RenewalRow>) -> Vec<OpportunityRecord> {
    rows.into_iter().map(classify).collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{classify, classify_all};
    use crate::domain::category::{BusinessCategory, OutcomeCategory};
    use crate::domain::opportunity::RenewalRow;

    fn row(stage: &str, business_type: &str) -> RenewalRow {
        RenewalRow {
            opportunity_id: "006-1".to_string(),
            stage: stage.to_string(),
            business_type: business_type.to_string(),
            renewal_type: "Personal Lines - Renewal".to_string(),
            account_id: "001-1".to_string(),
            account_name: "Harbor Point HOA".to_string(),
            account_manager: "Jane".to_string(),
            close_date: None,
            premium: Decimal::ZERO,
        }
    }

    #[test]
    fn attaches_outcome_and_business_line() {
        let record = classify(row("Closed Won", "Homeowners"));
        assert_eq!(record.outcome_category, OutcomeCategory::Won);
        assert_eq!(record.business_category, BusinessCategory::Homeowners);
        assert_eq!(record.row.stage, "Closed Won");
    }

    #[test]
    fn unrecognized_inputs_stay_inside_closed_sets() {
        let records = classify_all(vec![
            row("Archived", "Homeowners "),
            row("CLOSED LOST", "Personal Auto"),
            row("Binding", ""),
        ]);

        for record in &records {
            assert!(OutcomeCategory::ALL.contains(&record.outcome_category));
            assert!(BusinessCategory::ALL.contains(&record.business_category));
        }
        assert_eq!(records[0].outcome_category, OutcomeCategory::Unknown);
        assert_eq!(records[0].business_category, BusinessCategory::Other);
        assert_eq!(records[1].outcome_category, OutcomeCategory::Unknown);
        assert_eq!(records[1].business_category, BusinessCategory::Auto);
        assert_eq!(records[2].business_category, BusinessCategory::Other);
    }
}
