//! Rule applicability: which (rule, record) pairs are worth evaluating.

use credit_core::{RecordVariant, TypedRecord};

use crate::schema::{Rule, RuleCategory};

/// Whether `category` may be evaluated against `record`.
pub fn category_applies(category: RuleCategory, record: &TypedRecord<'_>) -> bool {
    let revolving_loan = record.as_loan().map_or(false, |loan| loan.is_revolving());
    let variant = record.variant();

    match category {
        RuleCategory::Utilization | RuleCategory::PositiveUtilization => revolving_loan,
        RuleCategory::PaymentConduct | RuleCategory::PositivePaymentHistory | RuleCategory::General => {
            variant == RecordVariant::Loan
        }
        RuleCategory::Portfolio
        | RuleCategory::TradeReference
        | RuleCategory::LegalRisk
        | RuleCategory::PositiveCreditHistory => variant == RecordVariant::Aggregate,
    }
}

/// Whether `rule` should be evaluated against `record` at all.
pub fn applies(rule: &Rule, record: &TypedRecord<'_>) -> bool {
    category_applies(rule.category, record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use credit_core::Record;

    use crate::classify::typed;

    fn credit_card() -> Record {
        Record::new().with("facility_type", "CRDTCARD").with("creditutilizationratio", 85.5)
    }

    fn housing_loan() -> Record {
        Record::new().with("facility_type", "HSLNFNCE").with("mon_arrears", 2)
    }

    fn portfolio() -> Record {
        Record::new().with("numberofloans", 5).with("legal_cases_active", 1)
    }

    #[test]
    fn utilization_needs_revolving_loan() {
        assert!(category_applies(RuleCategory::Utilization, &typed(&credit_card())));
        assert!(!category_applies(RuleCategory::Utilization, &typed(&housing_loan())));
        assert!(!category_applies(RuleCategory::Utilization, &typed(&portfolio())));
    }

    #[test]
    fn revolving_read_from_loantype_fallback() {
        let record = Record::new().with("loantype", "OVRDRAFT");
        assert!(category_applies(RuleCategory::PositiveUtilization, &typed(&record)));
        let record = Record::new().with("facility_type", "").with("loan_type", "CRDTCARD");
        assert!(category_applies(RuleCategory::Utilization, &typed(&record)));
    }

    #[test]
    fn payment_conduct_on_every_loan() {
        assert!(category_applies(RuleCategory::PaymentConduct, &typed(&credit_card())));
        assert!(category_applies(RuleCategory::PaymentConduct, &typed(&housing_loan())));
        assert!(!category_applies(RuleCategory::PaymentConduct, &typed(&portfolio())));
    }

    #[test]
    fn portfolio_families_need_aggregate() {
        for category in [
            RuleCategory::Portfolio,
            RuleCategory::TradeReference,
            RuleCategory::LegalRisk,
            RuleCategory::PositiveCreditHistory,
        ] {
            assert!(category_applies(category, &typed(&portfolio())), "{}", category);
            assert!(!category_applies(category, &typed(&credit_card())), "{}", category);
        }
    }

    #[test]
    fn general_defaults_to_loan() {
        assert!(category_applies(RuleCategory::General, &typed(&Record::new())));
        assert!(!category_applies(RuleCategory::General, &typed(&portfolio())));
    }
}
