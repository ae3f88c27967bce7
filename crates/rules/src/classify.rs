//! Record variant classification by field presence.

use credit_core::{Field, Record, RecordVariant, TypedRecord};

/// Fields that only appear on portfolio-level (aggregate) records.
pub const AGGREGATE_MARKERS: &[Field] = &[
    Field::NumberOfLoans,
    Field::ApplicationsLast12Months,
    Field::DistinctAccountTypes,
    Field::TradeRefAmountOverdue,
    Field::LegalCasesSettled,
    Field::LegalCasesActive,
];

/// Fields that identify a single credit facility.
pub const LOAN_MARKERS: &[Field] = &[Field::FacilityType, Field::LoanTypeName];

/// Classify a record. Depends on which fields are present, never on their values.
///
/// Any aggregate marker wins. Records with neither kind of marker are
/// treated as loans.
pub fn classify(record: &Record) -> RecordVariant {
    if AGGREGATE_MARKERS.iter().any(|f| record.contains(*f)) {
        return RecordVariant::Aggregate;
    }
    if LOAN_MARKERS.iter().any(|f| record.contains(*f)) {
        return RecordVariant::Loan;
    }
    RecordVariant::Loan
}

/// Classify and wrap in the matching typed view.
pub fn typed(record: &Record) -> TypedRecord<'_> {
    TypedRecord::new(record, classify(record))
}
