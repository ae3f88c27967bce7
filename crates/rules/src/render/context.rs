//! Render context assembly.

use credit_core::{Field, FieldKind, FieldValue, PersonalInfo, Record};
use indexmap::IndexMap;

/// Name → value map handed to the template renderer.
pub type RenderContext = IndexMap<String, FieldValue>;

/// Build the context for one record: personal info, then the record's own
/// fields (record wins on collision), then the display aliases.
///
/// Schema fields are normalized to their kind when the raw value converts
/// cleanly, so `"12,500"` in a `balance` column still renders as money.
pub fn build_context(record: &Record, personal: &PersonalInfo) -> RenderContext {
    let mut ctx = RenderContext::new();

    for (field, value) in personal.entries() {
        ctx.insert(field.name().to_string(), value);
    }

    for (name, value) in record.iter() {
        let value = match Field::from_name(name) {
            Some(field) if field.kind() != FieldKind::Text && value.coerces_cleanly(field.kind()) => {
                value.coerce(field.kind())
            }
            _ => value.clone(),
        };
        ctx.insert(name.to_string(), value);
    }

    add_alias(&mut ctx, record, Field::Facility, &[Field::LoanTypeName, Field::FacilityType]);
    add_alias(&mut ctx, record, Field::LenderTypeAlias, &[Field::LenderTypeName, Field::Lender]);

    if let Some(months) = record.get(Field::OldestAccountMonths).and_then(FieldValue::to_f64) {
        if months != 0.0 {
            ctx.insert(
                Field::OldestAccountYears.name().to_string(),
                FieldValue::Float(months / 12.0),
            );
        }
    }

    ctx
}

/// Point `alias` at the first non-empty source field. With no source the
/// record's own value (if any) is kept, else the alias is empty text.
fn add_alias(ctx: &mut RenderContext, record: &Record, alias: Field, sources: &[Field]) {
    match record.first_text(sources) {
        Some(text) => {
            ctx.insert(alias.name().to_string(), FieldValue::Text(text.to_string()));
        }
        None => {
            ctx.entry(alias.name().to_string())
                .or_insert_with(|| FieldValue::Text(String::new()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn personal() -> PersonalInfo {
        PersonalInfo {
            name: "Aisyah".into(),
            ic_number: "900101-14-5678".into(),
            ctos_score: 712,
        }
    }

    #[test]
    fn merges_personal_info_and_record() {
        let record = Record::new().with("balance", "12,500").with("name", "Override");
        let ctx = build_context(&record, &personal());
        assert_eq!(ctx["name"], FieldValue::Text("Override".into()));
        assert_eq!(ctx["ctos_score"], FieldValue::Int(712));
        assert_eq!(ctx["balance"], FieldValue::Float(12500.0));
    }

    #[test]
    fn facility_and_lender_aliases() {
        let record = Record::new()
            .with("facility_type", "CRDTCARD")
            .with("lender", "CIMB Bank");
        let ctx = build_context(&record, &PersonalInfo::default());
        assert_eq!(ctx["Facility"], FieldValue::Text("CRDTCARD".into()));
        assert_eq!(ctx["Lender_Type"], FieldValue::Text("CIMB Bank".into()));

        let record = Record::new()
            .with("loantype", "Credit Card")
            .with("facility_type", "CRDTCARD")
            .with("lendertype", "Commercial Bank");
        let ctx = build_context(&record, &PersonalInfo::default());
        assert_eq!(ctx["Facility"], FieldValue::Text("Credit Card".into()));
        assert_eq!(ctx["Lender_Type"], FieldValue::Text("Commercial Bank".into()));
    }

    #[test]
    fn aliases_default_to_empty_or_keep_record_value() {
        let ctx = build_context(&Record::new(), &PersonalInfo::default());
        assert_eq!(ctx["Facility"], FieldValue::Text(String::new()));

        let record = Record::new().with("Facility", "Housing Loan");
        let ctx = build_context(&record, &PersonalInfo::default());
        assert_eq!(ctx["Facility"], FieldValue::Text("Housing Loan".into()));
    }

    #[test]
    fn derives_account_age_in_years() {
        let record = Record::new().with("oldest_account_months", 54);
        let ctx = build_context(&record, &PersonalInfo::default());
        assert_eq!(ctx["oldest_account_years"], FieldValue::Float(4.5));

        let record = Record::new().with("oldest_account_months", 0);
        let ctx = build_context(&record, &PersonalInfo::default());
        assert!(!ctx.contains_key("oldest_account_years"));
    }
}
