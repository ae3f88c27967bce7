//! Tests for schema types.

use super::*;

const RULE_SET_YAML: &str = r#"
apiVersion: v1
kind: InsightRuleSet
metadata:
  id: credit-rules
  name: Credit insight rules
  tags: [ccris, ctos]
rules:
  - label: "🔴 High Utilization"
    compound_type: Revolving Credit Overuse
    category: utilization
    condition: creditutilizationratio > 80
    template: "Your {{ Facility }} with {{ Lender_Type }} is at {{ creditutilizationratio }}%."
    recommendation: Pay down the balance.
    priority: High
    data_source: CCRIS
  - label: "⚫ Legal Risk"
    compound_type: Active Legal Case
    condition: legal_cases_active > 0
    template: "You have {{ legal_cases_active }} active case(s): {{ case_types }}."
    priority: Critical
"#;

const LEGACY_JSON: &str = r#"
{
  "rules": [
    {
      "label": "🟠 Missed Payments",
      "compound_type": "Payment Conduct Issues",
      "condition": "payment_conduct_code >= 1",
      "template": "Your {{Facility}} shows payment issues.",
      "recommendation": "Contact your lender.",
      "priority": "high",
      "field_mapping": "payment_conduct_code <- CCRIS conduct row"
    }
  ]
}
"#;

#[test]
fn parse_versioned_rule_set() {
    let doc: RuleSetDocument = serde_yaml::from_str(RULE_SET_YAML).unwrap();
    assert_eq!(doc.api_version.as_deref(), Some("v1"));
    assert_eq!(doc.kind.as_deref(), Some(RULE_SET_KIND));
    assert!(doc.check_header().is_ok());

    let meta = doc.metadata.as_ref().unwrap();
    assert_eq!(meta.id, "credit-rules");
    assert_eq!(meta.tags.as_ref().unwrap(), &vec!["ccris".to_string(), "ctos".to_string()]);

    assert_eq!(doc.rules.len(), 2);
    assert_eq!(doc.rules[0].category, Some(RuleCategory::Utilization));
    assert_eq!(doc.rules[0].data_source.as_deref(), Some("CCRIS"));
    assert_eq!(doc.rules[1].category, None);
    assert_eq!(doc.rules[1].recommendation, "");
}

#[test]
fn parse_legacy_json() {
    let doc: RuleSetDocument = serde_json::from_str(LEGACY_JSON).unwrap();
    assert!(doc.api_version.is_none());
    assert!(doc.check_header().is_ok());
    assert_eq!(doc.rules.len(), 1);
    assert!(doc.rules[0].field_mapping.is_some());
}

#[test]
fn header_rejects_wrong_version_and_kind() {
    let doc = RuleSetDocument {
        api_version: Some("v2".into()),
        ..Default::default()
    };
    assert!(doc.check_header().unwrap_err().contains("apiVersion"));

    let doc = RuleSetDocument {
        kind: Some("AnomalyRule".into()),
        ..Default::default()
    };
    assert!(doc.check_header().unwrap_err().contains("kind"));
}

#[test]
fn unknown_category_is_a_parse_error() {
    let yaml = r#"
rules:
  - label: X
    category: sideways
"#;
    assert!(serde_yaml::from_str::<RuleSetDocument>(yaml).is_err());
}

#[test]
fn rule_resolves_category() {
    let doc: RuleSetDocument = serde_yaml::from_str(RULE_SET_YAML).unwrap();
    let explicit = Rule::from_definition(0, doc.rules[0].clone());
    assert_eq!(explicit.category, RuleCategory::Utilization);
    assert!(!explicit.category_inferred);

    let inferred = Rule::from_definition(1, doc.rules[1].clone());
    assert_eq!(inferred.category, RuleCategory::LegalRisk);
    assert!(inferred.category_inferred);
    assert_eq!(inferred.severity(), Severity::Critical);
}

#[test]
fn blank_data_source_is_dropped() {
    let def = RuleDefinition {
        label: "L".into(),
        condition: "true".into(),
        template: "t".into(),
        priority: "low".into(),
        data_source: Some("  ".into()),
        ..Default::default()
    };
    let rule = Rule::from_definition(0, def);
    assert!(rule.data_source.is_none());
}
