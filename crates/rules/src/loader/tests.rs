//! Tests for the rule repository.

use std::fs;

use credit_core::EngineConfig;
use tempfile::TempDir;

use super::*;
use crate::schema::{RuleCategory, RuleDefinition, Severity};

const UTILIZATION_YAML: &str = r#"
apiVersion: v1
kind: InsightRuleSet
metadata:
  id: utilization
  name: Utilization rules
rules:
  - label: "🔴 High Utilization"
    compound_type: Revolving Credit Overuse
    condition: creditutilizationratio > 80
    template: "Your {{ Facility }} with {{ Lender_Type }} is at {{ creditutilizationratio }}%."
    recommendation: Pay down the balance below 30%.
    priority: High
    data_source: CCRIS
  - label: "🟠 Moderate Utilization"
    compound_type: Revolving Credit Overuse
    condition: 50 < creditutilizationratio <= 80
    template: "Your {{ Facility }} is at {{ creditutilizationratio }}%."
    priority: Medium
"#;

const LEGAL_JSON: &str = r#"
{
  "rules": [
    {
      "label": "⚫ Legal Risk",
      "compound_type": "Active Legal Case",
      "condition": "legal_cases_active > 0",
      "template": "You have {{ legal_cases_active }} active case(s): {{ case_types }}.",
      "recommendation": "Seek legal advice.",
      "priority": "Critical"
    }
  ]
}
"#;

fn temp_dir() -> TempDir {
    TempDir::new().expect("create tempdir")
}

#[test]
fn load_single_yaml_file() {
    let dir = temp_dir();
    let path = dir.path().join("utilization.yml");
    fs::write(&path, UTILIZATION_YAML).unwrap();

    let repo = RuleRepository::load(&path).unwrap();
    assert_eq!(repo.len(), 2);
    assert_eq!(repo.rules()[0].label, "🔴 High Utilization");
    assert_eq!(repo.rules()[0].category, RuleCategory::Utilization);
    assert_eq!(repo.rules()[1].severity(), Severity::Medium);
    assert_eq!(repo.metadata()[0].id, "utilization");
    assert_eq!(repo.sources()[0].status, LoadStatus::Loaded { rules: 2 });
}

#[test]
fn load_directory_in_name_order_with_global_indices() {
    let dir = temp_dir();
    fs::write(dir.path().join("b-legal.json"), LEGAL_JSON).unwrap();
    fs::write(dir.path().join("a-utilization.yaml"), UTILIZATION_YAML).unwrap();
    fs::write(dir.path().join(".hidden.yml"), "not: [valid").unwrap();
    fs::write(dir.path().join("README.md"), "# rules").unwrap();

    let repo = RuleRepository::load(dir.path()).unwrap();
    let labels: Vec<&str> = repo.rules().iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["🔴 High Utilization", "🟠 Moderate Utilization", "⚫ Legal Risk"]);
    let indices: Vec<usize> = repo.rules().iter().map(|r| r.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
    assert_eq!(repo.rules()[2].category, RuleCategory::LegalRisk);

    let loaded: Vec<_> = repo
        .sources()
        .iter()
        .filter(|s| matches!(s.status, LoadStatus::Loaded { .. }))
        .collect();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].status, LoadStatus::Loaded { rules: 2 });
    assert_eq!(loaded[1].status, LoadStatus::Loaded { rules: 1 });

    let skipped = repo
        .sources()
        .iter()
        .filter(|s| matches!(s.status, LoadStatus::Skipped { .. }))
        .count();
    assert_eq!(skipped, 2);
}

#[test]
fn nested_directories_are_scanned() {
    let dir = temp_dir();
    let nested = dir.path().join("ccris");
    fs::create_dir(&nested).unwrap();
    fs::write(nested.join("legal.json"), LEGAL_JSON).unwrap();

    let repo = RuleRepository::load(dir.path()).unwrap();
    assert_eq!(repo.len(), 1);
}

#[test]
fn invalid_rule_aborts_whole_load() {
    let dir = temp_dir();
    fs::write(dir.path().join("a.yml"), UTILIZATION_YAML).unwrap();
    fs::write(
        dir.path().join("b.yml"),
        r#"
rules:
  - label: Broken
    condition: balance > 1
    priority: low
"#,
    )
    .unwrap();

    match RuleRepository::load(dir.path()) {
        Err(RuleError::Validation { index, label, message }) => {
            assert_eq!(index, 2);
            assert_eq!(label, "Broken");
            assert!(message.contains("template"));
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn parse_errors_name_the_file() {
    let dir = temp_dir();
    let path = dir.path().join("bad.yml");
    fs::write(&path, "rules: [ { label: ").unwrap();
    let err = RuleRepository::load(&path).unwrap_err();
    assert!(matches!(err, RuleError::Yaml { .. }));
    assert!(err.to_string().contains("bad.yml"));
}

#[test]
fn wrong_api_version_is_rejected() {
    let yaml = UTILIZATION_YAML.replace("apiVersion: v1", "apiVersion: v9");
    assert!(matches!(
        RuleRepository::from_yaml_str(&yaml),
        Err(RuleError::InvalidDocument { .. })
    ));
}

#[test]
fn unsupported_extension_is_rejected() {
    let dir = temp_dir();
    let path = dir.path().join("rules.txt");
    fs::write(&path, LEGAL_JSON).unwrap();
    assert!(matches!(
        RuleRepository::load(&path),
        Err(RuleError::UnsupportedFormat(_))
    ));
}

#[test]
fn missing_path_is_an_io_error() {
    let dir = temp_dir();
    let err = RuleRepository::load(&dir.path().join("nope.yml")).unwrap_err();
    assert!(matches!(err, RuleError::Io(_)));
}

#[test]
fn from_json_str_legacy_form() {
    let repo = RuleRepository::from_json_str(LEGAL_JSON).unwrap();
    assert_eq!(repo.len(), 1);
    assert!(repo.rules()[0].category_inferred);
}

#[test]
fn lint_warnings_are_kept_not_fatal() {
    let repo = RuleRepository::from_definitions(vec![RuleDefinition {
        label: "Odd".into(),
        condition: "balence > 1".into(),
        template: "t".into(),
        priority: "low".into(),
        ..Default::default()
    }])
    .unwrap();
    assert_eq!(repo.len(), 1);
    assert_eq!(repo.warnings().len(), 1);
    assert_eq!(repo.warnings()[0].path, "rules[0].condition");
}

#[test]
fn whitespace_only_priority_is_invalid() {
    let err = RuleRepository::from_definitions(vec![RuleDefinition {
        label: "L".into(),
        condition: "true".into(),
        template: "t".into(),
        priority: "   ".into(),
        ..Default::default()
    }])
    .unwrap_err();
    assert!(err.to_string().contains("priority"));
}

fn single_rule_yaml(condition: &str) -> String {
    format!(
        "rules:\n  - label: Deep\n    condition: \"{}\"\n    template: t\n    priority: low\n",
        condition
    )
}

#[test]
fn very_long_condition_chain_is_a_warning_not_a_crash() {
    let condition = vec!["1"; 200_000].join(" + ") + " > 0";
    let repo = RuleRepository::from_yaml_str(&single_rule_yaml(&condition)).unwrap();
    assert_eq!(repo.len(), 1);
    assert_eq!(repo.warnings().len(), 1);
    assert_eq!(repo.warnings()[0].path, "rules[0].condition");
    assert!(repo.warnings()[0].message.contains("nested"));
}

#[test]
fn lint_uses_the_run_depth_limit() {
    let condition = format!("{}balance{} > 1", "(".repeat(80), ")".repeat(80));
    let dir = temp_dir();
    let path = dir.path().join("deep.yml");
    fs::write(&path, single_rule_yaml(&condition)).unwrap();

    let default = RuleRepository::load(&path).unwrap();
    assert_eq!(default.warnings().len(), 1);

    let config = EngineConfig {
        max_expression_depth: 128,
        ..Default::default()
    };
    let roomy = RuleRepository::load_with_config(&path, &config).unwrap();
    assert!(roomy.warnings().is_empty(), "{:?}", roomy.warnings());
    let inline = RuleRepository::from_yaml_str_with_config(&single_rule_yaml(&condition), &config).unwrap();
    assert!(inline.warnings().is_empty());
}
