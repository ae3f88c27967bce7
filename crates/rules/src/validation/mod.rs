//! Rule validation with structured errors and suggestions.
//!
//! Errors block loading: a rule missing `label`, `condition`, `template` or
//! `priority`, or a file with the wrong `apiVersion`/`kind`. Warnings are
//! advisory: unknown identifiers and placeholders (with "did you mean"
//! hints), unparseable conditions or templates, odd priorities and
//! non-kebab-case rule set ids.

mod expression_checks;
mod rule_checks;

pub(crate) mod fuzzy;

use credit_core::EngineConfig;
use serde::{Deserialize, Serialize};

use crate::condition::SandboxEvaluator;
use crate::render::TemplateRenderer;
use crate::schema::{RuleDefinition, RuleSetDocument};

// ── Result types ────────────────────────────────────────────────────

/// Overall validation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

/// A blocking validation error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Location such as `"rules[3].template"`.
    pub path: String,
    pub message: String,
}

/// A non-blocking advisory warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.suggestion {
            Some(hint) => write!(f, "{}: {} ({})", self.path, self.message, hint),
            None => write!(f, "{}: {}", self.path, self.message),
        }
    }
}

impl ValidationResult {
    pub(crate) fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    pub(crate) fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warn_with_suggestion(path, message, None);
    }

    pub(crate) fn warn_with_suggestion(
        &mut self,
        path: impl Into<String>,
        message: impl Into<String>,
        suggestion: Option<String>,
    ) {
        self.warnings.push(ValidationWarning {
            path: path.into(),
            message: message.into(),
            suggestion,
        });
    }

    /// Error messages joined for a single-line report.
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| format!("{}: {}", e.path, e.message))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn merge(&mut self, other: ValidationResult) {
        self.valid &= other.valid;
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

// ── Public API ──────────────────────────────────────────────────────

/// Shared parsers used by the lint passes.
pub struct Linter {
    evaluator: SandboxEvaluator,
    renderer: TemplateRenderer,
}

impl Default for Linter {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl Linter {
    /// Lint with the same parse limits the engine will run under.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            evaluator: SandboxEvaluator::new(config),
            renderer: TemplateRenderer::new(config),
        }
    }

    /// Validate one rule definition. `index` is its global position and
    /// only affects the reported paths.
    pub fn validate_definition(&self, index: usize, def: &RuleDefinition) -> ValidationResult {
        let path = format!("rules[{}]", index);
        let mut result = ValidationResult::new();
        rule_checks::validate_required(&path, def, &mut result);
        rule_checks::validate_priority(&path, def, &mut result);
        expression_checks::lint_condition(&path, def, &self.evaluator, &mut result);
        expression_checks::lint_template(&path, def, &self.renderer, &mut result);
        result
    }

    /// Validate a whole document: header, metadata and every rule.
    /// `first_index` is the global index of the document's first rule.
    pub fn validate_document(&self, doc: &RuleSetDocument, first_index: usize) -> ValidationResult {
        let mut result = ValidationResult::new();
        if let Err(message) = doc.check_header() {
            result.error("", message);
        }
        if let Some(meta) = &doc.metadata {
            rule_checks::validate_metadata(meta, &mut result);
        }
        for (offset, def) in doc.rules.iter().enumerate() {
            result.merge(self.validate_definition(first_index + offset, def));
        }
        result
    }
}

/// Validate a single definition with default settings.
pub fn validate_definition(index: usize, def: &RuleDefinition) -> ValidationResult {
    Linter::default().validate_definition(index, def)
}

/// Parse raw YAML and validate. Parse errors become validation errors.
pub fn validate_yaml(yaml: &str) -> ValidationResult {
    match serde_yaml::from_str::<RuleSetDocument>(yaml) {
        Ok(doc) => Linter::default().validate_document(&doc, 0),
        Err(e) => {
            let mut result = ValidationResult::new();
            result.error("", format!("YAML parse error: {e}"));
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(label: &str, condition: &str, template: &str, priority: &str) -> RuleDefinition {
        RuleDefinition {
            label: label.into(),
            condition: condition.into(),
            template: template.into(),
            priority: priority.into(),
            ..Default::default()
        }
    }

    #[test]
    fn complete_rule_is_valid_and_quiet() {
        let result = validate_definition(
            0,
            &def(
                "🔴 High Utilization",
                "creditutilizationratio > 80",
                "Your {{ Facility }} is at {{ creditutilizationratio }}%",
                "High",
            ),
        );
        assert!(result.valid);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    }

    #[test]
    fn missing_required_fields_are_errors() {
        let result = validate_definition(4, &def("", "  ", "t", ""));
        assert!(!result.valid);
        let paths: Vec<&str> = result.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["rules[4].label", "rules[4].condition", "rules[4].priority"]);
        assert!(result.error_summary().contains("rules[4].label"));
    }

    #[test]
    fn unknown_identifier_warns_with_suggestion() {
        let result = validate_definition(0, &def("L", "balence > 100", "t", "low"));
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].path, "rules[0].condition");
        assert_eq!(result.warnings[0].suggestion.as_deref(), Some("did you mean 'balance'?"));
    }

    #[test]
    fn unknown_placeholder_warns() {
        let result = validate_definition(0, &def("L", "balance > 1", "Hi {{ nam }}", "low"));
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].path, "rules[0].template");
        assert_eq!(result.warnings[0].suggestion.as_deref(), Some("did you mean 'name'?"));
    }

    #[test]
    fn broken_condition_and_template_are_warnings() {
        let result = validate_definition(0, &def("L", "balance >", "{{ oops", "low"));
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 2);
    }

    #[test]
    fn odd_priority_warns() {
        let result = validate_definition(0, &def("L", "balance > 1", "t", "hihg"));
        assert!(result.valid);
        let warning = &result.warnings[0];
        assert!(warning.message.contains("'medium'"));
        assert!(warning.message.contains("did you mean 'high'?"));
    }

    #[test]
    fn document_header_and_metadata() {
        let yaml = r#"
apiVersion: v2
metadata:
  id: Credit_Rules
  name: Rules
rules:
  - label: A
    condition: balance > 1
    template: t
    priority: low
"#;
        let result = validate_yaml(yaml);
        assert!(!result.valid);
        assert!(result.errors[0].message.contains("apiVersion"));
        assert!(result.warnings.iter().any(|w| w.path == "metadata.id"));
    }

    #[test]
    fn depth_warning_follows_the_configured_limit() {
        let condition = format!("{}balance{} > 1", "(".repeat(80), ")".repeat(80));
        let rule = def("L", &condition, "t", "low");

        let default = Linter::default().validate_definition(0, &rule);
        assert_eq!(default.warnings.len(), 1);
        assert!(default.warnings[0].message.contains("nested"));

        let config = EngineConfig {
            max_expression_depth: 128,
            ..Default::default()
        };
        let roomy = Linter::new(&config).validate_definition(0, &rule);
        assert!(roomy.warnings.is_empty(), "{:?}", roomy.warnings);
    }

    #[test]
    fn yaml_parse_error_is_reported() {
        let result = validate_yaml("rules: [ { label: ");
        assert!(!result.valid);
        assert!(result.errors[0].message.starts_with("YAML parse error"));
    }
}
