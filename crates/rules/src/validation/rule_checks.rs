//! Structural checks: required fields, priority token, rule set metadata.

use crate::schema::{RuleDefinition, RuleSetMetadata, Severity};

use super::fuzzy::{did_you_mean, is_kebab_case};
use super::ValidationResult;

/// Priority tokens that map to a severity without falling back.
const PRIORITY_TOKENS: &[&str] = &["critical", "high", "medium", "low", "positive"];

/// `label`, `condition`, `template` and `priority` must be non-blank.
pub(super) fn validate_required(path: &str, def: &RuleDefinition, result: &mut ValidationResult) {
    let required = [
        ("label", &def.label),
        ("condition", &def.condition),
        ("template", &def.template),
        ("priority", &def.priority),
    ];
    for (name, value) in required {
        if value.trim().is_empty() {
            result.error(format!("{}.{}", path, name), format!("'{}' is required and must not be empty", name));
        }
    }
}

pub(super) fn validate_priority(path: &str, def: &RuleDefinition, result: &mut ValidationResult) {
    let priority = def.priority.trim();
    if priority.is_empty() {
        return;
    }
    let lower = priority.to_lowercase();
    if !PRIORITY_TOKENS.contains(&lower.as_str()) {
        let mut message = format!(
            "unrecognised priority '{}' will be treated as '{}'",
            priority,
            Severity::from_priority(priority)
        );
        if let Some(hint) = did_you_mean(&lower, PRIORITY_TOKENS) {
            message = format!("{}; {}", message, hint);
        }
        result.warn(format!("{}.priority", path), message);
    }
}

pub(super) fn validate_metadata(meta: &RuleSetMetadata, result: &mut ValidationResult) {
    if meta.id.trim().is_empty() {
        result.warn("metadata.id", "rule set id is empty");
    } else if !is_kebab_case(&meta.id) {
        result.warn(
            "metadata.id",
            format!("rule set id '{}' should be kebab-case (e.g. 'credit-rules')", meta.id),
        );
    }
    if meta.name.trim().is_empty() {
        result.warn("metadata.name", "rule set name is empty");
    }
}
