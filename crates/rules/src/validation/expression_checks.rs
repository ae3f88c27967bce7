//! Advisory checks on condition and template text.
//!
//! Everything here is a warning: a malformed condition only skips that rule
//! per record, and a placeholder outside the schema may still be supplied by
//! the record at render time.

use credit_core::Field;

use crate::condition::SandboxEvaluator;
use crate::render::TemplateRenderer;
use crate::schema::RuleDefinition;

use super::fuzzy::did_you_mean;
use super::ValidationResult;

pub(super) fn lint_condition(
    path: &str,
    def: &RuleDefinition,
    evaluator: &SandboxEvaluator,
    result: &mut ValidationResult,
) {
    if def.condition.trim().is_empty() {
        return;
    }
    let known = Field::names();
    match evaluator.referenced_variables(&def.condition) {
        Ok(vars) => {
            for name in vars.iter().filter(|v| Field::from_name(v).is_none()) {
                result.warn_with_suggestion(
                    format!("{}.condition", path),
                    format!("identifier '{}' is not a known field and defaults to 0 unless the record supplies it", name),
                    did_you_mean(name, &known),
                );
            }
        }
        Err(e) => result.warn(
            format!("{}.condition", path),
            format!("condition will be skipped for every record: {}", e),
        ),
    }
}

pub(super) fn lint_template(
    path: &str,
    def: &RuleDefinition,
    renderer: &TemplateRenderer,
    result: &mut ValidationResult,
) {
    if def.template.trim().is_empty() {
        return;
    }
    let known = Field::names();
    match renderer.placeholders(&def.template) {
        Ok(names) => {
            for name in names.iter().filter(|n| Field::from_name(n).is_none()) {
                result.warn_with_suggestion(
                    format!("{}.template", path),
                    format!("placeholder '{}' is not a known field; rendering fails unless the record supplies it", name),
                    did_you_mean(name, &known),
                );
            }
        }
        Err(e) => result.warn(
            format!("{}.template", path),
            format!("template will fail for every match: {}", e),
        ),
    }
}
