//! Insight rule definitions: the raw wire form and the validated rule.

use serde::{Deserialize, Serialize};

use super::{infer_legacy_category, RuleCategory, Severity};

/// A rule exactly as written in a rule file. Every field is optional on the
/// wire so that validation, not deserialization, reports missing values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleDefinition {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub compound_type: String,
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub template: String,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
    /// Documentation only; never read at runtime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_mapping: Option<String>,
    /// Explicit category. When absent, the legacy table decides at load time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<RuleCategory>,
}

/// A validated, immutable rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    /// Position in declaration order across the whole rule set.
    pub index: usize,
    pub label: String,
    pub compound_type: String,
    pub condition: String,
    pub template: String,
    pub recommendation: String,
    pub priority: String,
    pub data_source: Option<String>,
    pub field_mapping: Option<String>,
    pub category: RuleCategory,
    /// Whether `category` came from the legacy inference table.
    #[serde(skip)]
    pub category_inferred: bool,
}

impl Rule {
    /// Build a rule from an already-validated definition.
    pub(crate) fn from_definition(index: usize, def: RuleDefinition) -> Self {
        let (category, category_inferred) = match def.category {
            Some(cat) => (cat, false),
            None => (
                infer_legacy_category(&def.label, &def.compound_type, &def.condition),
                true,
            ),
        };

        Self {
            index,
            label: def.label.trim().to_string(),
            compound_type: def.compound_type.trim().to_string(),
            condition: def.condition.trim().to_string(),
            template: def.template,
            recommendation: def.recommendation,
            priority: def.priority.trim().to_string(),
            data_source: def.data_source.filter(|s| !s.trim().is_empty()),
            field_mapping: def.field_mapping,
            category,
            category_inferred,
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::from_priority(&self.priority)
    }
}
