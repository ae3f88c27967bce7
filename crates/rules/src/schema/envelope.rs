//! Rule set document: the top-level shape of a rule file.

use serde::{Deserialize, Serialize};

use super::{RuleDefinition, RuleSetMetadata};

/// The only supported `apiVersion`.
pub const API_VERSION: &str = "v1";

/// The only supported `kind`.
pub const RULE_SET_KIND: &str = "InsightRuleSet";

/// A rule file. Accepts both the versioned envelope and the bare legacy
/// `{ "rules": [...] }` form, since every header field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSetDocument {
    #[serde(rename = "apiVersion", default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RuleSetMetadata>,
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

impl RuleSetDocument {
    /// Check the header fields that are present.
    pub fn check_header(&self) -> std::result::Result<(), String> {
        if let Some(version) = &self.api_version {
            if version != API_VERSION {
                return Err(format!("apiVersion must be '{}', got '{}'", API_VERSION, version));
            }
        }
        if let Some(kind) = &self.kind {
            if kind != RULE_SET_KIND {
                return Err(format!("kind must be '{}', got '{}'", RULE_SET_KIND, kind));
            }
        }
        Ok(())
    }
}
