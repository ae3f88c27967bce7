//! Canonical severity derived from a rule's free-form priority token.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Five-level severity. Declaration order is rank order, so the derived
/// `Ord` sorts `Critical` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Positive,
}

impl Severity {
    /// All severities, most severe first.
    pub const ALL: [Severity; 5] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
        Severity::Positive,
    ];

    /// Map a raw priority token (case-insensitive). Unrecognised → `Medium`.
    pub fn from_priority(priority: &str) -> Severity {
        match priority.trim().to_lowercase().as_str() {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "medium" => Severity::Medium,
            "low" => Severity::Low,
            "positive" => Severity::Positive,
            _ => Severity::Medium,
        }
    }

    /// Sort rank, 0 = most severe.
    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Positive => "positive",
        }
    }

    /// Indicator glyph for text formatters.
    pub fn icon(self) -> &'static str {
        match self {
            Severity::Critical => "⛔",
            Severity::High => "🔴",
            Severity::Medium => "🟡",
            Severity::Low => "🔵",
            Severity::Positive => "✅",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
