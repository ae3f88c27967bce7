//! Rule repository: loads and validates the immutable rule set once per run.
//!
//! Accepts a single YAML/JSON file or a directory of them. Files use either
//! the versioned envelope (`apiVersion: v1`, `kind: InsightRuleSet`) or the
//! bare legacy `{ "rules": [...] }` form.

mod core;
mod error;

#[cfg(test)]
mod tests;

pub use self::core::RuleRepository;
pub use self::error::{LoadResult, LoadStatus, Result, RuleError};
