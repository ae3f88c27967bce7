//! Rule schema types with serde deserialization.
//!
//! - `RuleSetDocument`: a rule file (optional apiVersion/kind/metadata header + rules)
//! - `RuleDefinition`: one rule as written on the wire
//! - `Rule`: a validated rule with its resolved `RuleCategory`
//! - `Severity`: canonical five-level rank derived from a priority token

mod category;
mod envelope;
mod metadata;
mod rule;
mod severity;

pub use category::*;
pub use envelope::*;
pub use metadata::*;
pub use rule::*;
pub use severity::*;

#[cfg(test)]
mod tests;
