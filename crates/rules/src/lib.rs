//! Credit insight rule engine.
//!
//! This crate provides:
//! - YAML/JSON rule files with load-time validation and lint warnings
//! - Record classification (loan vs. aggregate) and category-based rule
//!   applicability
//! - A sandboxed condition language with an operation and time budget
//! - Minijinja message templates with naming-convention number formatting
//! - Insight deduplication, severity ranking and a per-run evaluation report

pub mod aggregate;
pub mod applicability;
pub mod classify;
pub mod condition;
pub mod engine;
pub mod loader;
pub mod render;
pub mod report;
pub mod schema;
pub mod validation;

pub use aggregate::{Insight, InsightAggregator, InsightSummary};
pub use condition::{ConditionEvaluator, SandboxEvaluator};
pub use engine::{InsightEngine, RunOutput};
pub use loader::{RuleError, RuleRepository};
pub use render::{TemplateError, TemplateRenderer};
pub use report::{EvaluationReport, InsightReport};
pub use schema::{Rule, RuleCategory, RuleDefinition, Severity};
