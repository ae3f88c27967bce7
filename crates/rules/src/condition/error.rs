//! Error types for condition parsing and evaluation.

/// A malformed condition expression. Surfaced to the caller; the rule is
/// skipped for the record being evaluated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("syntax error at offset {position}: {message}")]
pub struct ConditionSyntaxError {
    /// Byte offset into the normalized expression.
    pub position: usize,
    pub message: String,
}

impl ConditionSyntaxError {
    pub(crate) fn new(position: usize, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

/// A runtime failure while walking a well-formed expression. Never escapes
/// the evaluator as an error: the condition is treated as a non-match.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConditionEvaluationError {
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow")]
    Overflow,

    #[error("operation budget of {0} exceeded")]
    BudgetExceeded(usize),

    #[error("evaluation exceeded {0} ms")]
    Timeout(u64),
}
