//! Sandboxed condition evaluation.
//!
//! Conditions are small boolean expressions over record fields:
//! comparisons (including chains), `and`/`or`/`not`, arithmetic, membership
//! against literal lists and grouping. Calls, attribute access, subscripts
//! and statements are rejected by the parser, so an expression can only read
//! variables and combine them.
//!
//! Each identifier resolves lazily against the record being evaluated:
//! - a known schema field present in the record is coerced to the field's kind;
//! - a known schema field absent from the record takes the field default;
//! - an unknown name present in the record passes through uncoerced;
//! - anything else evaluates to integer `0` and is reported as unknown.
//!
//! Walking is bounded by an operation count and a wall-clock budget. Syntax
//! errors are returned to the caller; runtime failures become a non-match.

mod ast;
mod error;
mod interpreter;
mod lexer;
mod parser;
mod value;

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use credit_core::{EngineConfig, Field, Record};
use indexmap::IndexMap;
use serde::Serialize;

pub use self::ast::Expr;
pub use self::error::{ConditionEvaluationError, ConditionSyntaxError};
pub use self::interpreter::Limits;
pub use self::value::Value;

// ── Evaluator seam ──────────────────────────────────────────────────

/// Outcome of evaluating one well-formed condition against one record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    /// Truthiness of the result; always `false` when `failure` is set.
    pub matched: bool,
    /// Runtime failure that forced a non-match.
    pub failure: Option<ConditionEvaluationError>,
    /// Schema fields read from defaults because the record lacked them.
    pub defaulted: Vec<String>,
    /// Identifiers outside the schema and absent from the record.
    pub unknown: Vec<String>,
}

/// Evaluates condition text against a record.
///
/// Implementations must be shareable across the per-record worker pool.
pub trait ConditionEvaluator: Send + Sync {
    fn evaluate(&self, condition: &str, record: &Record) -> Result<Evaluation, ConditionSyntaxError>;
}

// ── Sandbox ─────────────────────────────────────────────────────────

type ParseCache = HashMap<String, Result<Arc<Expr>, ConditionSyntaxError>>;

/// The default evaluator: lexer + recursive-descent parser + budgeted walker.
///
/// Parsed expressions are cached by normalized text, so each distinct
/// condition is parsed once per evaluator.
pub struct SandboxEvaluator {
    limits: Limits,
    max_depth: usize,
    cache: RwLock<ParseCache>,
}

impl Default for SandboxEvaluator {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl SandboxEvaluator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            limits: Limits {
                max_ops: config.max_eval_ops,
                timeout: Duration::from_millis(config.eval_timeout_ms),
            },
            max_depth: config.max_expression_depth,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Parse (or fetch from cache) the AST for `condition`.
    pub fn compile(&self, condition: &str) -> Result<Arc<Expr>, ConditionSyntaxError> {
        let normalized = normalize(condition);
        if let Ok(cache) = self.cache.read() {
            if let Some(hit) = cache.get(&normalized) {
                return hit.clone();
            }
        }

        let parsed = parser::parse(&normalized, self.max_depth).map(Arc::new);
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(normalized, parsed.clone());
        }
        parsed
    }

    /// Identifiers referenced by `condition`, sorted.
    pub fn referenced_variables(&self, condition: &str) -> Result<BTreeSet<String>, ConditionSyntaxError> {
        Ok(self.compile(condition)?.variables())
    }

    /// Evaluate with full diagnostics: normalized text, every referenced
    /// variable with its prepared value, which ones were defaulted, and the
    /// result or error.
    pub fn test_condition(&self, condition: &str, record: &Record) -> ConditionDiagnostics {
        let normalized = normalize(condition);
        let mut diagnostics = ConditionDiagnostics {
            condition: condition.to_string(),
            normalized,
            ..Default::default()
        };

        let expr = match self.compile(condition) {
            Ok(expr) => expr,
            Err(e) => {
                diagnostics.error = Some(e.to_string());
                return diagnostics;
            }
        };

        for name in expr.variables() {
            let resolved = resolve(&name, record);
            if resolved.source != VariableSource::Record {
                diagnostics.defaulted.push(name.clone());
            }
            diagnostics.variables.insert(name, resolved.value.to_json());
        }

        let evaluation = self.run(&expr, record);
        match evaluation.failure {
            Some(e) => diagnostics.error = Some(e.to_string()),
            None => diagnostics.result = Some(evaluation.matched),
        }
        diagnostics
    }

    fn run(&self, expr: &Expr, record: &Record) -> Evaluation {
        let mut defaulted = Vec::new();
        let mut unknown = Vec::new();
        let mut lookup = |name: &str| {
            let resolved = resolve(name, record);
            match resolved.source {
                VariableSource::Record => {}
                VariableSource::Default => push_unique(&mut defaulted, name),
                VariableSource::Unknown => push_unique(&mut unknown, name),
            }
            resolved.value
        };

        match interpreter::eval(expr, self.limits, &mut lookup) {
            Ok(value) => Evaluation {
                matched: value.truthy(),
                failure: None,
                defaulted,
                unknown,
            },
            Err(e) => Evaluation {
                matched: false,
                failure: Some(e),
                defaulted,
                unknown,
            },
        }
    }
}

impl ConditionEvaluator for SandboxEvaluator {
    fn evaluate(&self, condition: &str, record: &Record) -> Result<Evaluation, ConditionSyntaxError> {
        let expr = self.compile(condition)?;
        Ok(self.run(&expr, record))
    }
}

/// One-shot evaluation with default limits.
///
/// Runtime failures are folded into `false`; syntax errors are returned.
pub fn evaluate(condition: &str, record: &Record) -> Result<bool, ConditionSyntaxError> {
    SandboxEvaluator::default()
        .evaluate(condition, record)
        .map(|e| e.matched)
}

/// Trim surrounding whitespace and canonicalize boolean literals to
/// `True`/`False` regardless of case. Quoted text is left untouched.
pub fn normalize(condition: &str) -> String {
    let src = condition.trim();
    let mut out = String::with_capacity(src.len());
    let mut chars = src.char_indices().peekable();
    let mut quote: Option<char> = None;

    while let Some((start, c)) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == '\\' {
                if let Some((_, escaped)) = chars.next() {
                    out.push(escaped);
                }
            } else if c == q {
                quote = None;
            }
            continue;
        }
        if c == '\'' || c == '"' {
            quote = Some(c);
            out.push(c);
            continue;
        }
        if c == '_' || c.is_ascii_alphabetic() {
            let mut end = start + c.len_utf8();
            while let Some(&(i, next)) = chars.peek() {
                if next == '_' || next.is_ascii_alphanumeric() {
                    end = i + next.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            let word = &src[start..end];
            if word.eq_ignore_ascii_case("true") {
                out.push_str("True");
            } else if word.eq_ignore_ascii_case("false") {
                out.push_str("False");
            } else {
                out.push_str(word);
            }
            continue;
        }
        out.push(c);
    }
    out
}

// ── Variable resolution ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VariableSource {
    Record,
    Default,
    Unknown,
}

struct Resolved {
    value: Value,
    source: VariableSource,
}

fn resolve(name: &str, record: &Record) -> Resolved {
    match (Field::from_name(name), record.get_raw(name)) {
        (Some(field), Some(raw)) => Resolved {
            value: Value::from(&raw.coerce(field.kind())),
            source: VariableSource::Record,
        },
        (Some(field), None) => Resolved {
            value: Value::from(&field.default_value()),
            source: VariableSource::Default,
        },
        (None, Some(raw)) => Resolved {
            value: Value::from(raw),
            source: VariableSource::Record,
        },
        (None, None) => Resolved {
            value: Value::Int(0),
            source: VariableSource::Unknown,
        },
    }
}

fn push_unique(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|n| n == name) {
        names.push(name.to_string());
    }
}

// ── Diagnostics ─────────────────────────────────────────────────────

/// Result of [`SandboxEvaluator::test_condition`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConditionDiagnostics {
    pub condition: String,
    pub normalized: String,
    /// Prepared value of every referenced variable.
    pub variables: IndexMap<String, serde_json::Value>,
    /// Variables that did not come from the record.
    pub defaulted: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_utilization_matches() {
        let record = Record::new().with("creditutilizationratio", 85.5);
        assert!(evaluate("creditutilizationratio > 80", &record).unwrap());
    }

    #[test]
    fn missing_balance_defaults_to_zero() {
        let eval = SandboxEvaluator::default();
        let result = eval.evaluate("balance > 5000", &Record::new()).unwrap();
        assert!(!result.matched);
        assert!(result.failure.is_none());
        assert_eq!(result.defaulted, vec!["balance".to_string()]);
    }

    #[test]
    fn text_numbers_are_coerced_by_field_kind() {
        let record = Record::new()
            .with("balance", "12,500.00")
            .with("mon_arrears", "3")
            .with("bankruptcy_active", "yes");
        assert!(evaluate("balance > 12000 and mon_arrears == 3 and bankruptcy_active", &record).unwrap());
    }

    #[test]
    fn unparseable_numbers_become_zero() {
        let record = Record::new().with("balance", "n/a");
        assert!(evaluate("balance == 0", &record).unwrap());
    }

    #[test]
    fn unknown_identifier_defaults_to_zero_and_is_reported() {
        let eval = SandboxEvaluator::default();
        let result = eval.evaluate("mystery_score > 0", &Record::new()).unwrap();
        assert!(!result.matched);
        assert_eq!(result.unknown, vec!["mystery_score".to_string()]);
    }

    #[test]
    fn extra_record_fields_pass_through() {
        let record = Record::new().with("branch_code", "KL01");
        assert!(evaluate("branch_code == 'KL01'", &record).unwrap());
    }

    #[test]
    fn boolean_literals_any_case() {
        let record = Record::new().with("has_credit_card", true);
        assert!(evaluate("has_credit_card == TRUE", &record).unwrap());
        assert!(evaluate("has_credit_card != false", &record).unwrap());
    }

    #[test]
    fn normalize_leaves_strings_alone() {
        assert_eq!(normalize("  a == true and b == 'true'  "), "a == True and b == 'true'");
        assert_eq!(normalize("trueish == FALSE"), "trueish == False");
    }

    #[test]
    fn runtime_failure_is_a_non_match() {
        let eval = SandboxEvaluator::default();
        let result = eval.evaluate("balance / limit > 1", &Record::new()).unwrap();
        assert!(!result.matched);
        assert_eq!(result.failure, Some(ConditionEvaluationError::DivisionByZero));
    }

    #[test]
    fn syntax_error_is_returned() {
        let eval = SandboxEvaluator::default();
        assert!(eval.evaluate("balance >", &Record::new()).is_err());
        assert!(eval.evaluate("__import__('os')", &Record::new()).is_err());
        assert!(evaluate("open('x')", &Record::new()).is_err());
    }

    #[test]
    fn parse_results_are_cached() {
        let eval = SandboxEvaluator::default();
        let first = eval.compile("balance > 1").unwrap();
        let second = eval.compile("  balance > 1 ").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn op_budget_from_config() {
        let config = EngineConfig {
            max_eval_ops: 3,
            ..Default::default()
        };
        let eval = SandboxEvaluator::new(&config);
        let result = eval.evaluate("1 + 2 + 3 > 0", &Record::new()).unwrap();
        assert_eq!(result.failure, Some(ConditionEvaluationError::BudgetExceeded(3)));
    }

    #[test]
    fn diagnostics_report_inputs_and_result() {
        let eval = SandboxEvaluator::default();
        let record = Record::new().with("legal_cases_active", 1).with("case_types", "SUMMONS");
        let diag = eval.test_condition("legal_cases_active > 0 and balance == 0", &record);
        assert_eq!(diag.result, Some(true));
        assert_eq!(diag.defaulted, vec!["balance".to_string()]);
        assert_eq!(diag.variables["legal_cases_active"], serde_json::json!(1));
        assert_eq!(diag.variables["balance"], serde_json::json!(0.0));

        let bad = eval.test_condition("balance >", &record);
        assert!(bad.result.is_none());
        assert!(bad.error.unwrap().contains("syntax error"));
    }

    #[test]
    fn referenced_variables_are_sorted() {
        let eval = SandboxEvaluator::default();
        let vars = eval.referenced_variables("mon_arrears > 0 or inst_arrears > 2").unwrap();
        assert_eq!(vars.into_iter().collect::<Vec<_>>(), vec!["inst_arrears", "mon_arrears"]);
    }
}
