//! Runtime values produced while walking a condition.

use std::cmp::Ordering;
use std::fmt;

use credit_core::FieldValue;

use super::error::ConditionEvaluationError;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    pub fn truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::None => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::from(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Value::from(*f),
            Value::Str(s) => serde_json::Value::from(s.as_str()),
            Value::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
        }
    }

    /// Integer view for bool/int operands.
    fn as_int(&self) -> Option<i64> {
        match self {
            Value::Bool(b) => Some(*b as i64),
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            other => other.as_int().map(|i| i as f64),
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(self, Value::Bool(_) | Value::Int(_) | Value::Float(_))
    }

    /// Equality across types: numbers compare by value, everything else
    /// must match in type.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (a, b) if a.is_numeric() && b.is_numeric() => match (a.as_int(), b.as_int()) {
                (Some(x), Some(y)) => x == y,
                _ => a.as_float() == b.as_float(),
            },
            (Value::None, Value::None) => true,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loose_eq(y))
            }
            _ => false,
        }
    }

    pub fn compare(&self, other: &Value) -> Result<Ordering, ConditionEvaluationError> {
        match (self, other) {
            (a, b) if a.is_numeric() && b.is_numeric() => match (a.as_int(), b.as_int()) {
                (Some(x), Some(y)) => Ok(x.cmp(&y)),
                _ => {
                    let (x, y) = (a.as_float().unwrap_or(0.0), b.as_float().unwrap_or(0.0));
                    x.partial_cmp(&y).ok_or_else(|| mismatch("compare", a, b))
                }
            },
            (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
            (a, b) => Err(mismatch("order", a, b)),
        }
    }

    /// `self in container`.
    pub fn contained_in(&self, container: &Value) -> Result<bool, ConditionEvaluationError> {
        match (self, container) {
            (needle, Value::List(items)) => Ok(items.iter().any(|item| needle.loose_eq(item))),
            (Value::Str(needle), Value::Str(haystack)) => Ok(haystack.contains(needle.as_str())),
            (a, b) => Err(mismatch("test membership of", a, b)),
        }
    }

    pub fn add(&self, other: &Value) -> Result<Value, ConditionEvaluationError> {
        if let (Value::Str(a), Value::Str(b)) = (self, other) {
            return Ok(Value::Str(format!("{}{}", a, b)));
        }
        self.arith(other, "add", i64::checked_add, |a, b| a + b)
    }

    pub fn sub(&self, other: &Value) -> Result<Value, ConditionEvaluationError> {
        self.arith(other, "subtract", i64::checked_sub, |a, b| a - b)
    }

    pub fn mul(&self, other: &Value) -> Result<Value, ConditionEvaluationError> {
        self.arith(other, "multiply", i64::checked_mul, |a, b| a * b)
    }

    /// True division always yields a float.
    pub fn div(&self, other: &Value) -> Result<Value, ConditionEvaluationError> {
        let (a, b) = self.float_pair(other, "divide")?;
        if b == 0.0 {
            return Err(ConditionEvaluationError::DivisionByZero);
        }
        finite(a / b)
    }

    /// Floor division, rounding toward negative infinity.
    pub fn floor_div(&self, other: &Value) -> Result<Value, ConditionEvaluationError> {
        if let (Some(a), Some(b)) = (self.as_int(), other.as_int()) {
            if b == 0 {
                return Err(ConditionEvaluationError::DivisionByZero);
            }
            let q = a.checked_div(b).ok_or(ConditionEvaluationError::Overflow)?;
            let q = if (a % b != 0) && ((a < 0) != (b < 0)) { q - 1 } else { q };
            return Ok(Value::Int(q));
        }
        let (a, b) = self.float_pair(other, "divide")?;
        if b == 0.0 {
            return Err(ConditionEvaluationError::DivisionByZero);
        }
        finite((a / b).floor())
    }

    /// Modulo with the sign of the divisor.
    pub fn rem(&self, other: &Value) -> Result<Value, ConditionEvaluationError> {
        if let (Some(a), Some(b)) = (self.as_int(), other.as_int()) {
            if b == 0 {
                return Err(ConditionEvaluationError::DivisionByZero);
            }
            let r = a.checked_rem(b).ok_or(ConditionEvaluationError::Overflow)?;
            let r = if r != 0 && ((r < 0) != (b < 0)) { r + b } else { r };
            return Ok(Value::Int(r));
        }
        let (a, b) = self.float_pair(other, "take modulo of")?;
        if b == 0.0 {
            return Err(ConditionEvaluationError::DivisionByZero);
        }
        let r = a % b;
        finite(if r != 0.0 && ((r < 0.0) != (b < 0.0)) { r + b } else { r })
    }

    pub fn neg(&self) -> Result<Value, ConditionEvaluationError> {
        match self {
            Value::Float(f) => Ok(Value::Float(-f)),
            other => match other.as_int() {
                Some(i) => i.checked_neg().map(Value::Int).ok_or(ConditionEvaluationError::Overflow),
                None => Err(ConditionEvaluationError::TypeMismatch(format!(
                    "cannot negate {}",
                    other.type_name()
                ))),
            },
        }
    }

    pub fn pos(&self) -> Result<Value, ConditionEvaluationError> {
        match self {
            Value::Bool(b) => Ok(Value::Int(*b as i64)),
            Value::Int(_) | Value::Float(_) => Ok(self.clone()),
            other => Err(ConditionEvaluationError::TypeMismatch(format!(
                "unary plus on {}",
                other.type_name()
            ))),
        }
    }

    fn arith(
        &self,
        other: &Value,
        verb: &str,
        int_op: fn(i64, i64) -> Option<i64>,
        float_op: fn(f64, f64) -> f64,
    ) -> Result<Value, ConditionEvaluationError> {
        if let (Some(a), Some(b)) = (self.as_int(), other.as_int()) {
            return int_op(a, b).map(Value::Int).ok_or(ConditionEvaluationError::Overflow);
        }
        let (a, b) = self.float_pair(other, verb)?;
        finite(float_op(a, b))
    }

    fn float_pair(&self, other: &Value, verb: &str) -> Result<(f64, f64), ConditionEvaluationError> {
        match (self.as_float(), other.as_float()) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err(mismatch(verb, self, other)),
        }
    }
}

fn finite(v: f64) -> Result<Value, ConditionEvaluationError> {
    if v.is_finite() {
        Ok(Value::Float(v))
    } else {
        Err(ConditionEvaluationError::Overflow)
    }
}

fn mismatch(verb: &str, a: &Value, b: &Value) -> ConditionEvaluationError {
    ConditionEvaluationError::TypeMismatch(format!(
        "cannot {} {} and {}",
        verb,
        a.type_name(),
        b.type_name()
    ))
}

impl From<&FieldValue> for Value {
    fn from(v: &FieldValue) -> Self {
        match v {
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Int(i) => Value::Int(*i),
            FieldValue::Float(f) => Value::Float(*f),
            FieldValue::Text(s) => Value::Str(s.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{:?}", v),
            Value::Str(s) => write!(f, "'{}'", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}
