//! Scalar values carried by normalized records.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::field::FieldKind;

/// A single scalar in a normalized record.
///
/// Untagged so records read naturally as flat JSON objects. Variant order
/// matters for deserialization: integers are tried before floats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    /// Lenient float view. Text is trimmed, thousands separators dropped.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            FieldValue::Int(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            FieldValue::Text(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        }
    }

    /// Lenient integer view; fractional values truncate toward zero.
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(i) => Some(*i),
            FieldValue::Text(s) => {
                let s = s.trim().replace(',', "");
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            }
            other => other
                .to_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64),
        }
    }

    /// Truthiness. Text recognises common spellings of true/false before
    /// falling back to "non-empty is true".
    pub fn to_bool(&self) -> bool {
        match self {
            FieldValue::Bool(b) => *b,
            FieldValue::Int(i) => *i != 0,
            FieldValue::Float(f) => *f != 0.0,
            FieldValue::Text(s) => {
                let t = s.trim();
                match t.to_ascii_lowercase().as_str() {
                    "true" | "yes" | "y" | "1" => true,
                    "false" | "no" | "n" | "0" | "" => false,
                    _ => true,
                }
            }
        }
    }

    /// Force this value into `kind`. Unparseable numerics become zero.
    pub fn coerce(&self, kind: FieldKind) -> FieldValue {
        match kind {
            FieldKind::Float => FieldValue::Float(self.to_f64().unwrap_or(0.0)),
            FieldKind::Int => FieldValue::Int(self.to_i64().unwrap_or(0)),
            FieldKind::Bool => FieldValue::Bool(self.to_bool()),
            FieldKind::Text => match self {
                FieldValue::Text(_) => self.clone(),
                other => FieldValue::Text(other.to_string()),
            },
        }
    }

    /// Whether the value can be coerced into `kind` without falling back to zero.
    pub fn coerces_cleanly(&self, kind: FieldKind) -> bool {
        match kind {
            FieldKind::Float => self.to_f64().is_some(),
            FieldKind::Int => self.to_i64().is_some(),
            FieldKind::Bool | FieldKind::Text => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// True for empty text; numbers and booleans are never blank.
    pub fn is_blank(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.trim().is_empty())
    }

    /// False for blank text, `false` and zero; true for anything else.
    pub fn is_set(&self) -> bool {
        match self {
            FieldValue::Bool(b) => *b,
            FieldValue::Int(i) => *i != 0,
            FieldValue::Float(f) => *f != 0.0,
            FieldValue::Text(s) => !s.trim().is_empty(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(v as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_ints_before_floats() {
        let v: FieldValue = serde_json::from_str("5").unwrap();
        assert_eq!(v, FieldValue::Int(5));
        let v: FieldValue = serde_json::from_str("85.5").unwrap();
        assert_eq!(v, FieldValue::Float(85.5));
        let v: FieldValue = serde_json::from_str("true").unwrap();
        assert_eq!(v, FieldValue::Bool(true));
        let v: FieldValue = serde_json::from_str("\"SUMMONS\"").unwrap();
        assert_eq!(v, FieldValue::Text("SUMMONS".into()));
    }

    #[test]
    fn coerce_numeric_text() {
        let v = FieldValue::from(" 1,250.50 ");
        assert_eq!(v.coerce(FieldKind::Float), FieldValue::Float(1250.5));
        assert_eq!(v.coerce(FieldKind::Int), FieldValue::Int(1250));
    }

    #[test]
    fn coerce_garbage_falls_back_to_zero() {
        let v = FieldValue::from("n/a");
        assert_eq!(v.coerce(FieldKind::Float), FieldValue::Float(0.0));
        assert_eq!(v.coerce(FieldKind::Int), FieldValue::Int(0));
        assert!(!v.coerces_cleanly(FieldKind::Int));
    }

    #[test]
    fn coerce_bool_spellings() {
        assert_eq!(FieldValue::from("False").coerce(FieldKind::Bool), FieldValue::Bool(false));
        assert_eq!(FieldValue::from("yes").coerce(FieldKind::Bool), FieldValue::Bool(true));
        assert_eq!(FieldValue::Int(0).coerce(FieldKind::Bool), FieldValue::Bool(false));
        assert_eq!(FieldValue::Float(2.0).coerce(FieldKind::Bool), FieldValue::Bool(true));
    }

    #[test]
    fn float_to_int_truncates() {
        assert_eq!(FieldValue::Float(3.9).to_i64(), Some(3));
        assert_eq!(FieldValue::Float(f64::NAN).to_i64(), None);
    }
}
