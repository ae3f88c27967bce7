//! Normalized credit records and their derived variants.
//!
//! A [`Record`] is a flat, ordered map of field name to [`FieldValue`]. The
//! same structure serves loan-level and portfolio-level records; which one a
//! record is gets derived from field presence and exposed as a
//! [`TypedRecord`] view.

use std::fmt;

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::field::Field;
use crate::value::FieldValue;

/// Facility codes for credit lines without a fixed repayment schedule.
pub const REVOLVING_FACILITIES: &[&str] = &["CRDTCARD", "OVRDRAFT"];

/// A normalized record: field name → scalar, in input order.
///
/// Null values are dropped on the way in, so an absent field and a null
/// field behave identically downstream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: IndexMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.fields.get(field.name())
    }

    /// Look up a field by raw name, including fields outside the known schema.
    pub fn get_raw(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.fields.contains_key(field.name())
    }

    /// First non-blank text among `fields`, in order.
    pub fn first_text(&self, fields: &[Field]) -> Option<&str> {
        fields
            .iter()
            .filter_map(|f| self.get(*f))
            .filter(|v| !v.is_blank())
            .find_map(|v| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = IndexMap::<String, Option<FieldValue>>::deserialize(deserializer)?;
        let fields = raw
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, v)))
            .collect();
        Ok(Self { fields })
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

// ── Variants ──────────────────────────────────────────────────

/// Which shape a record has, derived from the fields it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordVariant {
    Loan,
    Aggregate,
}

impl fmt::Display for RecordVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordVariant::Loan => write!(f, "loan"),
            RecordVariant::Aggregate => write!(f, "aggregate"),
        }
    }
}

/// Account-level view over a record classified as a loan.
#[derive(Debug, Clone, Copy)]
pub struct LoanRecord<'a>(&'a Record);

impl<'a> LoanRecord<'a> {
    pub fn record(&self) -> &'a Record {
        self.0
    }

    /// Facility code from the first set field of `facility_type`,
    /// `loan_type` and `loantype`. A non-text value there yields no code
    /// rather than falling through to the next field.
    pub fn facility_code(&self) -> Option<&'a str> {
        [Field::FacilityType, Field::LoanType, Field::LoanTypeName]
            .iter()
            .filter_map(|f| self.0.get(*f))
            .find(|v| v.is_set())
            .and_then(FieldValue::as_str)
    }

    /// Whether the facility is a revolving credit line.
    pub fn is_revolving(&self) -> bool {
        self.facility_code()
            .map(|code| REVOLVING_FACILITIES.contains(&code.trim()))
            .unwrap_or(false)
    }
}

/// Portfolio-level view over a record classified as an aggregate.
#[derive(Debug, Clone, Copy)]
pub struct AggregateRecord<'a>(&'a Record);

impl<'a> AggregateRecord<'a> {
    pub fn record(&self) -> &'a Record {
        self.0
    }
}

/// A record tagged with its derived variant.
#[derive(Debug, Clone, Copy)]
pub enum TypedRecord<'a> {
    Loan(LoanRecord<'a>),
    Aggregate(AggregateRecord<'a>),
}

impl<'a> TypedRecord<'a> {
    pub fn new(record: &'a Record, variant: RecordVariant) -> Self {
        match variant {
            RecordVariant::Loan => TypedRecord::Loan(LoanRecord(record)),
            RecordVariant::Aggregate => TypedRecord::Aggregate(AggregateRecord(record)),
        }
    }

    pub fn variant(&self) -> RecordVariant {
        match self {
            TypedRecord::Loan(_) => RecordVariant::Loan,
            TypedRecord::Aggregate(_) => RecordVariant::Aggregate,
        }
    }

    pub fn record(&self) -> &'a Record {
        match self {
            TypedRecord::Loan(loan) => loan.record(),
            TypedRecord::Aggregate(agg) => agg.record(),
        }
    }

    pub fn as_loan(&self) -> Option<&LoanRecord<'a>> {
        match self {
            TypedRecord::Loan(loan) => Some(loan),
            TypedRecord::Aggregate(_) => None,
        }
    }
}

// ── Personal info ─────────────────────────────────────────────

/// Subject details merged into every rendering context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ic_number: String,
    #[serde(default)]
    pub ctos_score: i64,
}

impl PersonalInfo {
    /// Field/value pairs as they appear in a rendering context.
    pub fn entries(&self) -> Vec<(Field, FieldValue)> {
        vec![
            (Field::Name, FieldValue::Text(self.name.clone())),
            (Field::IcNumber, FieldValue::Text(self.ic_number.clone())),
            (Field::CtosScore, FieldValue::Int(self.ctos_score)),
        ]
    }
}
