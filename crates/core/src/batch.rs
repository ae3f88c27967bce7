//! Batch input: one record set plus the subject's personal info.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::BatchError;
use crate::record::{PersonalInfo, Record};

/// One invocation's worth of normalized input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBatch {
    #[serde(default)]
    pub records: Vec<Record>,
    #[serde(default)]
    pub personal_info: PersonalInfo,
}

/// Accepted wire shapes: the full envelope or a bare array of records.
#[derive(Deserialize)]
#[serde(untagged)]
enum BatchInput {
    Envelope(NormalizedBatch),
    Records(Vec<Record>),
}

impl NormalizedBatch {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            personal_info: PersonalInfo::default(),
        }
    }

    pub fn with_personal_info(mut self, info: PersonalInfo) -> Self {
        self.personal_info = info;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, BatchError> {
        let input: BatchInput = serde_json::from_str(json)?;
        Ok(match input {
            BatchInput::Envelope(batch) => batch,
            BatchInput::Records(records) => NormalizedBatch::new(records),
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, BatchError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;

    #[test]
    fn parses_envelope() {
        let batch = NormalizedBatch::from_json_str(
            r#"{
                "records": [{"facility_type": "CRDTCARD"}, {"numberofloans": 2}],
                "personal_info": {"name": "TAN AH KOW", "ic_number": "800101-14-5555", "ctos_score": 712}
            }"#,
        )
        .unwrap();
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.personal_info.ctos_score, 712);
        assert!(batch.records[1].contains(Field::NumberOfLoans));
    }

    #[test]
    fn parses_bare_array() {
        let batch = NormalizedBatch::from_json_str(r#"[{"balance": 10}, {}]"#).unwrap();
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.personal_info, PersonalInfo::default());
    }

    #[test]
    fn rejects_scalars() {
        assert!(NormalizedBatch::from_json_str("42").is_err());
    }
}
