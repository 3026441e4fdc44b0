use crate::record::{InstitutionName, InstitutionRecord, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DATASET_SCHEMA_VERSION: u64 = 1;

/// The serialized canonical record set. Records are sorted by name so the
/// artifact is byte-stable across runs and readable in diffs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetFile {
    pub schema_version: u64,
    pub records: Vec<InstitutionRecord>,
}

impl DatasetFile {
    #[must_use]
    pub fn from_records(records: BTreeMap<InstitutionName, InstitutionRecord>) -> Self {
        Self {
            schema_version: DATASET_SCHEMA_VERSION,
            records: records.into_values().collect(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.schema_version != DATASET_SCHEMA_VERSION {
            return Err(ValidationError(format!(
                "unsupported dataset schema version: expected {DATASET_SCHEMA_VERSION}, got {}",
                self.schema_version
            )));
        }
        for pair in self.records.windows(2) {
            if pair[0].name >= pair[1].name {
                return Err(ValidationError(format!(
                    "records must be strictly sorted by name: {} before {}",
                    pair[0].name, pair[1].name
                )));
            }
        }
        for record in &self.records {
            record.validate()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
