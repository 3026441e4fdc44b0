// SPDX-License-Identifier: Apache-2.0

use crate::record::{InstitutionName, ValidationError, LABEL_MAX_LEN, RATE_MAX_LEN, TAG_MAX_LEN};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One hand-maintained authoritative correction. The rate here wins over
/// anything the rate table or roster said.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverrideEntry {
    pub rate: String,
    pub source: String,
    #[serde(default)]
    pub tag: Option<String>,
}

impl OverrideEntry {
    /// Provenance label stamped on overridden records.
    #[must_use]
    pub fn source_label(&self) -> String {
        format!("official override ({})", self.source)
    }
}

/// Immutable, explicitly-passed override configuration. Loaded once at
/// startup; never ambient global state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct OverrideTable(BTreeMap<String, OverrideEntry>);

impl OverrideTable {
    #[must_use]
    pub fn from_entries(entries: BTreeMap<String, OverrideEntry>) -> Self {
        Self(entries)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &OverrideEntry)> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for (name, entry) in &self.0 {
            InstitutionName::parse(name)
                .map_err(|e| ValidationError(format!("override key {name:?}: {e}")))?;
            let rate = entry.rate.trim();
            if rate.is_empty() || rate != entry.rate || entry.rate.len() > RATE_MAX_LEN {
                return Err(ValidationError(format!(
                    "override for {name} must carry a non-empty trimmed rate"
                )));
            }
            if entry.source.trim().is_empty() || entry.source.len() > LABEL_MAX_LEN {
                return Err(ValidationError(format!(
                    "override for {name} must carry a source label"
                )));
            }
            if let Some(tag) = &entry.tag {
                if tag.trim().is_empty() || tag.trim() != tag || tag.len() > TAG_MAX_LEN {
                    return Err(ValidationError(format!(
                        "override tag for {name} must be non-empty trimmed text"
                    )));
                }
            }
        }
        Ok(())
    }
}
