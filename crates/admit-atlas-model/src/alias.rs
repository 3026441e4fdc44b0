// SPDX-License-Identifier: Apache-2.0

use crate::record::{InstitutionName, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Hand-curated abbreviation → canonical name mapping. Static configuration,
/// never derived from the dataset; an alias whose target is absent from a
/// given dataset simply resolves to nothing at lookup time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct AliasIndex(BTreeMap<String, String>);

impl AliasIndex {
    #[must_use]
    pub fn from_pairs(pairs: BTreeMap<String, String>) -> Self {
        Self(pairs)
    }

    /// The abbreviations commonly typed by applicants.
    #[must_use]
    pub fn builtin() -> Self {
        let pairs = [
            ("北航", "北京航空航天大学"),
            ("北理工", "北京理工大学"),
            ("哈工大", "哈尔滨工业大学"),
            ("西工大", "西北工业大学"),
            ("中科大", "中国科学技术大学"),
            ("人大", "中国人民大学"),
            ("武大", "武汉大学"),
            ("华科", "华中科技大学"),
            ("上交", "上海交通大学"),
            ("复旦", "复旦大学"),
            ("浙大", "浙江大学"),
            ("南大", "南京大学"),
            ("西交", "西安交通大学"),
        ];
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[must_use]
    pub fn canonical_for(&self, alias: &str) -> Option<&str> {
        self.0.get(alias).map(String::as_str)
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
        for (alias, canonical) in &self.0 {
            if alias.trim().is_empty() || alias.trim() != alias {
                return Err(ValidationError(format!(
                    "alias key {alias:?} must be non-empty trimmed text"
                )));
            }
            InstitutionName::parse(canonical)
                .map_err(|e| ValidationError(format!("alias {alias} target: {e}")))?;
            if alias == canonical {
                return Err(ValidationError(format!(
                    "alias {alias} must not map to itself"
                )));
            }
        }
        Ok(())
    }
}
