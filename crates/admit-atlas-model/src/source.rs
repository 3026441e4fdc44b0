// SPDX-License-Identifier: Apache-2.0

use crate::record::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Fixed column layout of the rate-table export. Column indices are
/// validated once up front; rows that fall short of the layout are skipped,
/// never indexed blindly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateTableSchema {
    pub header_rows: usize,
    pub name_column: usize,
    pub preferred_rate_column: usize,
    pub fallback_rate_column: usize,
    pub preferred_label: String,
    pub fallback_label: String,
}

impl Default for RateTableSchema {
    fn default() -> Self {
        // Matches the upstream export: two header rows, name in the third
        // column, 2025-cohort rate in column 5, 2024-cohort rate in column 8.
        Self {
            header_rows: 2,
            name_column: 2,
            preferred_rate_column: 5,
            fallback_rate_column: 8,
            preferred_label: "2025 cohort (rate table)".to_string(),
            fallback_label: "2024 cohort (rate table)".to_string(),
        }
    }
}

impl RateTableSchema {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.preferred_rate_column == self.fallback_rate_column {
            return Err(ValidationError(
                "preferred and fallback rate columns must differ".to_string(),
            ));
        }
        if self.name_column == self.preferred_rate_column
            || self.name_column == self.fallback_rate_column
        {
            return Err(ValidationError(
                "name column must not coincide with a rate column".to_string(),
            ));
        }
        if self.preferred_label.trim().is_empty() || self.fallback_label.trim().is_empty() {
            return Err(ValidationError(
                "rate source labels must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Minimum number of cells a row needs before it can be read at all.
    #[must_use]
    pub fn min_columns(&self) -> usize {
        self.name_column
            .max(self.preferred_rate_column)
            .max(self.fallback_rate_column)
            + 1
    }

    /// Empty cells and the literal "NaN" both mean "no value here". The
    /// sentinel becomes `None` at this boundary and nowhere else.
    #[must_use]
    pub fn cell_value(cell: &str) -> Option<&str> {
        let trimmed = cell.trim();
        if trimmed.is_empty() || trimmed == "NaN" {
            None
        } else {
            Some(trimmed)
        }
    }
}

/// Noise filter for the loosely delimited qualification roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RosterTokenPolicy {
    pub min_chars: usize,
    pub denylist: BTreeSet<String>,
    pub artifact_markers: Vec<String>,
}

impl Default for RosterTokenPolicy {
    fn default() -> Self {
        Self {
            min_chars: 3,
            denylist: ["NaN", "nan", "-"].iter().map(ToString::to_string).collect(),
            // Spreadsheet exports leak placeholder column headers into the
            // roster text ("Unnamed: 3" and friends).
            artifact_markers: vec!["Unnamed:".to_string()],
        }
    }
}

impl RosterTokenPolicy {
    #[must_use]
    pub fn accepts(&self, token: &str) -> bool {
        if token.chars().count() < self.min_chars {
            return false;
        }
        if self.denylist.contains(token) {
            return false;
        }
        !self
            .artifact_markers
            .iter()
            .any(|marker| token.contains(marker.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::{RateTableSchema, RosterTokenPolicy};

    #[test]
    fn default_schema_matches_the_upstream_export() {
        let schema = RateTableSchema::default();
        assert!(schema.validate().is_ok());
        assert_eq!(schema.min_columns(), 9);
    }

    #[test]
    fn nan_and_blank_cells_are_missing_values() {
        assert_eq!(RateTableSchema::cell_value("  "), None);
        assert_eq!(RateTableSchema::cell_value("NaN"), None);
        assert_eq!(RateTableSchema::cell_value(" 20.0% "), Some("20.0%"));
    }

    #[test]
    fn colliding_columns_are_rejected() {
        let mut schema = RateTableSchema::default();
        schema.fallback_rate_column = schema.preferred_rate_column;
        assert!(schema.validate().is_err());
    }

    #[test]
    fn roster_policy_drops_short_tokens_and_artifacts() {
        let policy = RosterTokenPolicy::default();
        assert!(policy.accepts("示例大学"));
        assert!(!policy.accepts("大学"));
        assert!(!policy.accepts("NaN"));
        assert!(!policy.accepts("Unnamed: 3"));
    }
}
