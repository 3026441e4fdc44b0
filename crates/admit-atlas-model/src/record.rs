// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

pub const NAME_MAX_LEN: usize = 256;
pub const RATE_MAX_LEN: usize = 32;
pub const LABEL_MAX_LEN: usize = 128;
pub const TAG_MAX_LEN: usize = 64;

/// Tag carried by every institution known to participate in the program,
/// independent of whether a numeric rate is verified.
pub const QUALIFIED_TAG: &str = "qualified";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(pub String);

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ValidationError {}

/// Canonical institution name: the unique key of the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
#[non_exhaustive]
pub struct InstitutionName(String);

impl InstitutionName {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        if input.is_empty() {
            return Err(ValidationError("institution name must not be empty".to_string()));
        }
        if input.trim() != input {
            return Err(ValidationError(
                "institution name must not contain leading/trailing whitespace".to_string(),
            ));
        }
        if input.len() > NAME_MAX_LEN {
            return Err(ValidationError(format!(
                "institution name exceeds max length {NAME_MAX_LEN}"
            )));
        }
        if input.contains('\n') || input.contains('\r') {
            return Err(ValidationError(
                "institution name must not contain line breaks".to_string(),
            ));
        }
        Ok(Self(input.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for InstitutionName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One canonical per-institution record. The rate text is preserved verbatim
/// from its source of record ("36.6%" stays "36.6%"); `None` means no
/// verified figure exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstitutionRecord {
    pub name: InstitutionName,
    pub rate: Option<String>,
    pub rate_source: Option<String>,
    pub official_override: bool,
    pub tags: BTreeSet<String>,
}

impl InstitutionRecord {
    #[must_use]
    pub fn with_rate(name: InstitutionName, rate: String, rate_source: String) -> Self {
        Self {
            name,
            rate: Some(rate),
            rate_source: Some(rate_source),
            official_override: false,
            tags: BTreeSet::new(),
        }
    }

    /// Roster-only record: no verified figure, by design never backfilled.
    #[must_use]
    pub fn qualified_only(name: InstitutionName) -> Self {
        let mut tags = BTreeSet::new();
        tags.insert(QUALIFIED_TAG.to_string());
        Self {
            name,
            rate: None,
            rate_source: None,
            official_override: false,
            tags,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match (&self.rate, &self.rate_source) {
            (None, Some(_)) => {
                return Err(ValidationError(format!(
                    "record {} has a rate_source but no rate",
                    self.name
                )));
            }
            (Some(rate), source) => {
                let trimmed = rate.trim();
                if trimmed.is_empty() || trimmed != rate {
                    return Err(ValidationError(format!(
                        "record {} rate must be non-empty trimmed text",
                        self.name
                    )));
                }
                if rate.len() > RATE_MAX_LEN {
                    return Err(ValidationError(format!(
                        "record {} rate exceeds max length {RATE_MAX_LEN}",
                        self.name
                    )));
                }
                match source {
                    None => {
                        return Err(ValidationError(format!(
                            "record {} has a rate but no rate_source",
                            self.name
                        )));
                    }
                    Some(label) => {
                        if label.trim().is_empty() {
                            return Err(ValidationError(format!(
                                "record {} rate_source must not be empty",
                                self.name
                            )));
                        }
                        if label.len() > LABEL_MAX_LEN {
                            return Err(ValidationError(format!(
                                "record {} rate_source exceeds max length {LABEL_MAX_LEN}",
                                self.name
                            )));
                        }
                    }
                }
            }
            (None, None) => {
                if self.official_override {
                    return Err(ValidationError(format!(
                        "record {} is flagged official_override without a rate",
                        self.name
                    )));
                }
            }
        }
        for tag in &self.tags {
            if tag.trim().is_empty() || tag.trim() != tag {
                return Err(ValidationError(format!(
                    "record {} carries an empty or untrimmed tag",
                    self.name
                )));
            }
            if tag.len() > TAG_MAX_LEN {
                return Err(ValidationError(format!(
                    "record {} tag exceeds max length {TAG_MAX_LEN}",
                    self.name
                )));
            }
        }
        Ok(())
    }
}
