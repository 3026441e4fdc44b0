// SPDX-License-Identifier: Apache-2.0

use admit_atlas_model::{InstitutionName, RosterTokenPolicy};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RosterExtract {
    pub names: Vec<InstitutionName>,
    pub tokens_discarded: u64,
}

/// Splits the loosely delimited qualification roster into institution names.
/// Delimiters are ASCII and full-width commas plus line breaks. Tokens that
/// fail the noise policy are counted and dropped; nothing here ever aborts.
#[must_use]
pub fn extract_qualified_names(content: &str, policy: &RosterTokenPolicy) -> RosterExtract {
    let mut out = RosterExtract::default();

    for token in content.split([',', '，', '\n', '\r']) {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !policy.accepts(trimmed) {
            out.tokens_discarded += 1;
            continue;
        }
        match InstitutionName::parse(trimmed) {
            Ok(name) => out.names.push(name),
            Err(_) => out.tokens_discarded += 1,
        }
    }

    out
}
