// SPDX-License-Identifier: Apache-2.0

use admit_atlas_model::{InstitutionName, RateTableSchema};

/// A row of the rate table that yielded both a name and a resolvable rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateCandidate {
    pub name: InstitutionName,
    pub rate: String,
    pub source_label: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RateExtract {
    pub candidates: Vec<RateCandidate>,
    pub rows_skipped_short: u64,
    pub rows_skipped_unnamed: u64,
    pub rows_skipped_rateless: u64,
    pub rows_with_fallback_rate: u64,
}

/// Extracts `(name, rate, source label)` candidates from the delimited rate
/// table. The first `header_rows` non-empty lines are discarded. Rows that
/// fail the schema are skipped and counted; one bad row never fails the run.
#[must_use]
pub fn extract_rate_candidates(content: &str, schema: &RateTableSchema) -> RateExtract {
    let mut out = RateExtract::default();

    for (row_index, line) in content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
    {
        if row_index < schema.header_rows {
            continue;
        }
        let cells: Vec<&str> = line.split(',').collect();
        if cells.len() <= schema.name_column {
            out.rows_skipped_short += 1;
            continue;
        }

        let name = match InstitutionName::parse(cells[schema.name_column].trim()) {
            Ok(name) => name,
            Err(_) => {
                out.rows_skipped_unnamed += 1;
                continue;
            }
        };

        // Prefer the recent cohort column; fall back to the older one. A
        // ragged row tail reads as a missing cell, not an error.
        let preferred = cells
            .get(schema.preferred_rate_column)
            .and_then(|cell| RateTableSchema::cell_value(cell));
        let (rate, source_label) = match preferred {
            Some(rate) => (rate, schema.preferred_label.as_str()),
            None => {
                match cells
                    .get(schema.fallback_rate_column)
                    .and_then(|cell| RateTableSchema::cell_value(cell))
                {
                    Some(rate) => {
                        out.rows_with_fallback_rate += 1;
                        (rate, schema.fallback_label.as_str())
                    }
                    None => {
                        // No resolvable rate anywhere in the row: the name
                        // does not originate from this extractor at all.
                        out.rows_skipped_rateless += 1;
                        continue;
                    }
                }
            }
        };

        out.candidates.push(RateCandidate {
            name,
            rate: rate.to_string(),
            source_label: source_label.to_string(),
        });
    }

    out
}
