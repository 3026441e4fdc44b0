// SPDX-License-Identifier: Apache-2.0

use std::collections::{BTreeMap, BTreeSet};

use admit_atlas_model::{
    InstitutionName, InstitutionRecord, OverrideTable, QUALIFIED_TAG,
};

use crate::rate_table::RateCandidate;
use crate::IngestError;

#[derive(Debug, Default, Clone)]
pub struct ReconcileOutcome {
    pub records: BTreeMap<InstitutionName, InstitutionRecord>,
    pub rate_rows_replaced: u64,
    pub qualified_created: u64,
    pub qualified_tagged: u64,
}

/// Merges the three producers into one canonical record set, in this exact
/// order: rate table seeds, roster tags, overrides win. Tags only grow; a
/// missing rate is never backfilled by the weaker roster source.
pub fn reconcile(
    rate_candidates: Vec<RateCandidate>,
    qualified_names: Vec<InstitutionName>,
    overrides: &OverrideTable,
) -> Result<ReconcileOutcome, IngestError> {
    let mut out = ReconcileOutcome::default();

    // Step 1: one record per distinct rate-table name. A later row for the
    // same name replaces the earlier one.
    for candidate in rate_candidates {
        let record = InstitutionRecord::with_rate(
            candidate.name.clone(),
            candidate.rate,
            candidate.source_label,
        );
        if out.records.insert(candidate.name, record).is_some() {
            out.rate_rows_replaced += 1;
        }
    }

    // Step 2: the roster may only add the qualified tag or create a
    // rate-less record. It never touches rate or rate_source.
    for name in qualified_names {
        match out.records.get_mut(&name) {
            Some(record) => {
                if record.tags.insert(QUALIFIED_TAG.to_string()) {
                    out.qualified_tagged += 1;
                }
            }
            None => {
                out.records
                    .insert(name.clone(), InstitutionRecord::qualified_only(name));
                out.qualified_created += 1;
            }
        }
    }

    // Step 3: overrides set the rate unconditionally, whatever steps 1 and 2
    // concluded.
    for (raw_name, entry) in overrides.iter() {
        let name = InstitutionName::parse(raw_name)
            .map_err(|e| IngestError(format!("override key {raw_name:?}: {e}")))?;
        let record = out
            .records
            .entry(name.clone())
            .or_insert_with(|| InstitutionRecord {
                name,
                rate: None,
                rate_source: None,
                official_override: false,
                tags: BTreeSet::new(),
            });
        record.rate = Some(entry.rate.clone());
        record.rate_source = Some(entry.source_label());
        record.official_override = true;
        if let Some(tag) = &entry.tag {
            record.tags.insert(tag.clone());
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::reconcile;
    use crate::rate_table::RateCandidate;
    use admit_atlas_model::{
        InstitutionName, OverrideEntry, OverrideTable, QUALIFIED_TAG,
    };
    use std::collections::BTreeMap;

    fn name(raw: &str) -> InstitutionName {
        InstitutionName::parse(raw).expect("name")
    }

    fn candidate(raw: &str, rate: &str) -> RateCandidate {
        RateCandidate {
            name: name(raw),
            rate: rate.to_string(),
            source_label: "2025 cohort (rate table)".to_string(),
        }
    }

    fn overrides(entries: &[(&str, &str, Option<&str>)]) -> OverrideTable {
        OverrideTable::from_entries(
            entries
                .iter()
                .map(|(n, rate, tag)| {
                    (
                        (*n).to_string(),
                        OverrideEntry {
                            rate: (*rate).to_string(),
                            source: "official".to_string(),
                            tag: tag.map(ToString::to_string),
                        },
                    )
                })
                .collect::<BTreeMap<_, _>>(),
        )
    }

    #[test]
    fn roster_never_backfills_a_missing_rate() {
        let outcome = reconcile(
            vec![candidate("示例大学", "20.0%")],
            vec![name("示例大学"), name("某学院")],
            &OverrideTable::default(),
        )
        .expect("reconcile");

        let seeded = outcome.records.get(&name("示例大学")).expect("seeded");
        assert_eq!(seeded.rate.as_deref(), Some("20.0%"));
        assert!(seeded.tags.contains(QUALIFIED_TAG));

        let roster_only = outcome.records.get(&name("某学院")).expect("roster only");
        assert_eq!(roster_only.rate, None);
        assert_eq!(roster_only.rate_source, None);
        assert!(!roster_only.official_override);
    }

    #[test]
    fn overrides_win_over_both_weaker_sources() {
        let outcome = reconcile(
            vec![candidate("示例大学", "20.0%")],
            vec![name("示例大学")],
            &overrides(&[("示例大学", "4.0%", Some("double-non-elite"))]),
        )
        .expect("reconcile");

        let record = outcome.records.get(&name("示例大学")).expect("record");
        assert_eq!(record.rate.as_deref(), Some("4.0%"));
        assert_eq!(record.rate_source.as_deref(), Some("official override (official)"));
        assert!(record.official_override);
        assert!(record.tags.contains(QUALIFIED_TAG));
        assert!(record.tags.contains("double-non-elite"));
    }

    #[test]
    fn overrides_create_records_absent_from_every_other_source() {
        let outcome = reconcile(
            Vec::new(),
            Vec::new(),
            &overrides(&[("西安工业大学", "4.0%", None)]),
        )
        .expect("reconcile");

        let record = outcome.records.get(&name("西安工业大学")).expect("record");
        assert_eq!(record.rate.as_deref(), Some("4.0%"));
        assert!(record.official_override);
        assert!(!record.tags.contains(QUALIFIED_TAG));
    }

    #[test]
    fn later_rate_rows_replace_earlier_ones_for_the_same_name() {
        let outcome = reconcile(
            vec![candidate("示例大学", "20.0%"), candidate("示例大学", "21.0%")],
            Vec::new(),
            &OverrideTable::default(),
        )
        .expect("reconcile");

        assert_eq!(outcome.rate_rows_replaced, 1);
        let record = outcome.records.get(&name("示例大学")).expect("record");
        assert_eq!(record.rate.as_deref(), Some("21.0%"));
    }

    #[test]
    fn tags_only_grow_across_merge_steps() {
        let outcome = reconcile(
            vec![candidate("示例大学", "20.0%")],
            vec![name("示例大学")],
            &overrides(&[("示例大学", "4.0%", Some("double-non-elite"))]),
        )
        .expect("reconcile");

        let record = outcome.records.get(&name("示例大学")).expect("record");
        assert_eq!(record.tags.len(), 2);

        // Applying the qualified tag twice is idempotent.
        let again = reconcile(
            Vec::new(),
            vec![name("某学院"), name("某学院")],
            &OverrideTable::default(),
        )
        .expect("reconcile");
        let rec = again.records.get(&name("某学院")).expect("record");
        assert_eq!(rec.tags.len(), 1);
        assert_eq!(again.qualified_created, 1);
        assert_eq!(again.qualified_tagged, 0);
    }
}
