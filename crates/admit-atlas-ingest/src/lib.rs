// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod job;
mod logging;
mod rate_table;
mod reconcile;
mod roster;
mod write;

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::PathBuf;

use admit_atlas_model::{
    DatasetManifest, OverrideTable, RateTableSchema, RosterTokenPolicy, SourceSummary,
};

pub use job::IngestJob;
pub use logging::{IngestEvent, IngestLog, IngestStage};
pub use rate_table::{extract_rate_candidates, RateCandidate, RateExtract};
pub use reconcile::{reconcile, ReconcileOutcome};
pub use roster::{extract_qualified_names, RosterExtract};
pub use write::{write_dataset_outputs, WrittenArtifacts};

pub const CRATE_NAME: &str = "admit-atlas-ingest";

#[derive(Debug)]
pub struct IngestError(pub String);

impl Display for IngestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for IngestError {}

#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub rate_table_path: PathBuf,
    pub roster_path: PathBuf,
    pub output_root: PathBuf,
    pub schema: RateTableSchema,
    pub roster_policy: RosterTokenPolicy,
    pub overrides: OverrideTable,
}

impl IngestOptions {
    #[must_use]
    pub fn new(rate_table_path: PathBuf, roster_path: PathBuf, output_root: PathBuf) -> Self {
        Self {
            rate_table_path,
            roster_path,
            output_root,
            schema: RateTableSchema::default(),
            roster_policy: RosterTokenPolicy::default(),
            overrides: OverrideTable::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IngestResult {
    pub dataset_path: PathBuf,
    pub manifest_path: PathBuf,
    pub manifest: DatasetManifest,
    pub events: Vec<IngestEvent>,
}

/// Runs the full pipeline: read -> extract -> reconcile -> persist.
///
/// A missing source degrades the dataset and is logged as a warning event;
/// a persistence failure aborts the run, since a partial artifact would
/// silently break the no-fabrication guarantee downstream.
pub fn run_ingest(options: &IngestOptions) -> Result<IngestResult, IngestError> {
    options
        .schema
        .validate()
        .map_err(|e| IngestError(format!("rate table schema: {e}")))?;
    options
        .overrides
        .validate()
        .map_err(|e| IngestError(format!("override table: {e}")))?;

    let job = IngestJob::from_options(options);
    let mut log = IngestLog::default();

    let rate_extract = match fs::read_to_string(&options.rate_table_path) {
        Ok(content) => {
            let extract = extract_rate_candidates(&content, &options.schema);
            log.emit(
                IngestStage::Extract,
                "rate_table",
                fields([
                    ("candidates", extract.candidates.len().to_string()),
                    ("rows_skipped_short", extract.rows_skipped_short.to_string()),
                    (
                        "rows_skipped_unnamed",
                        extract.rows_skipped_unnamed.to_string(),
                    ),
                    (
                        "rows_skipped_rateless",
                        extract.rows_skipped_rateless.to_string(),
                    ),
                    (
                        "rows_with_fallback_rate",
                        extract.rows_with_fallback_rate.to_string(),
                    ),
                ]),
            );
            Some(extract)
        }
        Err(err) => {
            log.emit(
                IngestStage::Read,
                "rate_table_missing",
                fields([
                    ("path", options.rate_table_path.display().to_string()),
                    ("error", err.to_string()),
                ]),
            );
            None
        }
    };

    let roster_extract = match fs::read_to_string(&options.roster_path) {
        Ok(content) => {
            let extract = extract_qualified_names(&content, &options.roster_policy);
            log.emit(
                IngestStage::Extract,
                "roster",
                fields([
                    ("qualified", extract.names.len().to_string()),
                    ("tokens_discarded", extract.tokens_discarded.to_string()),
                ]),
            );
            Some(extract)
        }
        Err(err) => {
            log.emit(
                IngestStage::Read,
                "roster_missing",
                fields([
                    ("path", options.roster_path.display().to_string()),
                    ("error", err.to_string()),
                ]),
            );
            None
        }
    };

    let sources = SourceSummary::new(
        rate_extract.is_some(),
        roster_extract.is_some(),
        options.overrides.len() as u64,
    );

    let rate_candidates = rate_extract.map(|e| e.candidates).unwrap_or_default();
    let qualified_names = roster_extract.map(|e| e.names).unwrap_or_default();

    let outcome = reconcile(rate_candidates, qualified_names, &options.overrides)?;
    log.emit(
        IngestStage::Reconcile,
        "merged",
        fields([
            ("records", outcome.records.len().to_string()),
            (
                "rate_rows_replaced",
                outcome.rate_rows_replaced.to_string(),
            ),
            ("qualified_created", outcome.qualified_created.to_string()),
            ("qualified_tagged", outcome.qualified_tagged.to_string()),
            ("overrides_applied", options.overrides.len().to_string()),
        ]),
    );

    let written = write_dataset_outputs(&job, outcome.records, sources)?;
    log.emit(
        IngestStage::Persist,
        "published",
        fields([
            ("dataset", written.dataset_path.display().to_string()),
            ("manifest", written.manifest_path.display().to_string()),
            (
                "dataset_sha256",
                written.manifest.checksums.dataset_sha256.clone(),
            ),
        ]),
    );

    Ok(IngestResult {
        dataset_path: written.dataset_path,
        manifest_path: written.manifest_path,
        manifest: written.manifest,
        events: log.into_events(),
    })
}

fn fields<const N: usize>(pairs: [(&str, String); N]) -> BTreeMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}
