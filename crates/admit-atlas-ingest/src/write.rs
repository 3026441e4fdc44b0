// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use admit_atlas_core::{sha256_hex, stable_json_pretty_bytes};
use admit_atlas_model::{
    DatasetChecksums, DatasetFile, DatasetManifest, DatasetStats, InstitutionName,
    InstitutionRecord, SourceSummary, QUALIFIED_TAG,
};

use crate::job::IngestJob;
use crate::IngestError;

#[derive(Debug, Clone)]
pub struct WrittenArtifacts {
    pub dataset_path: PathBuf,
    pub manifest_path: PathBuf,
    pub manifest: DatasetManifest,
}

/// Publishes the canonical dataset and its manifest. Both files go through
/// temp + fsync + rename so a failed run never leaves a partial artifact in
/// place of a previous good one.
pub fn write_dataset_outputs(
    job: &IngestJob,
    records: BTreeMap<InstitutionName, InstitutionRecord>,
    sources: SourceSummary,
) -> Result<WrittenArtifacts, IngestError> {
    let stats = compute_stats(&records);
    let dataset = DatasetFile::from_records(records);
    dataset
        .validate()
        .map_err(|e| IngestError(format!("reconciled dataset failed validation: {e}")))?;

    let dataset_bytes =
        stable_json_pretty_bytes(&dataset).map_err(|e| IngestError(e.to_string()))?;
    let manifest = DatasetManifest::new(
        dataset.schema_version,
        DatasetChecksums::new(sha256_hex(&dataset_bytes)),
        stats,
        sources,
    );
    manifest
        .validate_strict()
        .map_err(|e| IngestError(format!("manifest failed validation: {e}")))?;
    let manifest_bytes =
        stable_json_pretty_bytes(&manifest).map_err(|e| IngestError(e.to_string()))?;

    fs::create_dir_all(&job.layout.root).map_err(|e| IngestError(e.to_string()))?;
    publish_atomic(&job.layout.dataset, &dataset_bytes)?;
    publish_atomic(&job.layout.manifest, &manifest_bytes)?;

    Ok(WrittenArtifacts {
        dataset_path: job.layout.dataset.clone(),
        manifest_path: job.layout.manifest.clone(),
        manifest,
    })
}

fn compute_stats(records: &BTreeMap<InstitutionName, InstitutionRecord>) -> DatasetStats {
    let mut with_rate = 0;
    let mut qualified = 0;
    let mut overridden = 0;
    for record in records.values() {
        if record.rate.is_some() {
            with_rate += 1;
        }
        if record.tags.contains(QUALIFIED_TAG) {
            qualified += 1;
        }
        if record.official_override {
            overridden += 1;
        }
    }
    DatasetStats::new(records.len() as u64, with_rate, qualified, overridden)
}

fn publish_atomic(path: &Path, bytes: &[u8]) -> Result<(), IngestError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| IngestError(format!("invalid artifact path: {}", path.display())))?;
    let tmp = path.with_file_name(format!("{file_name}.tmp"));
    write_and_sync(&tmp, bytes)?;
    fs::rename(&tmp, path).map_err(|e| {
        IngestError(format!(
            "failed to move {} into place: {e}",
            path.display()
        ))
    })
}

fn write_and_sync(path: &Path, bytes: &[u8]) -> Result<(), IngestError> {
    let mut file = fs::File::create(path)
        .map_err(|e| IngestError(format!("failed to create {}: {e}", path.display())))?;
    file.write_all(bytes)
        .map_err(|e| IngestError(format!("failed to write {}: {e}", path.display())))?;
    file.sync_all()
        .map_err(|e| IngestError(format!("failed to sync {}: {e}", path.display())))?;
    Ok(())
}
