use crate::record::ValidationError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const MANIFEST_VERSION: &str = "1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
#[non_exhaustive]
pub struct DatasetChecksums {
    pub dataset_sha256: String,
}

impl DatasetChecksums {
    #[must_use]
    pub fn new(dataset_sha256: String) -> Self {
        Self { dataset_sha256 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
#[non_exhaustive]
pub struct DatasetStats {
    pub record_count: u64,
    pub with_rate_count: u64,
    pub qualified_count: u64,
    pub override_count: u64,
}

impl DatasetStats {
    #[must_use]
    pub fn new(
        record_count: u64,
        with_rate_count: u64,
        qualified_count: u64,
        override_count: u64,
    ) -> Self {
        Self {
            record_count,
            with_rate_count,
            qualified_count,
            override_count,
        }
    }
}

/// Which inputs actually fed the run. A missing source is a warning at
/// ingest time, but the manifest records the gap so a thin dataset can be
/// told apart from a thin reality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
#[non_exhaustive]
pub struct SourceSummary {
    pub rate_table_present: bool,
    pub roster_present: bool,
    pub override_entries: u64,
}

impl SourceSummary {
    #[must_use]
    pub fn new(rate_table_present: bool, roster_present: bool, override_entries: u64) -> Self {
        Self {
            rate_table_present,
            roster_present,
            override_entries,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[non_exhaustive]
pub struct DatasetManifest {
    pub manifest_version: String,
    pub dataset_schema_version: u64,
    pub checksums: DatasetChecksums,
    pub stats: DatasetStats,
    pub sources: SourceSummary,
}

impl DatasetManifest {
    #[must_use]
    pub fn new(
        dataset_schema_version: u64,
        checksums: DatasetChecksums,
        stats: DatasetStats,
        sources: SourceSummary,
    ) -> Self {
        Self {
            manifest_version: MANIFEST_VERSION.to_string(),
            dataset_schema_version,
            checksums,
            stats,
            sources,
        }
    }

    pub fn validate_strict(&self) -> Result<(), ValidationError> {
        if self.manifest_version.trim().is_empty() {
            return Err(ValidationError(
                "manifest_version must not be empty".to_string(),
            ));
        }
        if self.manifest_version != MANIFEST_VERSION {
            return Err(ValidationError(format!(
                "unsupported manifest_version: expected {MANIFEST_VERSION}, got {}",
                self.manifest_version
            )));
        }
        let sha = &self.checksums.dataset_sha256;
        if sha.len() != 64 || !sha.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValidationError(
                "dataset_sha256 must be a 64-char hex digest".to_string(),
            ));
        }
        if self.stats.with_rate_count > self.stats.record_count
            || self.stats.qualified_count > self.stats.record_count
            || self.stats.override_count > self.stats.record_count
        {
            return Err(ValidationError(
                "manifest stats must not exceed record_count".to_string(),
            ));
        }
        if self.stats.override_count > self.stats.with_rate_count {
            return Err(ValidationError(
                "every override carries a rate; override_count must not exceed with_rate_count"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    pub root: PathBuf,
    pub dataset: PathBuf,
    pub manifest: PathBuf,
}

#[must_use]
pub fn artifact_layout(root: &Path) -> ArtifactLayout {
    ArtifactLayout {
        root: root.to_path_buf(),
        dataset: root.join("institutions.json"),
        manifest: root.join("manifest.json"),
    }
}
