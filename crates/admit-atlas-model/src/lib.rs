#![forbid(unsafe_code)]
//! Admission-rate model SSOT.

mod alias;
mod dataset;
mod manifest;
mod overrides;
mod record;
mod source;

pub use alias::AliasIndex;
pub use dataset::{DatasetFile, DATASET_SCHEMA_VERSION};
pub use manifest::{
    artifact_layout, ArtifactLayout, DatasetChecksums, DatasetManifest, DatasetStats,
    SourceSummary, MANIFEST_VERSION,
};
pub use overrides::{OverrideEntry, OverrideTable};
pub use record::{
    InstitutionName, InstitutionRecord, ValidationError, LABEL_MAX_LEN, NAME_MAX_LEN,
    QUALIFIED_TAG, RATE_MAX_LEN, TAG_MAX_LEN,
};
pub use source::{RateTableSchema, RosterTokenPolicy};

pub const CRATE_NAME: &str = "admit-atlas-model";
