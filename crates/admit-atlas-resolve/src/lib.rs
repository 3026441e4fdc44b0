#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;

use admit_atlas_core::sha256_hex;
use admit_atlas_model::{
    AliasIndex, ArtifactLayout, DatasetFile, DatasetManifest, InstitutionRecord,
};

pub const CRATE_NAME: &str = "admit-atlas-resolve";

#[derive(Debug)]
pub struct ResolveError(pub String);

impl Display for ResolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ResolveError {}

/// Loads and validates a dataset artifact without checksum verification.
pub fn load_dataset(path: &Path) -> Result<DatasetFile, ResolveError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| ResolveError(format!("failed to read {}: {e}", path.display())))?;
    let dataset: DatasetFile = serde_json::from_str(&raw)
        .map_err(|e| ResolveError(format!("failed to decode {}: {e}", path.display())))?;
    dataset
        .validate()
        .map_err(|e| ResolveError(e.to_string()))?;
    Ok(dataset)
}

/// Loads a dataset and verifies it against its manifest: strict manifest
/// validation plus a sha256 check of the artifact bytes. This is the load
/// path long-running consumers should use at startup.
pub fn load_verified(layout: &ArtifactLayout) -> Result<DatasetFile, ResolveError> {
    let manifest_raw = fs::read_to_string(&layout.manifest).map_err(|e| {
        ResolveError(format!(
            "failed to read {}: {e}",
            layout.manifest.display()
        ))
    })?;
    let manifest: DatasetManifest = serde_json::from_str(&manifest_raw).map_err(|e| {
        ResolveError(format!(
            "failed to decode {}: {e}",
            layout.manifest.display()
        ))
    })?;
    manifest
        .validate_strict()
        .map_err(|e| ResolveError(e.to_string()))?;

    let dataset_bytes = fs::read(&layout.dataset).map_err(|e| {
        ResolveError(format!("failed to read {}: {e}", layout.dataset.display()))
    })?;
    let actual = sha256_hex(&dataset_bytes);
    if actual != manifest.checksums.dataset_sha256 {
        return Err(ResolveError(format!(
            "dataset checksum mismatch for {}: expected {}, got {}",
            layout.dataset.display(),
            manifest.checksums.dataset_sha256,
            actual
        )));
    }

    let dataset: DatasetFile = serde_json::from_slice(&dataset_bytes).map_err(|e| {
        ResolveError(format!(
            "failed to decode {}: {e}",
            layout.dataset.display()
        ))
    })?;
    dataset
        .validate()
        .map_err(|e| ResolveError(e.to_string()))?;
    Ok(dataset)
}

/// How a lookup concluded. `NotFound` is an expected outcome every caller
/// must handle: it means "no verified data exists", and the caller decides
/// whether to proceed, warn, or refuse. The resolver never guesses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome<'a> {
    Exact(&'a InstitutionRecord),
    Alias {
        canonical: &'a str,
        record: &'a InstitutionRecord,
    },
    NotFound,
}

impl<'a> ResolveOutcome<'a> {
    #[must_use]
    pub fn record(&self) -> Option<&'a InstitutionRecord> {
        match self {
            Self::Exact(record) | Self::Alias { record, .. } => Some(*record),
            Self::NotFound => None,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Pure, synchronous lookup over one immutable snapshot. Safe to share
/// across any number of concurrent callers; a fresh dataset only arrives by
/// constructing a new `Resolver` and swapping it at the consumer boundary.
#[derive(Debug, Clone)]
pub struct Resolver {
    records: BTreeMap<String, InstitutionRecord>,
    aliases: AliasIndex,
}

impl Resolver {
    pub fn new(dataset: DatasetFile, aliases: AliasIndex) -> Result<Self, ResolveError> {
        dataset
            .validate()
            .map_err(|e| ResolveError(e.to_string()))?;
        aliases
            .validate()
            .map_err(|e| ResolveError(e.to_string()))?;
        let records = dataset
            .records
            .into_iter()
            .map(|record| (record.name.as_str().to_string(), record))
            .collect();
        Ok(Self { records, aliases })
    }

    /// Exact canonical match first, then the alias table, then `NotFound`.
    /// A canonical name always shadows an alias key of the same spelling.
    #[must_use]
    pub fn resolve(&self, input: &str) -> ResolveOutcome<'_> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return ResolveOutcome::NotFound;
        }
        if let Some(record) = self.records.get(trimmed) {
            return ResolveOutcome::Exact(record);
        }
        if let Some(canonical) = self.aliases.canonical_for(trimmed) {
            if let Some(record) = self.records.get(canonical) {
                return ResolveOutcome::Alias { canonical, record };
            }
        }
        ResolveOutcome::NotFound
    }

    pub fn records(&self) -> impl Iterator<Item = &InstitutionRecord> {
        self.records.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{ResolveOutcome, Resolver};
    use admit_atlas_model::{
        AliasIndex, DatasetFile, InstitutionName, InstitutionRecord,
    };
    use std::collections::BTreeMap;

    fn resolver() -> Resolver {
        let mut records = BTreeMap::new();
        for (name, rate) in [
            ("北京航空航天大学", Some("36.19%")),
            ("某学院", None),
        ] {
            let parsed = InstitutionName::parse(name).expect("name");
            let record = match rate {
                Some(rate) => InstitutionRecord::with_rate(
                    parsed.clone(),
                    rate.to_string(),
                    "2025 cohort (rate table)".to_string(),
                ),
                None => InstitutionRecord::qualified_only(parsed.clone()),
            };
            records.insert(parsed, record);
        }
        Resolver::new(DatasetFile::from_records(records), AliasIndex::builtin())
            .expect("resolver")
    }

    #[test]
    fn exact_match_returns_the_canonical_record() {
        let resolver = resolver();
        match resolver.resolve("北京航空航天大学") {
            ResolveOutcome::Exact(record) => {
                assert_eq!(record.rate.as_deref(), Some("36.19%"));
            }
            other => panic!("expected exact match, got {other:?}"),
        }
    }

    #[test]
    fn alias_match_maps_to_the_canonical_record() {
        let resolver = resolver();
        match resolver.resolve("北航") {
            ResolveOutcome::Alias { canonical, record } => {
                assert_eq!(canonical, "北京航空航天大学");
                assert_eq!(record.rate.as_deref(), Some("36.19%"));
            }
            other => panic!("expected alias match, got {other:?}"),
        }
    }

    #[test]
    fn input_is_trimmed_before_matching() {
        let resolver = resolver();
        assert!(resolver.resolve("  北航  ").record().is_some());
        assert!(resolver.resolve("   ").is_not_found());
    }

    #[test]
    fn unknown_names_are_not_found_never_guessed() {
        let resolver = resolver();
        assert!(resolver.resolve("不存在的学校").is_not_found());
        // An alias whose target is absent from this dataset is also a miss.
        assert!(resolver.resolve("武大").is_not_found());
    }

    #[test]
    fn rateless_records_resolve_with_an_explicit_null_rate() {
        let resolver = resolver();
        let record = resolver.resolve("某学院").record().expect("record");
        assert_eq!(record.rate, None);
        assert_eq!(record.rate_source, None);
    }
}
