use admit_atlas_ingest::{run_ingest, IngestOptions};
use admit_atlas_model::{artifact_layout, AliasIndex, DATASET_SCHEMA_VERSION};
use admit_atlas_resolve::{load_dataset, load_verified, ResolveOutcome, Resolver};
use std::fs;
use tempfile::tempdir;

const RATE_CSV: &str = "\
序号,省份,学校名称,总人数,名额,2025率,备注,人数,2024率
,,,,,,,,
1,北京,北京航空航天大学,3794,1373,36.19%,,3700,35.80%
";

fn build_snapshot(root: &std::path::Path) -> admit_atlas_model::ArtifactLayout {
    let rate = root.join("rate.csv");
    let roster = root.join("roster.txt");
    fs::write(&rate, RATE_CSV).expect("write rate csv");
    fs::write(&roster, "北京航空航天大学，某学院").expect("write roster");

    let options = IngestOptions::new(rate, roster, root.join("out"));
    let result = run_ingest(&options).expect("ingest");
    assert!(result.dataset_path.exists());
    artifact_layout(&root.join("out"))
}

#[test]
fn resolver_serves_the_published_snapshot_end_to_end() {
    let tmp = tempdir().expect("tempdir");
    let layout = build_snapshot(tmp.path());

    let dataset = load_verified(&layout).expect("verified load");
    let resolver = Resolver::new(dataset, AliasIndex::builtin()).expect("resolver");

    match resolver.resolve("北航") {
        ResolveOutcome::Alias { canonical, record } => {
            assert_eq!(canonical, "北京航空航天大学");
            assert_eq!(record.rate.as_deref(), Some("36.19%"));
        }
        other => panic!("expected alias match, got {other:?}"),
    }
    assert!(resolver.resolve("不存在的学校").is_not_found());

    let rateless = resolver.resolve("某学院").record().expect("record");
    assert_eq!(rateless.rate, None);
}

#[test]
fn tampered_dataset_bytes_fail_checksum_verification() {
    let tmp = tempdir().expect("tempdir");
    let layout = build_snapshot(tmp.path());

    let mut raw = fs::read_to_string(&layout.dataset).expect("read dataset");
    raw = raw.replace("36.19%", "99.99%");
    fs::write(&layout.dataset, raw).expect("rewrite dataset");

    let err = load_verified(&layout).expect_err("checksum must fail");
    assert!(err.0.contains("checksum mismatch"), "unexpected error: {}", err.0);
}

#[test]
fn unsupported_schema_versions_are_rejected_at_load() {
    let tmp = tempdir().expect("tempdir");
    let layout = build_snapshot(tmp.path());

    let raw = fs::read_to_string(&layout.dataset).expect("read dataset");
    let bumped = raw.replace(
        &format!("\"schema_version\": {DATASET_SCHEMA_VERSION}"),
        &format!("\"schema_version\": {}", DATASET_SCHEMA_VERSION + 1),
    );
    assert_ne!(raw, bumped, "fixture must contain the schema_version field");
    fs::write(&layout.dataset, bumped).expect("rewrite dataset");

    let err = load_dataset(&layout.dataset).expect_err("schema version must fail");
    assert!(
        err.0.contains("schema version"),
        "unexpected error: {}",
        err.0
    );
}
