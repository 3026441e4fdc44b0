use admit_atlas_model::{
    AliasIndex, DatasetFile, InstitutionName, InstitutionRecord, OverrideEntry, OverrideTable,
    RateTableSchema, RosterTokenPolicy, DATASET_SCHEMA_VERSION, QUALIFIED_TAG,
};
use std::collections::BTreeMap;

#[test]
fn name_is_the_unique_key_and_rejects_hidden_whitespace() {
    assert!(InstitutionName::parse("北京航空航天大学").is_ok());
    assert!(InstitutionName::parse("名\n字").is_err());
    assert!(InstitutionName::parse("\t名字").is_err());
}

#[test]
fn rateless_records_carry_no_provenance_and_no_override_flag() {
    let rec = InstitutionRecord::qualified_only(InstitutionName::parse("某学院").expect("name"));
    assert!(rec.validate().is_ok());
    assert_eq!(rec.rate, None);
    assert_eq!(rec.rate_source, None);
    assert!(!rec.official_override);
}

#[test]
fn dataset_file_serde_round_trips_with_sorted_tags() {
    let name = InstitutionName::parse("示例大学").expect("name");
    let mut rec = InstitutionRecord::with_rate(
        name.clone(),
        "20.0%".to_string(),
        "2025 cohort (rate table)".to_string(),
    );
    rec.tags.insert("double-non-elite".to_string());
    rec.tags.insert(QUALIFIED_TAG.to_string());

    let mut records = BTreeMap::new();
    records.insert(name, rec);
    let dataset = DatasetFile::from_records(records);

    let raw = serde_json::to_string(&dataset).expect("serialize");
    let back: DatasetFile = serde_json::from_str(&raw).expect("deserialize");
    assert_eq!(back, dataset);
    // BTreeSet serializes tags in canonical sort order.
    let double_non_elite = raw.find("double-non-elite").expect("tag present");
    let qualified = raw.find(QUALIFIED_TAG).expect("tag present");
    assert!(double_non_elite < qualified);
}

#[test]
fn dataset_file_rejects_unknown_fields() {
    let raw = format!(
        r#"{{"schema_version":{DATASET_SCHEMA_VERSION},"records":[],"extra":true}}"#
    );
    assert!(serde_json::from_str::<DatasetFile>(&raw).is_err());
}

#[test]
fn override_table_and_alias_index_load_from_plain_json_maps() {
    let overrides: OverrideTable = serde_json::from_str(
        r#"{"西安工业大学": {"rate": "4.0%", "source": "2025 registrar bulletin", "tag": "double-non-elite"}}"#,
    )
    .expect("override table");
    assert!(overrides.validate().is_ok());
    assert_eq!(overrides.len(), 1);
    let entry: &OverrideEntry = overrides
        .iter()
        .next()
        .map(|(_, entry)| entry)
        .expect("entry");
    assert_eq!(entry.rate, "4.0%");

    let aliases: AliasIndex =
        serde_json::from_str(r#"{"北航": "北京航空航天大学"}"#).expect("alias index");
    assert!(aliases.validate().is_ok());
    assert_eq!(aliases.canonical_for("北航"), Some("北京航空航天大学"));
}

#[test]
fn source_schemas_fail_closed_on_nonsense_layouts() {
    let mut schema = RateTableSchema::default();
    schema.name_column = schema.preferred_rate_column;
    assert!(schema.validate().is_err());

    let policy = RosterTokenPolicy::default();
    assert!(!policy.accepts(""));
    assert!(!policy.accepts("-"));
}
