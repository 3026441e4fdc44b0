#![forbid(unsafe_code)]

use admit_atlas_core::{sha256_hex, ExitCode};
use admit_atlas_ingest::{run_ingest, IngestOptions};
use admit_atlas_model::{
    artifact_layout, AliasIndex, DatasetManifest, InstitutionRecord, OverrideTable,
};
use admit_atlas_resolve::{load_dataset, load_verified, ResolveOutcome, Resolver};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode as ProcessExitCode;

#[derive(Parser)]
#[command(name = "admit-atlas")]
#[command(about = "Admit Atlas operations CLI")]
struct Cli {
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the offline pipeline and publish the canonical dataset.
    Build {
        #[arg(long)]
        rate_table: PathBuf,
        #[arg(long)]
        roster: PathBuf,
        #[arg(long)]
        output_root: PathBuf,
        /// JSON file with name -> {rate, source, tag} override entries.
        #[arg(long)]
        overrides: Option<PathBuf>,
        #[arg(long)]
        header_rows: Option<usize>,
        #[arg(long)]
        name_column: Option<usize>,
        #[arg(long)]
        preferred_rate_column: Option<usize>,
        #[arg(long)]
        fallback_rate_column: Option<usize>,
    },
    /// Resolve one free-text institution name against a published snapshot.
    Resolve {
        #[arg(long)]
        root: PathBuf,
        name: String,
        /// JSON file with abbreviation -> canonical name pairs; defaults to
        /// the built-in alias table.
        #[arg(long)]
        aliases: Option<PathBuf>,
    },
    /// Verify manifest, checksum, and dataset invariants.
    Validate {
        #[arg(long)]
        root: PathBuf,
    },
    /// Print stats and a sample of records.
    Inspect {
        #[arg(long)]
        root: PathBuf,
        #[arg(long, default_value_t = 5)]
        sample: usize,
    },
}

fn main() -> ProcessExitCode {
    match run() {
        Ok(code) => ProcessExitCode::from(code as u8),
        Err(err) => {
            eprintln!("{err}");
            ProcessExitCode::from(ExitCode::Internal as u8)
        }
    }
}

fn run() -> Result<ExitCode, String> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Build {
            rate_table,
            roster,
            output_root,
            overrides,
            header_rows,
            name_column,
            preferred_rate_column,
            fallback_rate_column,
        } => {
            let mut options = IngestOptions::new(rate_table, roster, output_root);
            if let Some(path) = overrides {
                options.overrides = load_overrides(&path)?;
            }
            if let Some(n) = header_rows {
                options.schema.header_rows = n;
            }
            if let Some(n) = name_column {
                options.schema.name_column = n;
            }
            if let Some(n) = preferred_rate_column {
                options.schema.preferred_rate_column = n;
            }
            if let Some(n) = fallback_rate_column {
                options.schema.fallback_rate_column = n;
            }
            run_build(&options, cli.json)
        }
        Commands::Resolve {
            root,
            name,
            aliases,
        } => run_resolve(root, &name, aliases, cli.json),
        Commands::Validate { root } => run_validate(root),
        Commands::Inspect { root, sample } => run_inspect(root, sample, cli.json),
    }
}

fn load_overrides(path: &PathBuf) -> Result<OverrideTable, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("failed to read overrides {}: {e}", path.display()))?;
    let table: OverrideTable = serde_json::from_str(&raw)
        .map_err(|e| format!("failed to decode overrides {}: {e}", path.display()))?;
    table.validate().map_err(|e| e.to_string())?;
    Ok(table)
}

fn load_aliases(path: Option<PathBuf>) -> Result<AliasIndex, String> {
    let Some(path) = path else {
        return Ok(AliasIndex::builtin());
    };
    let raw = fs::read_to_string(&path)
        .map_err(|e| format!("failed to read aliases {}: {e}", path.display()))?;
    let aliases: AliasIndex = serde_json::from_str(&raw)
        .map_err(|e| format!("failed to decode aliases {}: {e}", path.display()))?;
    aliases.validate().map_err(|e| e.to_string())?;
    Ok(aliases)
}

fn run_build(options: &IngestOptions, machine_json: bool) -> Result<ExitCode, String> {
    let result = run_ingest(options).map_err(|e| e.to_string())?;

    if machine_json {
        let payload = json!({
            "dataset": result.dataset_path,
            "manifest": result.manifest_path,
            "stats": result.manifest.stats,
            "sources": result.manifest.sources,
            "events": result.events,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).map_err(|e| e.to_string())?
        );
        return Ok(ExitCode::Success);
    }

    for event in &result.events {
        if event.name.ends_with("_missing") {
            eprintln!("warning: {} ({:?})", event.name, event.fields);
        }
    }
    println!("dataset: {}", result.dataset_path.display());
    println!("manifest: {}", result.manifest_path.display());
    let stats = result.manifest.stats;
    println!(
        "records={} with_rate={} qualified={} overrides={}",
        stats.record_count, stats.with_rate_count, stats.qualified_count, stats.override_count
    );
    Ok(ExitCode::Success)
}

fn run_resolve(
    root: PathBuf,
    name: &str,
    aliases: Option<PathBuf>,
    machine_json: bool,
) -> Result<ExitCode, String> {
    let layout = artifact_layout(&root);
    let dataset = load_verified(&layout).map_err(|e| e.to_string())?;
    let resolver =
        Resolver::new(dataset, load_aliases(aliases)?).map_err(|e| e.to_string())?;

    match resolver.resolve(name) {
        ResolveOutcome::Exact(record) => {
            print_record(record, "exact", record.name.as_str(), machine_json)?;
            Ok(ExitCode::Success)
        }
        ResolveOutcome::Alias { canonical, record } => {
            print_record(record, "alias", canonical, machine_json)?;
            Ok(ExitCode::Success)
        }
        ResolveOutcome::NotFound => {
            if machine_json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "matched": "none",
                        "name": name,
                    }))
                    .map_err(|e| e.to_string())?
                );
            } else {
                println!("no verified data for {name:?}; refusing to guess");
            }
            Ok(ExitCode::NotFound)
        }
    }
}

fn print_record(
    record: &InstitutionRecord,
    matched: &str,
    canonical: &str,
    machine_json: bool,
) -> Result<(), String> {
    if machine_json {
        let payload = json!({
            "matched": matched,
            "canonical": canonical,
            "record": record,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).map_err(|e| e.to_string())?
        );
        return Ok(());
    }
    println!("name: {}", record.name);
    match &record.rate {
        Some(rate) => println!("rate: {rate}"),
        None => println!("rate: (no verified figure)"),
    }
    if let Some(source) = &record.rate_source {
        println!("source: {source}");
    }
    println!("official_override: {}", record.official_override);
    let tags: Vec<&str> = record.tags.iter().map(String::as_str).collect();
    println!("tags: {}", tags.join(", "));
    if matched == "alias" {
        println!("matched via alias -> {canonical}");
    }
    Ok(())
}

fn run_validate(root: PathBuf) -> Result<ExitCode, String> {
    let layout = artifact_layout(&root);

    let manifest_raw =
        fs::read_to_string(&layout.manifest).map_err(|e| e.to_string())?;
    let manifest: DatasetManifest =
        serde_json::from_str(&manifest_raw).map_err(|e| e.to_string())?;
    manifest.validate_strict().map_err(|e| e.to_string())?;

    let dataset_bytes = fs::read(&layout.dataset).map_err(|e| e.to_string())?;
    let actual = sha256_hex(&dataset_bytes);
    if actual != manifest.checksums.dataset_sha256 {
        return Err(format!(
            "checksum mismatch for {}: expected {}, got {}",
            layout.dataset.display(),
            manifest.checksums.dataset_sha256,
            actual
        ));
    }

    let dataset = load_dataset(&layout.dataset).map_err(|e| e.to_string())?;
    if dataset.len() as u64 != manifest.stats.record_count {
        return Err(format!(
            "record count mismatch: manifest says {}, dataset has {}",
            manifest.stats.record_count,
            dataset.len()
        ));
    }

    println!("dataset validation: OK");
    Ok(ExitCode::Success)
}

fn run_inspect(root: PathBuf, sample: usize, machine_json: bool) -> Result<ExitCode, String> {
    let layout = artifact_layout(&root);
    let dataset = load_dataset(&layout.dataset).map_err(|e| e.to_string())?;

    if machine_json {
        let payload = json!({
            "record_count": dataset.len(),
            "sample": &dataset.records[..sample.min(dataset.len())],
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).map_err(|e| e.to_string())?
        );
        return Ok(ExitCode::Success);
    }

    println!("record_count={}", dataset.len());
    for record in dataset.records.iter().take(sample) {
        println!(
            "{}\trate={}\toverride={}\ttags={}",
            record.name,
            record.rate.as_deref().unwrap_or("-"),
            record.official_override,
            record
                .tags
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(",")
        );
    }
    Ok(ExitCode::Success)
}
