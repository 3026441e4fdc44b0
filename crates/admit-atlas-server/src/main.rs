#![forbid(unsafe_code)]

use admit_atlas_model::{artifact_layout, AliasIndex};
use admit_atlas_resolve::{load_verified, Resolver};
use admit_atlas_server::{build_router, AppState};
use std::env;
use std::fs;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if env_bool("ADMIT_LOG_JSON", true) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("register SIGTERM");
        let mut sigint = signal(SignalKind::interrupt()).expect("register SIGINT");
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn load_aliases() -> Result<AliasIndex, String> {
    match env::var("ADMIT_ALIASES") {
        Ok(path) => {
            let raw = fs::read_to_string(&path)
                .map_err(|e| format!("failed to read aliases {path}: {e}"))?;
            let aliases: AliasIndex = serde_json::from_str(&raw)
                .map_err(|e| format!("failed to decode aliases {path}: {e}"))?;
            aliases.validate().map_err(|e| e.to_string())?;
            Ok(aliases)
        }
        Err(_) => Ok(AliasIndex::builtin()),
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_tracing();

    let bind_addr = env::var("ADMIT_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let data_root = PathBuf::from(
        env::var("ADMIT_DATA_ROOT").unwrap_or_else(|_| "artifacts/dataset".to_string()),
    );

    let layout = artifact_layout(&data_root);
    let dataset = load_verified(&layout).map_err(|e| e.to_string())?;
    let resolver = Resolver::new(dataset, load_aliases()?).map_err(|e| e.to_string())?;
    info!(
        records = resolver.len(),
        root = %data_root.display(),
        "snapshot loaded"
    );

    let app = build_router(AppState::new(resolver));
    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| format!("bind failed for {bind_addr}: {e}"))?;
    info!("admit-atlas-server listening on {bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .map_err(|e| format!("server failed: {e}"))
}
