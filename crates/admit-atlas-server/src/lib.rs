#![forbid(unsafe_code)]

use admit_atlas_model::InstitutionRecord;
use admit_atlas_resolve::{ResolveOutcome, Resolver};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

pub const CRATE_NAME: &str = "admit-atlas-server";

/// The snapshot is loaded once at startup and served immutably; replacing it
/// means restarting with a freshly built dataset.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<Resolver>,
}

impl AppState {
    #[must_use]
    pub fn new(resolver: Resolver) -> Self {
        Self {
            resolver: Arc::new(resolver),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz_handler))
        .route("/resolve", get(resolve_handler))
        .with_state(state)
}

async fn healthz_handler(State(state): State<AppState>) -> Response {
    Json(json!({
        "status": "ok",
        "records": state.resolver.len(),
    }))
    .into_response()
}

#[derive(Debug, Deserialize)]
struct ResolveParams {
    name: String,
}

async fn resolve_handler(
    State(state): State<AppState>,
    Query(params): Query<ResolveParams>,
) -> Response {
    match state.resolver.resolve(&params.name) {
        ResolveOutcome::Exact(record) => {
            record_response("exact", record.name.as_str(), record)
        }
        ResolveOutcome::Alias { canonical, record } => {
            record_response("alias", canonical, record)
        }
        ResolveOutcome::NotFound => {
            // The explicit no-verified-data signal; callers must not ask the
            // generative step to invent a figure instead.
            info!(name = %params.name, "unresolved institution name");
            (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "unknown_institution",
                    "name": params.name,
                })),
            )
                .into_response()
        }
    }
}

fn record_response(matched: &str, canonical: &str, record: &InstitutionRecord) -> Response {
    Json(json!({
        "matched": matched,
        "canonical": canonical,
        "record": record,
    }))
    .into_response()
}
