//! Schema and evidence ingestion endpoints

use abus_common::ingest::{ingest_text, score_text, Weights};
use abus_common::payload::Payload;
use abus_common::schema::{get_schema, Schema};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::{ApiError, ApiResult, AppState};

/// Request payload for evidence ingestion
#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    /// Model to score
    #[serde(default)]
    pub name: Option<String>,
    /// Evidence text (paper, README, ...)
    pub text: String,
    /// Optional per-category weights; unlisted categories get 0.0
    #[serde(default)]
    pub weights: Option<Weights>,
    /// Score without persisting
    #[serde(default)]
    pub dry_run: bool,
}

/// GET /api/schema
///
/// Known categories and their subfeatures.
pub async fn get_schema_handler(State(state): State<AppState>) -> ApiResult<Json<Schema>> {
    Ok(Json(get_schema(&state.db).await?))
}

/// POST /api/ingest
///
/// Scores `text` against the current schema with the configured evidence
/// scorer and upserts the resulting payload (unless `dry_run`).
/// Returns the payload.
pub async fn post_ingest(
    State(state): State<AppState>,
    Json(request): Json<IngestRequest>,
) -> ApiResult<Json<Payload>> {
    let name = request
        .name
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("name is required".to_string()))?;
    if name.trim().is_empty() {
        return Err(ApiError::BadRequest("name cannot be empty".to_string()));
    }

    let weights = request.weights.as_ref();
    let scorer = state.scorer.as_ref();
    let payload = if request.dry_run {
        score_text(&state.db, name, &request.text, weights, scorer).await?
    } else {
        ingest_text(&state.db, name, &request.text, weights, scorer).await?
    };

    Ok(Json(payload))
}

/// Build ingestion routes
pub fn ingest_routes() -> Router<AppState> {
    Router::new()
        .route("/api/schema", get(get_schema_handler))
        .route("/api/ingest", post(post_ingest))
}
