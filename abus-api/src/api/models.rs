//! Model endpoints: listing, score views and upsert

use abus_common::document::{get_full, get_scores, ScoreTable, ScoringDocument};
use abus_common::reconcile::{list_models, upsert_json};
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::{ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct ModelListResponse {
    pub models: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct UpsertResponse {
    pub ok: bool,
    pub name: String,
}

/// GET /api/models
///
/// Sorted model names.
pub async fn get_models(State(state): State<AppState>) -> ApiResult<Json<ModelListResponse>> {
    let models = list_models(&state.db).await?;
    Ok(Json(ModelListResponse { models }))
}

/// GET /api/models/:name
///
/// `{category: {subfeature: score}}`; 404 for unknown models.
pub async fn get_model(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<ScoreTable>> {
    Ok(Json(get_scores(&state.db, &name).await?))
}

/// GET /api/models/:name/full
///
/// Full scoring document with weights and notes; 404 for unknown models.
pub async fn get_model_full(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<ScoringDocument>> {
    Ok(Json(get_full(&state.db, &name).await?))
}

/// POST /api/models/upsert
///
/// **Request:** `{"name": "...", "categories": {...}}`
/// **Response:** `{"ok": true, "name": "..."}`
///
/// **Errors:**
/// - 400 Bad Request: malformed payload (nothing is written)
pub async fn post_upsert(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> ApiResult<Json<UpsertResponse>> {
    let name = upsert_json(&state.db, &payload).await?;

    info!("Upserted model '{}' via API", name);

    Ok(Json(UpsertResponse { ok: true, name }))
}

/// Build model routes
pub fn model_routes() -> Router<AppState> {
    Router::new()
        .route("/api/models", get(get_models))
        .route("/api/models/upsert", post(post_upsert))
        .route("/api/models/:name", get(get_model))
        .route("/api/models/:name/full", get(get_model_full))
}
