//! Computed score endpoint

use abus_common::aggregate::{compute_scores, ModelScores};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::{ApiResult, AppState};

/// GET /api/score/:name
///
/// Per-category averages and the overall ABUS score; 404 for unknown models.
pub async fn get_score(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<ModelScores>> {
    Ok(Json(compute_scores(&state.db, &name).await?))
}

/// Build score routes
pub fn score_routes() -> Router<AppState> {
    Router::new().route("/api/score/:name", get(get_score))
}
