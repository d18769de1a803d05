//! Recommendation endpoint

use abus_common::recommend::{recommend, Query, Recommendation, DEFAULT_TOP_K};
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::{ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    /// `"category.subfeature"` -> `">= 1.5"`
    #[serde(default)]
    pub query: Query,
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub recommendations: Vec<Recommendation>,
}

/// POST /api/recommend
pub async fn post_recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> ApiResult<Json<RecommendResponse>> {
    let top_k = request.top_k.unwrap_or(DEFAULT_TOP_K);
    let recommendations = recommend(&state.db, &request.query, top_k).await?;
    Ok(Json(RecommendResponse { recommendations }))
}

/// Build recommendation routes
pub fn recommend_routes() -> Router<AppState> {
    Router::new().route("/api/recommend", post(post_recommend))
}
