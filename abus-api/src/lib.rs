//! abus-api library - HTTP transport over the ABUS scoring core
//!
//! Handlers only translate requests into core calls and core errors into
//! status codes; all scoring logic lives in `abus-common`.

use abus_common::evidence::{EvidenceScorer, KeywordScorer};
use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;

pub use crate::error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Strategy used by the ingest endpoint
    pub scorer: Arc<dyn EvidenceScorer>,
}

impl AppState {
    /// Create state with the keyword evidence scorer
    pub fn new(db: SqlitePool) -> Self {
        Self::with_scorer(db, Arc::new(KeywordScorer::default()))
    }

    pub fn with_scorer(db: SqlitePool, scorer: Arc<dyn EvidenceScorer>) -> Self {
        Self { db, scorer }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::model_routes())
        .merge(api::score_routes())
        .merge(api::ingest_routes())
        .merge(api::recommend_routes())
        .merge(api::health_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
