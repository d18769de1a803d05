//! HTTP API handlers for abus-api

pub mod health;
pub mod ingest;
pub mod models;
pub mod recommend;
pub mod score;

pub use health::health_routes;
pub use ingest::ingest_routes;
pub use models::model_routes;
pub use recommend::recommend_routes;
pub use score::score_routes;
