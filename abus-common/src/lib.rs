//! # ABUS Common Library
//!
//! Scoring core shared by the ABUS API server and the ingestion CLI:
//! - Database schema and store primitives
//! - Schema registry (known categories and subfeatures)
//! - Scoring documents and score aggregation
//! - Upsert reconciliation of scoring payloads
//! - Pluggable evidence scoring and the ingestion pipeline
//! - Model recommendation

pub mod aggregate;
pub mod calculator;
pub mod config;
pub mod db;
pub mod document;
pub mod error;
pub mod evidence;
pub mod ingest;
pub mod payload;
pub mod recommend;
pub mod reconcile;
pub mod schema;

pub use aggregate::{compute_scores, CategoryScore, ModelScores};
pub use document::{get_full, get_scores, ScoringDocument};
pub use error::{Error, Result};
pub use evidence::{EvidenceScorer, KeywordScorer};
pub use payload::{Payload, SubfeatureValue};
pub use reconcile::{list_models, upsert};
pub use schema::{get_schema, Schema};
