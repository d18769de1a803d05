//! Common error types for ABUS

use thiserror::Error;

/// Common result type for ABUS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types shared by the scoring core and its adapters
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested model does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed upsert payload; nothing was written
    #[error("Validation error: {0}")]
    Validation(String),

    /// A stored row violates a structural invariant (e.g. a score whose
    /// subfeature has no category)
    #[error("Schema inconsistency: {0}")]
    SchemaInconsistency(String),
}
