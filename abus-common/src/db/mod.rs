//! Database schema, row models and store primitives

pub mod init;
pub mod models;
pub mod store;

pub use init::*;
pub use models::*;
