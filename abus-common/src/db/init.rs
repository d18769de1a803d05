//! Database initialization
//!
//! Opens (or creates) the scoring database and creates the five scoring
//! tables if they are missing. Safe to run on every start-up.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Open the database at `database_url` and ensure the schema exists
pub async fn init_database(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        // WAL lets readers proceed while an upsert transaction is open
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await?;

    info!("Opened database: {}", database_url);

    create_tables(&pool).await?;

    Ok(pool)
}

/// Open a private in-memory database with the schema applied
///
/// Uses a single long-lived connection so the database survives for the
/// lifetime of the pool.
pub async fn init_in_memory() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    create_tables(&pool).await?;

    Ok(pool)
}

/// Create all scoring tables (idempotent)
pub async fn create_tables(pool: &SqlitePool) -> Result<()> {
    create_models_table(pool).await?;
    create_categories_table(pool).await?;
    create_subcategories_table(pool).await?;
    create_model_categories_table(pool).await?;
    create_scores_table(pool).await?;
    Ok(())
}

async fn create_models_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS models (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_categories_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_subcategories_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS subcategories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            category_id INTEGER NOT NULL REFERENCES categories(id),
            name TEXT NOT NULL,
            UNIQUE (category_id, name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_model_categories_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS model_categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            model_id INTEGER NOT NULL REFERENCES models(id),
            category_id INTEGER NOT NULL REFERENCES categories(id),
            weight REAL NOT NULL DEFAULT 0.0,
            UNIQUE (model_id, category_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_scores_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS scores (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            model_id INTEGER NOT NULL REFERENCES models(id),
            subcategory_id INTEGER NOT NULL REFERENCES subcategories(id),
            value REAL NOT NULL,
            note TEXT,
            UNIQUE (model_id, subcategory_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_scores_model ON scores(model_id)")
        .execute(pool)
        .await?;

    Ok(())
}
