//! abus-api - HTTP server for ABUS model scores
//!
//! Settings resolve CLI flag > environment > config.toml > default.

use abus_api::{build_router, AppState};
use abus_common::config::AbusConfig;
use abus_common::db::init_database;
use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "abus-api", version, about = "HTTP API for ABUS model scores")]
struct Args {
    /// SQLite database URL (e.g. sqlite://abus.db)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Address to listen on
    #[arg(long, env = "ABUS_BIND")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting ABUS API (abus-api) v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let config = AbusConfig::resolve(args.database_url, args.bind);

    let pool = match init_database(&config.database_url).await {
        Ok(pool) => {
            info!("✓ Database ready: {}", config.database_url);
            pool
        }
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e).context("Failed to open database");
        }
    };

    let state = AppState::new(pool);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!("abus-api listening on http://{}", config.bind);
    info!("Health check: http://{}/health", config.bind);

    axum::serve(listener, app).await?;

    Ok(())
}
