//! abus-ingest - Load ABUS scores into the database
//!
//! - `seed <file.json>`: bulk-load a `model -> categories` document
//! - `paper <model> <text-file>`: keyword-score evidence text and upsert it
//! - `check`: show which database is in use and its row counts

use abus_common::config::AbusConfig;
use abus_common::db::{init_database, store};
use abus_common::evidence::KeywordScorer;
use abus_common::ingest::{ingest_text, score_text, seed, Weights};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "abus-ingest", version, about = "Load ABUS scores into the database")]
struct Cli {
    /// SQLite database URL (e.g. sqlite://abus.db)
    #[arg(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Seed the database from a JSON document mapping model -> categories
    Seed {
        file: PathBuf,
    },
    /// Score a text file with the keyword rubric and upsert the result
    Paper {
        model: String,
        text_file: PathBuf,
        /// Category weight, repeatable (e.g. --weight usability=40)
        #[arg(long = "weight", value_parser = parse_weight)]
        weights: Vec<(String, f64)>,
        /// Print the payload without writing it
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the database URL and table row counts
    Check,
}

/// Parse `category=weight`
fn parse_weight(raw: &str) -> std::result::Result<(String, f64), String> {
    let (category, weight) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected category=weight, got '{}'", raw))?;
    let category = category.trim();
    if category.is_empty() {
        return Err(format!("missing category in '{}'", raw));
    }
    let weight = weight
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid weight in '{}': {}", raw, e))?;
    Ok((category.to_string(), weight))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AbusConfig::resolve(cli.database_url, None);

    let pool = init_database(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;

    match cli.command {
        Command::Seed { file } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let document: serde_json::Value = serde_json::from_str(&content)
                .with_context(|| format!("Invalid JSON file: {}", file.display()))?;

            info!("Seeding from {}", file.display());
            let report = seed(&pool, &document).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Paper {
            model,
            text_file,
            weights,
            dry_run,
        } => {
            let text = std::fs::read_to_string(&text_file)
                .with_context(|| format!("Failed to read {}", text_file.display()))?;
            let weights: Weights = weights.into_iter().collect();
            let scorer = KeywordScorer::default();

            let payload = if dry_run {
                score_text(&pool, &model, &text, Some(&weights), &scorer).await?
            } else {
                ingest_text(&pool, &model, &text, Some(&weights), &scorer).await?
            };
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        Command::Check => {
            let mut conn = pool.acquire().await?;
            let counts = store::count_rows(&mut conn).await?;
            println!("DATABASE_URL = {}", config.database_url);
            println!("{}", serde_json::to_string_pretty(&counts)?);
        }
    }

    pool.close().await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_weight() {
        assert_eq!(parse_weight("usability=40"), Ok(("usability".to_string(), 40.0)));
        assert_eq!(parse_weight(" a = 0.5 "), Ok(("a".to_string(), 0.5)));
        assert!(parse_weight("usability").is_err());
        assert!(parse_weight("=3").is_err());
        assert!(parse_weight("a=heavy").is_err());
    }

    #[test]
    fn test_cli_parses_paper_command() {
        let cli = Cli::try_parse_from([
            "abus-ingest",
            "paper",
            "MULAN",
            "paper.txt",
            "--weight",
            "usability=40",
            "--weight",
            "adaptability=60",
            "--dry-run",
        ])
        .unwrap();

        match cli.command {
            Command::Paper {
                model,
                weights,
                dry_run,
                ..
            } => {
                assert_eq!(model, "MULAN");
                assert_eq!(weights.len(), 2);
                assert!(dry_run);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_verifies() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
