//! Configuration loading and setting resolution

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Database used when nothing else is configured
pub const DEFAULT_DATABASE_URL: &str = "sqlite://abus.db";

/// Listen address used when nothing else is configured
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub database_url: Option<String>,
    pub bind: Option<String>,
}

/// Fully resolved runtime settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbusConfig {
    pub database_url: String,
    pub bind: String,
}

impl AbusConfig {
    /// Resolve settings in priority order:
    /// 1. Command-line argument or environment variable (both arrive through clap)
    /// 2. TOML config file
    /// 3. Compiled default
    pub fn resolve(database_url: Option<String>, bind: Option<String>) -> Self {
        let file = match load_config_file() {
            Ok(path) => match read_file_config(&path) {
                Ok(cfg) => {
                    tracing::debug!("Loaded config file: {}", path.display());
                    cfg
                }
                Err(e) => {
                    tracing::warn!("Ignoring unreadable config file {}: {}", path.display(), e);
                    FileConfig::default()
                }
            },
            Err(_) => FileConfig::default(),
        };

        Self::resolve_with(database_url, bind, &file)
    }

    /// Same as [`AbusConfig::resolve`] with an already-loaded file config
    pub fn resolve_with(
        database_url: Option<String>,
        bind: Option<String>,
        file: &FileConfig,
    ) -> Self {
        Self {
            database_url: database_url
                .or_else(|| file.database_url.clone())
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            bind: bind
                .or_else(|| file.bind.clone())
                .unwrap_or_else(|| DEFAULT_BIND.to_string()),
        }
    }
}

/// Parse a TOML config file
pub fn read_file_config(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
}

/// Locate the config file for the platform
fn load_config_file() -> Result<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("abus").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Ok(path);
        }
    }

    if cfg!(unix) {
        let system_config = PathBuf::from("/etc/abus/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
    }

    Err(Error::Config("No config file found".to_string()))
}
