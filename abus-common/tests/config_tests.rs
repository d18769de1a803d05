//! Tests for setting resolution and config file parsing

use abus_common::config::{
    read_file_config, AbusConfig, FileConfig, DEFAULT_BIND, DEFAULT_DATABASE_URL,
};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_defaults_when_nothing_configured() {
    let config = AbusConfig::resolve_with(None, None, &FileConfig::default());

    assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
    assert_eq!(config.bind, DEFAULT_BIND);
}

#[test]
fn test_file_overrides_default() {
    let file = FileConfig {
        database_url: Some("sqlite://from-file.db".to_string()),
        bind: None,
    };

    let config = AbusConfig::resolve_with(None, None, &file);

    assert_eq!(config.database_url, "sqlite://from-file.db");
    assert_eq!(config.bind, DEFAULT_BIND);
}

#[test]
fn test_explicit_value_overrides_file() {
    let file = FileConfig {
        database_url: Some("sqlite://from-file.db".to_string()),
        bind: Some("0.0.0.0:9000".to_string()),
    };

    let config = AbusConfig::resolve_with(
        Some("sqlite://cli.db".to_string()),
        Some("127.0.0.1:1234".to_string()),
        &file,
    );

    assert_eq!(config.database_url, "sqlite://cli.db");
    assert_eq!(config.bind, "127.0.0.1:1234");
}

#[test]
fn test_read_file_config() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "database_url = \"sqlite:///tmp/abus.db\"").unwrap();
    writeln!(file, "bind = \"0.0.0.0:8080\"").unwrap();

    let config = read_file_config(file.path()).unwrap();

    assert_eq!(config.database_url.as_deref(), Some("sqlite:///tmp/abus.db"));
    assert_eq!(config.bind.as_deref(), Some("0.0.0.0:8080"));
}

#[test]
fn test_read_malformed_file_is_config_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "database_url = [unterminated").unwrap();

    let err = read_file_config(file.path()).unwrap_err();

    assert!(matches!(err, abus_common::Error::Config(_)));
}
