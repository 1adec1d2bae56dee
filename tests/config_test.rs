//! Tests for config loading

use serial_test::serial;
use std::path::Path;
use tempfile::TempDir;

use revharvest::config::{Config, UnparsedDate};

#[test]
fn test_config_file_exists() {
    let config_path = Path::new("config.toml");
    assert!(
        config_path.exists(),
        "config.toml should exist in project root"
    );
}

#[test]
fn test_sample_config_loads_and_validates() {
    let config = Config::from_file(Path::new("config.toml")).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.scraper.max_steps, 40);
    assert_eq!(config.output.unparsed_date, UnparsedDate::Raw);
}

#[test]
fn test_invalid_toml_reports_path() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.toml");
    std::fs::write(&path, "[scraper\nmax_steps = ").unwrap();

    let err = Config::from_file(&path).unwrap_err();
    assert!(err.to_string().contains("broken.toml"));
}

#[test]
#[serial]
fn test_from_env_overrides() {
    std::env::set_var("REVHARVEST_MAX_STEPS", "12");
    std::env::set_var("REVHARVEST_KEEP_UNPARSEABLE", "false");
    std::env::set_var("REVHARVEST_UNPARSED_DATE", "null");

    let config = Config::from_env().unwrap();

    std::env::remove_var("REVHARVEST_MAX_STEPS");
    std::env::remove_var("REVHARVEST_KEEP_UNPARSEABLE");
    std::env::remove_var("REVHARVEST_UNPARSED_DATE");

    assert_eq!(config.scraper.max_steps, 12);
    assert!(!config.scraper.keep_unparseable);
    assert_eq!(config.output.unparsed_date, UnparsedDate::Null);
}

#[test]
#[serial]
fn test_from_env_ignores_malformed_values() {
    std::env::set_var("REVHARVEST_SETTLE_MS", "soon");

    let config = Config::from_env().unwrap();

    std::env::remove_var("REVHARVEST_SETTLE_MS");

    assert_eq!(config.scraper.settle_ms, 800);
    assert!(config.validate().is_ok());
}
