//! Integration tests for dataset configuration loading and
//! connection-string resolution
//!
//! Tests that manipulate PLUMAGE_DATABASE_URL are marked #[serial] so they
//! never run in parallel with each other.

use plumage_common::config::{
    resolve_database_url, DatabaseConfig, DatasetConfig, ExistingTablePolicy, WavelengthRule,
    DATABASE_URL_ENV, DEFAULT_DATABASE_URL,
};
use plumage_common::Error;
use serial_test::serial;
use std::env;
use tempfile::TempDir;

const ICTERIDAE: &str = r#"
[dataset]
name = "icteridae"
family = "Icteridae"
source = "data/bbdataconverted.csv"

[columns]
catalog_number = "Catalog Number"
patch = "Region"

[measurement]
spectrophotometer = "Avantes"
observer = "M. Eaton"
inc_angle = 0
obs_angle = 0

[database]
url = "sqlite://color.db"
on_existing = "fail"
"#;

#[test]
fn test_load_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("icteridae.toml");
    std::fs::write(&path, ICTERIDAE).unwrap();

    let config = DatasetConfig::load(&path).unwrap();

    assert_eq!(config.dataset.name, "icteridae");
    assert_eq!(config.columns.catalog_number, "catalog number");
    assert_eq!(config.columns.patch, "region");
    assert_eq!(config.measurement.observer, "M. Eaton");
    assert_eq!(config.wavelengths, WavelengthRule::ContainsDigit);
    assert_eq!(config.database.on_existing, ExistingTablePolicy::Fail);
}

#[test]
fn test_load_missing_file_names_path() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("absent.toml");

    let err = DatasetConfig::load(&path).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(err.to_string().contains("absent.toml"), "{}", err);
}

#[test]
fn test_load_invalid_file_names_path() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.toml");
    std::fs::write(&path, "[dataset\nname = ").unwrap();

    let err = DatasetConfig::load(&path).unwrap_err();
    assert!(err.to_string().contains("broken.toml"), "{}", err);
}

#[test]
fn test_shipped_dataset_configs_parse() {
    let datasets = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("datasets");
    let mut parsed = 0;
    for entry in std::fs::read_dir(&datasets).unwrap() {
        let path = entry.unwrap().path();
        if path.extension().and_then(|e| e.to_str()) == Some("toml") {
            DatasetConfig::load(&path)
                .unwrap_or_else(|e| panic!("{} failed to load: {}", path.display(), e));
            parsed += 1;
        }
    }
    assert!(parsed >= 2, "expected at least two dataset configs, found {}", parsed);
}

#[test]
#[serial]
fn test_cli_argument_has_highest_priority() {
    env::set_var(DATABASE_URL_ENV, "sqlite://from-env.db");
    let config = DatabaseConfig {
        url: Some("sqlite://from-toml.db".to_string()),
        ..Default::default()
    };

    let url = resolve_database_url(Some("sqlite://from-cli.db"), DATABASE_URL_ENV, &config);
    assert_eq!(url, "sqlite://from-cli.db");

    env::remove_var(DATABASE_URL_ENV);
}

#[test]
#[serial]
fn test_env_var_beats_toml() {
    env::set_var(DATABASE_URL_ENV, "sqlite://from-env.db");
    let config = DatabaseConfig {
        url: Some("sqlite://from-toml.db".to_string()),
        ..Default::default()
    };

    let url = resolve_database_url(None, DATABASE_URL_ENV, &config);
    assert_eq!(url, "sqlite://from-env.db");

    env::remove_var(DATABASE_URL_ENV);
}

#[test]
#[serial]
fn test_toml_used_without_env_var() {
    env::remove_var(DATABASE_URL_ENV);
    let config = DatabaseConfig {
        url: Some("sqlite://from-toml.db".to_string()),
        ..Default::default()
    };

    let url = resolve_database_url(None, DATABASE_URL_ENV, &config);
    assert_eq!(url, "sqlite://from-toml.db");
}

#[test]
#[serial]
fn test_compiled_default_is_last_resort() {
    env::remove_var(DATABASE_URL_ENV);

    let url = resolve_database_url(None, DATABASE_URL_ENV, &DatabaseConfig::default());
    assert_eq!(url, DEFAULT_DATABASE_URL);
}

#[test]
#[serial]
fn test_blank_env_var_is_ignored() {
    env::set_var(DATABASE_URL_ENV, "  ");

    let url = resolve_database_url(None, DATABASE_URL_ENV, &DatabaseConfig::default());
    assert_eq!(url, DEFAULT_DATABASE_URL);

    env::remove_var(DATABASE_URL_ENV);
}
