//! Dataset configuration loading and connection-string resolution
//!
//! One TOML file describes one dataset: which source columns hold the
//! natural keys, the constant measurement fields written into `metadata`,
//! how wavelength columns are identified, and where the rows are stored.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable consulted for the connection string
pub const DATABASE_URL_ENV: &str = "PLUMAGE_DATABASE_URL";

/// Compiled fallback connection string
pub const DEFAULT_DATABASE_URL: &str = "sqlite://plumage.db";

/// Complete per-dataset configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub dataset: DatasetInfo,
    #[serde(default)]
    pub columns: ColumnConfig,
    pub measurement: MeasurementConfig,
    #[serde(default)]
    pub wavelengths: WavelengthRule,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[dataset]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetInfo {
    /// Short name used in logs and the load report
    pub name: String,
    /// Literal family written for every taxon (exclusive with `columns.family`)
    pub family: Option<String>,
    /// Default input file; the command line overrides it
    pub source: Option<PathBuf>,
}

/// `[columns]` section: source column names, matched after lower-casing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub catalog_number: String,
    pub sex: String,
    pub genus: String,
    pub species: String,
    pub patch: String,
    /// Source column holding the family (exclusive with `dataset.family`)
    pub family: Option<String>,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            catalog_number: "catalog number".to_string(),
            sex: "sex".to_string(),
            genus: "genus".to_string(),
            species: "species".to_string(),
            patch: "region".to_string(),
            family: None,
        }
    }
}

/// `[measurement]` section: constants copied into every metadata row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementConfig {
    pub spectrophotometer: String,
    pub observer: String,
    #[serde(default)]
    pub inc_angle: f64,
    #[serde(default)]
    pub obs_angle: f64,
    /// Also copy each record's sex into `metadata.sex`
    #[serde(default)]
    pub include_sex: bool,
}

/// How wavelength columns are picked out of the header
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum WavelengthRule {
    /// Every numeric column whose name contains a digit.
    ///
    /// Names such as `ratio2` are also selected; keep header names clean
    /// or switch to `Explicit`.
    #[default]
    ContainsDigit,
    /// Only the listed columns; each must exist and hold numbers only
    Explicit { columns: Vec<String> },
}

/// What to do when a target table is already present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExistingTablePolicy {
    /// Abort before anything is written
    #[default]
    Fail,
    /// Drop the existing tables and load from scratch
    Replace,
}

/// `[database]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub on_existing: ExistingTablePolicy,
    /// Keep sqlx statement logging on
    pub echo: bool,
}

/// `[logging]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Where the taxonomy family comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FamilySource {
    Literal(String),
    Column(String),
}

impl DatasetConfig {
    /// Read, normalize and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;

        Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse configuration text, lower-case column names, then validate
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: DatasetConfig =
            toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Headers are lower-cased on read, so configured names are too
    fn normalize(&mut self) {
        let columns = &mut self.columns;
        for name in [
            &mut columns.catalog_number,
            &mut columns.sex,
            &mut columns.genus,
            &mut columns.species,
            &mut columns.patch,
        ] {
            *name = name.to_lowercase();
        }
        if let Some(family) = columns.family.as_mut() {
            *family = family.to_lowercase();
        }
        if let WavelengthRule::Explicit { columns } = &mut self.wavelengths {
            for name in columns.iter_mut() {
                *name = name.to_lowercase();
            }
        }
    }

    /// Check cross-field constraints serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.dataset.name.trim().is_empty() {
            return Err(Error::Config("dataset.name must not be empty".to_string()));
        }

        self.family_source()?;

        let columns = &self.columns;
        for (key, name) in [
            ("catalog_number", &columns.catalog_number),
            ("sex", &columns.sex),
            ("genus", &columns.genus),
            ("species", &columns.species),
            ("patch", &columns.patch),
        ] {
            if name.trim().is_empty() {
                return Err(Error::Config(format!("columns.{} must not be empty", key)));
            }
        }

        if let WavelengthRule::Explicit { columns } = &self.wavelengths {
            if columns.is_empty() {
                return Err(Error::Config(
                    "wavelengths.columns must list at least one column".to_string(),
                ));
            }
            let mut seen = HashSet::new();
            for name in columns {
                if !seen.insert(name.as_str()) {
                    return Err(Error::Config(format!(
                        "wavelengths.columns lists '{}' more than once",
                        name
                    )));
                }
            }
        }

        debug!("Dataset configuration '{}' validated", self.dataset.name);
        Ok(())
    }

    /// Family comes from exactly one of `dataset.family` or `columns.family`
    pub fn family_source(&self) -> Result<FamilySource> {
        match (&self.dataset.family, &self.columns.family) {
            (Some(literal), None) => Ok(FamilySource::Literal(literal.clone())),
            (None, Some(column)) => Ok(FamilySource::Column(column.clone())),
            (Some(_), Some(_)) => Err(Error::Config(
                "set either dataset.family or columns.family, not both".to_string(),
            )),
            (None, None) => Err(Error::Config(
                "no family configured: set dataset.family or columns.family".to_string(),
            )),
        }
    }
}

/// Connection string resolution, highest priority first:
/// 1. Command-line argument
/// 2. Environment variable
/// 3. `[database] url` from the dataset TOML
/// 4. Compiled default
pub fn resolve_database_url(
    cli_arg: Option<&str>,
    env_var_name: &str,
    config: &DatabaseConfig,
) -> String {
    if let Some(url) = cli_arg {
        return url.to_string();
    }

    if let Ok(url) = std::env::var(env_var_name) {
        if !url.trim().is_empty() {
            return url;
        }
    }

    if let Some(url) = &config.url {
        return url.clone();
    }

    DEFAULT_DATABASE_URL.to_string()
}

/// Input file: command line first, then `dataset.source`
pub fn resolve_input_path(cli_arg: Option<&Path>, dataset: &DatasetInfo) -> Result<PathBuf> {
    if let Some(path) = cli_arg {
        return Ok(path.to_path_buf());
    }

    dataset.source.clone().ok_or_else(|| {
        Error::Config(format!(
            "no input file for dataset '{}': pass --input or set dataset.source",
            dataset.name
        ))
    })
}
