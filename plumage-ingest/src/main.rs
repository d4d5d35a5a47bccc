//! plumage-ingest - Main entry point
//!
//! Loads one plumage reflectance CSV into the five-table SQLite schema
//! described by a dataset TOML.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use plumage_common::config::{resolve_database_url, resolve_input_path, DatasetConfig, DATABASE_URL_ENV};
use plumage_ingest::{run, RunOptions};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for plumage-ingest
#[derive(Parser, Debug)]
#[command(name = "plumage-ingest")]
#[command(about = "Load plumage reflectance spectra into a normalized SQLite database")]
#[command(version)]
struct Args {
    /// Dataset TOML
    #[arg(short, long)]
    config: PathBuf,

    /// Input CSV (overrides dataset.source)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Connection string (overrides PLUMAGE_DATABASE_URL and the TOML)
    #[arg(long)]
    database_url: Option<String>,

    /// Drop and recreate tables left by an earlier run
    #[arg(long)]
    replace: bool,

    /// Derive the tables and report counts without opening the database
    #[arg(long)]
    dry_run: bool,

    /// Print the load report as JSON on stdout
    #[arg(long)]
    json: bool,
}

/// Filter used when RUST_LOG is unset
fn default_filter(config: &DatasetConfig) -> String {
    let level = &config.logging.level;
    let sqlx_level = if config.database.echo { "debug" } else { "warn" };
    format!("plumage_ingest={level},plumage_common={level},sqlx={sqlx_level}")
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = DatasetConfig::load(&args.config)
        .with_context(|| format!("Failed to load dataset config {}", args.config.display()))?;

    // Initialize tracing; the config decides the default levels
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(&config).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(
        "Loaded dataset configuration '{}' from {}",
        config.dataset.name,
        args.config.display()
    );

    let input = resolve_input_path(args.input.as_deref(), &config.dataset)?;
    let database_url =
        resolve_database_url(args.database_url.as_deref(), DATABASE_URL_ENV, &config.database);

    info!("Input: {}", input.display());
    if !args.dry_run {
        info!("Database: {}", database_url);
    }

    let options = RunOptions {
        input,
        database_url,
        replace: args.replace,
        dry_run: args.dry_run,
    };

    let report = run(&config, &options)
        .await
        .with_context(|| format!("Failed to load dataset '{}'", config.dataset.name))?;

    for table in &report.tables {
        info!("{}: {} rows", table.table, table.rows);
    }

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize load report")?;
        println!("{}", json);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
        [dataset]
        name = "icteridae"
        family = "Icteridae"

        [measurement]
        spectrophotometer = "Avantes"
        observer = "M. Eaton"
    "#;

    #[test]
    fn test_default_filter_uses_configured_level() {
        let mut config = DatasetConfig::from_toml_str(CONFIG).unwrap();
        assert_eq!(
            default_filter(&config),
            "plumage_ingest=info,plumage_common=info,sqlx=warn"
        );

        config.logging.level = "debug".to_string();
        config.database.echo = true;
        assert_eq!(
            default_filter(&config),
            "plumage_ingest=debug,plumage_common=debug,sqlx=debug"
        );
    }

    #[test]
    fn test_default_filter_parses() {
        let config = DatasetConfig::from_toml_str(CONFIG).unwrap();
        assert!(tracing_subscriber::EnvFilter::try_new(default_filter(&config)).is_ok());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "plumage-ingest",
            "--config",
            "datasets/icteridae.toml",
            "--replace",
            "--json",
        ])
        .unwrap();
        assert_eq!(args.config, PathBuf::from("datasets/icteridae.toml"));
        assert!(args.replace && args.json && !args.dry_run);
        assert!(args.input.is_none());
    }
}
