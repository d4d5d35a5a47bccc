//! Database connection setup
//!
//! The loader holds exactly one connection: every stage runs in sequence,
//! so a larger pool would only add lock contention on the SQLite file.

use crate::{Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{ConnectOptions, SqlitePool};
use std::str::FromStr;
use tracing::info;

/// Open the database named by `url`, creating the file if needed
///
/// Foreign keys are enforced on the connection. With `echo` off, sqlx's
/// per-statement logging is disabled.
pub async fn connect(url: &str, echo: bool) -> Result<SqlitePool> {
    if !url.starts_with("sqlite:") {
        return Err(Error::Config(format!(
            "unsupported connection string '{}': expected sqlite://<path> or sqlite::memory:",
            url
        )));
    }

    let mut options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);
    if !echo {
        options = options.disable_statement_logging();
    }

    let db_path = options.get_filename().to_path_buf();
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    Ok(pool)
}
