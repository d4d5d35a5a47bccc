//! Common error types for the plumage loader

use thiserror::Error;

/// Common result type for plumage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the loader crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Target table is already present and the re-run policy is `fail`
    #[error("Table '{0}' already exists (set on_existing = \"replace\" or pass --replace to overwrite it)")]
    TableExists(String),

    /// Writing one table failed; earlier tables stay committed
    #[error("Failed to write table '{table}': {source}")]
    TableWrite {
        table: String,
        #[source]
        source: sqlx::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Table named by an error, if any; exhaustive so new variants are seen here
    fn table_of(error: &Error) -> Option<&str> {
        match error {
            Error::Database(_) | Error::Io(_) | Error::Config(_) => None,
            Error::TableExists(table) => Some(table.as_str()),
            Error::TableWrite { table, .. } => Some(table.as_str()),
        }
    }

    #[test]
    fn test_table_errors_name_the_table() {
        let exists = Error::TableExists("birds".to_string());
        assert_eq!(table_of(&exists), Some("birds"));
        assert!(exists.to_string().contains("--replace"));

        let write = Error::TableWrite {
            table: "spectra".to_string(),
            source: sqlx::Error::PoolClosed,
        };
        assert_eq!(table_of(&write), Some("spectra"));
        assert!(write.to_string().starts_with("Failed to write table 'spectra'"));
    }

    #[test]
    fn test_other_errors_carry_no_table() {
        assert_eq!(table_of(&Error::Config("bad".to_string())), None);
        assert_eq!(table_of(&Error::Database(sqlx::Error::PoolClosed)), None);
    }
}
