//! Error types for plumage-ingest
//!
//! Input problems are reported with the CSV line and column they were
//! found in; storage problems come through [`plumage_common::Error`].

use thiserror::Error;

/// Result type for ingest operations
pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Debug, Error)]
pub enum IngestError {
    /// CSV could not be opened or parsed
    #[error("Failed to read {input}: {source}")]
    Csv {
        input: String,
        #[source]
        source: csv::Error,
    },

    /// A configured source column is absent from the header
    #[error("Missing required column '{column}'")]
    MissingColumn { column: String },

    /// Two headers are equal once lower-cased
    #[error("Duplicate column '{column}' after lower-casing headers")]
    DuplicateColumn { column: String },

    /// Non-numeric value where a reflectance is expected
    #[error("Malformed value {value:?} in column '{column}' at line {line}")]
    MalformedValue {
        line: u64,
        column: String,
        value: String,
    },

    /// Column selected as a wavelength has no digit run to parse
    #[error("Column '{column}' does not name a wavelength")]
    NotAWavelength { column: String },

    /// Two columns resolve to the same wavelength
    #[error("Wavelength {wavelength} nm appears in both '{first}' and '{second}'")]
    DuplicateWavelength {
        wavelength: i64,
        first: String,
        second: String,
    },

    #[error("No wavelength columns found in the input")]
    NoWavelengthColumns,

    /// Same natural key seen with two different attribute values
    #[error(
        "Conflicting {column} for {key_column} {key:?} at line {line}: first seen as {first:?}, now {found:?}"
    )]
    ConflictingKey {
        key_column: String,
        key: Option<String>,
        column: String,
        first: Option<String>,
        found: Option<String>,
        line: u64,
    },

    #[error(transparent)]
    Common(#[from] plumage_common::Error),
}
