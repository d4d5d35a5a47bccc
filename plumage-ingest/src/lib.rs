//! plumage-ingest library - wide CSV to normalized tables
//!
//! Stages, in order:
//! 1. [`records`]: read the CSV into an in-memory record set
//! 2. [`wavelengths`]: decide which columns hold reflectance values
//! 3. [`factorize`] / [`projector`]: assign surrogate keys and project the
//!    taxonomy, birds, patches and metadata tables
//! 4. [`reshape`]: turn wavelength columns into long-form readings
//! 5. [`pipeline`]: run the stages and hand the tables to the sink

pub mod error;
pub mod factorize;
pub mod pipeline;
pub mod projector;
pub mod records;
pub mod reshape;
pub mod wavelengths;

pub use error::{IngestError, Result};
pub use pipeline::{derive, load, run, DerivedTables, LoadReport, RunOptions, TableReport};
pub use records::RecordSet;
