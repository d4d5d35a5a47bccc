//! Input Record Set
//!
//! The whole CSV is read into memory. Headers are lower-cased on read and
//! every later lookup uses the lower-cased names.

use crate::error::{IngestError, Result};
use csv::{ReaderBuilder, StringRecord};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Cell values read as null
pub const MISSING_VALUE_TOKENS: [&str; 7] = ["", "NA", "N/A", "NaN", "nan", "null", "NULL"];

pub fn is_missing(value: &str) -> bool {
    MISSING_VALUE_TOKENS.contains(&value)
}

/// Ordered specimen rows with their lower-cased header
#[derive(Debug, Clone)]
pub struct RecordSet {
    columns: Vec<String>,
    rows: Vec<StringRecord>,
    /// Source line of each row, for error messages
    lines: Vec<u64>,
}

impl RecordSet {
    /// Read a CSV file with a header row
    pub fn from_path(path: &Path) -> Result<Self> {
        let input = path.display().to_string();
        let reader = ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(|source| IngestError::Csv {
                input: input.clone(),
                source,
            })?;
        let records = Self::read(reader, &input)?;
        info!(
            "Read {} records with {} columns from {}",
            records.len(),
            records.columns.len(),
            input
        );
        Ok(records)
    }

    /// Read CSV text from any reader; `input` names it in errors
    pub fn from_reader<R: Read>(reader: R, input: &str) -> Result<Self> {
        let reader = ReaderBuilder::new().has_headers(true).from_reader(reader);
        Self::read(reader, input)
    }

    fn read<R: Read>(mut reader: csv::Reader<R>, input: &str) -> Result<Self> {
        let csv_error = |source: csv::Error| IngestError::Csv {
            input: input.to_string(),
            source,
        };

        let columns: Vec<String> = reader
            .headers()
            .map_err(csv_error)?
            .iter()
            .map(|h| h.to_lowercase())
            .collect();

        for (i, name) in columns.iter().enumerate() {
            if columns[..i].contains(name) {
                return Err(IngestError::DuplicateColumn {
                    column: name.clone(),
                });
            }
        }

        let mut rows = Vec::new();
        let mut lines = Vec::new();
        for record in reader.records() {
            let record = record.map_err(csv_error)?;
            lines.push(record.position().map(|p| p.line()).unwrap_or(0));
            rows.push(record);
        }

        debug!("{}: header {:?}", input, columns);
        Ok(Self {
            columns,
            rows,
            lines,
        })
    }

    /// Lower-cased column names in file order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of `name` (already lower-cased) in the header
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| IngestError::MissingColumn {
                column: name.to_string(),
            })
    }

    /// Raw cell text
    pub fn raw(&self, row: usize, column: usize) -> &str {
        self.rows[row].get(column).unwrap_or("")
    }

    /// Cell text, `None` for missing-value tokens
    pub fn text(&self, row: usize, column: usize) -> Option<&str> {
        let value = self.raw(row, column);
        if is_missing(value) {
            None
        } else {
            Some(value)
        }
    }

    /// Cell as a number, `None` for missing-value tokens
    pub fn number(&self, row: usize, column: usize) -> Result<Option<f64>> {
        match self.text(row, column) {
            None => Ok(None),
            Some(value) => value
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| IngestError::MalformedValue {
                    line: self.line(row),
                    column: self.columns[column].clone(),
                    value: value.to_string(),
                }),
        }
    }

    /// Source line of a row (header is line 1)
    pub fn line(&self, row: usize) -> u64 {
        self.lines[row]
    }
}
