//! Wavelength column resolution
//!
//! Decides, once per input, which columns carry reflectance values and
//! which wavelength each one stands for. The wavelength is the first run of
//! digits in the column name (`wl400` → 400).
//!
//! Under [`WavelengthRule::ContainsDigit`] any numeric column with a digit
//! anywhere in its name is selected, so a name like `ratio2` is read as
//! wavelength 2. [`WavelengthRule::Explicit`] avoids that by naming the
//! columns up front.

use crate::error::{IngestError, Result};
use crate::records::RecordSet;
use plumage_common::config::WavelengthRule;
use std::collections::HashMap;
use tracing::{info, warn};

/// One reflectance column of the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavelengthColumn {
    /// Position in the record set header
    pub index: usize,
    /// Lower-cased column name
    pub name: String,
    /// Wavelength in nanometers
    pub wavelength: i64,
}

/// Wavelength columns of one input, in header order
#[derive(Debug, Clone)]
pub struct SpectralLayout {
    columns: Vec<WavelengthColumn>,
}

pub fn contains_digit(name: &str) -> bool {
    name.chars().any(|c| c.is_ascii_digit())
}

/// First run of ASCII digits in `name`
pub fn first_digit_run(name: &str) -> Option<i64> {
    let start = name.find(|c: char| c.is_ascii_digit())?;
    let rest = &name[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}

impl SpectralLayout {
    /// Apply `rule` to the header and check the result
    ///
    /// Every selected column must parse to a wavelength and no wavelength
    /// may appear twice. An input with no wavelength columns is rejected.
    pub fn resolve(records: &RecordSet, rule: &WavelengthRule) -> Result<Self> {
        let selected = match rule {
            WavelengthRule::ContainsDigit => Self::select_by_digit(records)?,
            WavelengthRule::Explicit { columns } => Self::select_explicit(records, columns)?,
        };

        let mut columns = Vec::with_capacity(selected.len());
        let mut seen: HashMap<i64, usize> = HashMap::new();
        for index in selected {
            let name = records.columns()[index].clone();
            let wavelength = first_digit_run(&name)
                .ok_or_else(|| IngestError::NotAWavelength { column: name.clone() })?;

            if let Some(&previous) = seen.get(&wavelength) {
                return Err(IngestError::DuplicateWavelength {
                    wavelength,
                    first: records.columns()[previous].clone(),
                    second: name,
                });
            }
            seen.insert(wavelength, index);

            columns.push(WavelengthColumn {
                index,
                name,
                wavelength,
            });
        }

        if columns.is_empty() {
            return Err(IngestError::NoWavelengthColumns);
        }

        let layout = Self { columns };
        info!(
            "Resolved {} wavelength columns ({}-{} nm)",
            layout.len(),
            layout.min_wavelength().unwrap_or_default(),
            layout.max_wavelength().unwrap_or_default()
        );
        Ok(layout)
    }

    /// Numeric columns whose name contains a digit
    ///
    /// A digit-named column with no numeric cell at all is taken for a text
    /// field and skipped. One that mixes numbers with malformed cells is a
    /// reflectance column with bad data and fails on the first bad cell.
    fn select_by_digit(records: &RecordSet) -> Result<Vec<usize>> {
        let mut selected = Vec::new();
        for (index, name) in records.columns().iter().enumerate() {
            if !contains_digit(name) {
                continue;
            }

            let mut numeric_cells = 0usize;
            let mut first_error = None;
            for row in 0..records.len() {
                match records.number(row, index) {
                    Ok(Some(_)) => numeric_cells += 1,
                    Ok(None) => {}
                    Err(e) => {
                        if first_error.is_none() {
                            first_error = Some(e);
                        }
                    }
                }
            }

            match first_error {
                None => selected.push(index),
                Some(e) if numeric_cells > 0 => return Err(e),
                Some(_) => warn!(
                    "Column '{}' has a digit in its name but non-numeric values; not read as a wavelength",
                    name
                ),
            }
        }
        Ok(selected)
    }

    /// Listed columns; each must exist and hold only numbers
    fn select_explicit(records: &RecordSet, names: &[String]) -> Result<Vec<usize>> {
        let mut selected = Vec::with_capacity(names.len());
        for name in names {
            let index = records.column_index(name)?;
            for row in 0..records.len() {
                records.number(row, index)?;
            }
            selected.push(index);
        }
        Ok(selected)
    }

    pub fn columns(&self) -> &[WavelengthColumn] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn min_wavelength(&self) -> Option<i64> {
        self.columns.iter().map(|c| c.wavelength).min()
    }

    pub fn max_wavelength(&self) -> Option<i64> {
        self.columns.iter().map(|c| c.wavelength).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> RecordSet {
        RecordSet::from_reader(text.as_bytes(), "test.csv").unwrap()
    }

    fn wavelengths(layout: &SpectralLayout) -> Vec<i64> {
        layout.columns().iter().map(|c| c.wavelength).collect()
    }

    #[test]
    fn test_first_digit_run() {
        assert_eq!(first_digit_run("400"), Some(400));
        assert_eq!(first_digit_run("wl400"), Some(400));
        assert_eq!(first_digit_run("R_700nm"), Some(700));
        assert_eq!(first_digit_run("band12_500"), Some(12));
        assert_eq!(first_digit_run("region"), None);
        assert_eq!(first_digit_run("wl99999999999999999999999"), None);
    }

    #[test]
    fn test_contains_digit_selects_numeric_digit_columns() {
        let records = parse("catalog number,genus,300,301,302\nA1,G1,1.5,2.5,3.5\n");
        let layout = SpectralLayout::resolve(&records, &WavelengthRule::ContainsDigit).unwrap();

        assert_eq!(wavelengths(&layout), vec![300, 301, 302]);
        assert_eq!(layout.columns()[0].index, 2);
        assert_eq!(layout.min_wavelength(), Some(300));
        assert_eq!(layout.max_wavelength(), Some(302));
    }

    #[test]
    fn test_contains_digit_also_selects_non_wavelength_names() {
        // Known weakness of the digit rule: "ratio2" is numeric and has a
        // digit, so it is read as wavelength 2
        let records = parse("genus,wl400,ratio2\nG1,0.5,0.9\n");
        let layout = SpectralLayout::resolve(&records, &WavelengthRule::ContainsDigit).unwrap();

        assert_eq!(wavelengths(&layout), vec![400, 2]);
        assert_eq!(layout.columns()[1].name, "ratio2");
    }

    #[test]
    fn test_contains_digit_skips_text_columns() {
        let records = parse("specimen2,wl400\nskin,0.5\n");
        let layout = SpectralLayout::resolve(&records, &WavelengthRule::ContainsDigit).unwrap();
        assert_eq!(wavelengths(&layout), vec![400]);
    }

    #[test]
    fn test_contains_digit_rejects_malformed_cell_in_numeric_column() {
        let records = parse("genus,wl400,wl500\nG1,0.5,0.7\nG2,0.6,0.1o\n");
        let err = SpectralLayout::resolve(&records, &WavelengthRule::ContainsDigit).unwrap_err();
        match err {
            IngestError::MalformedValue { line, column, value } => {
                assert_eq!(line, 3);
                assert_eq!(column, "wl500");
                assert_eq!(value, "0.1o");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_contains_digit_rejects_padded_missing_token() {
        let records = parse("wl400,wl500\n0.5, NA\n0.6,0.2\n");
        let err = SpectralLayout::resolve(&records, &WavelengthRule::ContainsDigit).unwrap_err();
        assert!(
            matches!(err, IngestError::MalformedValue { line: 2, ref column, .. } if column == "wl500"),
            "{}",
            err
        );
    }

    #[test]
    fn test_explicit_rule_ignores_other_digit_columns() {
        let records = parse("genus,wl400,wl500,ratio2\nG1,0.5,0.7,0.9\n");
        let rule = WavelengthRule::Explicit {
            columns: vec!["wl400".to_string(), "wl500".to_string()],
        };
        let layout = SpectralLayout::resolve(&records, &rule).unwrap();
        assert_eq!(wavelengths(&layout), vec![400, 500]);
    }

    #[test]
    fn test_explicit_rule_missing_column() {
        let records = parse("genus,wl400\nG1,0.5\n");
        let rule = WavelengthRule::Explicit {
            columns: vec!["wl400".to_string(), "wl410".to_string()],
        };
        let err = SpectralLayout::resolve(&records, &rule).unwrap_err();
        assert!(matches!(err, IngestError::MissingColumn { ref column } if column == "wl410"));
    }

    #[test]
    fn test_explicit_rule_rejects_non_numeric_cell() {
        let records = parse("genus,wl400\nG1,0.5\nG2,oops\n");
        let rule = WavelengthRule::Explicit {
            columns: vec!["wl400".to_string()],
        };
        let err = SpectralLayout::resolve(&records, &rule).unwrap_err();
        match err {
            IngestError::MalformedValue { line, column, value } => {
                assert_eq!(line, 3);
                assert_eq!(column, "wl400");
                assert_eq!(value, "oops");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_explicit_rule_column_without_digits() {
        let records = parse("genus,peak\nG1,0.5\n");
        let rule = WavelengthRule::Explicit {
            columns: vec!["peak".to_string()],
        };
        let err = SpectralLayout::resolve(&records, &rule).unwrap_err();
        assert!(matches!(err, IngestError::NotAWavelength { .. }));
    }

    #[test]
    fn test_duplicate_wavelength_rejected() {
        let records = parse("wl400,400nm\n0.1,0.2\n");
        let err = SpectralLayout::resolve(&records, &WavelengthRule::ContainsDigit).unwrap_err();
        match err {
            IngestError::DuplicateWavelength { wavelength, first, second } => {
                assert_eq!(wavelength, 400);
                assert_eq!(first, "wl400");
                assert_eq!(second, "400nm");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_no_wavelength_columns() {
        let records = parse("genus,species\nG1,s1\n");
        let err = SpectralLayout::resolve(&records, &WavelengthRule::ContainsDigit).unwrap_err();
        assert!(matches!(err, IngestError::NoWavelengthColumns));
    }
}
