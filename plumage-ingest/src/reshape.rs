//! Spectral Reshaper: wide wavelength columns to long-form readings
//!
//! Each record yields one [`SpectralReading`] per wavelength column, keyed
//! by the record's 0-based position. Values are parsed straight from the
//! cell text into `f64` and never rounded. Consumers must not rely on the
//! order of the output.

use crate::error::Result;
use crate::records::RecordSet;
use crate::wavelengths::SpectralLayout;
use plumage_common::db::SpectralReading;
use std::collections::BTreeMap;
use tracing::info;

/// Wavelength → reflectance for one specimen record
pub type WideRow = BTreeMap<i64, Option<f64>>;

/// Melt every record's wavelength columns into long form
pub fn reshape(records: &RecordSet, layout: &SpectralLayout) -> Result<Vec<SpectralReading>> {
    let mut readings = Vec::with_capacity(records.len() * layout.len());

    for row in 0..records.len() {
        for column in layout.columns() {
            readings.push(SpectralReading {
                spec_id: row as i64,
                wl: column.wavelength,
                reflectance: records.number(row, column.index)?,
            });
        }
    }

    info!(
        "Reshaped {} records x {} wavelengths into {} spectral rows",
        records.len(),
        layout.len(),
        readings.len()
    );
    Ok(readings)
}

/// Pivot long-form readings back to one wide row per spec_id
pub fn pivot_wide(readings: &[SpectralReading]) -> BTreeMap<i64, WideRow> {
    let mut wide: BTreeMap<i64, WideRow> = BTreeMap::new();
    for reading in readings {
        wide.entry(reading.spec_id)
            .or_default()
            .insert(reading.wl, reading.reflectance);
    }
    wide
}

#[cfg(test)]
mod tests {
    use super::*;
    use plumage_common::config::WavelengthRule;

    const INPUT: &str = "catnum,region,wl300,wl310,wl320\n\
                         A1,head,0.1,0.2,0.30000000000000004\n\
                         A1,back,12.5,NA,1e-3\n\
                         A2,head,7,8,9\n";

    fn setup() -> (RecordSet, SpectralLayout) {
        let records = RecordSet::from_reader(INPUT.as_bytes(), "test.csv").unwrap();
        let layout = SpectralLayout::resolve(&records, &WavelengthRule::ContainsDigit).unwrap();
        (records, layout)
    }

    #[test]
    fn test_one_reading_per_record_and_wavelength() {
        let (records, layout) = setup();
        let readings = reshape(&records, &layout).unwrap();

        assert_eq!(readings.len(), records.len() * layout.len());
        for spec_id in 0..3 {
            let count = readings.iter().filter(|r| r.spec_id == spec_id).count();
            assert_eq!(count, layout.len());
        }
    }

    #[test]
    fn test_values_are_preserved_exactly() {
        let (records, layout) = setup();
        let readings = reshape(&records, &layout).unwrap();
        let wide = pivot_wide(&readings);

        assert_eq!(wide[&0][&320], Some(0.30000000000000004));
        assert_eq!(wide[&1][&300], Some(12.5));
        assert_eq!(wide[&1][&310], None);
        assert_eq!(wide[&1][&320], Some(0.001));
        assert_eq!(wide[&2][&300], Some(7.0));
    }

    #[test]
    fn test_pivot_round_trip_matches_source_columns() {
        let (records, layout) = setup();
        let wide = pivot_wide(&reshape(&records, &layout).unwrap());

        assert_eq!(wide.len(), records.len());
        for row in 0..records.len() {
            let expected: WideRow = layout
                .columns()
                .iter()
                .map(|c| (c.wavelength, records.number(row, c.index).unwrap()))
                .collect();
            assert_eq!(wide[&(row as i64)], expected);
        }
    }

    #[test]
    fn test_no_duplicate_wavelength_within_a_record() {
        let (records, layout) = setup();
        let readings = reshape(&records, &layout).unwrap();
        let wide = pivot_wide(&readings);
        let total: usize = wide.values().map(|row| row.len()).sum();
        assert_eq!(total, readings.len());
    }

    #[test]
    fn test_empty_input_gives_no_readings() {
        let records = RecordSet::from_reader("catnum,wl300\n".as_bytes(), "test.csv").unwrap();
        let layout = SpectralLayout::resolve(&records, &WavelengthRule::ContainsDigit).unwrap();
        assert!(reshape(&records, &layout).unwrap().is_empty());
    }
}
