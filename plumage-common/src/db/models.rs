//! Database row models

use crate::db::sink::SinkRow;
use crate::db::table_schemas::{BirdsTable, MetadataTable, PatchesTable, SpectraTable, TaxonomyTable};
use serde::{Deserialize, Serialize};
use sqlx::query_builder::Separated;
use sqlx::Sqlite;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Taxon {
    pub tax_id: i64,
    pub family: Option<String>,
    pub genus: Option<String>,
    pub species: Option<String>,
}

impl SinkRow for Taxon {
    type Table = TaxonomyTable;

    fn bind_columns<'args>(&self, row: &mut Separated<'_, 'args, Sqlite, &'static str>) {
        row.push_bind(self.tax_id)
            .push_bind(self.family.clone())
            .push_bind(self.genus.clone())
            .push_bind(self.species.clone());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bird {
    pub bird_id: i64,
    pub catnum: Option<String>,
    pub sex: Option<String>,
}

impl SinkRow for Bird {
    type Table = BirdsTable;

    fn bind_columns<'args>(&self, row: &mut Separated<'_, 'args, Sqlite, &'static str>) {
        row.push_bind(self.bird_id)
            .push_bind(self.catnum.clone())
            .push_bind(self.sex.clone());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    pub patch_id: i64,
    pub region: Option<String>,
}

impl SinkRow for Patch {
    type Table = PatchesTable;

    fn bind_columns<'args>(&self, row: &mut Separated<'_, 'args, Sqlite, &'static str>) {
        row.push_bind(self.patch_id).push_bind(self.region.clone());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementMeta {
    pub spec_id: i64,
    pub bird_id: i64,
    pub tax_id: i64,
    pub patch_id: i64,
    pub spectrophotometer: String,
    pub observer: String,
    pub inc_angle: f64,
    pub obs_angle: f64,
    pub sex: Option<String>,
}

impl SinkRow for MeasurementMeta {
    type Table = MetadataTable;

    fn bind_columns<'args>(&self, row: &mut Separated<'_, 'args, Sqlite, &'static str>) {
        row.push_bind(self.spec_id)
            .push_bind(self.bird_id)
            .push_bind(self.tax_id)
            .push_bind(self.patch_id)
            .push_bind(self.spectrophotometer.clone())
            .push_bind(self.observer.clone())
            .push_bind(self.inc_angle)
            .push_bind(self.obs_angle)
            .push_bind(self.sex.clone());
    }
}

/// One (spec_id, wavelength) reflectance value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectralReading {
    pub spec_id: i64,
    /// Wavelength in nanometers
    pub wl: i64,
    /// `None` when the source cell was a missing-value token
    pub reflectance: Option<f64>,
}

impl SinkRow for SpectralReading {
    type Table = SpectraTable;

    fn bind_columns<'args>(&self, row: &mut Separated<'_, 'args, Sqlite, &'static str>) {
        row.push_bind(self.spec_id)
            .push_bind(self.wl)
            .push_bind(self.reflectance);
    }
}
