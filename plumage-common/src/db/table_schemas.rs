//! Target table definitions
//!
//! Single source of truth for the five normalized tables. Tables are listed
//! in [`LOAD_ORDER`], which is also foreign-key dependency order.

use crate::db::schema::{ColumnDefinition, TableSchema};

/// Tables in write order; drops run in reverse
pub const LOAD_ORDER: [&str; 5] = [
    TaxonomyTable::NAME,
    BirdsTable::NAME,
    PatchesTable::NAME,
    MetadataTable::NAME,
    SpectraTable::NAME,
];

/// Distinct (family, genus, species) triples
pub struct TaxonomyTable;

impl TaxonomyTable {
    pub const NAME: &'static str = "taxonomy";
}

impl TableSchema for TaxonomyTable {
    fn table_name() -> &'static str {
        Self::NAME
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("tax_id", "INTEGER").primary_key(),
            ColumnDefinition::new("family", "TEXT"),
            ColumnDefinition::new("genus", "TEXT"),
            ColumnDefinition::new("species", "TEXT"),
        ]
    }
}

/// One row per catalogued individual
pub struct BirdsTable;

impl BirdsTable {
    pub const NAME: &'static str = "birds";
}

impl TableSchema for BirdsTable {
    fn table_name() -> &'static str {
        Self::NAME
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("bird_id", "INTEGER").primary_key(),
            ColumnDefinition::new("catnum", "TEXT"),
            ColumnDefinition::new("sex", "TEXT"),
        ]
    }
}

/// Named plumage regions
pub struct PatchesTable;

impl PatchesTable {
    pub const NAME: &'static str = "patches";
}

impl TableSchema for PatchesTable {
    fn table_name() -> &'static str {
        Self::NAME
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("patch_id", "INTEGER").primary_key(),
            ColumnDefinition::new("region", "TEXT"),
        ]
    }
}

/// One row per measurement session (input record)
pub struct MetadataTable;

impl MetadataTable {
    pub const NAME: &'static str = "metadata";
}

impl TableSchema for MetadataTable {
    fn table_name() -> &'static str {
        Self::NAME
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("spec_id", "INTEGER").primary_key(),
            ColumnDefinition::new("bird_id", "INTEGER")
                .not_null()
                .references("birds(bird_id)"),
            ColumnDefinition::new("tax_id", "INTEGER")
                .not_null()
                .references("taxonomy(tax_id)"),
            ColumnDefinition::new("patch_id", "INTEGER")
                .not_null()
                .references("patches(patch_id)"),
            ColumnDefinition::new("spectrophotometer", "TEXT"),
            ColumnDefinition::new("observer", "TEXT"),
            ColumnDefinition::new("inc_angle", "REAL"),
            ColumnDefinition::new("obs_angle", "REAL"),
            // Only populated when measurement.include_sex is set
            ColumnDefinition::new("sex", "TEXT"),
        ]
    }
}

/// Long-form reflectance readings
pub struct SpectraTable;

impl SpectraTable {
    pub const NAME: &'static str = "spectra";
}

impl TableSchema for SpectraTable {
    fn table_name() -> &'static str {
        Self::NAME
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("spec_id", "INTEGER")
                .primary_key()
                .references("metadata(spec_id)"),
            ColumnDefinition::new("wl", "INTEGER").primary_key(),
            ColumnDefinition::new("reflectance", "REAL"),
        ]
    }
}
