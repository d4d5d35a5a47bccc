//! Load pipeline
//!
//! [`derive`] turns a record set into the five tables without touching
//! storage; [`load`] writes them through a [`Sink`] in dependency order;
//! [`run`] wires both to a dataset config.

use crate::error::Result;
use crate::projector::{enrich, project, KeyColumns};
use crate::records::RecordSet;
use crate::reshape::reshape;
use crate::wavelengths::SpectralLayout;
use plumage_common::config::{DatasetConfig, ExistingTablePolicy};
use plumage_common::db::{
    Bird, BirdsTable, MeasurementMeta, MetadataTable, Patch, PatchesTable, Sink, SpectraTable,
    SpectralReading, Taxon, TaxonomyTable, LOAD_ORDER,
};
use plumage_common::{Error as CommonError, Result as CommonResult};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info};

/// Everything derived from one input, ready to be written
#[derive(Debug, Clone, Default)]
pub struct DerivedTables {
    pub taxonomy: Vec<Taxon>,
    pub birds: Vec<Bird>,
    pub patches: Vec<Patch>,
    pub metadata: Vec<MeasurementMeta>,
    pub spectra: Vec<SpectralReading>,
    /// Number of wavelength columns found in the input
    pub wavelength_columns: usize,
}

impl DerivedTables {
    /// Row count per table, in load order
    pub fn row_counts(&self) -> Vec<TableReport> {
        vec![
            TableReport::new(TaxonomyTable::NAME, self.taxonomy.len() as u64),
            TableReport::new(BirdsTable::NAME, self.birds.len() as u64),
            TableReport::new(PatchesTable::NAME, self.patches.len() as u64),
            TableReport::new(MetadataTable::NAME, self.metadata.len() as u64),
            TableReport::new(SpectraTable::NAME, self.spectra.len() as u64),
        ]
    }
}

/// Rows derived (dry run) or written for one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableReport {
    pub table: String,
    pub rows: u64,
}

impl TableReport {
    pub fn new(table: &str, rows: u64) -> Self {
        Self {
            table: table.to_string(),
            rows,
        }
    }
}

/// Summary of one run
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub dataset: String,
    pub source: PathBuf,
    pub records: usize,
    pub wavelength_columns: usize,
    pub dry_run: bool,
    pub tables: Vec<TableReport>,
}

/// Run options that come from the command line rather than the dataset TOML
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Already resolved input file
    pub input: PathBuf,
    /// Already resolved connection string
    pub database_url: String,
    /// Force the `replace` re-run policy
    pub replace: bool,
    /// Stop before opening the database
    pub dry_run: bool,
}

/// Derive all five tables from `records`
///
/// Every configured column is checked before any keys are assigned, so a
/// missing column fails fast.
pub fn derive(records: &RecordSet, config: &DatasetConfig) -> Result<DerivedTables> {
    let columns = KeyColumns::resolve(records, config)?;
    let layout = SpectralLayout::resolve(records, &config.wavelengths)?;

    let enriched = enrich(records, &columns);
    let projection = project(&enriched, &config.measurement)?;
    let spectra = reshape(records, &layout)?;

    Ok(DerivedTables {
        taxonomy: projection.taxonomy,
        birds: projection.birds,
        patches: projection.patches,
        metadata: projection.metadata,
        spectra,
        wavelength_columns: layout.len(),
    })
}

/// Write the derived tables in dependency order
///
/// On a write failure the tables already committed are logged and the
/// error is returned; nothing further is attempted.
pub async fn load(sink: &Sink, tables: &DerivedTables) -> Result<Vec<TableReport>> {
    sink.prepare(&LOAD_ORDER).await?;

    let mut written: Vec<TableReport> = Vec::with_capacity(LOAD_ORDER.len());
    for table in LOAD_ORDER {
        match write_table(sink, tables, table).await {
            Ok(rows) => written.push(TableReport::new(table, rows)),
            Err(e) => {
                let committed: Vec<&str> = written.iter().map(|t| t.table.as_str()).collect();
                error!(
                    "Load stopped at '{}'; already committed: {:?}",
                    table, committed
                );
                return Err(e.into());
            }
        }
    }

    Ok(written)
}

/// Write the rows derived for `table`
async fn write_table(sink: &Sink, tables: &DerivedTables, table: &str) -> CommonResult<u64> {
    match table {
        TaxonomyTable::NAME => sink.write(&tables.taxonomy).await,
        BirdsTable::NAME => sink.write(&tables.birds).await,
        PatchesTable::NAME => sink.write(&tables.patches).await,
        MetadataTable::NAME => sink.write(&tables.metadata).await,
        SpectraTable::NAME => sink.write(&tables.spectra).await,
        other => Err(CommonError::Config(format!(
            "no rows are derived for table '{}'",
            other
        ))),
    }
}

/// Read, derive and (unless dry-run) write one dataset
pub async fn run(config: &DatasetConfig, options: &RunOptions) -> Result<LoadReport> {
    let records = RecordSet::from_path(&options.input)?;
    let tables = derive(&records, config)?;

    let mut report = LoadReport {
        dataset: config.dataset.name.clone(),
        source: options.input.clone(),
        records: records.len(),
        wavelength_columns: tables.wavelength_columns,
        dry_run: options.dry_run,
        tables: tables.row_counts(),
    };

    if options.dry_run {
        info!("Dry run: database not opened");
        return Ok(report);
    }

    let mut database = config.database.clone();
    if options.replace {
        database.on_existing = ExistingTablePolicy::Replace;
    }

    let sink = Sink::open(&options.database_url, &database).await?;
    let result = load(&sink, &tables).await;
    sink.close().await;

    report.tables = result?;
    info!(
        "Loaded dataset '{}': {} records, {} spectral rows",
        report.dataset,
        report.records,
        tables.spectra.len()
    );
    Ok(report)
}
