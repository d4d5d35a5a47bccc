//! Surrogate key assignment and the Table Projector
//!
//! [`enrich`] gives every record its `bird_id`, `tax_id` and `patch_id`;
//! [`project`] then selects and renames the columns of each wide table and
//! keeps the first row per key.

use crate::error::{IngestError, Result};
use crate::factorize::Factorizer;
use crate::records::RecordSet;
use plumage_common::config::{DatasetConfig, FamilySource, MeasurementConfig};
use plumage_common::db::{Bird, MeasurementMeta, Patch, Taxon};
use std::collections::{HashMap, HashSet};
use tracing::info;

/// Where the family value of a record comes from
#[derive(Debug, Clone)]
enum FamilyColumn {
    Literal(String),
    Column(usize),
}

/// Header positions of the natural-key columns
#[derive(Debug, Clone)]
pub struct KeyColumns {
    catalog_number: usize,
    sex: usize,
    genus: usize,
    species: usize,
    patch: usize,
    family: FamilyColumn,
}

impl KeyColumns {
    /// Look up every configured column; the first one absent is reported
    pub fn resolve(records: &RecordSet, config: &DatasetConfig) -> Result<Self> {
        let columns = &config.columns;
        let family = match config.family_source()? {
            FamilySource::Literal(family) => FamilyColumn::Literal(family),
            FamilySource::Column(name) => FamilyColumn::Column(records.column_index(&name)?),
        };

        Ok(Self {
            catalog_number: records.column_index(&columns.catalog_number)?,
            sex: records.column_index(&columns.sex)?,
            genus: records.column_index(&columns.genus)?,
            species: records.column_index(&columns.species)?,
            patch: records.column_index(&columns.patch)?,
            family,
        })
    }
}

/// One input record with its surrogate keys attached
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRecord<'a> {
    /// 0-based position in the input
    pub spec_id: i64,
    pub line: u64,
    pub bird_id: i64,
    pub tax_id: i64,
    pub patch_id: i64,
    pub catnum: Option<&'a str>,
    pub sex: Option<&'a str>,
    pub family: Option<&'a str>,
    pub genus: Option<&'a str>,
    pub species: Option<&'a str>,
    pub region: Option<&'a str>,
}

type TaxonKey<'a> = (Option<&'a str>, Option<&'a str>, Option<&'a str>);

/// Assign surrogate keys to every record in input order
pub fn enrich<'a>(records: &'a RecordSet, columns: &'a KeyColumns) -> Vec<EnrichedRecord<'a>> {
    let mut birds: Factorizer<Option<&'a str>> = Factorizer::new();
    let mut taxa: Factorizer<TaxonKey<'a>> = Factorizer::new();
    let mut patches: Factorizer<Option<&'a str>> = Factorizer::new();

    let enriched: Vec<EnrichedRecord<'a>> = (0..records.len())
        .map(|row| {
            let catnum = records.text(row, columns.catalog_number);
            let family = match &columns.family {
                FamilyColumn::Literal(family) => Some(family.as_str()),
                FamilyColumn::Column(index) => records.text(row, *index),
            };
            let genus = records.text(row, columns.genus);
            let species = records.text(row, columns.species);
            let region = records.text(row, columns.patch);

            EnrichedRecord {
                spec_id: row as i64,
                line: records.line(row),
                bird_id: birds.key(catnum),
                tax_id: taxa.key((family, genus, species)),
                patch_id: patches.key(region),
                catnum,
                sex: records.text(row, columns.sex),
                family,
                genus,
                species,
                region,
            }
        })
        .collect();

    info!(
        "Assigned {} bird_id, {} tax_id and {} patch_id keys over {} records",
        birds.len(),
        taxa.len(),
        patches.len(),
        enriched.len()
    );
    enriched
}

/// The four wide tables
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    pub taxonomy: Vec<Taxon>,
    pub birds: Vec<Bird>,
    pub patches: Vec<Patch>,
    pub metadata: Vec<MeasurementMeta>,
}

/// Project the enriched records into the wide tables
///
/// A catalog number seen again with a different sex is an error rather
/// than silently keeping the first value.
pub fn project(enriched: &[EnrichedRecord<'_>], measurement: &MeasurementConfig) -> Result<Projection> {
    let mut projection = Projection::default();
    let mut bird_rows: HashMap<i64, usize> = HashMap::new();
    let mut tax_seen: HashSet<i64> = HashSet::new();
    let mut patch_seen: HashSet<i64> = HashSet::new();

    for record in enriched {
        if tax_seen.insert(record.tax_id) {
            projection.taxonomy.push(Taxon {
                tax_id: record.tax_id,
                family: record.family.map(str::to_string),
                genus: record.genus.map(str::to_string),
                species: record.species.map(str::to_string),
            });
        }

        match bird_rows.get(&record.bird_id) {
            None => {
                bird_rows.insert(record.bird_id, projection.birds.len());
                projection.birds.push(Bird {
                    bird_id: record.bird_id,
                    catnum: record.catnum.map(str::to_string),
                    sex: record.sex.map(str::to_string),
                });
            }
            Some(&index) => {
                let first = &projection.birds[index];
                if first.sex.as_deref() != record.sex {
                    return Err(IngestError::ConflictingKey {
                        key_column: "catnum".to_string(),
                        key: record.catnum.map(str::to_string),
                        column: "sex".to_string(),
                        first: first.sex.clone(),
                        found: record.sex.map(str::to_string),
                        line: record.line,
                    });
                }
            }
        }

        if patch_seen.insert(record.patch_id) {
            projection.patches.push(Patch {
                patch_id: record.patch_id,
                region: record.region.map(str::to_string),
            });
        }

        projection.metadata.push(MeasurementMeta {
            spec_id: record.spec_id,
            bird_id: record.bird_id,
            tax_id: record.tax_id,
            patch_id: record.patch_id,
            spectrophotometer: measurement.spectrophotometer.clone(),
            observer: measurement.observer.clone(),
            inc_angle: measurement.inc_angle,
            obs_angle: measurement.obs_angle,
            sex: if measurement.include_sex {
                record.sex.map(str::to_string)
            } else {
                None
            },
        });
    }

    info!(
        "Projected {} taxa, {} birds, {} patches, {} metadata rows",
        projection.taxonomy.len(),
        projection.birds.len(),
        projection.patches.len(),
        projection.metadata.len()
    );
    Ok(projection)
}
