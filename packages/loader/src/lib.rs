#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Loads incident and police-operation tables from CSV.
//!
//! Headers are matched case-insensitively, with spaces and hyphens folded
//! to underscores, so `Data Registro`, `data_registro` and `DATA-REGISTRO`
//! all name the same column. Both English and Portuguese column names are
//! accepted. Rows that fail to deserialize are skipped.

pub mod cache;
pub mod parsing;

use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use crime_risk_incident_models::{
    IncidentRecord, OperationRecord, OperationType, TimeOfDay, map_crime_type, map_operation_type,
};
use serde::Deserialize;

pub use cache::TableCache;

/// Errors from loading a source table.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// CSV parsing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error opening or inspecting a file.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A required column is absent from the header row.
    #[error("{table} table has no {column} column (accepted: {accepted})")]
    MissingColumn {
        /// Which table was being read.
        table: &'static str,
        /// Logical column name.
        column: &'static str,
        /// Header spellings that would have been accepted.
        accepted: String,
    },
}

const NEIGHBORHOOD_COLUMNS: &[&str] = &["neighborhood", "bairro"];
const CRIME_TYPE_COLUMNS: &[&str] = &["crime_type", "tipo_crime"];

/// A raw incident row.
#[derive(Debug, Deserialize)]
struct IncidentRow {
    #[serde(alias = "bairro")]
    neighborhood: String,
    #[serde(alias = "tipo_crime")]
    crime_type: String,
    #[serde(default, alias = "data_registro", alias = "data_hora")]
    timestamp: Option<String>,
    #[serde(default, alias = "periodo_dia", alias = "periodo_do_dia")]
    time_of_day: Option<String>,
}

impl IncidentRow {
    fn into_record(self) -> Option<IncidentRecord> {
        let neighborhood = self.neighborhood.trim();
        if neighborhood.is_empty() {
            return None;
        }

        let parsed = self
            .timestamp
            .as_deref()
            .and_then(parsing::parse_timestamp_parts);
        let time_of_day = self
            .time_of_day
            .as_deref()
            .and_then(TimeOfDay::parse_label)
            .or_else(|| {
                parsed
                    .filter(|p| p.has_time)
                    .map(|p| TimeOfDay::from_timestamp(&p.timestamp))
            });

        Some(IncidentRecord {
            neighborhood: neighborhood.to_string(),
            crime_type: map_crime_type(&self.crime_type),
            timestamp: parsed.map(|p| p.timestamp),
            time_of_day,
        })
    }
}

/// A raw police-operation row. Numeric columns are read as text and
/// parsed leniently.
#[derive(Debug, Deserialize)]
struct OperationRow {
    #[serde(alias = "bairro")]
    neighborhood: String,
    #[serde(default, alias = "data_operacao")]
    date: Option<String>,
    #[serde(default, alias = "prisoes_realizadas", alias = "presos")]
    arrests: Option<String>,
    #[serde(default, alias = "apreensoes_armas")]
    weapons_seized: Option<String>,
    #[serde(default, alias = "apreensoes_drogas_kg")]
    drugs_seized_kg: Option<String>,
    #[serde(
        default,
        alias = "mortes_intervencao_policial",
        alias = "mortes_confronto"
    )]
    deaths: Option<String>,
    #[serde(default, alias = "policiais_envolvidos")]
    officers_involved: Option<String>,
    #[serde(default, alias = "tipo_operacao")]
    operation_type: Option<String>,
    #[serde(default, alias = "ativa", alias = "operacao_ativa")]
    active: Option<String>,
}

impl OperationRow {
    fn into_record(self) -> Option<OperationRecord> {
        let neighborhood = self.neighborhood.trim();
        if neighborhood.is_empty() {
            return None;
        }

        Some(OperationRecord {
            neighborhood: neighborhood.to_string(),
            date: self.date.as_deref().and_then(parsing::parse_timestamp),
            arrests: parsing::parse_count(self.arrests.as_deref()),
            weapons_seized: parsing::parse_count(self.weapons_seized.as_deref()),
            drugs_seized_kg: parsing::parse_decimal(self.drugs_seized_kg.as_deref())
                .filter(|kg| *kg > 0.0)
                .unwrap_or(0.0),
            deaths: parsing::parse_count(self.deaths.as_deref()),
            officers_involved: parsing::parse_count(self.officers_involved.as_deref()),
            operation_type: self
                .operation_type
                .as_deref()
                .map_or(OperationType::Other, map_operation_type),
            active: parsing::parse_flag(self.active.as_deref()),
        })
    }
}

/// Folds a header to its lookup form: trimmed, lowercase, with runs of
/// spaces and hyphens replaced by a single underscore.
#[must_use]
pub fn normalize_header(header: &str) -> String {
    header
        .trim()
        .trim_start_matches('\u{feff}')
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Opens a CSV reader with normalized headers, checking that each group in
/// `required` has at least one matching column.
fn open_reader<R: Read>(
    reader: R,
    table: &'static str,
    required: &[(&'static str, &[&str])],
) -> Result<csv::Reader<R>, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: csv::StringRecord = csv_reader.headers()?.iter().map(normalize_header).collect();

    for &(column, accepted) in required {
        if !headers.iter().any(|h| accepted.contains(&h)) {
            return Err(LoadError::MissingColumn {
                table,
                column,
                accepted: accepted.join(", "),
            });
        }
    }

    csv_reader.set_headers(headers);
    Ok(csv_reader)
}

/// Reads incidents from any CSV source.
///
/// # Errors
///
/// * If the header row cannot be read
/// * If the neighborhood or crime type column is missing
pub fn load_incidents_from_reader<R: Read>(reader: R) -> Result<Vec<IncidentRecord>, LoadError> {
    let mut csv_reader = open_reader(
        reader,
        "incident",
        &[
            ("neighborhood", NEIGHBORHOOD_COLUMNS),
            ("crime type", CRIME_TYPE_COLUMNS),
        ],
    )?;

    let mut records = Vec::new();
    let mut skipped = 0u64;
    for result in csv_reader.deserialize::<IncidentRow>() {
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                log::trace!("  skipping malformed incident row: {e}");
                skipped += 1;
                continue;
            }
        };
        match row.into_record() {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }

    let undated = records.iter().filter(|r| r.timestamp.is_none()).count();
    log::debug!(
        "Loaded {} incidents ({skipped} skipped, {undated} without a usable timestamp)",
        records.len()
    );
    Ok(records)
}

/// Reads police operations from any CSV source.
///
/// # Errors
///
/// * If the header row cannot be read
/// * If the neighborhood column is missing
pub fn load_operations_from_reader<R: Read>(
    reader: R,
) -> Result<Vec<OperationRecord>, LoadError> {
    let mut csv_reader = open_reader(
        reader,
        "operation",
        &[("neighborhood", NEIGHBORHOOD_COLUMNS)],
    )?;

    let mut records = Vec::new();
    let mut skipped = 0u64;
    for result in csv_reader.deserialize::<OperationRow>() {
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                log::trace!("  skipping malformed operation row: {e}");
                skipped += 1;
                continue;
            }
        };
        match row.into_record() {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }

    log::debug!("Loaded {} operations ({skipped} skipped)", records.len());
    Ok(records)
}

fn open_file(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Reads incidents from a CSV file.
///
/// # Errors
///
/// * If the file cannot be opened
/// * See [`load_incidents_from_reader`]
pub fn load_incidents_from_path(path: &Path) -> Result<Vec<IncidentRecord>, LoadError> {
    log::info!("Loading incidents from {}", path.display());
    load_incidents_from_reader(open_file(path)?)
}

/// Reads police operations from a CSV file.
///
/// # Errors
///
/// * If the file cannot be opened
/// * See [`load_operations_from_reader`]
pub fn load_operations_from_path(path: &Path) -> Result<Vec<OperationRecord>, LoadError> {
    log::info!("Loading operations from {}", path.display());
    load_operations_from_reader(open_file(path)?)
}

/// Loads both tables through per-table caches.
#[derive(Debug)]
pub struct DatasetLoader {
    incidents: TableCache<Vec<IncidentRecord>>,
    operations: TableCache<Vec<OperationRecord>>,
}

impl Default for DatasetLoader {
    fn default() -> Self {
        Self::new(cache::DEFAULT_TTL)
    }
}

impl DatasetLoader {
    /// Creates a loader whose cached tables expire after `ttl`.
    #[must_use]
    pub const fn new(ttl: Duration) -> Self {
        Self {
            incidents: TableCache::new(ttl),
            operations: TableCache::new(ttl),
        }
    }

    /// Returns the incident table at `path`, loading it if needed.
    ///
    /// # Errors
    ///
    /// * See [`load_incidents_from_path`]
    pub fn incidents(&mut self, path: &Path) -> Result<Arc<Vec<IncidentRecord>>, LoadError> {
        self.incidents.get_or_load(path, load_incidents_from_path)
    }

    /// Returns the operation table at `path`, loading it if needed. A
    /// `None` path is an empty table.
    ///
    /// # Errors
    ///
    /// * See [`load_operations_from_path`]
    pub fn operations(
        &mut self,
        path: Option<&Path>,
    ) -> Result<Arc<Vec<OperationRecord>>, LoadError> {
        match path {
            Some(path) => self.operations.get_or_load(path, load_operations_from_path),
            None => Ok(Arc::new(Vec::new())),
        }
    }

    /// Drops every cached table.
    pub fn clear(&mut self) {
        self.incidents.clear();
        self.operations.clear();
    }

    /// Paths currently cached, incidents first.
    #[must_use]
    pub fn cached_paths(&self) -> Vec<PathBuf> {
        self.incidents
            .paths()
            .chain(self.operations.paths())
            .cloned()
            .collect()
    }
}
