#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Neighborhood name canonicalization.
//!
//! Incident feeds, police operation logs, and the municipal boundary
//! `GeoJSON` all spell neighborhood names differently (accented or not,
//! abbreviated, alternate historical names). This crate maps every variant
//! to one canonical spelling so the tables can be joined.
//!
//! Alias tables are TOML files embedded at compile time, following the
//! same registry pattern as the data source definitions.

pub mod normalize;
pub mod registry;

pub use normalize::NameTable;
pub use registry::{all_tables, default_table};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while building a name table.
#[derive(Debug, Error)]
pub enum NameTableError {
    /// The TOML definition could not be parsed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Two canonical names claim the same spelling.
    #[error("Alias '{alias}' maps to both '{first}' and '{second}'")]
    Conflict {
        /// The conflicting spelling.
        alias: String,
        /// Canonical name registered first.
        first: String,
        /// Canonical name that tried to claim it.
        second: String,
    },
}

/// A neighborhood alias table, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameTableDefinition {
    /// Unique table identifier (e.g., `"porto_alegre"`).
    pub id: String,
    /// City the neighborhoods belong to.
    pub city: String,
    /// State abbreviation.
    pub state: String,
    /// Token abbreviations expanded before lookup (e.g., `JD` -> `JARDIM`).
    #[serde(default)]
    pub abbreviations: std::collections::BTreeMap<String, String>,
    /// Canonical neighborhoods and their alternate spellings.
    pub neighborhoods: Vec<NeighborhoodNames>,
}

/// One canonical neighborhood and the spellings that map to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborhoodNames {
    /// Canonical name as used by the boundary data.
    pub name: String,
    /// Alternate spellings that differ in more than accents.
    #[serde(default)]
    pub aliases: Vec<String>,
}
