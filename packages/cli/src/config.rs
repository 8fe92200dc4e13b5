//! TOML configuration file.
//!
//! Every key is optional:
//!
//! ```toml
//! city = "porto_alegre"        # built-in name table id
//! names_file = "aliases.toml"  # or a custom table, overrides `city`
//!
//! [alerts]
//! volume = 10
//! increase = 0.3
//! increase_high = 0.5
//! severe = 3
//!
//! [report]
//! max_recommendations = 4
//!
//! [choropleth]
//! name_property = "nome"
//!
//! [cache]
//! ttl_secs = 300
//! ```

use std::{
    borrow::Cow,
    path::{Path, PathBuf},
    time::Duration,
};

use crime_risk_neighborhood_names::{NameTable, all_tables, default_table};
use crime_risk_report::text::DEFAULT_MAX_RECOMMENDATIONS;
use crime_risk_scoring::alerts::AlertThresholds;
use serde::Deserialize;

/// Errors from reading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading a configured file.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`Config`].
    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    /// A custom name table failed to load.
    #[error("Invalid name table: {0}")]
    Names(#[from] crime_risk_neighborhood_names::NameTableError),

    /// `city` does not match any built-in name table.
    #[error("Unknown city table: {0}")]
    UnknownCity(String),
}

/// Tool configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Built-in name table id.
    pub city: Option<String>,
    /// Custom name table file. Takes precedence over `city`.
    pub names_file: Option<PathBuf>,
    /// Alert thresholds.
    pub alerts: AlertThresholds,
    /// Report settings.
    pub report: ReportConfig,
    /// Choropleth settings.
    pub choropleth: ChoroplethConfig,
    /// Table cache settings.
    pub cache: CacheConfig,
}

/// `[report]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub max_recommendations: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            max_recommendations: DEFAULT_MAX_RECOMMENDATIONS,
        }
    }
}

/// `[choropleth]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChoroplethConfig {
    /// Feature property holding the neighborhood name.
    pub name_property: String,
}

impl Default for ChoroplethConfig {
    fn default() -> Self {
        Self {
            name_property: "nome".to_string(),
        }
    }
}

/// `[cache]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: crime_risk_loader::cache::DEFAULT_TTL.as_secs(),
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Config {
    /// Reads the configuration at `path`, or the defaults when `None`.
    ///
    /// # Errors
    ///
    /// * If the file cannot be read
    /// * If the file is not valid TOML or has unknown keys
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            log::debug!("No config file given, using defaults");
            return Ok(Self::default());
        };

        log::info!("Loading config from {}", path.display());
        let contents = read(path)?;
        Self::from_toml(&contents)
    }

    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// * If the text is not valid TOML or has unknown keys
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Resolves the neighborhood name table to use.
    ///
    /// # Errors
    ///
    /// * If `names_file` cannot be read or is not a valid table
    /// * If `city` names no built-in table
    pub fn name_table(&self) -> Result<Cow<'static, NameTable>, ConfigError> {
        if let Some(path) = &self.names_file {
            let contents = read(path)?;
            return Ok(Cow::Owned(NameTable::from_toml(&contents)?));
        }

        match &self.city {
            None => Ok(Cow::Borrowed(default_table())),
            Some(city) if city == default_table().id() => Ok(Cow::Borrowed(default_table())),
            Some(city) => all_tables()
                .into_iter()
                .find(|table| table.id() == city)
                .map(Cow::Owned)
                .ok_or_else(|| ConfigError::UnknownCity(city.clone())),
        }
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        source: e,
    })
}
