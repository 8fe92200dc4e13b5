#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Risk engine result types.
//!
//! Defines the per-neighborhood aggregate the scorer consumes, the
//! [`RiskAssessment`] it produces, the ordered [`RiskLevel`] scale with its
//! map palette, and the alert types raised from 30-day windows.

use std::collections::BTreeMap;

use crime_risk_incident_models::{CrimeType, TimeOfDay};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Per-neighborhood summary counts derived from raw records.
///
/// All counts default to zero when no records match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborhoodAggregate {
    /// Canonical neighborhood name.
    pub neighborhood: String,
    /// Incidents matched to the neighborhood.
    pub total_crimes: u64,
    /// Police operations matched to the neighborhood.
    pub total_operations: u64,
    /// Arrests across all matched operations.
    pub arrests: u64,
    /// Weapons seized across all matched operations.
    pub weapons: u64,
    /// Drugs seized across all matched operations, in kilograms.
    pub drugs_kg: f64,
    /// Deaths in confrontation across all matched operations.
    pub deaths: u64,
    /// Matched operations still flagged as active.
    pub active_operations_count: u64,
    /// Incidents timestamped in `[now - 30d, now]`.
    pub crimes_last_30_days: u64,
    /// Incidents timestamped in `[now - 60d, now - 30d)`.
    pub crimes_prior_30_days: u64,
    /// Severe incidents (homicide, robbery, rape) in the last 30 days.
    pub severe_crimes_last_30_days: u64,
    /// Incident counts per crime type.
    pub crimes_by_type: BTreeMap<CrimeType, u64>,
    /// Incident counts per time-of-day bucket.
    pub crimes_by_period: BTreeMap<TimeOfDay, u64>,
}

impl NeighborhoodAggregate {
    /// Creates an all-zero aggregate for `neighborhood`.
    #[must_use]
    pub fn empty(neighborhood: impl Into<String>) -> Self {
        Self {
            neighborhood: neighborhood.into(),
            ..Self::default()
        }
    }

    /// Returns the `n` most frequent crime types, most frequent first.
    #[must_use]
    pub fn top_crime_types(&self, n: usize) -> Vec<(CrimeType, u64)> {
        let mut types: Vec<(CrimeType, u64)> =
            self.crimes_by_type.iter().map(|(t, c)| (*t, *c)).collect();
        types.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        types.truncate(n);
        types
    }
}

/// Ordered risk scale, lowest first.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum RiskLevel {
    /// Score below 3
    #[serde(rename = "Very Low")]
    #[strum(serialize = "Very Low")]
    VeryLow,
    /// Score in `[3, 8)`
    #[strum(serialize = "Low")]
    Low,
    /// Score in `[8, 15)`
    #[serde(rename = "Low-Medium")]
    #[strum(serialize = "Low-Medium")]
    LowMedium,
    /// Score in `[15, 30)`
    #[strum(serialize = "Medium")]
    Medium,
    /// Score in `[30, 50)`
    #[serde(rename = "Medium-High")]
    #[strum(serialize = "Medium-High")]
    MediumHigh,
    /// Score in `[50, 80)`
    #[strum(serialize = "High")]
    High,
    /// Score in `[80, 120)`
    #[serde(rename = "Very High")]
    #[strum(serialize = "Very High")]
    VeryHigh,
    /// Score of 120 or more
    #[strum(serialize = "Critical")]
    Critical,
}

impl RiskLevel {
    /// Map fill color for this level.
    ///
    /// Ordered from Critical (near-black) down to Very Low (light green).
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Critical => "#4A0000",
            Self::VeryHigh => "#8B0000",
            Self::High => "#FF0000",
            Self::MediumHigh => "#FF4500",
            Self::Medium => "#FFA500",
            Self::LowMedium => "#FFD700",
            Self::Low => "#FFFF00",
            Self::VeryLow => "#90EE90",
        }
    }

    /// Whether this level calls for immediate reinforcement.
    #[must_use]
    pub const fn is_elevated(self) -> bool {
        matches!(self, Self::High | Self::VeryHigh | Self::Critical)
    }

    /// Returns all variants, highest risk first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Critical,
            Self::VeryHigh,
            Self::High,
            Self::MediumHigh,
            Self::Medium,
            Self::LowMedium,
            Self::Low,
            Self::VeryLow,
        ]
    }
}

/// Fill color for neighborhoods without any data.
pub const NO_DATA_COLOR: &str = "#808080";

/// Direction of the 30-day-over-30-day crime comparison.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Trend {
    /// More than 20% more incidents than the prior window.
    Rising,
    /// More than 20% fewer incidents than the prior window.
    Falling,
    /// Within 20%, or not enough data to tell.
    #[default]
    Stable,
}

/// How much police presence a neighborhood gets relative to its crime
/// volume.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum OperationCoverage {
    /// No operations or no crimes, so no ratio to judge.
    #[default]
    #[serde(rename = "Not Assessable")]
    #[strum(serialize = "Not Assessable")]
    NotAssessable,
    /// Fewer than 15 operations per 100 crimes.
    Low,
    /// 15 to 30 operations per 100 crimes.
    Medium,
    /// 30 or more operations per 100 crimes.
    High,
}

/// The engine's output for one neighborhood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    /// Canonical neighborhood name.
    pub neighborhood: String,
    /// Composite risk score, never negative.
    pub score: f64,
    /// Discrete level for `score`.
    pub risk_level: RiskLevel,
    /// Share of crime volume offset by police activity, in `[0, 100]`.
    pub effectiveness_percent: f64,
    /// Recommended actions, most general first. Not truncated.
    pub recommendations: Vec<String>,
    /// 30-day trend.
    pub trend: Trend,
    /// Operation-to-crime coverage rating.
    pub operation_coverage: OperationCoverage,
}

/// Kind of condition an alert was raised for.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum AlertKind {
    /// Many incidents in the last 30 days.
    #[serde(rename = "High Volume")]
    #[strum(serialize = "High Volume")]
    HighVolume,
    /// Sharp increase over the prior 30 days.
    #[serde(rename = "Significant Increase")]
    #[strum(serialize = "Significant Increase")]
    SignificantIncrease,
    /// Several severe crimes in the last 30 days.
    #[serde(rename = "Severe Crimes")]
    #[strum(serialize = "Severe Crimes")]
    SevereCrimes,
}

/// Alert urgency; sorts most urgent first.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum AlertPriority {
    /// Needs action now.
    Critical,
    /// Needs action soon.
    High,
    /// Worth watching.
    Medium,
    /// Informational.
    Low,
}

/// One alert for one neighborhood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// What triggered the alert.
    pub kind: AlertKind,
    /// Canonical neighborhood name.
    pub neighborhood: String,
    /// Human-readable description.
    pub description: String,
    /// Urgency.
    pub priority: AlertPriority,
}
