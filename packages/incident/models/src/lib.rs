#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Incident and police-operation record types.
//!
//! This crate defines the typed records handed to the risk engine by the
//! data loader, plus the canonical crime type taxonomy that raw source
//! strings (Portuguese or English) are mapped into. Records are immutable
//! once loaded; neighborhood names are kept as free text and normalized by
//! the engine.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Canonical crime types reported by the city's incident feed.
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
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CrimeType {
    /// Taking property by force or threat (roubo, assalto)
    Robbery,
    /// Theft without violence (furto)
    Theft,
    /// Bodily injury (lesão corporal)
    BodilyInjury,
    /// Homicide
    Homicide,
    /// Robbery followed by death (latrocínio)
    RobberyHomicide,
    /// Rape (estupro)
    Rape,
    /// Drug trafficking
    DrugTrafficking,
    /// Threat (ameaça)
    Threat,
    /// Domestic violence
    DomesticViolence,
    /// Anything that doesn't map to another type
    Other,
}

impl CrimeType {
    /// Whether this type counts toward severe-crime alerts.
    #[must_use]
    pub const fn is_severe(self) -> bool {
        matches!(
            self,
            Self::Homicide | Self::Robbery | Self::RobberyHomicide | Self::Rape
        )
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Robbery,
            Self::Theft,
            Self::BodilyInjury,
            Self::Homicide,
            Self::RobberyHomicide,
            Self::Rape,
            Self::DrugTrafficking,
            Self::Threat,
            Self::DomesticViolence,
            Self::Other,
        ]
    }
}

/// Maps a raw crime description to the canonical [`CrimeType`].
///
/// Keyword matching is case-insensitive and accepts both the Portuguese
/// terms used by the state feed and English equivalents. Returns
/// [`CrimeType::Other`] when nothing matches.
#[must_use]
pub fn map_crime_type(raw: &str) -> CrimeType {
    let lower = raw.to_lowercase();

    // Latrocínio contains "roubo"-like semantics, check it first
    if contains_any(&lower, &["latrocínio", "latrocinio", "robbery homicide"]) {
        return CrimeType::RobberyHomicide;
    }
    if contains_any(&lower, &["homicídio", "homicidio", "homicide", "murder"]) {
        return CrimeType::Homicide;
    }
    if contains_any(&lower, &["estupro", "rape", "sexual assault"]) {
        return CrimeType::Rape;
    }
    if contains_any(&lower, &["roubo", "assalto", "robbery"]) {
        return CrimeType::Robbery;
    }
    if contains_any(&lower, &["furto", "theft", "larceny"]) {
        return CrimeType::Theft;
    }
    if contains_any(
        &lower,
        &["violência doméstica", "violencia domestica", "domestic"],
    ) {
        return CrimeType::DomesticViolence;
    }
    if contains_any(
        &lower,
        &["lesão corporal", "lesao corporal", "bodily injury", "assault"],
    ) {
        return CrimeType::BodilyInjury;
    }
    if contains_any(&lower, &["tráfico", "trafico", "drug", "entorpecente"]) {
        return CrimeType::DrugTrafficking;
    }
    if contains_any(&lower, &["ameaça", "ameaca", "threat"]) {
        return CrimeType::Threat;
    }

    CrimeType::Other
}

/// Time-of-day bucket an incident falls into.
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
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeOfDay {
    /// 00:00 to 05:59 (madrugada)
    Dawn,
    /// 06:00 to 11:59 (manhã)
    Morning,
    /// 12:00 to 17:59 (tarde)
    Afternoon,
    /// 18:00 to 23:59 (noite)
    Night,
}

impl TimeOfDay {
    /// Buckets an hour of the day (0-23).
    #[must_use]
    pub const fn from_hour(hour: u32) -> Self {
        match hour {
            0..=5 => Self::Dawn,
            6..=11 => Self::Morning,
            12..=17 => Self::Afternoon,
            _ => Self::Night,
        }
    }

    /// Buckets the hour component of a timestamp.
    #[must_use]
    pub fn from_timestamp(timestamp: &DateTime<Utc>) -> Self {
        Self::from_hour(timestamp.hour())
    }

    /// Parses a free-text period label such as `"Madrugada"` or `"night"`.
    #[must_use]
    pub fn parse_label(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "madrugada" | "dawn" | "early morning" => Some(Self::Dawn),
            "manhã" | "manha" | "morning" => Some(Self::Morning),
            "tarde" | "afternoon" => Some(Self::Afternoon),
            "noite" | "night" | "evening" => Some(Self::Night),
            _ => None,
        }
    }
}

/// Kind of police operation.
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
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationType {
    /// Saturation of a critical area
    Saturation,
    /// Cordon and search
    Siege,
    /// Joint military/civil police operation
    Integrated,
    /// Counter-narcotics operation
    AntiDrug,
    /// Ostensive patrol round
    OstensivePatrol,
    /// Domestic violence protective patrol
    DomesticViolencePatrol,
    /// Rural crime operation
    Rural,
    /// Anything else
    Other,
}

/// Maps a raw operation label to the canonical [`OperationType`].
#[must_use]
pub fn map_operation_type(raw: &str) -> OperationType {
    let lower = raw.to_lowercase();

    if lower.contains("satura") {
        return OperationType::Saturation;
    }
    if contains_any(&lower, &["cerco", "siege", "cordon"]) {
        return OperationType::Siege;
    }
    if contains_any(&lower, &["integrada", "integrated", "joint"]) {
        return OperationType::Integrated;
    }
    if contains_any(&lower, &["drogas", "drug", "narcotic"]) {
        return OperationType::AntiDrug;
    }
    if contains_any(&lower, &["ronda", "ostensiv", "patrol"]) {
        if contains_any(&lower, &["maria da penha", "domestic"]) {
            return OperationType::DomesticViolencePatrol;
        }
        return OperationType::OstensivePatrol;
    }
    if contains_any(&lower, &["maria da penha", "agressor", "domestic"]) {
        return OperationType::DomesticViolencePatrol;
    }
    if contains_any(&lower, &["agro", "rural"]) {
        return OperationType::Rural;
    }

    OperationType::Other
}

/// Checks if `haystack` contains any of the given `needles`.
fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// One reported crime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentRecord {
    /// Neighborhood name as it appeared in the source (not normalized).
    pub neighborhood: String,
    /// Canonical crime type.
    pub crime_type: CrimeType,
    /// When the incident was registered. `None` if the source value could
    /// not be parsed; such records still count toward totals.
    pub timestamp: Option<DateTime<Utc>>,
    /// Time-of-day bucket, if known.
    pub time_of_day: Option<TimeOfDay>,
}

impl IncidentRecord {
    /// Creates a record, deriving the time-of-day bucket from the
    /// timestamp.
    #[must_use]
    pub fn new(
        neighborhood: impl Into<String>,
        crime_type: CrimeType,
        timestamp: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            neighborhood: neighborhood.into(),
            crime_type,
            time_of_day: timestamp.as_ref().map(TimeOfDay::from_timestamp),
            timestamp,
        }
    }
}

/// One police action associated with a neighborhood and date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRecord {
    /// Neighborhood name as it appeared in the source (not normalized).
    pub neighborhood: String,
    /// Operation date, if parseable.
    pub date: Option<DateTime<Utc>>,
    /// Arrests made.
    pub arrests: u32,
    /// Firearms and other weapons seized.
    pub weapons_seized: u32,
    /// Drugs seized, in kilograms.
    pub drugs_seized_kg: f64,
    /// Deaths in confrontation with police.
    pub deaths: u32,
    /// Officers involved.
    pub officers_involved: u32,
    /// Operation kind.
    pub operation_type: OperationType,
    /// Whether the operation is still ongoing.
    pub active: bool,
}

impl OperationRecord {
    /// Creates an inactive operation with no outcomes for `neighborhood`.
    #[must_use]
    pub fn new(neighborhood: impl Into<String>, operation_type: OperationType) -> Self {
        Self {
            neighborhood: neighborhood.into(),
            date: None,
            arrests: 0,
            weapons_seized: 0,
            drugs_seized_kg: 0.0,
            deaths: 0,
            officers_involved: 0,
            operation_type,
            active: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn maps_state_feed_types() {
        assert_eq!(map_crime_type("ROUBO"), CrimeType::Robbery);
        assert_eq!(map_crime_type("Roubo a pedestre"), CrimeType::Robbery);
        assert_eq!(map_crime_type("FURTO"), CrimeType::Theft);
        assert_eq!(map_crime_type("LESÃO CORPORAL"), CrimeType::BodilyInjury);
        assert_eq!(map_crime_type("HOMICÍDIO"), CrimeType::Homicide);
        assert_eq!(map_crime_type("LATROCÍNIO"), CrimeType::RobberyHomicide);
        assert_eq!(map_crime_type("ESTUPRO"), CrimeType::Rape);
        assert_eq!(
            map_crime_type("TRÁFICO DE DROGAS"),
            CrimeType::DrugTrafficking
        );
        assert_eq!(map_crime_type("AMEAÇA"), CrimeType::Threat);
        assert_eq!(
            map_crime_type("VIOLÊNCIA DOMÉSTICA"),
            CrimeType::DomesticViolence
        );
    }

    #[test]
    fn unknown_fallback() {
        assert_eq!(map_crime_type("ESTELIONATO"), CrimeType::Other);
    }

    #[test]
    fn severe_types() {
        let severe: Vec<CrimeType> = CrimeType::all()
            .iter()
            .copied()
            .filter(|t| t.is_severe())
            .collect();
        assert_eq!(
            severe,
            vec![
                CrimeType::Robbery,
                CrimeType::Homicide,
                CrimeType::RobberyHomicide,
                CrimeType::Rape
            ]
        );
    }

    #[test]
    fn time_of_day_buckets() {
        assert_eq!(TimeOfDay::from_hour(0), TimeOfDay::Dawn);
        assert_eq!(TimeOfDay::from_hour(5), TimeOfDay::Dawn);
        assert_eq!(TimeOfDay::from_hour(6), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(12), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(18), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(23), TimeOfDay::Night);
    }

    #[test]
    fn parses_period_labels() {
        assert_eq!(TimeOfDay::parse_label("Manhã"), Some(TimeOfDay::Morning));
        assert_eq!(TimeOfDay::parse_label(" NOITE "), Some(TimeOfDay::Night));
        assert_eq!(TimeOfDay::parse_label("whenever"), None);
    }

    #[test]
    fn incident_derives_time_of_day() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 10, 2, 30, 0).unwrap();
        let record = IncidentRecord::new("Centro", CrimeType::Theft, Some(ts));
        assert_eq!(record.time_of_day, Some(TimeOfDay::Dawn));

        let undated = IncidentRecord::new("Centro", CrimeType::Theft, None);
        assert_eq!(undated.time_of_day, None);
    }

    #[test]
    fn maps_operation_labels() {
        assert_eq!(
            map_operation_type("Operação Saturação"),
            OperationType::Saturation
        );
        assert_eq!(
            map_operation_type("Patrulha Maria da Penha"),
            OperationType::DomesticViolencePatrol
        );
        assert_eq!(
            map_operation_type("Ronda Ostensiva"),
            OperationType::OstensivePatrol
        );
        assert_eq!(
            map_operation_type("Operação Anti-Drogas"),
            OperationType::AntiDrug
        );
        assert_eq!(
            map_operation_type("Operação Agro-Hórus"),
            OperationType::Rural
        );
        assert_eq!(map_operation_type("Operação Cerco"), OperationType::Siege);
        assert_eq!(map_operation_type("???"), OperationType::Other);
    }
}
