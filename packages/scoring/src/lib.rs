#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Synergistic neighborhood risk scoring.
//!
//! Two pure stages:
//!
//! - [`aggregate`] reduces incident and police-operation records to one
//!   [`NeighborhoodAggregate`] per neighborhood.
//! - [`score`], [`trend`] and [`recommend`] turn an aggregate into a
//!   [`RiskAssessment`].
//!
//! [`alerts`] raises volume, increase and severe-crime alerts from the same
//! aggregates. Nothing here performs I/O, holds shared state, or fails on
//! well-formed input; every call may run concurrently for different
//! neighborhoods.

pub mod aggregate;
pub mod alerts;
pub mod recommend;
pub mod score;
pub mod trend;

use chrono::{DateTime, Utc};
use crime_risk_incident_models::{IncidentRecord, OperationRecord};
use crime_risk_neighborhood_names::NameTable;
use serde::Serialize;

pub use aggregate::Aggregator;
pub use crime_risk_scoring_models::{NeighborhoodAggregate, RiskAssessment};

/// An aggregate together with the assessment computed from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredNeighborhood {
    /// Source counts.
    pub aggregate: NeighborhoodAggregate,
    /// Derived assessment.
    pub assessment: RiskAssessment,
}

/// Scores one neighborhood from raw records.
///
/// `now` defaults to the latest incident timestamp when `None`.
#[must_use]
pub fn assess_neighborhood(
    names: &NameTable,
    incidents: &[IncidentRecord],
    operations: &[OperationRecord],
    neighborhood: &str,
    now: Option<DateTime<Utc>>,
) -> ScoredNeighborhood {
    let aggregate = Aggregator::new(names).aggregate(incidents, operations, neighborhood, now);
    let assessment = score::assess(&aggregate);
    ScoredNeighborhood {
        aggregate,
        assessment,
    }
}

/// Scores every neighborhood present in either record set.
///
/// Records are grouped in a single pass. Results are sorted by score
/// descending, ties broken by neighborhood name.
#[must_use]
pub fn assess_all(
    names: &NameTable,
    incidents: &[IncidentRecord],
    operations: &[OperationRecord],
    now: Option<DateTime<Utc>>,
) -> Vec<ScoredNeighborhood> {
    let mut scored: Vec<ScoredNeighborhood> = Aggregator::new(names)
        .aggregate_all(incidents, operations, now)
        .into_values()
        .map(|aggregate| {
            let assessment = score::assess(&aggregate);
            ScoredNeighborhood {
                aggregate,
                assessment,
            }
        })
        .collect();

    sort_by_score(&mut scored);
    scored
}

/// Sorts by score descending, then by neighborhood name.
pub fn sort_by_score(scored: &mut [ScoredNeighborhood]) {
    scored.sort_by(|a, b| {
        b.assessment
            .score
            .total_cmp(&a.assessment.score)
            .then_with(|| a.assessment.neighborhood.cmp(&b.assessment.neighborhood))
    });
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use crime_risk_incident_models::{CrimeType, OperationType};
    use crime_risk_neighborhood_names::default_table;
    use crime_risk_scoring_models::{RiskLevel, Trend};

    use super::*;

    fn incidents(name: &str, count: usize) -> Vec<IncidentRecord> {
        let ts = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        (0..count)
            .map(|_| IncidentRecord::new(name, CrimeType::Theft, Some(ts)))
            .collect()
    }

    #[test]
    fn scenario_fifty_crimes_no_operations_is_high() {
        let records = incidents("Menino Deus", 50);
        let scored = assess_neighborhood(default_table(), &records, &[], "MENINO DEUS", None);
        assert!((scored.assessment.score - 50.0).abs() < f64::EPSILON);
        assert_eq!(scored.assessment.risk_level, RiskLevel::High);
    }

    #[test]
    fn scenario_one_death_is_critical() {
        let records = incidents("Menino Deus", 50);
        let mut op = OperationRecord::new("menino deus", OperationType::Saturation);
        op.deaths = 1;
        // The death comes from an operation record, so one operation
        // exists; the reduction is still applied on top of the penalty.
        let scored = assess_neighborhood(default_table(), &records, &[op], "Menino Deus", None);
        assert!(scored.assessment.score > 120.0);
        assert_eq!(scored.assessment.risk_level, RiskLevel::Critical);
        assert!(
            scored
                .assessment
                .recommendations
                .iter()
                .any(|r| r.contains("use-of-force"))
        );
    }

    #[test]
    fn scenario_unknown_neighborhood_is_zero_state() {
        let records = incidents("Menino Deus", 50);
        let scored = assess_neighborhood(default_table(), &records, &[], "Nowhere", None);
        assert_eq!(scored.aggregate.total_crimes, 0);
        assert!(scored.assessment.score.abs() < f64::EPSILON);
        assert_eq!(scored.assessment.risk_level, RiskLevel::VeryLow);
        assert_eq!(scored.assessment.trend, Trend::Stable);
    }

    #[test]
    fn scenario_empty_collections_are_zero_state() {
        let scored = assess_neighborhood(default_table(), &[], &[], "Centro", None);
        assert_eq!(scored.aggregate.neighborhood, "CENTRO HISTÓRICO");
        assert_eq!(scored.assessment.risk_level, RiskLevel::VeryLow);
        assert_eq!(
            scored.assessment.recommendations,
            vec![recommend::MAINTAIN_PREVENTIVE.to_string()]
        );
    }

    #[test]
    fn assess_all_sorts_by_score_descending() {
        let mut records = incidents("Centro", 40);
        records.extend(incidents("Cidade Baixa", 10));
        records.extend(incidents("Azenha", 25));
        records.extend(incidents("Bom Fim", 25));

        let scored = assess_all(default_table(), &records, &[], None);
        let names: Vec<&str> = scored
            .iter()
            .map(|s| s.assessment.neighborhood.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["CENTRO HISTÓRICO", "AZENHA", "BOM FIM", "CIDADE BAIXA"]
        );
    }
}
