//! Risk score, level classification and effectiveness.
//!
//! ```text
//! score = total_crimes
//!       + deaths * 75
//!       - arrests * 3
//!       - weapons * 8
//!       - drugs_kg * 5
//!       - active_operations * 2
//! score = max(0, score)
//! if total_operations > 0 and total_crimes > 0:
//!     score *= 1 - min(0.5, total_operations / total_crimes)
//! ```
//!
//! A neighborhood with no crimes always scores zero, whatever its
//! operation record.

use crime_risk_scoring_models::{
    NeighborhoodAggregate, OperationCoverage, RiskAssessment, RiskLevel,
};

use crate::{recommend, trend};

/// Score added per death in confrontation.
pub const DEATH_PENALTY: f64 = 75.0;
/// Score removed per arrest.
pub const ARREST_CREDIT: f64 = 3.0;
/// Score removed per weapon seized.
pub const WEAPON_CREDIT: f64 = 8.0;
/// Score removed per kilogram of drugs seized.
pub const DRUG_KG_CREDIT: f64 = 5.0;
/// Score removed per active operation.
pub const ACTIVE_OPERATION_CREDIT: f64 = 2.0;
/// Upper bound on the operations-to-crimes reduction factor.
pub const MAX_OPERATIONS_REDUCTION: f64 = 0.5;

/// Level thresholds, highest first. A score belongs to the first level
/// whose threshold it meets.
const LEVEL_THRESHOLDS: [(f64, RiskLevel); 7] = [
    (120.0, RiskLevel::Critical),
    (80.0, RiskLevel::VeryHigh),
    (50.0, RiskLevel::High),
    (30.0, RiskLevel::MediumHigh),
    (15.0, RiskLevel::Medium),
    (8.0, RiskLevel::LowMedium),
    (3.0, RiskLevel::Low),
];

/// Computes the composite risk score for an aggregate.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn risk_score(aggregate: &NeighborhoodAggregate) -> f64 {
    if aggregate.total_crimes == 0 {
        return 0.0;
    }

    let crimes = aggregate.total_crimes as f64;
    let raw = crimes + aggregate.deaths as f64 * DEATH_PENALTY
        - aggregate.arrests as f64 * ARREST_CREDIT
        - aggregate.weapons as f64 * WEAPON_CREDIT
        - aggregate.drugs_kg * DRUG_KG_CREDIT
        - aggregate.active_operations_count as f64 * ACTIVE_OPERATION_CREDIT;

    // `max` also maps a NaN from bad drug weights to zero
    let score = raw.max(0.0);

    if aggregate.total_operations > 0 {
        let factor = (aggregate.total_operations as f64 / crimes).min(MAX_OPERATIONS_REDUCTION);
        return score * (1.0 - factor);
    }

    score
}

/// Classifies a score into a [`RiskLevel`].
#[must_use]
pub fn classify(score: f64) -> RiskLevel {
    LEVEL_THRESHOLDS
        .iter()
        .find(|(threshold, _)| score >= *threshold)
        .map_or(RiskLevel::VeryLow, |(_, level)| *level)
}

/// Percentage of crime volume offset by arrests, seizures and active
/// operations, clamped to `[0, 100]`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn effectiveness_percent(aggregate: &NeighborhoodAggregate) -> f64 {
    if aggregate.total_crimes == 0 {
        return 0.0;
    }

    let crimes = aggregate.total_crimes as f64;
    let arrests = aggregate.arrests as f64 / crimes;
    let seizures = (aggregate.weapons as f64 + aggregate.drugs_kg) / crimes;
    let active = aggregate.active_operations_count as f64 / crimes;

    let percent = arrests.mul_add(0.4, seizures.mul_add(0.3, active * 0.3)) * 100.0;
    if percent.is_nan() {
        return 0.0;
    }
    percent.clamp(0.0, 100.0)
}

/// Rates operation coverage from the operations-to-crimes ratio.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn operation_coverage(aggregate: &NeighborhoodAggregate) -> OperationCoverage {
    if aggregate.total_operations == 0 || aggregate.total_crimes == 0 {
        return OperationCoverage::NotAssessable;
    }
    let ratio = aggregate.total_operations as f64 / aggregate.total_crimes as f64;
    if ratio >= 0.3 {
        OperationCoverage::High
    } else if ratio >= 0.15 {
        OperationCoverage::Medium
    } else {
        OperationCoverage::Low
    }
}

/// Produces the full assessment for an aggregate.
#[must_use]
pub fn assess(aggregate: &NeighborhoodAggregate) -> RiskAssessment {
    let score = risk_score(aggregate);
    let risk_level = classify(score);
    let trend = trend::classify_trend(aggregate);

    RiskAssessment {
        neighborhood: aggregate.neighborhood.clone(),
        score,
        risk_level,
        effectiveness_percent: effectiveness_percent(aggregate),
        recommendations: recommend::recommendations(aggregate, risk_level, trend),
        trend,
        operation_coverage: operation_coverage(aggregate),
    }
}

#[cfg(test)]
mod tests {
    use crime_risk_scoring_models::Trend;

    use super::*;

    fn aggregate(total_crimes: u64) -> NeighborhoodAggregate {
        NeighborhoodAggregate {
            total_crimes,
            ..NeighborhoodAggregate::empty("TEST")
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn fifty_crimes_without_operations_is_high() {
        let agg = aggregate(50);
        assert_close(risk_score(&agg), 50.0);
        assert_eq!(classify(risk_score(&agg)), RiskLevel::High);
    }

    #[test]
    fn one_death_without_operations_is_critical() {
        let agg = NeighborhoodAggregate {
            deaths: 1,
            ..aggregate(50)
        };
        assert_close(risk_score(&agg), 125.0);
        assert_eq!(classify(risk_score(&agg)), RiskLevel::Critical);
    }

    #[test]
    fn mitigation_clamps_then_reduces() {
        let agg = NeighborhoodAggregate {
            total_operations: 20,
            arrests: 15,
            weapons: 5,
            ..aggregate(50)
        };
        assert_close(risk_score(&agg), 0.0);
        assert_eq!(classify(risk_score(&agg)), RiskLevel::VeryLow);
    }

    #[test]
    fn operations_reduction_is_capped_at_half() {
        let agg = NeighborhoodAggregate {
            total_operations: 200,
            ..aggregate(40)
        };
        assert_close(risk_score(&agg), 20.0);

        let agg = NeighborhoodAggregate {
            total_operations: 10,
            ..aggregate(40)
        };
        assert_close(risk_score(&agg), 30.0);
    }

    #[test]
    fn zero_crimes_is_zero_state() {
        let agg = NeighborhoodAggregate {
            deaths: 3,
            total_operations: 4,
            arrests: 2,
            ..aggregate(0)
        };
        let assessment = assess(&agg);
        assert_close(assessment.score, 0.0);
        assert_eq!(assessment.risk_level, RiskLevel::VeryLow);
        assert_close(assessment.effectiveness_percent, 0.0);
        assert_eq!(assessment.trend, Trend::Stable);
        assert_eq!(
            assessment.recommendations,
            vec![recommend::MAINTAIN_PREVENTIVE.to_string()]
        );
    }

    #[test]
    fn score_is_never_negative() {
        for arrests in [0, 1, 10, 1000] {
            for weapons in [0, 5, 500] {
                for drugs_kg in [0.0, 2.5, 1e6] {
                    for operations in [0, 1, 100] {
                        let agg = NeighborhoodAggregate {
                            arrests,
                            weapons,
                            drugs_kg,
                            total_operations: operations,
                            active_operations_count: operations / 2,
                            ..aggregate(25)
                        };
                        assert!(risk_score(&agg) >= 0.0);
                    }
                }
            }
        }
    }

    #[test]
    fn deaths_never_decrease_score() {
        for operations in [0, 3, 60] {
            let mut previous = -1.0;
            for deaths in 0..6 {
                let agg = NeighborhoodAggregate {
                    deaths,
                    total_operations: operations,
                    arrests: 4,
                    ..aggregate(30)
                };
                let score = risk_score(&agg);
                assert!(score > previous, "deaths={deaths} ops={operations}");
                previous = score;
            }
        }
    }

    #[test]
    fn death_adds_exactly_the_penalty_before_reduction() {
        let base = aggregate(30);
        let with_death = NeighborhoodAggregate {
            deaths: 1,
            ..aggregate(30)
        };
        assert_close(risk_score(&with_death) - risk_score(&base), DEATH_PENALTY);
    }

    #[test]
    fn mitigation_never_increases_score() {
        let base = NeighborhoodAggregate {
            total_operations: 5,
            ..aggregate(60)
        };
        let base_score = risk_score(&base);

        let more_arrests = NeighborhoodAggregate {
            arrests: 3,
            ..base.clone()
        };
        let more_weapons = NeighborhoodAggregate {
            weapons: 2,
            ..base.clone()
        };
        let more_drugs = NeighborhoodAggregate {
            drugs_kg: 1.25,
            ..base.clone()
        };
        assert!(risk_score(&more_arrests) <= base_score);
        assert!(risk_score(&more_weapons) <= base_score);
        assert!(risk_score(&more_drugs) <= base_score);

        let mut previous = f64::INFINITY;
        for arrests in 0..30 {
            let score = risk_score(&NeighborhoodAggregate {
                arrests,
                ..base.clone()
            });
            assert!(score <= previous);
            previous = score;
        }
    }

    #[test]
    fn classification_boundaries() {
        let cases = [
            (120.0, RiskLevel::Critical),
            (119.99, RiskLevel::VeryHigh),
            (80.0, RiskLevel::VeryHigh),
            (79.99, RiskLevel::High),
            (50.0, RiskLevel::High),
            (49.99, RiskLevel::MediumHigh),
            (30.0, RiskLevel::MediumHigh),
            (29.99, RiskLevel::Medium),
            (15.0, RiskLevel::Medium),
            (14.99, RiskLevel::LowMedium),
            (8.0, RiskLevel::LowMedium),
            (7.99, RiskLevel::Low),
            (3.0, RiskLevel::Low),
            (2.99, RiskLevel::VeryLow),
            (0.0, RiskLevel::VeryLow),
            (1_000.0, RiskLevel::Critical),
        ];
        for (score, expected) in cases {
            assert_eq!(classify(score), expected, "score {score}");
        }
    }

    #[test]
    fn effectiveness_formula() {
        let agg = NeighborhoodAggregate {
            arrests: 10,
            weapons: 5,
            drugs_kg: 5.0,
            active_operations_count: 10,
            ..aggregate(100)
        };
        // (0.1 * 0.4 + 0.1 * 0.3 + 0.1 * 0.3) * 100
        assert_close(effectiveness_percent(&agg), 10.0);
    }

    #[test]
    fn effectiveness_is_clamped() {
        let agg = NeighborhoodAggregate {
            arrests: 500,
            ..aggregate(2)
        };
        assert_close(effectiveness_percent(&agg), 100.0);
        assert_close(effectiveness_percent(&aggregate(0)), 0.0);
    }

    #[test]
    fn coverage_ratings() {
        let rate = |ops| {
            operation_coverage(&NeighborhoodAggregate {
                total_operations: ops,
                ..aggregate(100)
            })
        };
        assert_eq!(rate(0), OperationCoverage::NotAssessable);
        assert_eq!(rate(14), OperationCoverage::Low);
        assert_eq!(rate(15), OperationCoverage::Medium);
        assert_eq!(rate(30), OperationCoverage::High);
        assert_eq!(
            operation_coverage(&NeighborhoodAggregate {
                total_operations: 3,
                ..aggregate(0)
            }),
            OperationCoverage::NotAssessable
        );
    }

    #[test]
    fn assessment_carries_neighborhood() {
        let agg = NeighborhoodAggregate {
            neighborhood: "RESTINGA".to_string(),
            ..aggregate(12)
        };
        let assessment = assess(&agg);
        assert_eq!(assessment.neighborhood, "RESTINGA");
        assert_eq!(assessment.risk_level, RiskLevel::LowMedium);
    }
}
