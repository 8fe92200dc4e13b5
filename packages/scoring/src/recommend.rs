//! Recommendation rules.
//!
//! Level-based advice comes first, followed by each condition rule that
//! fires. The list is returned whole; display code decides how many to
//! show.

use crime_risk_scoring_models::{NeighborhoodAggregate, RiskLevel, Trend};

pub const INCREASE_PATROLS: &str = "Increase patrols in the area";
pub const PREVENTIVE_OPERATIONS: &str = "Implement preventive operations";
pub const IMPROVE_LIGHTING: &str = "Improve public lighting";
pub const REGULAR_SURVEILLANCE: &str = "Maintain regular surveillance";
pub const COMMUNITY_ACTIONS: &str = "Implement community safety actions";
pub const MAINTAIN_PREVENTIVE: &str = "Maintain current preventive actions";
pub const CONSIDER_OPERATIONS: &str = "Consider implementing police operations";
pub const FOCUS_ARRESTS: &str = "Focus operations on arrests";
pub const REVIEW_USE_OF_FORCE: &str = "Review use-of-force protocols";
pub const REINFORCE_MONITORING: &str = "Reinforce monitoring: crime trend is rising";

/// Crimes above which a neighborhood without operations gets flagged.
const OPERATIONS_CRIME_FLOOR: u64 = 5;
/// Crimes above which a neighborhood without arrests gets flagged.
const ARRESTS_CRIME_FLOOR: u64 = 10;

/// Builds the ordered recommendation list for an assessed neighborhood.
#[must_use]
pub fn recommendations(
    aggregate: &NeighborhoodAggregate,
    level: RiskLevel,
    trend: Trend,
) -> Vec<String> {
    let mut out: Vec<&str> = match level {
        RiskLevel::Critical | RiskLevel::VeryHigh | RiskLevel::High => {
            vec![INCREASE_PATROLS, PREVENTIVE_OPERATIONS, IMPROVE_LIGHTING]
        }
        RiskLevel::MediumHigh | RiskLevel::Medium => {
            vec![REGULAR_SURVEILLANCE, COMMUNITY_ACTIONS]
        }
        RiskLevel::LowMedium | RiskLevel::Low | RiskLevel::VeryLow => vec![MAINTAIN_PREVENTIVE],
    };

    if aggregate.total_operations == 0 && aggregate.total_crimes > OPERATIONS_CRIME_FLOOR {
        out.push(CONSIDER_OPERATIONS);
    }
    if aggregate.arrests == 0 && aggregate.total_crimes > ARRESTS_CRIME_FLOOR {
        out.push(FOCUS_ARRESTS);
    }
    // Zero-crime neighborhoods always get the bare zero-state advice
    if aggregate.deaths > 0 && aggregate.total_crimes > 0 {
        out.push(REVIEW_USE_OF_FORCE);
    }
    if trend == Trend::Rising {
        out.push(REINFORCE_MONITORING);
    }

    out.into_iter().map(str::to_string).collect()
}
