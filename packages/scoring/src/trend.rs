//! 30-day-over-30-day trend classification.
//!
//! A neighborhood is `Rising` when the last window has strictly more than
//! 20% more incidents than the prior one, `Falling` when it has strictly
//! more than 20% fewer, and `Stable` otherwise. Exactly +/-20% is stable.

use crime_risk_scoring_models::{NeighborhoodAggregate, Trend};

/// Minimum incidents a neighborhood needs before its trend is computed.
pub const MIN_TREND_SAMPLE: u64 = 10;

/// Classifies the trend of an aggregate's two 30-day windows.
///
/// Returns [`Trend::Stable`] when the prior window is empty or the
/// neighborhood has fewer than [`MIN_TREND_SAMPLE`] incidents.
#[must_use]
pub const fn classify_trend(aggregate: &NeighborhoodAggregate) -> Trend {
    if aggregate.total_crimes < MIN_TREND_SAMPLE {
        return Trend::Stable;
    }
    compare_windows(aggregate.crimes_last_30_days, aggregate.crimes_prior_30_days)
}

/// Compares two window counts.
///
/// Works in integers: `(last - prior) / prior > 1/5` is `5 * last > 6 * prior`
/// and `< -1/5` is `5 * last < 4 * prior`, so the 20% boundary is exact.
#[must_use]
#[allow(clippy::cast_lossless)]
pub const fn compare_windows(last: u64, prior: u64) -> Trend {
    if prior == 0 {
        return Trend::Stable;
    }
    let last = last as u128 * 5;
    let prior = prior as u128;
    if last > prior * 6 {
        Trend::Rising
    } else if last < prior * 4 {
        Trend::Falling
    } else {
        Trend::Stable
    }
}

/// Fractional change from `prior` to `last`, or `None` when `prior` is 0.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percent_change(last: u64, prior: u64) -> Option<f64> {
    if prior == 0 {
        return None;
    }
    Some((last as f64 - prior as f64) / prior as f64)
}
