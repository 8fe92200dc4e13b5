//! Plaintext report and tooltip rendering.

use std::{collections::BTreeMap, fmt::Write as _};

use chrono::{DateTime, Utc};
use crime_risk_incident_models::CrimeType;
use crime_risk_scoring::ScoredNeighborhood;
use crime_risk_scoring_models::Alert;

/// Recommendations shown per neighborhood unless configured otherwise.
pub const DEFAULT_MAX_RECOMMENDATIONS: usize = 4;

const RULE: &str = "============================================================";
const SUBRULE: &str = "------------------------------";

/// Report rendering knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    /// Timestamp printed in the header.
    pub generated_at: DateTime<Utc>,
    /// How many recommendations to list per neighborhood.
    pub max_recommendations: usize,
    /// How many crime types to list in the breakdown.
    pub max_crime_types: usize,
}

impl ReportOptions {
    /// Default options stamped with `generated_at`.
    #[must_use]
    pub const fn new(generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            max_recommendations: DEFAULT_MAX_RECOMMENDATIONS,
            max_crime_types: 10,
        }
    }
}

/// One-line hover text for a neighborhood on a map.
#[must_use]
pub fn tooltip(scored: &ScoredNeighborhood) -> String {
    let assessment = &scored.assessment;
    let aggregate = &scored.aggregate;
    format!(
        "{}: {} crimes - {} (score {:.1}) | {} operations, {} deaths | trend {}",
        assessment.neighborhood,
        aggregate.total_crimes,
        assessment.risk_level,
        assessment.score,
        aggregate.total_operations,
        aggregate.deaths,
        assessment.trend,
    )
}

/// Renders the full plaintext report.
///
/// Neighborhoods are listed by score descending, ties by name, regardless
/// of the order they are passed in.
#[must_use]
pub fn render_report(
    scored: &[ScoredNeighborhood],
    alerts: &[Alert],
    options: &ReportOptions,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "NEIGHBORHOOD RISK REPORT");
    let _ = writeln!(
        out,
        "Generated: {}",
        options.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out);

    if scored.is_empty() {
        let _ = writeln!(out, "No neighborhood data available.");
        return out;
    }

    let mut ordered: Vec<ScoredNeighborhood> = scored.to_vec();
    crime_risk_scoring::sort_by_score(&mut ordered);

    write_summary(&mut out, &ordered);
    write_crime_types(&mut out, &ordered, options.max_crime_types);
    write_neighborhoods(&mut out, &ordered, options.max_recommendations);
    write_alerts(&mut out, alerts);

    log::debug!(
        "Rendered report for {} neighborhoods and {} alerts",
        ordered.len(),
        alerts.len()
    );
    out
}

fn write_summary(out: &mut String, scored: &[ScoredNeighborhood]) {
    let total_crimes: u64 = scored.iter().map(|s| s.aggregate.total_crimes).sum();
    let total_operations: u64 = scored.iter().map(|s| s.aggregate.total_operations).sum();
    let elevated = scored
        .iter()
        .filter(|s| s.assessment.risk_level.is_elevated())
        .count();

    let _ = writeln!(out, "SUMMARY");
    let _ = writeln!(out, "{SUBRULE}");
    let _ = writeln!(out, "Neighborhoods assessed: {}", scored.len());
    let _ = writeln!(out, "Total incidents: {total_crimes}");
    let _ = writeln!(out, "Total police operations: {total_operations}");
    let _ = writeln!(out, "Elevated-risk neighborhoods: {elevated}");
    let _ = writeln!(out);
}

#[allow(clippy::cast_precision_loss)]
fn write_crime_types(out: &mut String, scored: &[ScoredNeighborhood], limit: usize) {
    let mut by_type: BTreeMap<CrimeType, u64> = BTreeMap::new();
    for s in scored {
        for (crime_type, count) in &s.aggregate.crimes_by_type {
            *by_type.entry(*crime_type).or_default() += count;
        }
    }
    let total: u64 = by_type.values().sum();
    if total == 0 {
        return;
    }

    let mut types: Vec<(CrimeType, u64)> = by_type.into_iter().collect();
    types.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let _ = writeln!(out, "CRIMES BY TYPE");
    let _ = writeln!(out, "{SUBRULE}");
    for (crime_type, count) in types.into_iter().take(limit) {
        let share = count as f64 / total as f64 * 100.0;
        let _ = writeln!(out, "{crime_type}: {count} ({share:.1}%)");
    }
    let _ = writeln!(out);
}

fn write_neighborhoods(out: &mut String, scored: &[ScoredNeighborhood], max_recommendations: usize) {
    let _ = writeln!(out, "NEIGHBORHOODS");
    let _ = writeln!(out, "{SUBRULE}");
    for (rank, s) in scored.iter().enumerate() {
        let a = &s.assessment;
        let _ = writeln!(out, "{}. {}", rank + 1, a.neighborhood);
        let _ = writeln!(out, "   Level: {} (score {:.1})", a.risk_level, a.score);
        let _ = writeln!(
            out,
            "   Incidents: {} | Operations: {} | Deaths: {}",
            s.aggregate.total_crimes, s.aggregate.total_operations, s.aggregate.deaths
        );
        let _ = writeln!(
            out,
            "   Effectiveness: {:.1}% | Coverage: {} | Trend: {}",
            a.effectiveness_percent, a.operation_coverage, a.trend
        );
        let _ = writeln!(out, "   Recommendations:");
        for recommendation in a.recommendations.iter().take(max_recommendations) {
            let _ = writeln!(out, "   - {recommendation}");
        }
    }
    let _ = writeln!(out);
}

fn write_alerts(out: &mut String, alerts: &[Alert]) {
    let _ = writeln!(out, "ALERTS");
    let _ = writeln!(out, "{SUBRULE}");
    if alerts.is_empty() {
        let _ = writeln!(out, "No alerts.");
        return;
    }
    for alert in alerts {
        let _ = writeln!(
            out,
            "[{}] {} - {}: {}",
            alert.priority, alert.neighborhood, alert.kind, alert.description
        );
    }
}
