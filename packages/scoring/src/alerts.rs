//! Alert generation from 30-day windows.

use crime_risk_scoring_models::{Alert, AlertKind, AlertPriority, NeighborhoodAggregate};
use serde::{Deserialize, Serialize};

use crate::trend::percent_change;

/// Tunable alert thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct AlertThresholds {
    /// Incidents in the last 30 days that trigger a volume alert.
    pub volume: u64,
    /// Fractional increase over the prior window that triggers an
    /// increase alert (inclusive).
    pub increase: f64,
    /// Fractional increase at which an increase alert becomes high
    /// priority.
    pub increase_high: f64,
    /// Severe incidents in the last 30 days that trigger a critical alert.
    pub severe: u64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            volume: 10,
            increase: 0.3,
            increase_high: 0.5,
            severe: 3,
        }
    }
}

/// Raises alerts for every aggregate.
///
/// Sorted most urgent first, then by neighborhood name. Alerts of equal
/// priority for the same neighborhood keep their rule order (volume,
/// increase, severe).
#[must_use]
pub fn generate_alerts<'a>(
    aggregates: impl IntoIterator<Item = &'a NeighborhoodAggregate>,
    thresholds: &AlertThresholds,
) -> Vec<Alert> {
    let mut alerts: Vec<Alert> = aggregates
        .into_iter()
        .flat_map(|aggregate| alerts_for(aggregate, thresholds))
        .collect();

    alerts.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| a.neighborhood.cmp(&b.neighborhood))
    });

    log::debug!("Generated {} alerts", alerts.len());
    alerts
}

/// Raises the alerts for a single aggregate, in rule order.
#[must_use]
pub fn alerts_for(aggregate: &NeighborhoodAggregate, thresholds: &AlertThresholds) -> Vec<Alert> {
    let mut alerts = Vec::new();
    let recent = aggregate.crimes_last_30_days;
    let prior = aggregate.crimes_prior_30_days;

    if thresholds.volume > 0 && recent >= thresholds.volume {
        alerts.push(Alert {
            kind: AlertKind::HighVolume,
            neighborhood: aggregate.neighborhood.clone(),
            description: format!("{recent} incidents in the last 30 days"),
            priority: if recent >= thresholds.volume.saturating_mul(2) {
                AlertPriority::High
            } else {
                AlertPriority::Medium
            },
        });
    }

    let change = percent_change(recent, prior).filter(|c| *c >= thresholds.increase);
    if let Some(change) = change {
        alerts.push(Alert {
            kind: AlertKind::SignificantIncrease,
            neighborhood: aggregate.neighborhood.clone(),
            description: format!(
                "Increase of {:.1}% (from {prior} to {recent})",
                change * 100.0
            ),
            priority: if change >= thresholds.increase_high {
                AlertPriority::High
            } else {
                AlertPriority::Medium
            },
        });
    }

    let severe = aggregate.severe_crimes_last_30_days;
    if thresholds.severe > 0 && severe >= thresholds.severe {
        alerts.push(Alert {
            kind: AlertKind::SevereCrimes,
            neighborhood: aggregate.neighborhood.clone(),
            description: format!("{severe} severe crimes in the last 30 days"),
            priority: AlertPriority::Critical,
        });
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregate(name: &str, recent: u64, prior: u64, severe: u64) -> NeighborhoodAggregate {
        NeighborhoodAggregate {
            total_crimes: recent + prior,
            crimes_last_30_days: recent,
            crimes_prior_30_days: prior,
            severe_crimes_last_30_days: severe,
            ..NeighborhoodAggregate::empty(name)
        }
    }

    #[test]
    fn quiet_neighborhood_has_no_alerts() {
        let alerts = alerts_for(&aggregate("LAMI", 3, 3, 0), &AlertThresholds::default());
        assert!(alerts.is_empty());
    }

    #[test]
    fn volume_alert_priority_doubles() {
        let thresholds = AlertThresholds::default();
        let medium = alerts_for(&aggregate("A", 10, 10, 0), &thresholds);
        assert_eq!(medium.len(), 1);
        assert_eq!(medium[0].kind, AlertKind::HighVolume);
        assert_eq!(medium[0].priority, AlertPriority::Medium);

        let high = alerts_for(&aggregate("A", 20, 20, 0), &thresholds);
        assert_eq!(high[0].priority, AlertPriority::High);
    }

    #[test]
    fn increase_alert_is_inclusive() {
        let thresholds = AlertThresholds::default();
        let alerts = alerts_for(&aggregate("A", 4, 3, 0), &thresholds);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::SignificantIncrease);
        assert_eq!(alerts[0].priority, AlertPriority::Medium);
        assert_eq!(alerts[0].description, "Increase of 33.3% (from 3 to 4)");

        let alerts = alerts_for(&aggregate("A", 6, 4, 0), &thresholds);
        assert_eq!(alerts[0].priority, AlertPriority::High);

        assert!(alerts_for(&aggregate("A", 5, 0, 0), &thresholds).is_empty());
    }

    #[test]
    fn severe_alert_is_critical() {
        let alerts = alerts_for(&aggregate("A", 3, 3, 3), &AlertThresholds::default());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::SevereCrimes);
        assert_eq!(alerts[0].priority, AlertPriority::Critical);
    }

    #[test]
    fn alerts_sort_by_priority_then_name() {
        let aggregates = vec![
            aggregate("BELA VISTA", 10, 10, 0),
            aggregate("AZENHA", 25, 5, 0),
            aggregate("CRISTAL", 2, 2, 4),
        ];
        let alerts = generate_alerts(&aggregates, &AlertThresholds::default());
        let summary: Vec<(AlertPriority, &str, AlertKind)> = alerts
            .iter()
            .map(|a| (a.priority, a.neighborhood.as_str(), a.kind))
            .collect();
        assert_eq!(
            summary,
            vec![
                (AlertPriority::Critical, "CRISTAL", AlertKind::SevereCrimes),
                (AlertPriority::High, "AZENHA", AlertKind::HighVolume),
                (AlertPriority::High, "AZENHA", AlertKind::SignificantIncrease),
                (AlertPriority::Medium, "BELA VISTA", AlertKind::HighVolume),
            ]
        );
    }

    #[test]
    fn thresholds_deserialize_with_defaults() {
        let thresholds: AlertThresholds = toml::de::from_str("volume = 25").unwrap();
        assert_eq!(thresholds.volume, 25);
        assert_eq!(thresholds.severe, 3);
    }
}
