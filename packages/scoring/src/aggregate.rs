//! Reduces raw records to per-neighborhood aggregates.
//!
//! A record belongs to a neighborhood when both names normalize to the
//! same canonical spelling. Records with a blank neighborhood are ignored.
//! Incidents without a timestamp count toward totals but fall in neither
//! 30-day window.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use crime_risk_incident_models::{IncidentRecord, OperationRecord};
use crime_risk_neighborhood_names::{NameTable, default_table};
use crime_risk_scoring_models::NeighborhoodAggregate;

/// Length of each trend window in days.
pub const TREND_WINDOW_DAYS: i64 = 30;

/// Groups and sums records by normalized neighborhood name.
#[derive(Debug, Clone, Copy)]
pub struct Aggregator<'a> {
    names: &'a NameTable,
}

impl Default for Aggregator<'static> {
    fn default() -> Self {
        Self::new(default_table())
    }
}

impl<'a> Aggregator<'a> {
    /// Creates an aggregator that resolves names through `names`.
    #[must_use]
    pub const fn new(names: &'a NameTable) -> Self {
        Self { names }
    }

    /// Builds the aggregate for a single neighborhood.
    ///
    /// `now` anchors the 30-day windows; when `None` it defaults to the
    /// latest timestamp across all of `incidents`, not only the matching
    /// ones. An unmatched or blank target yields an all-zero aggregate.
    #[must_use]
    pub fn aggregate(
        &self,
        incidents: &[IncidentRecord],
        operations: &[OperationRecord],
        neighborhood: &str,
        now: Option<DateTime<Utc>>,
    ) -> NeighborhoodAggregate {
        let target = self.names.normalize(neighborhood);
        let mut aggregate = NeighborhoodAggregate::empty(target.clone());
        if target.is_empty() {
            log::debug!("Blank neighborhood name {neighborhood:?}, nothing to aggregate");
            return aggregate;
        }

        let windows = now.or_else(|| latest_timestamp(incidents)).map(Windows::new);

        for incident in incidents
            .iter()
            .filter(|i| self.names.normalize(&i.neighborhood) == target)
        {
            add_incident(&mut aggregate, incident, windows.as_ref());
        }

        for operation in operations
            .iter()
            .filter(|o| self.names.normalize(&o.neighborhood) == target)
        {
            add_operation(&mut aggregate, operation);
        }

        aggregate
    }

    /// Builds aggregates for every neighborhood seen in either record set,
    /// visiting each record once.
    #[must_use]
    pub fn aggregate_all(
        &self,
        incidents: &[IncidentRecord],
        operations: &[OperationRecord],
        now: Option<DateTime<Utc>>,
    ) -> BTreeMap<String, NeighborhoodAggregate> {
        let windows = now.or_else(|| latest_timestamp(incidents)).map(Windows::new);

        // Feeds repeat the same few spellings thousands of times.
        let mut resolved: BTreeMap<&str, String> = BTreeMap::new();
        let mut aggregates: BTreeMap<String, NeighborhoodAggregate> = BTreeMap::new();
        let mut skipped = 0_u64;

        for incident in incidents {
            let key = resolved
                .entry(incident.neighborhood.as_str())
                .or_insert_with(|| self.names.normalize(&incident.neighborhood));
            if key.is_empty() {
                skipped += 1;
                continue;
            }
            let aggregate = aggregates
                .entry(key.clone())
                .or_insert_with(|| NeighborhoodAggregate::empty(key.clone()));
            add_incident(aggregate, incident, windows.as_ref());
        }

        for operation in operations {
            let key = resolved
                .entry(operation.neighborhood.as_str())
                .or_insert_with(|| self.names.normalize(&operation.neighborhood));
            if key.is_empty() {
                skipped += 1;
                continue;
            }
            let aggregate = aggregates
                .entry(key.clone())
                .or_insert_with(|| NeighborhoodAggregate::empty(key.clone()));
            add_operation(aggregate, operation);
        }

        if skipped > 0 {
            log::debug!("Skipped {skipped} records with a blank neighborhood");
        }
        log::debug!(
            "Aggregated {} incidents and {} operations into {} neighborhoods",
            incidents.len(),
            operations.len(),
            aggregates.len()
        );

        aggregates
    }
}

/// Latest parseable incident timestamp, used as the default "now".
#[must_use]
pub fn latest_timestamp(incidents: &[IncidentRecord]) -> Option<DateTime<Utc>> {
    incidents.iter().filter_map(|i| i.timestamp).max()
}

/// The two adjacent trend windows ending at `now`.
struct Windows {
    now: DateTime<Utc>,
    last_start: DateTime<Utc>,
    prior_start: DateTime<Utc>,
}

impl Windows {
    fn new(now: DateTime<Utc>) -> Self {
        let window = Duration::days(TREND_WINDOW_DAYS);
        Self {
            now,
            last_start: now - window,
            prior_start: now - window - window,
        }
    }

    /// `[now - 30d, now]`
    fn in_last(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.last_start && ts <= self.now
    }

    /// `[now - 60d, now - 30d)`
    fn in_prior(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.prior_start && ts < self.last_start
    }
}

fn add_incident(
    aggregate: &mut NeighborhoodAggregate,
    incident: &IncidentRecord,
    windows: Option<&Windows>,
) {
    aggregate.total_crimes += 1;
    *aggregate
        .crimes_by_type
        .entry(incident.crime_type)
        .or_insert(0) += 1;
    if let Some(period) = incident.time_of_day {
        *aggregate.crimes_by_period.entry(period).or_insert(0) += 1;
    }

    let (Some(windows), Some(ts)) = (windows, incident.timestamp) else {
        return;
    };
    if windows.in_last(ts) {
        aggregate.crimes_last_30_days += 1;
        if incident.crime_type.is_severe() {
            aggregate.severe_crimes_last_30_days += 1;
        }
    } else if windows.in_prior(ts) {
        aggregate.crimes_prior_30_days += 1;
    }
}

fn add_operation(aggregate: &mut NeighborhoodAggregate, operation: &OperationRecord) {
    aggregate.total_operations += 1;
    aggregate.arrests += u64::from(operation.arrests);
    aggregate.weapons += u64::from(operation.weapons_seized);
    if operation.drugs_seized_kg.is_finite() && operation.drugs_seized_kg > 0.0 {
        aggregate.drugs_kg += operation.drugs_seized_kg;
    }
    aggregate.deaths += u64::from(operation.deaths);
    if operation.active {
        aggregate.active_operations_count += 1;
    }
}
