//! Subcommand implementations. Each returns the text to print.

use std::{
    fmt::Write as _,
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::{DateTime, Duration, Utc};
use clap::{Args, ValueEnum};
use crime_risk_incident_models::{IncidentRecord, OperationRecord};
use crime_risk_loader::{DatasetLoader, LoadError, parsing::parse_timestamp_parts};
use crime_risk_neighborhood_names::NameTable;
use crime_risk_report::{ReportOptions, annotate_geojson, render_report};
use crime_risk_scoring::{
    Aggregator, ScoredNeighborhood,
    alerts::{AlertThresholds, generate_alerts},
    assess_all, assess_neighborhood,
};

use crate::config::Config;

type CommandResult = Result<String, Box<dyn std::error::Error>>;

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Input tables shared by every data subcommand.
#[derive(Debug, Args)]
pub struct Inputs {
    /// Incident CSV file
    #[arg(long)]
    pub incidents: PathBuf,
    /// Police operation CSV file
    #[arg(long)]
    pub operations: Option<PathBuf>,
    /// Reference date for the 30-day windows. A bare date means the end of
    /// that day. Defaults to the latest incident timestamp.
    #[arg(long, value_parser = parse_now)]
    pub now: Option<DateTime<Utc>>,
}

fn parse_now(raw: &str) -> Result<DateTime<Utc>, String> {
    let parsed = parse_timestamp_parts(raw).ok_or_else(|| format!("Unrecognized date: {raw}"))?;
    if parsed.has_time {
        Ok(parsed.timestamp)
    } else {
        Ok(parsed.timestamp + Duration::days(1) - Duration::seconds(1))
    }
}

/// Loaded input tables.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub incidents: Arc<Vec<IncidentRecord>>,
    pub operations: Arc<Vec<OperationRecord>>,
    pub now: Option<DateTime<Utc>>,
}

impl Inputs {
    /// Loads both tables through `loader`.
    ///
    /// # Errors
    ///
    /// * If either table fails to load
    pub fn load(&self, loader: &mut DatasetLoader) -> Result<Dataset, LoadError> {
        let incidents = loader.incidents(&self.incidents)?;
        let operations = loader.operations(self.operations.as_deref())?;
        log::info!(
            "Loaded {} incidents and {} operations",
            incidents.len(),
            operations.len()
        );
        Ok(Dataset {
            incidents,
            operations,
            now: self.now,
        })
    }
}

fn assess_dataset(names: &NameTable, dataset: &Dataset) -> Vec<ScoredNeighborhood> {
    assess_all(names, &dataset.incidents, &dataset.operations, dataset.now)
}

/// `score` subcommand.
///
/// # Errors
///
/// * If JSON serialization fails
pub fn score(
    names: &NameTable,
    dataset: &Dataset,
    neighborhood: Option<&str>,
    format: OutputFormat,
) -> CommandResult {
    let scored = match neighborhood {
        Some(name) => vec![assess_neighborhood(
            names,
            &dataset.incidents,
            &dataset.operations,
            name,
            dataset.now,
        )],
        None => assess_dataset(names, dataset),
    };

    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(&scored)? + "\n");
    }

    let mut out = String::new();
    if neighborhood.is_some() {
        for s in &scored {
            write_detail(&mut out, s);
        }
        return Ok(out);
    }

    let _ = writeln!(
        out,
        "{:<30} {:<12} {:>8} {:>7} {:>5}  TREND",
        "NEIGHBORHOOD", "LEVEL", "SCORE", "CRIMES", "OPS"
    );
    let _ = writeln!(out, "{}", "-".repeat(72));
    for s in &scored {
        let _ = writeln!(
            out,
            "{:<30} {:<12} {:>8.1} {:>7} {:>5}  {}",
            s.assessment.neighborhood,
            s.assessment.risk_level.to_string(),
            s.assessment.score,
            s.aggregate.total_crimes,
            s.aggregate.total_operations,
            s.assessment.trend,
        );
    }
    Ok(out)
}

fn write_detail(out: &mut String, s: &ScoredNeighborhood) {
    let a = &s.assessment;
    let agg = &s.aggregate;
    let _ = writeln!(out, "{}", a.neighborhood);
    let _ = writeln!(out, "  Risk level:     {}", a.risk_level);
    let _ = writeln!(out, "  Score:          {:.1}", a.score);
    let _ = writeln!(out, "  Effectiveness:  {:.1}%", a.effectiveness_percent);
    let _ = writeln!(out, "  Coverage:       {}", a.operation_coverage);
    let _ = writeln!(out, "  Trend:          {}", a.trend);
    let _ = writeln!(
        out,
        "  Incidents:      {} ({} in the last 30 days, {} the 30 before)",
        agg.total_crimes, agg.crimes_last_30_days, agg.crimes_prior_30_days
    );
    let _ = writeln!(
        out,
        "  Operations:     {} ({} active), {} arrests, {} weapons, {:.1} kg drugs, {} deaths",
        agg.total_operations,
        agg.active_operations_count,
        agg.arrests,
        agg.weapons,
        agg.drugs_kg,
        agg.deaths
    );
    for (crime_type, count) in agg.top_crime_types(3) {
        let _ = writeln!(out, "  Top crime:      {crime_type} ({count})");
    }
    let mut periods: Vec<_> = agg.crimes_by_period.iter().collect();
    periods.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
    for (period, count) in periods {
        let _ = writeln!(out, "  Period:         {period} ({count})");
    }
    let _ = writeln!(out, "  Recommendations:");
    for recommendation in &a.recommendations {
        let _ = writeln!(out, "    - {recommendation}");
    }
}

/// `report` subcommand.
#[must_use]
pub fn report(names: &NameTable, dataset: &Dataset, config: &Config) -> String {
    let scored = assess_dataset(names, dataset);
    let aggregates = scored.iter().map(|s| &s.aggregate);
    let alerts = generate_alerts(aggregates, &config.alerts);

    let mut options = ReportOptions::new(Utc::now());
    options.max_recommendations = config.report.max_recommendations;
    render_report(&scored, &alerts, &options)
}

/// `alerts` subcommand.
///
/// # Errors
///
/// * If JSON serialization fails
pub fn alerts(
    names: &NameTable,
    dataset: &Dataset,
    thresholds: &AlertThresholds,
    format: OutputFormat,
) -> CommandResult {
    let aggregates =
        Aggregator::new(names).aggregate_all(&dataset.incidents, &dataset.operations, dataset.now);
    let alerts = generate_alerts(aggregates.values(), thresholds);

    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(&alerts)? + "\n");
    }

    let mut out = String::new();
    if alerts.is_empty() {
        let _ = writeln!(out, "No alerts.");
    }
    for alert in &alerts {
        let _ = writeln!(
            out,
            "{:<9} {:<30} {:<21} {}",
            alert.priority.to_string(),
            alert.neighborhood,
            alert.kind.to_string(),
            alert.description
        );
    }
    Ok(out)
}

/// `choropleth` subcommand.
///
/// # Errors
///
/// * If `geojson` is not a `FeatureCollection`
pub fn choropleth(
    names: &NameTable,
    dataset: &Dataset,
    geojson: &str,
    name_property: &str,
) -> CommandResult {
    let scored = assess_dataset(names, dataset);
    let (out, summary) = annotate_geojson(geojson, name_property, names, &scored)?;
    if !summary.unmatched.is_empty() {
        log::warn!(
            "{} boundary features have no data: {}",
            summary.unmatched.len(),
            summary.unmatched.join(", ")
        );
    }
    Ok(out)
}

/// `normalize` subcommand.
#[must_use]
pub fn normalize(names: &NameTable, raw: &[String]) -> String {
    let mut out = String::new();
    for name in raw {
        let canonical = names.normalize(name);
        let marker = if names.is_known(name) { "" } else { " (unknown)" };
        let _ = writeln!(out, "{name} -> {canonical}{marker}");
    }
    out
}

/// Writes `contents` to `path`, or stdout when `None`.
///
/// # Errors
///
/// * If the file cannot be written
pub fn write_output(path: Option<&Path>, contents: &str) -> Result<(), std::io::Error> {
    match path {
        Some(path) => {
            std::fs::write(path, contents)?;
            log::info!("Wrote {}", path.display());
        }
        None => print!("{contents}"),
    }
    Ok(())
}
