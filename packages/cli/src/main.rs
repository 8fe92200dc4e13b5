#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for neighborhood crime risk scoring.

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use crime_risk_loader::DatasetLoader;

use crate::{
    commands::{Inputs, OutputFormat},
    config::Config,
};

#[derive(Parser)]
#[command(
    name = "crime_risk",
    about = "Neighborhood crime risk scoring, alerts, and reports"
)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score neighborhoods and print their risk assessments
    Score {
        #[command(flatten)]
        inputs: Inputs,
        /// Score only this neighborhood (any spelling)
        #[arg(long)]
        neighborhood: Option<String>,
        /// Output format: `text` or `json`
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Write the plaintext risk report
    Report {
        #[command(flatten)]
        inputs: Inputs,
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List volume, increase, and severe-crime alerts
    Alerts {
        #[command(flatten)]
        inputs: Inputs,
        /// Output format: `text` or `json`
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Annotate a `GeoJSON` boundary file with risk properties
    Choropleth {
        #[command(flatten)]
        inputs: Inputs,
        /// `GeoJSON` `FeatureCollection` of neighborhood boundaries
        #[arg(long)]
        boundaries: PathBuf,
        /// Feature property holding the neighborhood name (overrides config)
        #[arg(long)]
        name_property: Option<String>,
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the canonical form of neighborhood names
    Normalize {
        /// Names to normalize
        #[arg(required = true)]
        names: Vec<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    let names = config.name_table()?;
    log::debug!("Using name table {} ({})", names.id(), names.city());

    let mut loader = DatasetLoader::new(config.cache.ttl());

    match cli.command {
        Commands::Score {
            inputs,
            neighborhood,
            format,
        } => {
            let dataset = inputs.load(&mut loader)?;
            let out = commands::score(&names, &dataset, neighborhood.as_deref(), format)?;
            print!("{out}");
        }
        Commands::Report { inputs, output } => {
            let dataset = inputs.load(&mut loader)?;
            let out = commands::report(&names, &dataset, &config);
            commands::write_output(output.as_deref(), &out)?;
        }
        Commands::Alerts { inputs, format } => {
            let dataset = inputs.load(&mut loader)?;
            let out = commands::alerts(&names, &dataset, &config.alerts, format)?;
            print!("{out}");
        }
        Commands::Choropleth {
            inputs,
            boundaries,
            name_property,
            output,
        } => {
            let dataset = inputs.load(&mut loader)?;
            let geojson = std::fs::read_to_string(&boundaries)
                .map_err(|e| format!("Failed to read {}: {e}", boundaries.display()))?;
            let name_property = name_property.unwrap_or(config.choropleth.name_property);
            let out = commands::choropleth(&names, &dataset, &geojson, &name_property)?;
            commands::write_output(output.as_deref(), &out)?;
        }
        Commands::Normalize { names: raw } => {
            print!("{}", commands::normalize(&names, &raw));
        }
    }

    Ok(())
}
