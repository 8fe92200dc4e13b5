#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Presentation of risk assessments.
//!
//! - [`text`] renders the plaintext report and per-neighborhood tooltips.
//! - [`choropleth`] writes risk properties onto `GeoJSON` boundary
//!   features so any map renderer can color them.

pub mod choropleth;
pub mod text;

pub use choropleth::{ChoroplethSummary, annotate_features, annotate_geojson};
pub use text::{ReportOptions, render_report, tooltip};

/// Errors from rendering or annotating output.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// The boundary document is not valid `GeoJSON`.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The boundary document parsed, but is not a `FeatureCollection`.
    #[error("Expected a GeoJSON FeatureCollection, found a {0}")]
    NotFeatureCollection(&'static str),
}
