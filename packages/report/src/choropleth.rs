//! Risk annotation of `GeoJSON` neighborhood boundaries.
//!
//! Each feature gets `risk_level`, `risk_score`, `risk_color`,
//! `risk_trend` and `risk_tooltip` properties. Features whose name does
//! not match any assessed neighborhood get the no-data color and nulls.

use std::{collections::BTreeMap, str::FromStr as _};

use crime_risk_neighborhood_names::NameTable;
use crime_risk_scoring::ScoredNeighborhood;
use crime_risk_scoring_models::NO_DATA_COLOR;
use geojson::{Feature, FeatureCollection, GeoJson, JsonValue};

use crate::{ReportError, text::tooltip};

/// Outcome of an annotation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChoroplethSummary {
    /// Features matched to an assessment.
    pub matched: usize,
    /// Names of features with no assessment, as they appear in the file.
    pub unmatched: Vec<String>,
}

/// Annotates every feature in `collection`.
///
/// `name_property` names the feature property holding the neighborhood
/// name. It is normalized through `names` before lookup.
pub fn annotate_features(
    collection: &mut FeatureCollection,
    name_property: &str,
    names: &NameTable,
    scored: &[ScoredNeighborhood],
) -> ChoroplethSummary {
    let by_name: BTreeMap<&str, &ScoredNeighborhood> = scored
        .iter()
        .map(|s| (s.assessment.neighborhood.as_str(), s))
        .collect();

    let mut summary = ChoroplethSummary::default();
    for feature in &mut collection.features {
        let raw_name = feature
            .property(name_property)
            .and_then(JsonValue::as_str)
            .unwrap_or_default()
            .to_string();
        let canonical = names.normalize(&raw_name);

        if let Some(s) = by_name.get(canonical.as_str()) {
            set_risk(feature, s);
            summary.matched += 1;
        } else {
            log::trace!("No assessment for boundary feature {raw_name:?}");
            set_no_data(feature);
            summary.unmatched.push(raw_name);
        }
    }

    log::info!(
        "Annotated {} features ({} without data)",
        summary.matched + summary.unmatched.len(),
        summary.unmatched.len()
    );
    summary
}

/// Parses a `GeoJSON` document, annotates it, and serializes it back.
///
/// # Errors
///
/// * If `input` is not valid `GeoJSON`
/// * If `input` is not a `FeatureCollection`
pub fn annotate_geojson(
    input: &str,
    name_property: &str,
    names: &NameTable,
    scored: &[ScoredNeighborhood],
) -> Result<(String, ChoroplethSummary), ReportError> {
    let mut collection = match GeoJson::from_str(input)? {
        GeoJson::FeatureCollection(collection) => collection,
        GeoJson::Feature(_) => return Err(ReportError::NotFeatureCollection("Feature")),
        GeoJson::Geometry(_) => return Err(ReportError::NotFeatureCollection("Geometry")),
    };

    let summary = annotate_features(&mut collection, name_property, names, scored);
    Ok((GeoJson::FeatureCollection(collection).to_string(), summary))
}

fn set_risk(feature: &mut Feature, scored: &ScoredNeighborhood) {
    let assessment = &scored.assessment;
    feature.set_property("risk_level", assessment.risk_level.to_string());
    feature.set_property("risk_score", assessment.score);
    feature.set_property("risk_color", assessment.risk_level.color());
    feature.set_property("risk_trend", assessment.trend.to_string());
    feature.set_property("risk_tooltip", tooltip(scored));
}

fn set_no_data(feature: &mut Feature) {
    feature.set_property("risk_level", JsonValue::Null);
    feature.set_property("risk_score", JsonValue::Null);
    feature.set_property("risk_color", NO_DATA_COLOR);
    feature.set_property("risk_trend", JsonValue::Null);
    feature.set_property("risk_tooltip", JsonValue::Null);
}
