//! Normalisation of routing-provider answers into a [`RoutePlan`].

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::RouteExtractionError;
use crate::geo::GeoPoint;

/// Instruction used when a step carries no text.
pub const DEFAULT_INSTRUCTION: &str = "Continue";

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

/// A route as returned by a routing provider (metres / milliseconds).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRoute {
    pub distance_meters: Option<f64>,
    pub duration_millis: Option<f64>,
    pub path: Option<Vec<GeoPoint>>,
    pub legs: Vec<RawLeg>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawLeg {
    pub steps: Vec<RawStep>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawStep {
    pub instruction: Option<String>,
    pub distance_meters: Option<f64>,
    pub duration_millis: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteStep {
    pub instruction: String,
    pub distance: String,
    pub duration: String,
}

/// A normalised, display-ready route. Replaced wholesale on every routing call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePlan {
    pub distance_meters: f64,
    pub duration_secs: f64,
    /// e.g. `"2.4 km"`.
    pub distance: String,
    /// e.g. `"7 min"`.
    pub duration: String,
    pub path: Vec<GeoPoint>,
    pub steps: Vec<RouteStep>,
}

impl RoutePlan {
    #[must_use]
    pub fn destination(&self) -> Option<GeoPoint> {
        self.path.last().copied()
    }
}

/// Build a [`RoutePlan`] from a provider route.
///
/// Legs are flattened front-to-back; step order is preserved exactly.
///
/// # Errors
///
/// Returns [`RouteExtractionError::MissingPath`] when the route has no path
/// and [`RouteExtractionError::EmptyPath`] when the path has no points.
pub fn extract_plan(raw: &RawRoute) -> Result<RoutePlan, RouteExtractionError> {
    let path = raw.path.as_ref().ok_or(RouteExtractionError::MissingPath)?;
    if path.is_empty() {
        return Err(RouteExtractionError::EmptyPath);
    }

    let raw_steps: Vec<&RawStep> = raw.legs.iter().flat_map(|leg| &leg.steps).collect();

    let distance_meters = raw
        .distance_meters
        .unwrap_or_else(|| raw_steps.iter().filter_map(|s| s.distance_meters).sum());
    let duration_millis = raw
        .duration_millis
        .unwrap_or_else(|| raw_steps.iter().filter_map(|s| s.duration_millis).sum());

    let steps = raw_steps
        .into_iter()
        .map(|step| RouteStep {
            instruction: clean_instruction(step.instruction.as_deref()),
            distance: format_meters(step.distance_meters.unwrap_or(0.0)),
            duration: format_seconds(step.duration_millis.unwrap_or(0.0)),
        })
        .collect();

    Ok(RoutePlan {
        distance_meters,
        duration_secs: duration_millis / 1000.0,
        distance: format_kilometers(distance_meters),
        duration: format_minutes(duration_millis),
        path: path.clone(),
        steps,
    })
}

/// Metres to one-decimal kilometres: `2350.0` -> `"2.4 km"`.
#[must_use]
pub fn format_kilometers(meters: f64) -> String {
    // Round in hectometres so exact halves (2350 m) round up.
    let km = (meters / 100.0).round() / 10.0;
    format!("{km:.1} km")
}

/// Milliseconds to whole minutes: `420_000.0` -> `"7 min"`.
#[must_use]
pub fn format_minutes(millis: f64) -> String {
    format!("{:.0} min", (millis / 60_000.0).round())
}

/// Metres to whole metres: `349.6` -> `"350 m"`.
#[must_use]
pub fn format_meters(meters: f64) -> String {
    format!("{:.0} m", meters.round())
}

/// Milliseconds to whole seconds: `41_600.0` -> `"42 s"`.
#[must_use]
pub fn format_seconds(millis: f64) -> String {
    format!("{:.0} s", (millis / 1000.0).round())
}

fn clean_instruction(raw: Option<&str>) -> String {
    let text = raw.map(|s| HTML_TAG.replace_all(s, " ")).unwrap_or_default();
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        DEFAULT_INSTRUCTION.to_string()
    } else {
        collapsed
    }
}
