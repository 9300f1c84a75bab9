//! Capability traits for the external collaborators the orchestrator drives.
//!
//! The traits return `impl Future + Send`, so the orchestrator stays generic
//! over concrete providers without boxing and its own futures stay `Send`.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::candidate::RawCandidate;
use crate::error::{LocationError, RoutingProviderError, SearchProviderError};
use crate::geo::GeoPoint;
use crate::route::RawRoute;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Bicycling,
    Transit,
}

impl TravelMode {
    /// Parse a travel mode name (case-insensitive).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "driving" => Some(Self::Driving),
            "walking" => Some(Self::Walking),
            "bicycling" => Some(Self::Bicycling),
            "transit" => Some(Self::Transit),
            _ => None,
        }
    }
}

impl std::fmt::Display for TravelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TravelMode::Driving => write!(f, "driving"),
            TravelMode::Walking => write!(f, "walking"),
            TravelMode::Bicycling => write!(f, "bicycling"),
            TravelMode::Transit => write!(f, "transit"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub origin: GeoPoint,
    pub category: String,
    pub radius_meters: u32,
    pub max_results: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RouteRequest {
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    pub mode: TravelMode,
}

/// Source of the user's current position.
///
/// Implementations must fail (not hang) when permission is denied or no
/// fix can be obtained.
pub trait LocationProvider: Send + Sync {
    fn current_location(&self) -> impl Future<Output = Result<GeoPoint, LocationError>> + Send;
}

/// Nearby place search.
pub trait SearchProvider: Send + Sync {
    fn search_nearby(
        &self,
        request: &SearchRequest,
    ) -> impl Future<Output = Result<Vec<RawCandidate>, SearchProviderError>> + Send;
}

/// Point-to-point routing.
pub trait RoutingProvider: Send + Sync {
    fn compute_route(
        &self,
        request: &RouteRequest,
    ) -> impl Future<Output = Result<RawRoute, RoutingProviderError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn travel_mode_parses_case_insensitively() {
        assert_eq!(TravelMode::parse("DRIVING"), Some(TravelMode::Driving));
        assert_eq!(TravelMode::parse(" walking "), Some(TravelMode::Walking));
        assert_eq!(TravelMode::parse("teleport"), None);
    }

    #[test]
    fn travel_mode_serializes_lowercase() {
        let json = serde_json::to_string(&TravelMode::Bicycling).unwrap();
        assert_eq!(json, "\"bicycling\"");
        assert_eq!(TravelMode::default().to_string(), "driving");
    }
}
