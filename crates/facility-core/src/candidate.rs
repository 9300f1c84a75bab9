//! Search-result records: the raw provider shape and the normalised
//! [`Candidate`] the classifier and ranker work on.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// Display name used when a provider record carries no usable name.
pub const UNNAMED_PLACE: &str = "Unnamed place";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BusinessStatus {
    Operational,
    ClosedTemporarily,
    ClosedPermanently,
    Unknown,
}

impl BusinessStatus {
    /// Parse a provider status string. Unrecognised or blank values map to
    /// [`BusinessStatus::Unknown`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "OPERATIONAL" => Self::Operational,
            "CLOSED_TEMPORARILY" => Self::ClosedTemporarily,
            "CLOSED_PERMANENTLY" => Self::ClosedPermanently,
            _ => Self::Unknown,
        }
    }

    /// `true` only for an explicit closed status.
    #[must_use]
    pub fn is_closed(self) -> bool {
        matches!(self, Self::ClosedTemporarily | Self::ClosedPermanently)
    }
}

impl std::fmt::Display for BusinessStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BusinessStatus::Operational => write!(f, "OPERATIONAL"),
            BusinessStatus::ClosedTemporarily => write!(f, "CLOSED_TEMPORARILY"),
            BusinessStatus::ClosedPermanently => write!(f, "CLOSED_PERMANENTLY"),
            BusinessStatus::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// A place record as returned by a search provider. Any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawCandidate {
    pub id: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub location: Option<GeoPoint>,
    pub primary_type: Option<String>,
    pub types: Option<Vec<String>>,
    pub business_status: Option<String>,
    pub rating_count: Option<i64>,
}

/// A normalised search result. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub formatted_address: Option<String>,
    /// `None` when the provider omitted coordinates or sent invalid ones.
    pub location: Option<GeoPoint>,
    pub primary_type: Option<String>,
    pub types: BTreeSet<String>,
    pub business_status: BusinessStatus,
    pub rating_count: Option<u32>,
}

impl Candidate {
    /// Normalise a raw provider record.
    ///
    /// `index` is the record's position in the provider response and backs
    /// the id when the provider did not assign one.
    #[must_use]
    pub fn from_raw(raw: RawCandidate, index: usize) -> Self {
        let id = non_blank(raw.id).unwrap_or_else(|| format!("#{index}"));
        let name = non_blank(raw.name).unwrap_or_else(|| UNNAMED_PLACE.to_string());
        let location = raw.location.and_then(|p| GeoPoint::new(p.lat, p.lng));
        let types = raw
            .types
            .unwrap_or_default()
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        Self {
            id,
            name,
            formatted_address: non_blank(raw.address),
            location,
            primary_type: non_blank(raw.primary_type),
            types,
            business_status: raw
                .business_status
                .as_deref()
                .map_or(BusinessStatus::Unknown, BusinessStatus::parse),
            rating_count: raw.rating_count.and_then(|n| u32::try_from(n).ok()),
        }
    }

    /// Normalise a whole provider response, preserving its order.
    #[must_use]
    pub fn from_raw_list(raw: Vec<RawCandidate>) -> Vec<Self> {
        raw.into_iter()
            .enumerate()
            .map(|(index, r)| Self::from_raw(r, index))
            .collect()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
