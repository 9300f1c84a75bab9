//! Client-side distance ranking.
//!
//! Search providers blend relevance and popularity into their ordering, so
//! results are always re-sorted by great-circle distance from the origin.

use serde::Serialize;

use crate::candidate::Candidate;
use crate::geo::{distance, GeoPoint};

/// A candidate with a guaranteed location and its distance from the origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate {
    pub candidate: Candidate,
    pub location: GeoPoint,
    pub distance_meters: f64,
}

impl RankedCandidate {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.candidate.id
    }
}

/// Candidates ordered by ascending distance. Every entry has a location.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankedResult {
    entries: Vec<RankedCandidate>,
}

impl RankedResult {
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn first(&self) -> Option<&RankedCandidate> {
        self.entries.first()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&RankedCandidate> {
        self.entries.iter().find(|e| e.id() == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RankedCandidate> {
        self.entries.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[RankedCandidate] {
        &self.entries
    }

    /// Every entry except the one with `id`, in rank order.
    #[must_use]
    pub fn excluding(&self, id: &str) -> Vec<RankedCandidate> {
        self.entries
            .iter()
            .filter(|e| e.id() != id)
            .cloned()
            .collect()
    }
}

impl<'a> IntoIterator for &'a RankedResult {
    type Item = &'a RankedCandidate;
    type IntoIter = std::slice::Iter<'a, RankedCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Drop location-less candidates and stable-sort the rest by distance from
/// `origin`. Equal distances keep provider order.
#[must_use]
pub fn rank(origin: GeoPoint, candidates: Vec<Candidate>) -> RankedResult {
    let mut entries: Vec<RankedCandidate> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let location = candidate.location?;
            Some(RankedCandidate {
                distance_meters: distance(origin, location),
                location,
                candidate,
            })
        })
        .collect();

    entries.sort_by(|a, b| a.distance_meters.total_cmp(&b.distance_meters));
    RankedResult { entries }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::candidate::BusinessStatus;

    const ORIGIN: GeoPoint = GeoPoint {
        lat: 37.7749,
        lng: -122.4194,
    };

    fn at(id: &str, location: Option<GeoPoint>) -> Candidate {
        Candidate {
            id: id.to_string(),
            name: format!("{id} Hospital"),
            formatted_address: None,
            location,
            primary_type: Some("hospital".to_string()),
            types: BTreeSet::new(),
            business_status: BusinessStatus::Operational,
            rating_count: None,
        }
    }

    /// Point `km` kilometres due north of the origin.
    fn north(km: f64) -> Option<GeoPoint> {
        Some(GeoPoint {
            lat: ORIGIN.lat + km / 111.195,
            lng: ORIGIN.lng,
        })
    }

    fn ids(result: &RankedResult) -> Vec<&str> {
        result.iter().map(RankedCandidate::id).collect()
    }

    #[test]
    fn reorders_provider_results_by_distance() {
        let ranked = rank(
            ORIGIN,
            vec![at("far", north(3.0)), at("near", north(0.2)), at("mid", north(1.0))],
        );
        assert_eq!(ids(&ranked), ["near", "mid", "far"]);
        assert!(ranked
            .as_slice()
            .windows(2)
            .all(|w| w[0].distance_meters <= w[1].distance_meters));
    }

    #[test]
    fn excludes_candidates_without_location() {
        let ranked = rank(
            ORIGIN,
            vec![at("a", north(1.0)), at("ghost", None), at("b", north(0.5))],
        );
        assert_eq!(ids(&ranked), ["b", "a"]);
        assert!(ranked.get("ghost").is_none());
    }

    #[test]
    fn ties_keep_provider_order() {
        let ranked = rank(
            ORIGIN,
            vec![
                at("first", north(1.0)),
                at("second", north(1.0)),
                at("third", north(1.0)),
            ],
        );
        assert_eq!(ids(&ranked), ["first", "second", "third"]);
    }

    #[test]
    fn distances_are_recorded() {
        let ranked = rank(ORIGIN, vec![at("a", north(0.5))]);
        let d = ranked.first().unwrap().distance_meters;
        assert!((d - 500.0).abs() < 2.0, "got {d}");
    }

    #[test]
    fn excluding_returns_alternates_in_rank_order() {
        let ranked = rank(
            ORIGIN,
            vec![at("c", north(3.0)), at("a", north(1.0)), at("b", north(2.0))],
        );
        let alternates: Vec<_> = ranked
            .excluding("b")
            .into_iter()
            .map(|e| e.candidate.id)
            .collect();
        assert_eq!(alternates, ["a", "c"]);
    }

    #[test]
    fn empty_input_ranks_to_empty() {
        assert!(rank(ORIGIN, Vec::new()).is_empty());
        assert!(rank(ORIGIN, vec![at("ghost", None)]).is_empty());
    }
}
