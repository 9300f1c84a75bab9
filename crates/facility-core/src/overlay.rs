//! Map overlay lifecycle.
//!
//! [`OverlayManager`] is the only owner of map artifacts. Every artifact it
//! creates is wrapped in an [`OverlayHandle`] that removes it from the
//! [`MapSurface`] when dropped, and every "show"/"draw" call drops the
//! previous handle before asking the surface for a new one.

use std::sync::Arc;

use crate::geo::{Bounds, GeoPoint};
use crate::rank::RankedCandidate;

pub const USER_MARKER_TITLE: &str = "Your Location";

/// Identifier a [`MapSurface`] assigns to an artifact it has drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerRole {
    User,
    Selected,
    Alternate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub position: GeoPoint,
    pub title: String,
    pub role: MarkerRole,
}

/// Rendering backend (a map widget, a console, a test recorder).
pub trait MapSurface: Send + Sync {
    fn add_marker(&self, marker: &MarkerSpec) -> SurfaceId;
    fn add_polyline(&self, path: &[GeoPoint]) -> SurfaceId;
    fn remove(&self, id: SurfaceId);
    fn fit_bounds(&self, bounds: Bounds);
}

/// Owned map artifact; removed from the surface on drop.
pub struct OverlayHandle<M: MapSurface> {
    surface: Arc<M>,
    id: SurfaceId,
}

impl<M: MapSurface> OverlayHandle<M> {
    #[must_use]
    pub fn id(&self) -> SurfaceId {
        self.id
    }
}

impl<M: MapSurface> Drop for OverlayHandle<M> {
    fn drop(&mut self) {
        self.surface.remove(self.id);
    }
}

pub struct OverlayManager<M: MapSurface> {
    surface: Arc<M>,
    user_marker: Option<OverlayHandle<M>>,
    selected_marker: Option<OverlayHandle<M>>,
    alternate_markers: Vec<OverlayHandle<M>>,
    route_line: Option<OverlayHandle<M>>,
}

impl<M: MapSurface> OverlayManager<M> {
    #[must_use]
    pub fn new(surface: Arc<M>) -> Self {
        Self {
            surface,
            user_marker: None,
            selected_marker: None,
            alternate_markers: Vec::new(),
            route_line: None,
        }
    }

    pub fn show_user_marker(&mut self, point: GeoPoint) {
        self.user_marker = None;
        self.user_marker = Some(self.marker(MarkerSpec {
            position: point,
            title: USER_MARKER_TITLE.to_string(),
            role: MarkerRole::User,
        }));
    }

    /// Replace the whole alternate set. Old markers are removed before any
    /// new one is drawn.
    pub fn show_alternate_markers(&mut self, alternates: &[RankedCandidate]) {
        self.alternate_markers.clear();
        let handles: Vec<_> = alternates
            .iter()
            .map(|alt| {
                self.marker(MarkerSpec {
                    position: alt.location,
                    title: alt.candidate.name.clone(),
                    role: MarkerRole::Alternate,
                })
            })
            .collect();
        self.alternate_markers = handles;
    }

    pub fn show_selected_marker(&mut self, selected: &RankedCandidate) {
        self.selected_marker = None;
        self.selected_marker = Some(self.marker(MarkerSpec {
            position: selected.location,
            title: selected.candidate.name.clone(),
            role: MarkerRole::Selected,
        }));
    }

    /// Replace the route line. An empty path only clears the previous line.
    pub fn draw_route(&mut self, path: &[GeoPoint]) {
        self.route_line = None;
        if path.is_empty() {
            return;
        }
        let id = self.surface.add_polyline(path);
        self.route_line = Some(self.handle(id));
    }

    pub fn clear_route(&mut self) {
        self.route_line = None;
    }

    pub fn fit_bounds(&self, points: &[GeoPoint]) {
        if let Some(bounds) = Bounds::covering(points) {
            self.surface.fit_bounds(bounds);
        }
    }

    pub fn clear_all(&mut self) {
        self.route_line = None;
        self.selected_marker = None;
        self.alternate_markers.clear();
        self.user_marker = None;
    }

    #[must_use]
    pub fn has_user_marker(&self) -> bool {
        self.user_marker.is_some()
    }

    #[must_use]
    pub fn has_selected_marker(&self) -> bool {
        self.selected_marker.is_some()
    }

    #[must_use]
    pub fn has_route(&self) -> bool {
        self.route_line.is_some()
    }

    #[must_use]
    pub fn alternate_count(&self) -> usize {
        self.alternate_markers.len()
    }

    fn marker(&self, spec: MarkerSpec) -> OverlayHandle<M> {
        let id = self.surface.add_marker(&spec);
        self.handle(id)
    }

    fn handle(&self, id: SurfaceId) -> OverlayHandle<M> {
        OverlayHandle {
            surface: Arc::clone(&self.surface),
            id,
        }
    }
}


#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::recording::{Op, RecordingSurface};
    use super::*;
    use crate::candidate::{BusinessStatus, Candidate};

    fn ranked(id: &str, lat: f64) -> RankedCandidate {
        let location = GeoPoint { lat, lng: -122.4 };
        RankedCandidate {
            candidate: Candidate {
                id: id.to_string(),
                name: format!("{id} Hospital"),
                formatted_address: None,
                location: Some(location),
                primary_type: None,
                types: BTreeSet::new(),
                business_status: BusinessStatus::Operational,
                rating_count: None,
            },
            location,
            distance_meters: 0.0,
        }
    }

    fn manager() -> (Arc<RecordingSurface>, OverlayManager<RecordingSurface>) {
        let surface = Arc::new(RecordingSurface::default());
        let manager = OverlayManager::new(Arc::clone(&surface));
        (surface, manager)
    }

    #[test]
    fn alternates_are_replaced_not_accumulated() {
        let (surface, mut overlay) = manager();
        overlay.show_alternate_markers(&[ranked("a", 37.1), ranked("b", 37.2), ranked("c", 37.3)]);
        assert_eq!(overlay.alternate_count(), 3);

        overlay.show_alternate_markers(&[ranked("d", 37.4)]);
        assert_eq!(overlay.alternate_count(), 1);
        let live = surface.live_markers(MarkerRole::Alternate);
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].title, "d Hospital");
    }

    #[test]
    fn alternates_are_disposed_before_new_ones_are_created() {
        let (surface, mut overlay) = manager();
        overlay.show_alternate_markers(&[ranked("a", 37.1), ranked("b", 37.2)]);
        overlay.show_alternate_markers(&[ranked("c", 37.3)]);

        let log = surface.log();
        // add 1, add 2, remove 1, remove 2, add 3
        assert_eq!(
            log,
            vec![
                Op::Add(SurfaceId(1)),
                Op::Add(SurfaceId(2)),
                Op::Remove(SurfaceId(1)),
                Op::Remove(SurfaceId(2)),
                Op::Add(SurfaceId(3)),
            ]
        );
    }

    #[test]
    fn at_most_one_selected_marker_and_route_line() {
        let (surface, mut overlay) = manager();
        for i in 0..5 {
            let lat = 37.0 + f64::from(i) * 0.01;
            overlay.show_selected_marker(&ranked("s", lat));
            overlay.draw_route(&[GeoPoint { lat, lng: -122.4 }, GeoPoint { lat: 37.9, lng: -122.3 }]);
        }
        assert_eq!(surface.live_markers(MarkerRole::Selected).len(), 1);
        assert_eq!(surface.live_polylines().len(), 1);
        assert!(overlay.has_route());
    }

    #[test]
    fn drawing_an_empty_route_clears_the_previous_line() {
        let (surface, mut overlay) = manager();
        overlay.draw_route(&[GeoPoint { lat: 1.0, lng: 1.0 }]);
        overlay.draw_route(&[]);
        assert!(!overlay.has_route());
        assert!(surface.live_polylines().is_empty());
    }

    #[test]
    fn clear_all_removes_every_artifact_exactly_once() {
        let (surface, mut overlay) = manager();
        overlay.show_user_marker(GeoPoint { lat: 37.0, lng: -122.0 });
        overlay.show_alternate_markers(&[ranked("a", 37.1), ranked("b", 37.2)]);
        overlay.show_selected_marker(&ranked("c", 37.3));
        overlay.draw_route(&[GeoPoint { lat: 37.0, lng: -122.0 }]);
        overlay.clear_all();

        assert!(surface.live().is_empty());
        assert_eq!(surface.double_removes(), 0);
        assert!(!overlay.has_user_marker());
        assert!(!overlay.has_selected_marker());
    }

    #[test]
    fn dropping_the_manager_releases_its_handles() {
        let (surface, mut overlay) = manager();
        overlay.show_user_marker(GeoPoint { lat: 37.0, lng: -122.0 });
        overlay.show_selected_marker(&ranked("c", 37.3));
        drop(overlay);
        assert!(surface.live().is_empty());
    }

    #[test]
    fn fit_bounds_covers_all_points() {
        let (surface, overlay) = manager();
        let a = GeoPoint { lat: 37.0, lng: -122.5 };
        let b = GeoPoint { lat: 37.5, lng: -122.0 };
        overlay.fit_bounds(&[a, b]);
        let fit = surface.last_fit().unwrap();
        assert!(fit.contains(&a) && fit.contains(&b));

        overlay.fit_bounds(&[]);
        assert_eq!(surface.log().len(), 1, "empty input issues no fit command");
    }
}
