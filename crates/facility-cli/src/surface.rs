//! A [`MapSurface`] for terminals: there is no map, so overlay commands are
//! logged and the live artifact set is tracked for the final summary.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use facility_core::{Bounds, GeoPoint, MapSurface, MarkerRole, MarkerSpec, SurfaceId};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Drawn {
    Marker(MarkerSpec),
    Route { points: usize },
}

#[derive(Debug, Default)]
pub(crate) struct ConsoleSurface {
    next_id: AtomicU64,
    live: Mutex<BTreeMap<SurfaceId, Drawn>>,
}

impl ConsoleSurface {
    /// Artifacts currently on the "map", in creation order.
    pub(crate) fn live(&self) -> Vec<Drawn> {
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    fn insert(&self, drawn: Drawn) -> SurfaceId {
        let id = SurfaceId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, drawn);
        id
    }
}

impl MapSurface for ConsoleSurface {
    fn add_marker(&self, marker: &MarkerSpec) -> SurfaceId {
        let id = self.insert(Drawn::Marker(marker.clone()));
        tracing::debug!(
            id = id.0,
            role = ?marker.role,
            title = marker.title.as_str(),
            position = %marker.position,
            "marker added"
        );
        id
    }

    fn add_polyline(&self, path: &[GeoPoint]) -> SurfaceId {
        let id = self.insert(Drawn::Route { points: path.len() });
        tracing::debug!(id = id.0, points = path.len(), "route line added");
        id
    }

    fn remove(&self, id: SurfaceId) {
        let removed = self
            .live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        if removed.is_none() {
            tracing::warn!(id = id.0, "remove called for unknown overlay");
        }
    }

    fn fit_bounds(&self, bounds: Bounds) {
        tracing::debug!(
            south_west = %bounds.south_west,
            north_east = %bounds.north_east,
            "view fitted"
        );
    }
}

/// Live markers with `role`.
pub(crate) fn markers(drawn: &[Drawn], role: MarkerRole) -> usize {
    drawn
        .iter()
        .filter(|d| matches!(d, Drawn::Marker(m) if m.role == role))
        .count()
}
