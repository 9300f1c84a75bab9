//! Geographic primitives: points, great-circle distance, bounding boxes.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in metres (IUGG).
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// A WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Build a point, returning `None` when either coordinate is non-finite
    /// or out of range.
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Option<Self> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        valid.then_some(Self { lat, lng })
    }

    /// Great-circle distance to `other` in metres.
    #[must_use]
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        distance(*self, *other)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

/// Haversine distance between two points in metres.
#[must_use]
pub fn distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();
    let s1 = (dlat / 2.0).sin();
    let s2 = (dlng / 2.0).sin();
    let h = (s1 * s1 + lat1.cos() * lat2.cos() * s2 * s2).min(1.0);
    2.0 * EARTH_RADIUS_METERS * h.sqrt().asin()
}

/// Axis-aligned lat/lng box used for "fit view" commands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south_west: GeoPoint,
    pub north_east: GeoPoint,
}

impl Bounds {
    /// Smallest box containing every point, or `None` for an empty slice.
    ///
    /// Does not attempt to wrap across the antimeridian.
    #[must_use]
    pub fn covering(points: &[GeoPoint]) -> Option<Self> {
        let first = points.first()?;
        let init = Self {
            south_west: *first,
            north_east: *first,
        };
        Some(points.iter().skip(1).fold(init, |acc, p| Self {
            south_west: GeoPoint {
                lat: acc.south_west.lat.min(p.lat),
                lng: acc.south_west.lng.min(p.lng),
            },
            north_east: GeoPoint {
                lat: acc.north_east.lat.max(p.lat),
                lng: acc.north_east.lng.max(p.lng),
            },
        }))
    }

    #[must_use]
    pub fn contains(&self, point: &GeoPoint) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&point.lat)
            && (self.south_west.lng..=self.north_east.lng).contains(&point.lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SF: GeoPoint = GeoPoint {
        lat: 37.7749,
        lng: -122.4194,
    };

    #[test]
    fn distance_to_self_is_zero() {
        assert!(distance(SF, SF).abs() < f64::EPSILON);
        let pole = GeoPoint { lat: 90.0, lng: 0.0 };
        assert!(distance(pole, pole).abs() < f64::EPSILON);
    }

    #[test]
    fn distance_is_symmetric() {
        let la = GeoPoint {
            lat: 34.052_2,
            lng: -118.243_7,
        };
        let ab = distance(SF, la);
        let ba = distance(la, SF);
        assert!((ab - ba).abs() < 1e-6, "ab={ab} ba={ba}");
    }

    #[test]
    fn distance_matches_known_city_pair() {
        // SF -> LA is roughly 559 km great-circle.
        let la = GeoPoint {
            lat: 34.052_2,
            lng: -118.243_7,
        };
        let km = distance(SF, la) / 1000.0;
        assert!((km - 559.0).abs() < 5.0, "got {km} km");
    }

    #[test]
    fn distance_resolves_sub_metre_differences() {
        let near = GeoPoint {
            lat: SF.lat + 0.000_004,
            lng: SF.lng,
        };
        let d = distance(SF, near);
        assert!(d > 0.3 && d < 0.6, "got {d} m");
    }

    #[test]
    fn antipodal_points_do_not_produce_nan() {
        let a = GeoPoint { lat: 0.0, lng: 0.0 };
        let b = GeoPoint { lat: 0.0, lng: 180.0 };
        let d = distance(a, b);
        assert!(d.is_finite());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_METERS).abs() < 1.0);
    }

    #[test]
    fn new_rejects_out_of_range_and_non_finite() {
        assert!(GeoPoint::new(91.0, 0.0).is_none());
        assert!(GeoPoint::new(0.0, -180.5).is_none());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_none());
        assert_eq!(GeoPoint::new(37.7749, -122.4194), Some(SF));
    }

    #[test]
    fn bounds_cover_all_points() {
        let pts = [
            SF,
            GeoPoint {
                lat: 37.80,
                lng: -122.45,
            },
            GeoPoint {
                lat: 37.70,
                lng: -122.40,
            },
        ];
        let b = Bounds::covering(&pts).unwrap();
        assert!(pts.iter().all(|p| b.contains(p)));
        assert!((b.south_west.lat - 37.70).abs() < f64::EPSILON);
        assert!((b.north_east.lng - (-122.40)).abs() < f64::EPSILON);
        assert!(Bounds::covering(&[]).is_none());
    }
}
