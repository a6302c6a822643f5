//! Geometry primitives for driver tracking.
//!
//! Great-circle distance, coordinate validity, and radius membership checks
//! shared by the geofencing, clustering, and tracking code paths.

use serde::{Deserialize, Serialize};

/// Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Sentinel returned by [`haversine_km`] when either input has invalid
/// coordinates. Callers must check for this before treating the result as a
/// real distance.
pub const INVALID_DISTANCE: f64 = -1.0;

/// A plain latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    pub lat: f64,
    pub long: f64,
}

impl Coordinates {
    pub fn new(lat: f64, long: f64) -> Self {
        Self { lat, long }
    }

    /// Whether both components are within valid GPS ranges.
    pub fn is_valid(&self) -> bool {
        is_valid_coordinates(self.lat, self.long)
    }
}

/// Returns true when lat is in [-90, 90] and long is in [-180, 180].
pub fn is_valid_coordinates(lat: f64, long: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&long)
}

/// Haversine great-circle distance between two points, in kilometers.
///
/// Returns [`INVALID_DISTANCE`] (-1.0) if either point is outside valid
/// coordinate ranges.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    if !a.is_valid() || !b.is_valid() {
        return INVALID_DISTANCE;
    }

    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_long = (b.long - a.long).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_long / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Whether `point` lies within `radius_km` of `center`.
///
/// Does not special-case the invalid-distance sentinel: an invalid point
/// compares `-1.0 <= radius_km` and would trivially pass. Callers are
/// expected to validate coordinates before membership checks.
pub fn is_within_radius(point: Coordinates, center: Coordinates, radius_km: f64) -> bool {
    haversine_km(point, center) <= radius_km
}

/// Axis-aligned bounding box over a set of coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub north_east_lat: f64,
    pub north_east_long: f64,
    pub south_west_lat: f64,
    pub south_west_long: f64,
}

impl BoundingBox {
    /// Smallest box containing all the given points. Returns `None` for an
    /// empty input.
    pub fn from_points(points: &[Coordinates]) -> Option<Self> {
        let first = points.first()?;
        let mut bounds = BoundingBox {
            north_east_lat: first.lat,
            north_east_long: first.long,
            south_west_lat: first.lat,
            south_west_long: first.long,
        };
        for p in &points[1..] {
            bounds.north_east_lat = bounds.north_east_lat.max(p.lat);
            bounds.north_east_long = bounds.north_east_long.max(p.long);
            bounds.south_west_lat = bounds.south_west_lat.min(p.lat);
            bounds.south_west_long = bounds.south_west_long.min(p.long);
        }
        Some(bounds)
    }

    /// Whether a point lies within the box (inclusive edges).
    pub fn contains(&self, point: Coordinates) -> bool {
        point.lat <= self.north_east_lat
            && point.lat >= self.south_west_lat
            && point.long <= self.north_east_long
            && point.long >= self.south_west_long
    }
}
