//! GeoPoint domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::geo::{haversine_km, is_valid_coordinates, Coordinates};

/// A single timestamped driver position observation.
///
/// Append-only: points are created on each location ping and never updated in
/// place. A retention job deletes rows past the configured cutoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    pub id: i64,
    pub driver_id: i64,
    /// Delivery the ping is associated with; drivers also report positions
    /// while off-delivery.
    pub delivery_id: Option<i64>,
    pub lat: f64,
    pub long: f64,
    pub timestamp: DateTime<Utc>,
    pub speed_kmh: Option<f64>,
    pub heading_degrees: Option<f64>,
    pub accuracy_meters: Option<f64>,
    pub active: bool,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl GeoPoint {
    /// Whether this point has coordinates usable for distance and geofence
    /// computations. Invalid points are excluded from active-location queries.
    pub fn is_valid_location(&self) -> bool {
        is_valid_coordinates(self.lat, self.long)
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.long)
    }

    /// Haversine distance to another point in kilometers, or -1.0 when either
    /// point carries invalid coordinates.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        haversine_km(self.coordinates(), other.coordinates())
    }
}

/// Request payload for a driver location ping.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TrackLocationRequest {
    pub driver_id: i64,

    pub delivery_id: Option<i64>,

    #[validate(custom(function = "shared::validation::validate_latitude"))]
    pub lat: f64,

    #[validate(custom(function = "shared::validation::validate_longitude"))]
    pub long: f64,

    #[validate(custom(function = "shared::validation::validate_speed"))]
    pub speed_kmh: Option<f64>,

    #[validate(custom(function = "shared::validation::validate_heading"))]
    pub heading_degrees: Option<f64>,

    #[validate(custom(function = "shared::validation::validate_accuracy"))]
    pub accuracy_meters: Option<f64>,
}

/// Enriched location record returned from tracking queries.
///
/// Driver name, vehicle, and delivery status come from the driver directory
/// collaborator; `is_online` is derived from the staleness threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverLocationRecord {
    pub id: i64,
    pub driver_id: i64,
    pub delivery_id: Option<i64>,
    pub lat: f64,
    pub long: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_kmh: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading_degrees: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy_meters: Option<f64>,
    pub driver_name: String,
    pub vehicle_info: String,
    pub delivery_status: String,
    pub is_online: bool,
}

/// Query parameters for location history endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationHistoryQuery {
    /// Opaque cursor for pagination (base64-encoded timestamp:id).
    pub cursor: Option<String>,

    /// Number of results per page (1-100, default 50).
    pub limit: Option<i32>,
}

impl LocationHistoryQuery {
    pub const DEFAULT_LIMIT: i32 = 50;
    pub const MAX_LIMIT: i32 = 100;
    pub const MIN_LIMIT: i32 = 1;

    /// Returns the effective limit, clamped to valid range.
    pub fn effective_limit(&self) -> i32 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(Self::MIN_LIMIT, Self::MAX_LIMIT)
    }
}

/// Pagination info for cursor-based pagination.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

/// Response payload for location history endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationHistoryResponse {
    pub locations: Vec<GeoPoint>,
    pub pagination: PaginationInfo,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn create_test_point(lat: f64, long: f64) -> GeoPoint {
        GeoPoint {
            id: 1,
            driver_id: 7,
            delivery_id: Some(3),
            lat,
            long,
            timestamp: Utc::now(),
            speed_kmh: Some(25.0),
            heading_degrees: Some(45.0),
            accuracy_meters: Some(10.0),
            active: true,
            version: 0,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_geo_point_valid_location() {
        assert!(create_test_point(9.1450, 40.4897).is_valid_location());
        assert!(!create_test_point(91.0, 40.4897).is_valid_location());
        assert!(!create_test_point(9.1450, -200.0).is_valid_location());
    }

    #[test]
    fn test_geo_point_distance_to_self_is_zero() {
        let p = create_test_point(9.1450, 40.4897);
        assert!(p.distance_to(&p).abs() < 1e-9);
    }

    #[test]
    fn test_geo_point_distance_invalid_sentinel() {
        let good = create_test_point(9.1450, 40.4897);
        let bad = create_test_point(200.0, 40.4897);
        assert_eq!(good.distance_to(&bad), -1.0);
    }

    #[test]
    fn test_track_location_request_valid() {
        let request = TrackLocationRequest {
            driver_id: 1,
            delivery_id: Some(2),
            lat: 9.1450,
            long: 40.4897,
            speed_kmh: Some(25.0),
            heading_degrees: Some(45.0),
            accuracy_meters: Some(10.0),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_track_location_request_invalid_latitude() {
        let request = TrackLocationRequest {
            driver_id: 1,
            delivery_id: None,
            lat: 100.0,
            long: 40.4897,
            speed_kmh: None,
            heading_degrees: None,
            accuracy_meters: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_track_location_request_invalid_speed() {
        let request = TrackLocationRequest {
            driver_id: 1,
            delivery_id: None,
            lat: 9.1450,
            long: 40.4897,
            speed_kmh: Some(-5.0),
            heading_degrees: None,
            accuracy_meters: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_track_location_request_deserialization() {
        let json = r#"{
            "driverId": 4,
            "deliveryId": 9,
            "lat": 9.0321,
            "long": 38.7469,
            "speedKmh": 30.5
        }"#;
        let request: TrackLocationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.driver_id, 4);
        assert_eq!(request.delivery_id, Some(9));
        assert_eq!(request.speed_kmh, Some(30.5));
        assert!(request.heading_degrees.is_none());
    }

    #[test]
    fn test_history_query_effective_limit() {
        let query = LocationHistoryQuery {
            cursor: None,
            limit: None,
        };
        assert_eq!(query.effective_limit(), 50);

        let query = LocationHistoryQuery {
            cursor: None,
            limit: Some(500),
        };
        assert_eq!(query.effective_limit(), 100);

        let query = LocationHistoryQuery {
            cursor: None,
            limit: Some(0),
        };
        assert_eq!(query.effective_limit(), 1);
    }

    #[test]
    fn test_driver_location_record_serialization() {
        let record = DriverLocationRecord {
            id: 1,
            driver_id: 7,
            delivery_id: Some(3),
            lat: 9.1450,
            long: 40.4897,
            timestamp: Utc::now(),
            speed_kmh: None,
            heading_degrees: None,
            accuracy_meters: None,
            driver_name: "Driver 7".to_string(),
            vehicle_info: "Vehicle 7".to_string(),
            delivery_status: "IN_PROGRESS".to_string(),
            is_online: true,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"driverId\":7"));
        assert!(json.contains("\"isOnline\":true"));
        // None telemetry fields should be skipped
        assert!(!json.contains("speedKmh"));
    }
}
