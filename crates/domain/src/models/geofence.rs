//! Geofence domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::geo::Coordinates;

/// Zone membership status for a tracked driver.
///
/// The transition function currently computes only the binary
/// inside/outside pair from the latest ping; `EnteringZone` and
/// `ExitingZone` are declared so a transition-based machine (previous
/// status per key) can be added without a wire change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GeofenceStatus {
    InsideZone,
    OutsideZone,
    EnteringZone,
    ExitingZone,
}

impl GeofenceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InsideZone => "INSIDE_ZONE",
            Self::OutsideZone => "OUTSIDE_ZONE",
            Self::EnteringZone => "ENTERING_ZONE",
            Self::ExitingZone => "EXITING_ZONE",
        }
    }

    /// Whether this status should raise an alert to the dispatcher.
    pub fn is_breach(&self) -> bool {
        matches!(self, Self::OutsideZone | Self::ExitingZone)
    }

    /// Human-readable alert message for this status.
    pub fn alert_message(&self) -> &'static str {
        match self {
            Self::InsideZone => "Driver is within delivery zone",
            Self::OutsideZone => "Driver has left delivery zone",
            Self::EnteringZone => "Driver is entering delivery zone",
            Self::ExitingZone => "Driver is exiting delivery zone",
        }
    }
}

impl std::fmt::Display for GeofenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An in-memory geofence registration for a (driver, delivery) pair.
///
/// One active zone per pair; re-registration overwrites. Entries expire
/// after their TTL or when the delivery completes.
#[derive(Debug, Clone)]
pub struct GeofenceZone {
    pub driver_id: i64,
    pub delivery_id: i64,
    pub center: Coordinates,
    pub radius_km: f64,
    pub alerts_enabled: bool,
    pub registered_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl GeofenceZone {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Request payload for registering a geofencing alert.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SetupGeofenceRequest {
    pub driver_id: i64,

    pub delivery_id: i64,

    #[validate(custom(function = "shared::validation::validate_latitude"))]
    pub center_lat: f64,

    #[validate(custom(function = "shared::validation::validate_longitude"))]
    pub center_long: f64,

    #[validate(custom(function = "shared::validation::validate_radius_km"))]
    pub radius_km: f64,

    #[serde(default = "default_enable_alerts")]
    pub enable_alerts: bool,
}

fn default_enable_alerts() -> bool {
    true
}

/// A geofencing alert record returned to callers.
///
/// Not persisted history: each record is recomputed from the latest known
/// position against the registered zone.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceAlert {
    pub alert_id: i64,
    pub driver_id: i64,
    pub delivery_id: i64,
    pub status: GeofenceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_long: Option<f64>,
    pub zone_center_lat: f64,
    pub zone_center_long: f64,
    pub zone_radius_km: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_from_center_km: Option<f64>,
    pub timestamp: DateTime<Utc>,
    pub alert_message: String,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geofence_status_serialization() {
        assert_eq!(
            serde_json::to_string(&GeofenceStatus::InsideZone).unwrap(),
            "\"INSIDE_ZONE\""
        );
        assert_eq!(
            serde_json::to_string(&GeofenceStatus::ExitingZone).unwrap(),
            "\"EXITING_ZONE\""
        );
    }

    #[test]
    fn test_geofence_status_is_breach() {
        assert!(!GeofenceStatus::InsideZone.is_breach());
        assert!(!GeofenceStatus::EnteringZone.is_breach());
        assert!(GeofenceStatus::OutsideZone.is_breach());
        assert!(GeofenceStatus::ExitingZone.is_breach());
    }

    #[test]
    fn test_geofence_zone_expiry() {
        let now = Utc::now();
        let zone = GeofenceZone {
            driver_id: 1,
            delivery_id: 2,
            center: Coordinates::new(9.0, 38.0),
            radius_km: 1.0,
            alerts_enabled: true,
            registered_at: now,
            expires_at: now + chrono::Duration::hours(24),
        };
        assert!(!zone.is_expired(now));
        assert!(zone.is_expired(now + chrono::Duration::hours(25)));
    }

    #[test]
    fn test_setup_request_deserialization_defaults() {
        let json = r#"{
            "driverId": 1,
            "deliveryId": 2,
            "centerLat": 9.0321,
            "centerLong": 38.7469,
            "radiusKm": 1.5
        }"#;
        let request: SetupGeofenceRequest = serde_json::from_str(json).unwrap();
        assert!(request.enable_alerts);
        assert_eq!(request.radius_km, 1.5);
    }

    #[test]
    fn test_setup_request_invalid_radius() {
        use validator::Validate;
        let request = SetupGeofenceRequest {
            driver_id: 1,
            delivery_id: 2,
            center_lat: 9.0,
            center_long: 38.0,
            radius_km: -1.0,
            enable_alerts: true,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_alert_serialization_skips_missing_position() {
        let alert = GeofenceAlert {
            alert_id: 1,
            driver_id: 1,
            delivery_id: 2,
            status: GeofenceStatus::InsideZone,
            driver_lat: None,
            driver_long: None,
            zone_center_lat: 9.0,
            zone_center_long: 38.0,
            zone_radius_km: 1.0,
            distance_from_center_km: None,
            timestamp: Utc::now(),
            alert_message: GeofenceStatus::InsideZone.alert_message().to_string(),
            is_active: true,
        };
        let json = serde_json::to_string(&alert).unwrap();
        assert!(json.contains("\"status\":\"INSIDE_ZONE\""));
        assert!(!json.contains("driverLat"));
    }
}
