//! Route estimation domain models.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::geo::BoundingBox;

/// Transport mode for ETA estimation.
///
/// Parsing is lenient: unrecognized modes fall back to driving, since the
/// estimation path is non-critical (see error handling notes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    #[default]
    Driving,
    Walking,
    Cycling,
}

impl TransportMode {
    /// Assumed average speed in km/h.
    pub fn average_speed_kmh(&self) -> f64 {
        match self {
            Self::Driving => 30.0,
            Self::Walking => 5.0,
            Self::Cycling => 15.0,
        }
    }

    /// Case-insensitive parse with a driving default for unknown modes.
    pub fn parse_lenient(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "walking" => Self::Walking,
            "cycling" => Self::Cycling,
            _ => Self::Driving,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Driving => "driving",
            Self::Walking => "walking",
            Self::Cycling => "cycling",
        }
    }
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Request payload for a route query.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    pub pickup_address_id: i64,
    pub dropoff_address_id: i64,
    #[serde(default)]
    pub transport_mode: TransportMode,
    #[serde(default)]
    pub optimize_route: bool,
    #[serde(default)]
    pub include_traffic: bool,
}

/// An ordered stop along a computed route with cumulative distance/duration
/// from the pickup point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteWaypoint {
    pub lat: f64,
    pub long: f64,
    pub address: String,
    #[serde(with = "duration_secs")]
    pub duration_from_start: Duration,
    pub distance_from_start_km: f64,
}

/// Computed route result. Not persisted; recomputed per query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResult {
    pub route_id: i64,
    pub total_distance_km: f64,
    #[serde(with = "duration_secs")]
    pub estimated_duration: Duration,
    #[serde(with = "duration_secs")]
    pub estimated_duration_with_traffic: Duration,
    pub transport_mode: TransportMode,
    pub optimized: bool,
    pub waypoints: Vec<RouteWaypoint>,
    pub bounds: Option<BoundingBox>,
    pub polyline: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<String>,
}

/// Serde helper serializing `std::time::Duration` as whole seconds.
pub mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
