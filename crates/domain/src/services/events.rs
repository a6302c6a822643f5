//! Domain event publishing.
//!
//! Location and delivery updates are published to an external pub/sub
//! transport. The transport itself is a collaborator; this module defines
//! the envelope shape and the publisher seam.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::geo_point::DriverLocationRecord;
use crate::models::geofence::GeofenceAlert;

/// Event type discriminator carried in the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    DriverLocationUpdate,
    DeliveryStatusUpdate,
    GeofenceAlert,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DriverLocationUpdate => "DRIVER_LOCATION_UPDATE",
            Self::DeliveryStatusUpdate => "DELIVERY_STATUS_UPDATE",
            Self::GeofenceAlert => "GEOFENCE_ALERT",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Message envelope published to the transport: type, payload, timestamp.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope<T: Serialize> {
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub payload: T,
    pub timestamp: DateTime<Utc>,
}

impl<T: Serialize> EventEnvelope<T> {
    pub fn new(event_type: EventType, payload: T) -> Self {
        Self {
            event_type,
            payload,
            timestamp: Utc::now(),
        }
    }
}

/// Delivery status change payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryStatusUpdate {
    pub delivery_id: i64,
    pub driver_id: Option<i64>,
    pub status: String,
}

/// Publisher seam to the external pub/sub transport.
///
/// Topics are keyed by entity id (driver id for location updates, delivery
/// id for status updates). Implementations must not block request handling
/// on transport failures.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish_driver_location(&self, update: &DriverLocationRecord);

    async fn publish_delivery_status(&self, update: &DeliveryStatusUpdate);

    async fn publish_geofence_alert(&self, alert: &GeofenceAlert);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_serialization() {
        let envelope = EventEnvelope::new(
            EventType::DeliveryStatusUpdate,
            DeliveryStatusUpdate {
                delivery_id: 9,
                driver_id: Some(4),
                status: "IN_TRANSIT".to_string(),
            },
        );
        let json = serde_json::to_string(&envelope).unwrap();
        assert!(json.contains("\"type\":\"DELIVERY_STATUS_UPDATE\""));
        assert!(json.contains("\"deliveryId\":9"));
        assert!(json.contains("\"timestamp\""));
    }

    #[test]
    fn test_event_type_display() {
        assert_eq!(
            EventType::DriverLocationUpdate.to_string(),
            "DRIVER_LOCATION_UPDATE"
        );
    }
}
