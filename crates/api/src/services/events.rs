//! Event publisher implementation.
//!
//! The real transport (WebSocket/STOMP broker) is an external collaborator.
//! This implementation serializes the envelope and emits it on the log
//! stream, keyed by the topic the broker would use.

use async_trait::async_trait;
use tracing::{info, warn};

use domain::models::geo_point::DriverLocationRecord;
use domain::models::geofence::GeofenceAlert;
use domain::services::events::{
    DeliveryStatusUpdate, EventEnvelope, EventPublisher, EventType,
};

/// Publishes events to the tracing stream.
///
/// Serialization failures are logged and dropped; publishing never fails
/// the request that produced the event.
#[derive(Debug, Default)]
pub struct TracingEventPublisher;

impl TracingEventPublisher {
    fn emit<T: serde::Serialize>(&self, topic: String, envelope: EventEnvelope<T>) {
        match serde_json::to_string(&envelope) {
            Ok(message) => {
                info!(topic = %topic, event_type = %envelope.event_type, %message, "Published event");
            }
            Err(err) => {
                warn!(topic = %topic, %err, "Failed to serialize event payload");
            }
        }
    }
}

#[async_trait]
impl EventPublisher for TracingEventPublisher {
    async fn publish_driver_location(&self, update: &DriverLocationRecord) {
        self.emit(
            format!("/topic/driver/{}/location", update.driver_id),
            EventEnvelope::new(EventType::DriverLocationUpdate, update),
        );
    }

    async fn publish_delivery_status(&self, update: &DeliveryStatusUpdate) {
        self.emit(
            format!("/topic/delivery/{}/status", update.delivery_id),
            EventEnvelope::new(EventType::DeliveryStatusUpdate, update),
        );
    }

    async fn publish_geofence_alert(&self, alert: &GeofenceAlert) {
        self.emit(
            format!("/topic/driver/{}/geofence", alert.driver_id),
            EventEnvelope::new(EventType::GeofenceAlert, alert),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::models::geofence::GeofenceStatus;

    #[tokio::test]
    async fn test_publish_does_not_panic() {
        let publisher = TracingEventPublisher;
        publisher
            .publish_delivery_status(&DeliveryStatusUpdate {
                delivery_id: 9,
                driver_id: Some(4),
                status: "IN_TRANSIT".to_string(),
            })
            .await;

        publisher
            .publish_geofence_alert(&GeofenceAlert {
                alert_id: 1,
                driver_id: 4,
                delivery_id: 9,
                status: GeofenceStatus::OutsideZone,
                driver_lat: Some(9.0),
                driver_long: Some(38.0),
                zone_center_lat: 9.0,
                zone_center_long: 38.0,
                zone_radius_km: 1.0,
                distance_from_center_km: Some(2.0),
                timestamp: Utc::now(),
                alert_message: "Driver has left delivery zone".to_string(),
                is_active: true,
            })
            .await;
    }
}
