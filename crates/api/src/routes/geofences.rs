//! Geofencing endpoint handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

use domain::models::geofence::{GeofenceAlert, SetupGeofenceRequest};

use crate::app::AppState;
use crate::error::ApiError;

/// Register a geofencing alert for a (driver, delivery) pair.
///
/// POST /api/v1/geofences/alerts
pub async fn setup_alert(
    State(state): State<AppState>,
    Json(request): Json<SetupGeofenceRequest>,
) -> Result<(StatusCode, Json<GeofenceAlert>), ApiError> {
    let alert = state.geospatial.setup_geofence_alert(request).await?;
    Ok((StatusCode::CREATED, Json(alert)))
}

/// Query parameters identifying a (driver, delivery) pair.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertPairQuery {
    pub driver_id: i64,
    pub delivery_id: i64,
}

/// Current geofence status for a pair, recomputed from the latest known
/// position.
///
/// GET /api/v1/geofences/alerts?driverId=..&deliveryId=..
pub async fn get_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertPairQuery>,
) -> Result<Json<Vec<GeofenceAlert>>, ApiError> {
    let alerts = state
        .geospatial
        .geofence_alerts(query.driver_id, query.delivery_id)
        .await?;
    Ok(Json(alerts))
}

/// Drop the geofence registration for a pair (delivery completed or
/// tracking stopped).
///
/// DELETE /api/v1/geofences/alerts?driverId=..&deliveryId=..
pub async fn clear_alert(
    State(state): State<AppState>,
    Query(query): Query<AlertPairQuery>,
) -> Result<StatusCode, ApiError> {
    let removed = state
        .geospatial
        .clear_geofence_alert(query.driver_id, query.delivery_id);

    if !removed {
        return Err(ApiError::NotFound("No geofence registered for pair".into()));
    }

    info!(
        driver_id = query.driver_id,
        delivery_id = query.delivery_id,
        "Cleared geofence registration"
    );
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_pair_query_deserialization() {
        let query: AlertPairQuery =
            serde_json::from_str(r#"{"driverId": 4, "deliveryId": 9}"#).unwrap();
        assert_eq!(query.driver_id, 4);
        assert_eq!(query.delivery_id, 9);
    }

    #[test]
    fn test_setup_request_full_deserialization() {
        let json = r#"{
            "driverId": 4,
            "deliveryId": 9,
            "centerLat": 9.0321,
            "centerLong": 38.7469,
            "radiusKm": 2.0,
            "enableAlerts": false
        }"#;
        let request: SetupGeofenceRequest = serde_json::from_str(json).unwrap();
        assert!(!request.enable_alerts);
        assert_eq!(request.radius_km, 2.0);
    }
}
