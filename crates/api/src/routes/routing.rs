//! Route estimation endpoint handlers.

use axum::{extract::State, Json};

use domain::models::route::{RouteRequest, RouteResult};

use crate::app::AppState;
use crate::error::ApiError;

/// Compute a route between two addresses.
///
/// POST /api/v1/routes/query
///
/// The request flags choose the variant: `optimizeRoute` applies the
/// optimizer pass, `includeTraffic` pulls a per-pair traffic multiplier,
/// otherwise the plain estimate with the fixed traffic factor is returned.
pub async fn query_route(
    State(state): State<AppState>,
    Json(request): Json<RouteRequest>,
) -> Result<Json<RouteResult>, ApiError> {
    let result = state.geospatial.get_route(&request).await?;
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use domain::models::route::{RouteRequest, TransportMode};

    #[test]
    fn test_route_request_with_flags() {
        let json = r#"{
            "pickupAddressId": 10,
            "dropoffAddressId": 20,
            "transportMode": "walking",
            "optimizeRoute": true,
            "includeTraffic": true
        }"#;
        let request: RouteRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.transport_mode, TransportMode::Walking);
        assert!(request.optimize_route);
        assert!(request.include_traffic);
    }
}
