//! Tracking endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use domain::models::cluster::ClusterSummary;
use domain::models::geo_point::{
    DriverLocationRecord, LocationHistoryQuery, LocationHistoryResponse, TrackLocationRequest,
};
use domain::models::heatmap::HeatmapSummary;

use crate::app::AppState;
use crate::error::ApiError;

/// Ingest a driver location ping.
///
/// POST /api/v1/tracking/locations
pub async fn track_location(
    State(state): State<AppState>,
    Json(request): Json<TrackLocationRequest>,
) -> Result<(StatusCode, Json<DriverLocationRecord>), ApiError> {
    let record = state.geospatial.track_location(request).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// All active drivers with their latest position.
///
/// GET /api/v1/tracking/drivers/active
pub async fn active_drivers(
    State(state): State<AppState>,
) -> Result<Json<Vec<DriverLocationRecord>>, ApiError> {
    let records = state.geospatial.active_drivers_on_map().await?;
    Ok(Json(records))
}

/// Query parameters for the radius search.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadiusQuery {
    pub center_lat: f64,
    pub center_long: f64,
    pub radius_km: f64,
}

/// Drivers within a radius of a center point.
///
/// GET /api/v1/tracking/drivers/radius?centerLat=..&centerLong=..&radiusKm=..
pub async fn drivers_in_radius(
    State(state): State<AppState>,
    Query(query): Query<RadiusQuery>,
) -> Result<Json<Vec<DriverLocationRecord>>, ApiError> {
    let records = state
        .geospatial
        .drivers_in_radius(query.center_lat, query.center_long, query.radius_km)
        .await?;
    Ok(Json(records))
}

/// Chronological position history for a driver.
///
/// GET /api/v1/tracking/drivers/:driver_id/history
pub async fn driver_history(
    State(state): State<AppState>,
    Path(driver_id): Path<i64>,
    Query(query): Query<LocationHistoryQuery>,
) -> Result<Json<LocationHistoryResponse>, ApiError> {
    let response = state
        .geospatial
        .driver_location_history(driver_id, &query)
        .await?;
    Ok(Json(response))
}

/// The route actually travelled for a delivery.
///
/// GET /api/v1/tracking/deliveries/:delivery_id/route
pub async fn delivery_route(
    State(state): State<AppState>,
    Path(delivery_id): Path<i64>,
    Query(query): Query<LocationHistoryQuery>,
) -> Result<Json<LocationHistoryResponse>, ApiError> {
    let response = state
        .geospatial
        .delivery_route_history(delivery_id, &query)
        .await?;
    Ok(Json(response))
}

/// Query parameters for the clustered map view.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterQuery {
    pub radius_km: Option<f64>,
}

/// Latest driver positions grouped into spatial clusters.
///
/// GET /api/v1/tracking/clusters?radiusKm=..
pub async fn clustered_drivers(
    State(state): State<AppState>,
    Query(query): Query<ClusterQuery>,
) -> Result<Json<ClusterSummary>, ApiError> {
    let radius_km = query
        .radius_km
        .unwrap_or(state.config.tracking.default_cluster_radius_km);
    let summary = state.geospatial.clustered_drivers_view(radius_km).await?;
    Ok(Json(summary))
}

/// Query parameters for the delivery heatmap.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapQuery {
    pub region: Option<String>,
    pub woreda: Option<String>,
}

/// Delivery volume aggregated per region/woreda.
///
/// GET /api/v1/tracking/heatmap?region=..&woreda=..
pub async fn delivery_heatmap(
    State(state): State<AppState>,
    Query(query): Query<HeatmapQuery>,
) -> Result<Json<HeatmapSummary>, ApiError> {
    let summary = state
        .geospatial
        .delivery_heatmap(query.region.as_deref(), query.woreda.as_deref())
        .await?;
    Ok(Json(summary))
}
