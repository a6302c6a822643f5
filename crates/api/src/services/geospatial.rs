//! Geospatial tracking service.
//!
//! Orchestrates location ingestion, geofence evaluation, route queries,
//! clustering, and heatmap aggregation over the persistence and provider
//! collaborators.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use domain::geo::{is_valid_coordinates, is_within_radius, Coordinates};
use domain::models::cluster::{ClusterSummary, DriverCluster};
use domain::models::geo_point::{
    DriverLocationRecord, GeoPoint, LocationHistoryQuery, LocationHistoryResponse, PaginationInfo,
    TrackLocationRequest,
};
use domain::models::geofence::{GeofenceAlert, SetupGeofenceRequest};
use domain::models::heatmap::{heatmap_color, intensity_for_count, HeatmapCell, HeatmapSummary};
use domain::models::route::{RouteRequest, RouteResult};
use domain::services::clustering::cluster_points;
use domain::services::events::EventPublisher;
use domain::services::geofencing::{
    current_alerts, evaluate_ping, registration_alert, GeofenceRegistry,
};
use domain::services::routing::RouteEstimator;
use persistence::repositories::{DeliveryRepository, GeoPointRepository};
use shared::pagination::{decode_cursor, encode_cursor};

use crate::error::ApiError;
use crate::middleware::metrics::{record_geofence_breach, record_location_tracked};
use crate::services::providers::DriverDirectory;

/// Whether a last-seen timestamp counts as online at the given threshold.
pub fn is_online(last_update: DateTime<Utc>, now: DateTime<Utc>, threshold: Duration) -> bool {
    now - last_update < threshold
}

/// Orchestrator for the tracking subsystem.
pub struct GeospatialService {
    geo_points: GeoPointRepository,
    deliveries: DeliveryRepository,
    registry: Arc<GeofenceRegistry>,
    estimator: RouteEstimator,
    directory: Arc<dyn DriverDirectory>,
    publisher: Arc<dyn EventPublisher>,
    online_threshold: Duration,
}

impl GeospatialService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        geo_points: GeoPointRepository,
        deliveries: DeliveryRepository,
        registry: Arc<GeofenceRegistry>,
        estimator: RouteEstimator,
        directory: Arc<dyn DriverDirectory>,
        publisher: Arc<dyn EventPublisher>,
        online_threshold_secs: i64,
    ) -> Self {
        Self {
            geo_points,
            deliveries,
            registry,
            estimator,
            directory,
            publisher,
            online_threshold: Duration::seconds(online_threshold_secs),
        }
    }

    /// Ingest a location ping: validate, persist, evaluate the geofence for
    /// the pair, publish the update, and return the enriched record.
    pub async fn track_location(
        &self,
        request: TrackLocationRequest,
    ) -> Result<DriverLocationRecord, ApiError> {
        request.validate()?;

        if let Some(delivery_id) = request.delivery_id {
            if !self.deliveries.exists(delivery_id).await? {
                return Err(ApiError::NotFound(format!(
                    "Delivery {} not found",
                    delivery_id
                )));
            }
        }

        let entity = self
            .geo_points
            .insert(
                request.driver_id,
                request.delivery_id,
                request.lat,
                request.long,
                request.speed_kmh,
                request.heading_degrees,
                request.accuracy_meters,
            )
            .await?;
        let point: GeoPoint = entity.into();

        record_location_tracked();
        info!(
            driver_id = point.driver_id,
            delivery_id = ?point.delivery_id,
            "Tracked driver location"
        );

        if let Some(alert) = evaluate_ping(&self.registry, &point, Utc::now()) {
            record_geofence_breach();
            self.publisher.publish_geofence_alert(&alert).await;
        }

        let record = self.enrich(point, "IN_PROGRESS", true).await;
        self.publisher.publish_driver_location(&record).await;
        Ok(record)
    }

    /// Latest position per distinct driver, flagged online/offline against
    /// the staleness threshold.
    pub async fn active_drivers_on_map(&self) -> Result<Vec<DriverLocationRecord>, ApiError> {
        let now = Utc::now();
        let latest = self.geo_points.find_latest_per_driver().await?;

        let mut records = Vec::with_capacity(latest.len());
        for entity in latest {
            let point: GeoPoint = entity.into();
            let online = is_online(point.timestamp, now, self.online_threshold);
            records.push(self.enrich(point, "ACTIVE", online).await);
        }
        Ok(records)
    }

    /// Latest driver positions within `radius_km` of a center point.
    pub async fn drivers_in_radius(
        &self,
        center_lat: f64,
        center_long: f64,
        radius_km: f64,
    ) -> Result<Vec<DriverLocationRecord>, ApiError> {
        if !is_valid_coordinates(center_lat, center_long) {
            return Err(ApiError::Validation("Invalid center coordinates".into()));
        }
        if radius_km <= 0.0 {
            return Err(ApiError::Validation("Radius must be positive".into()));
        }

        let center = Coordinates::new(center_lat, center_long);
        let now = Utc::now();
        let latest = self.geo_points.find_latest_per_driver().await?;

        let mut records = Vec::new();
        for entity in latest {
            let point: GeoPoint = entity.into();
            if is_within_radius(point.coordinates(), center, radius_km) {
                let online = is_online(point.timestamp, now, self.online_threshold);
                records.push(self.enrich(point, "ACTIVE", online).await);
            }
        }
        Ok(records)
    }

    /// Chronological position history for a driver.
    pub async fn driver_location_history(
        &self,
        driver_id: i64,
        query: &LocationHistoryQuery,
    ) -> Result<LocationHistoryResponse, ApiError> {
        let cursor = parse_cursor(query)?;
        let limit = query.effective_limit() as i64;
        let entities = self
            .geo_points
            .history_by_driver(driver_id, cursor, limit)
            .await?;
        Ok(paginate(entities, limit))
    }

    /// The route actually travelled for a delivery.
    pub async fn delivery_route_history(
        &self,
        delivery_id: i64,
        query: &LocationHistoryQuery,
    ) -> Result<LocationHistoryResponse, ApiError> {
        if !self.deliveries.exists(delivery_id).await? {
            return Err(ApiError::NotFound(format!(
                "Delivery {} not found",
                delivery_id
            )));
        }
        let cursor = parse_cursor(query)?;
        let limit = query.effective_limit() as i64;
        let entities = self
            .geo_points
            .history_by_delivery(delivery_id, cursor, limit)
            .await?;
        Ok(paginate(entities, limit))
    }

    /// Latest driver positions grouped into spatial clusters.
    pub async fn clustered_drivers_view(&self, radius_km: f64) -> Result<ClusterSummary, ApiError> {
        if radius_km <= 0.0 {
            return Err(ApiError::Validation("Cluster radius must be positive".into()));
        }

        let now = Utc::now();
        let latest = self.geo_points.find_latest_per_driver().await?;
        let points: Vec<GeoPoint> = latest.into_iter().map(Into::into).collect();
        let total_drivers = points.len();

        let raw_clusters = cluster_points(&points, radius_km);

        let mut clusters = Vec::with_capacity(raw_clusters.len());
        for (index, cluster) in raw_clusters.iter().enumerate() {
            let mut drivers = Vec::with_capacity(cluster.member_indices.len());
            for &point_index in &cluster.member_indices {
                let point = points[point_index].clone();
                let online = is_online(point.timestamp, now, self.online_threshold);
                drivers.push(self.enrich(point, "ACTIVE", online).await);
            }
            clusters.push(DriverCluster {
                cluster_id: format!("cluster_{}_{}", now.timestamp_millis(), index),
                center_lat: cluster.center_lat,
                center_long: cluster.center_long,
                driver_count: drivers.len(),
                radius_km,
                drivers,
            });
        }

        Ok(ClusterSummary {
            total_clusters: clusters.len(),
            total_drivers,
            clusters,
        })
    }

    /// Delivery volume per region/woreda as normalized heatmap cells.
    pub async fn delivery_heatmap(
        &self,
        region: Option<&str>,
        woreda: Option<&str>,
    ) -> Result<HeatmapSummary, ApiError> {
        let aggregates = self.deliveries.heatmap_aggregates(region, woreda).await?;

        let mut total_deliveries = 0;
        let mut regions = std::collections::HashSet::new();
        let mut woredas = std::collections::HashSet::new();
        let mut cells = Vec::with_capacity(aggregates.len());

        for aggregate in aggregates {
            total_deliveries += aggregate.delivery_count;
            regions.insert(aggregate.region.clone());
            woredas.insert(aggregate.woreda.clone());

            let intensity = intensity_for_count(aggregate.delivery_count);
            cells.push(HeatmapCell {
                region: aggregate.region,
                woreda: aggregate.woreda,
                delivery_count: aggregate.delivery_count,
                center_lat: aggregate.center_lat.unwrap_or(0.0),
                center_long: aggregate.center_long.unwrap_or(0.0),
                intensity,
                color: heatmap_color(intensity),
            });
        }

        Ok(HeatmapSummary {
            total_deliveries,
            total_regions: regions.len(),
            total_woredas: woredas.len(),
            heatmap_data: cells,
        })
    }

    /// Register (or overwrite) a geofencing alert for a (driver, delivery)
    /// pair.
    pub async fn setup_geofence_alert(
        &self,
        request: SetupGeofenceRequest,
    ) -> Result<GeofenceAlert, ApiError> {
        request.validate()?;

        if !self.deliveries.exists(request.delivery_id).await? {
            return Err(ApiError::NotFound(format!(
                "Delivery {} not found",
                request.delivery_id
            )));
        }

        let now = Utc::now();
        let zone = self.registry.register(&request, now);
        info!(
            driver_id = zone.driver_id,
            delivery_id = zone.delivery_id,
            radius_km = zone.radius_km,
            "Registered geofencing alert"
        );
        Ok(registration_alert(&zone, now))
    }

    /// Current geofence status for a pair, recomputed from the latest known
    /// position.
    pub async fn geofence_alerts(
        &self,
        driver_id: i64,
        delivery_id: i64,
    ) -> Result<Vec<GeofenceAlert>, ApiError> {
        let latest = self
            .geo_points
            .find_latest_for_pair(driver_id, delivery_id)
            .await?
            .map(GeoPoint::from);
        Ok(current_alerts(
            &self.registry,
            driver_id,
            delivery_id,
            latest.as_ref(),
            Utc::now(),
        ))
    }

    /// Drop the geofence registration for a pair. Returns whether one
    /// existed.
    pub fn clear_geofence_alert(&self, driver_id: i64, delivery_id: i64) -> bool {
        self.registry.clear(driver_id, delivery_id)
    }

    /// Route query dispatch: optimization wins over traffic, traffic over
    /// the plain calculation.
    pub async fn get_route(&self, request: &RouteRequest) -> Result<RouteResult, ApiError> {
        Ok(self.estimator.estimate(request).await?)
    }

    async fn enrich(
        &self,
        point: GeoPoint,
        delivery_status: &str,
        online: bool,
    ) -> DriverLocationRecord {
        let profile = self.directory.driver_profile(point.driver_id).await;
        DriverLocationRecord {
            id: point.id,
            driver_id: point.driver_id,
            delivery_id: point.delivery_id,
            lat: point.lat,
            long: point.long,
            timestamp: point.timestamp,
            speed_kmh: point.speed_kmh,
            heading_degrees: point.heading_degrees,
            accuracy_meters: point.accuracy_meters,
            driver_name: profile.name,
            vehicle_info: profile.vehicle_info,
            delivery_status: delivery_status.to_string(),
            is_online: online,
        }
    }
}

fn parse_cursor(
    query: &LocationHistoryQuery,
) -> Result<Option<(DateTime<Utc>, i64)>, ApiError> {
    match &query.cursor {
        Some(cursor) => decode_cursor(cursor)
            .map(Some)
            .map_err(|e| ApiError::Validation(format!("Invalid cursor: {}", e))),
        None => Ok(None),
    }
}

fn paginate(
    entities: Vec<persistence::entities::GeoPointEntity>,
    limit: i64,
) -> LocationHistoryResponse {
    let has_more = entities.len() as i64 > limit;
    let locations: Vec<GeoPoint> = entities
        .into_iter()
        .take(limit as usize)
        .map(Into::into)
        .collect();

    let next_cursor = if has_more {
        locations
            .last()
            .map(|point| encode_cursor(point.timestamp, point.id))
    } else {
        None
    };

    LocationHistoryResponse {
        locations,
        pagination: PaginationInfo {
            next_cursor,
            has_more,
        },
    }
}
