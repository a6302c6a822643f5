//! Route estimation engine.
//!
//! ETA math over distances supplied by a routing provider. The provider and
//! traffic source sit behind traits so the stub implementations (no road
//! network available) and the real API-backed ones are interchangeable.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::geo::{BoundingBox, Coordinates};
use crate::models::route::{RouteRequest, RouteResult, RouteWaypoint, TransportMode};

/// Fixed traffic multiplier applied by the plain route calculation.
pub const FIXED_TRAFFIC_MULTIPLIER: f64 = 1.3;

/// Flat duration reduction applied by route optimization.
pub const OPTIMIZATION_FACTOR: f64 = 0.9;

/// Errors from routing/traffic collaborators.
///
/// `Unavailable` and `Timeout` are retryable from the caller's perspective;
/// the engine never fabricates a route when a provider fails.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("Routing provider unavailable: {0}")]
    Unavailable(String),
    #[error("Routing provider timed out")]
    Timeout,
    #[error("Unknown address: {0}")]
    UnknownAddress(i64),
}

/// One endpoint of a route leg as resolved by the provider.
#[derive(Debug, Clone)]
pub struct LegStop {
    pub coordinates: Coordinates,
    pub address: String,
}

/// A resolved route leg between two addresses.
#[derive(Debug, Clone)]
pub struct RouteLeg {
    pub distance_km: f64,
    pub pickup: LegStop,
    pub dropoff: LegStop,
    pub polyline: String,
}

/// Road-network routing collaborator.
#[async_trait]
pub trait RoutingProvider: Send + Sync {
    /// Resolve the leg between two address ids: distance, endpoint
    /// coordinates, and an encoded path.
    async fn route_leg(
        &self,
        pickup_address_id: i64,
        dropoff_address_id: i64,
    ) -> Result<RouteLeg, RoutingError>;
}

/// Real-time traffic collaborator.
#[async_trait]
pub trait TrafficProvider: Send + Sync {
    /// Traffic multiplier for a pickup/dropoff pair. 1.0 means free-flowing;
    /// values below 1.0 are clamped (traffic never speeds a route up).
    async fn multiplier(
        &self,
        pickup_address_id: i64,
        dropoff_address_id: i64,
    ) -> Result<f64, RoutingError>;
}

/// ETA for a distance at the mode's assumed average speed.
///
/// Zero, negative, or missing distance yields a zero duration. This is a
/// defined edge case on the estimation path, not an error.
pub fn calculate_eta(distance_km: Option<f64>, mode: TransportMode) -> Duration {
    let distance = match distance_km {
        Some(d) if d > 0.0 => d,
        _ => return Duration::ZERO,
    };

    let time_hours = distance / mode.average_speed_kmh();
    Duration::from_secs((time_hours * 3600.0) as u64)
}

fn scale_duration(duration: Duration, factor: f64) -> Duration {
    Duration::from_secs((duration.as_secs_f64() * factor) as u64)
}

/// Route estimation over pluggable routing/traffic collaborators.
pub struct RouteEstimator {
    routing: Arc<dyn RoutingProvider>,
    traffic: Arc<dyn TrafficProvider>,
}

impl RouteEstimator {
    pub fn new(routing: Arc<dyn RoutingProvider>, traffic: Arc<dyn TrafficProvider>) -> Self {
        Self { routing, traffic }
    }

    /// Dispatches on the request flags: optimization wins over traffic,
    /// traffic over the plain calculation.
    pub async fn estimate(&self, request: &RouteRequest) -> Result<RouteResult, RoutingError> {
        if request.optimize_route {
            self.optimize_route(request).await
        } else if request.include_traffic {
            self.route_with_traffic(request).await
        } else {
            self.calculate_route(request).await
        }
    }

    /// Base route: provider distance, mode ETA, fixed 1.3x traffic estimate.
    pub async fn calculate_route(&self, request: &RouteRequest) -> Result<RouteResult, RoutingError> {
        let leg = self
            .routing
            .route_leg(request.pickup_address_id, request.dropoff_address_id)
            .await?;

        let estimated_duration = calculate_eta(Some(leg.distance_km), request.transport_mode);
        let estimated_duration_with_traffic =
            scale_duration(estimated_duration, FIXED_TRAFFIC_MULTIPLIER);

        let waypoints = build_waypoints(&leg, estimated_duration);
        let bounds = BoundingBox::from_points(&[leg.pickup.coordinates, leg.dropoff.coordinates]);

        Ok(RouteResult {
            route_id: Utc::now().timestamp_millis(),
            total_distance_km: leg.distance_km,
            estimated_duration,
            estimated_duration_with_traffic,
            transport_mode: request.transport_mode,
            optimized: false,
            waypoints,
            bounds,
            polyline: leg.polyline,
            warnings: request
                .include_traffic
                .then(|| "Traffic data may be approximate".to_string()),
        })
    }

    /// Base route with a flat 10% duration reduction standing in for a real
    /// waypoint optimizer.
    pub async fn optimize_route(&self, request: &RouteRequest) -> Result<RouteResult, RoutingError> {
        let base = self.calculate_route(request).await?;

        let optimized_duration = scale_duration(base.estimated_duration, OPTIMIZATION_FACTOR);

        Ok(RouteResult {
            estimated_duration: optimized_duration,
            estimated_duration_with_traffic: scale_duration(
                optimized_duration,
                FIXED_TRAFFIC_MULTIPLIER,
            ),
            optimized: true,
            warnings: Some("Route optimized for efficiency".to_string()),
            ..base
        })
    }

    /// Base route with a per-pair traffic multiplier from the traffic
    /// collaborator instead of the fixed estimate.
    pub async fn route_with_traffic(&self, request: &RouteRequest) -> Result<RouteResult, RoutingError> {
        let base = self.calculate_route(request).await?;

        let multiplier = self
            .traffic
            .multiplier(request.pickup_address_id, request.dropoff_address_id)
            .await?
            .max(1.0);

        Ok(RouteResult {
            estimated_duration_with_traffic: scale_duration(base.estimated_duration, multiplier),
            warnings: Some("Traffic data is approximate".to_string()),
            ..base
        })
    }
}

/// Ordered waypoints: pickup at zero distance/duration, then the dropoff at
/// cumulative totals.
fn build_waypoints(leg: &RouteLeg, total_duration: Duration) -> Vec<RouteWaypoint> {
    vec![
        RouteWaypoint {
            lat: leg.pickup.coordinates.lat,
            long: leg.pickup.coordinates.long,
            address: leg.pickup.address.clone(),
            duration_from_start: Duration::ZERO,
            distance_from_start_km: 0.0,
        },
        RouteWaypoint {
            lat: leg.dropoff.coordinates.lat,
            long: leg.dropoff.coordinates.long,
            address: leg.dropoff.address.clone(),
            duration_from_start: total_duration,
            distance_from_start_km: leg.distance_km,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRouting {
        distance_km: f64,
    }

    #[async_trait]
    impl RoutingProvider for FixedRouting {
        async fn route_leg(&self, _pickup: i64, _dropoff: i64) -> Result<RouteLeg, RoutingError> {
            Ok(RouteLeg {
                distance_km: self.distance_km,
                pickup: LegStop {
                    coordinates: Coordinates::new(9.1450, 40.4897),
                    address: "Pickup Location".to_string(),
                },
                dropoff: LegStop {
                    coordinates: Coordinates::new(9.1550, 40.4997),
                    address: "Dropoff Location".to_string(),
                },
                polyline: "mocked_polyline".to_string(),
            })
        }
    }

    struct FixedTraffic {
        multiplier: f64,
    }

    #[async_trait]
    impl TrafficProvider for FixedTraffic {
        async fn multiplier(&self, _pickup: i64, _dropoff: i64) -> Result<f64, RoutingError> {
            Ok(self.multiplier)
        }
    }

    fn estimator(distance_km: f64, traffic: f64) -> RouteEstimator {
        RouteEstimator::new(
            Arc::new(FixedRouting { distance_km }),
            Arc::new(FixedTraffic { multiplier: traffic }),
        )
    }

    fn request(optimize: bool, traffic: bool) -> RouteRequest {
        RouteRequest {
            pickup_address_id: 10,
            dropoff_address_id: 20,
            transport_mode: TransportMode::Driving,
            optimize_route: optimize,
            include_traffic: traffic,
        }
    }

    #[test]
    fn test_calculate_eta_driving_scaling() {
        // 30 km at 30 km/h is exactly one hour
        let eta = calculate_eta(Some(30.0), TransportMode::Driving);
        assert_eq!(eta, Duration::from_secs(3600));
    }

    #[test]
    fn test_calculate_eta_walking_and_cycling() {
        assert_eq!(
            calculate_eta(Some(5.0), TransportMode::Walking),
            Duration::from_secs(3600)
        );
        assert_eq!(
            calculate_eta(Some(15.0), TransportMode::Cycling),
            Duration::from_secs(3600)
        );
    }

    #[test]
    fn test_calculate_eta_degenerate_distances() {
        assert_eq!(calculate_eta(Some(0.0), TransportMode::Driving), Duration::ZERO);
        assert_eq!(calculate_eta(Some(-5.0), TransportMode::Driving), Duration::ZERO);
        assert_eq!(calculate_eta(None, TransportMode::Driving), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_calculate_route_applies_fixed_traffic() {
        let result = estimator(30.0, 1.0)
            .calculate_route(&request(false, false))
            .await
            .unwrap();
        assert_eq!(result.estimated_duration, Duration::from_secs(3600));
        assert_eq!(
            result.estimated_duration_with_traffic,
            Duration::from_secs((3600.0 * FIXED_TRAFFIC_MULTIPLIER) as u64)
        );
        assert!(!result.optimized);
    }

    #[tokio::test]
    async fn test_optimize_route_reduces_duration() {
        let est = estimator(30.0, 1.0);
        let base = est.calculate_route(&request(false, false)).await.unwrap();
        let optimized = est.optimize_route(&request(true, false)).await.unwrap();

        assert!(optimized.estimated_duration < base.estimated_duration);
        assert_eq!(
            optimized.estimated_duration,
            Duration::from_secs((3600.0 * OPTIMIZATION_FACTOR) as u64)
        );
        assert!(optimized.optimized);
    }

    #[tokio::test]
    async fn test_traffic_never_speeds_route_up() {
        // A provider reporting < 1.0 is clamped to the base duration
        let result = estimator(30.0, 0.5)
            .route_with_traffic(&request(false, true))
            .await
            .unwrap();
        assert!(result.estimated_duration_with_traffic >= result.estimated_duration);
    }

    #[tokio::test]
    async fn test_traffic_multiplier_applied() {
        let result = estimator(30.0, 1.5)
            .route_with_traffic(&request(false, true))
            .await
            .unwrap();
        assert_eq!(
            result.estimated_duration_with_traffic,
            Duration::from_secs(5400)
        );
    }

    #[tokio::test]
    async fn test_waypoints_accumulate_from_pickup() {
        let result = estimator(12.0, 1.0)
            .calculate_route(&request(false, false))
            .await
            .unwrap();
        assert_eq!(result.waypoints.len(), 2);

        let pickup = &result.waypoints[0];
        assert_eq!(pickup.distance_from_start_km, 0.0);
        assert_eq!(pickup.duration_from_start, Duration::ZERO);

        let dropoff = &result.waypoints[1];
        assert_eq!(dropoff.distance_from_start_km, 12.0);
        assert_eq!(dropoff.duration_from_start, result.estimated_duration);
    }

    #[tokio::test]
    async fn test_estimate_dispatch_priority() {
        let est = estimator(30.0, 2.0);

        // optimize wins over traffic
        let result = est.estimate(&request(true, true)).await.unwrap();
        assert!(result.optimized);

        let result = est.estimate(&request(false, true)).await.unwrap();
        assert!(!result.optimized);
        assert_eq!(
            result.estimated_duration_with_traffic,
            Duration::from_secs(7200)
        );
    }

    #[tokio::test]
    async fn test_bounds_cover_endpoints() {
        let result = estimator(5.0, 1.0)
            .calculate_route(&request(false, false))
            .await
            .unwrap();
        let bounds = result.bounds.unwrap();
        assert!(bounds.contains(Coordinates::new(9.1450, 40.4897)));
        assert!(bounds.contains(Coordinates::new(9.1550, 40.4997)));
    }
}
