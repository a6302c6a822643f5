//! Collaborator providers for the tracking subsystem.
//!
//! The routing, traffic, and driver-directory seams each have a stub
//! implementation (no external system available) and, for routing, an
//! OSRM-backed implementation. Stubs derive their values deterministically
//! from the input pair so estimates are stable across calls.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use domain::geo::Coordinates;
use domain::services::routing::{LegStop, RouteLeg, RoutingError, RoutingProvider, TrafficProvider};

use crate::config::RoutingConfig;

/// Driver profile data resolved from the driver directory collaborator.
#[derive(Debug, Clone)]
pub struct DriverProfile {
    pub name: String,
    pub vehicle_info: String,
}

/// Driver directory seam. The real directory lives in the platform's driver
/// service; the stub composes display strings from the id.
#[async_trait]
pub trait DriverDirectory: Send + Sync {
    async fn driver_profile(&self, driver_id: i64) -> DriverProfile;
}

/// Stub directory: display fields composed from the driver id.
#[derive(Debug, Default)]
pub struct StubDriverDirectory;

#[async_trait]
impl DriverDirectory for StubDriverDirectory {
    async fn driver_profile(&self, driver_id: i64) -> DriverProfile {
        DriverProfile {
            name: format!("Driver {}", driver_id),
            vehicle_info: format!("Vehicle {}", driver_id),
        }
    }
}

/// Deterministic per-pair RNG so stubbed estimates are stable across calls.
fn pair_rng(pickup_address_id: i64, dropoff_address_id: i64) -> StdRng {
    let seed = (pickup_address_id as u64)
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
        .wrapping_add(dropoff_address_id as u64);
    StdRng::seed_from_u64(seed)
}

/// Stub routing provider: no road network, so legs are synthesized around
/// the Addis Ababa service area with a 5-20 km distance per address pair.
#[derive(Debug, Default)]
pub struct StubRoutingProvider;

#[async_trait]
impl RoutingProvider for StubRoutingProvider {
    async fn route_leg(
        &self,
        pickup_address_id: i64,
        dropoff_address_id: i64,
    ) -> Result<RouteLeg, RoutingError> {
        let mut rng = pair_rng(pickup_address_id, dropoff_address_id);
        let distance_km: f64 = rng.gen_range(5.0..20.0);

        // Scatter the endpoints around the service area center
        let pickup_lat = 9.1450 + rng.gen_range(-0.05..0.05);
        let pickup_long = 40.4897 + rng.gen_range(-0.05..0.05);
        let dropoff_lat = pickup_lat + rng.gen_range(-0.02..0.02);
        let dropoff_long = pickup_long + distance_km / 111.0;

        Ok(RouteLeg {
            distance_km,
            pickup: LegStop {
                coordinates: Coordinates::new(pickup_lat, pickup_long),
                address: format!("Address {}", pickup_address_id),
            },
            dropoff: LegStop {
                coordinates: Coordinates::new(dropoff_lat, dropoff_long),
                address: format!("Address {}", dropoff_address_id),
            },
            polyline: format!("stub_{}_{}", pickup_address_id, dropoff_address_id),
        })
    }
}

/// Stub traffic provider: a 0-50% slowdown derived from the address pair.
#[derive(Debug, Default)]
pub struct StubTrafficProvider;

#[async_trait]
impl TrafficProvider for StubTrafficProvider {
    async fn multiplier(
        &self,
        pickup_address_id: i64,
        dropoff_address_id: i64,
    ) -> Result<f64, RoutingError> {
        let mut rng = pair_rng(pickup_address_id, dropoff_address_id);
        Ok(1.0 + rng.gen_range(0.0..0.5))
    }
}

/// OSRM route response (subset of fields this provider reads).
#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    routes: Option<Vec<OsrmRoute>>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    /// Distance in meters.
    distance: f64,
    geometry: String,
}

/// OSRM-backed routing provider.
///
/// Calls run with a bounded timeout; timeouts and transport failures map to
/// retryable errors, never a fabricated leg.
pub struct OsrmRoutingProvider {
    client: Client,
    base_url: String,
    resolver: Box<dyn AddressResolver>,
}

/// Address-id to coordinate resolution seam for the OSRM provider.
#[async_trait]
pub trait AddressResolver: Send + Sync {
    async fn resolve(&self, address_id: i64) -> Result<(Coordinates, String), RoutingError>;
}

impl OsrmRoutingProvider {
    pub fn new(config: &RoutingConfig, resolver: Box<dyn AddressResolver>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            resolver,
        }
    }
}

#[async_trait]
impl RoutingProvider for OsrmRoutingProvider {
    async fn route_leg(
        &self,
        pickup_address_id: i64,
        dropoff_address_id: i64,
    ) -> Result<RouteLeg, RoutingError> {
        let (pickup_coords, pickup_address) = self.resolver.resolve(pickup_address_id).await?;
        let (dropoff_coords, dropoff_address) = self.resolver.resolve(dropoff_address_id).await?;

        // OSRM expects lon,lat ordering
        let url = format!(
            "{}/route/v1/driving/{},{};{},{}?overview=full",
            self.base_url,
            pickup_coords.long,
            pickup_coords.lat,
            dropoff_coords.long,
            dropoff_coords.lat,
        );

        debug!(%url, "Requesting OSRM route");

        let response = self.client.get(&url).send().await.map_err(|err| {
            if err.is_timeout() {
                RoutingError::Timeout
            } else {
                RoutingError::Unavailable(err.to_string())
            }
        })?;

        let body: OsrmRouteResponse = response
            .json()
            .await
            .map_err(|err| RoutingError::Unavailable(err.to_string()))?;

        if body.code != "Ok" {
            return Err(RoutingError::Unavailable(
                body.message.unwrap_or(body.code),
            ));
        }

        let route = body
            .routes
            .and_then(|mut routes| if routes.is_empty() { None } else { Some(routes.remove(0)) })
            .ok_or_else(|| RoutingError::Unavailable("OSRM returned no routes".to_string()))?;

        Ok(RouteLeg {
            distance_km: route.distance / 1000.0,
            pickup: LegStop {
                coordinates: pickup_coords,
                address: pickup_address,
            },
            dropoff: LegStop {
                coordinates: dropoff_coords,
                address: dropoff_address,
            },
            polyline: route.geometry,
        })
    }
}

/// Stub address resolver: address coordinates scattered deterministically
/// around the service area. The real resolver is the platform's address
/// service.
#[derive(Debug, Default)]
pub struct StubAddressResolver;

#[async_trait]
impl AddressResolver for StubAddressResolver {
    async fn resolve(&self, address_id: i64) -> Result<(Coordinates, String), RoutingError> {
        let mut rng = pair_rng(address_id, address_id);
        let lat = 9.1450 + rng.gen_range(-0.05..0.05);
        let long = 40.4897 + rng.gen_range(-0.05..0.05);
        Ok((Coordinates::new(lat, long), format!("Address {}", address_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stub_directory_composes_display_fields() {
        let directory = StubDriverDirectory;
        let profile = directory.driver_profile(42).await;
        assert_eq!(profile.name, "Driver 42");
        assert_eq!(profile.vehicle_info, "Vehicle 42");
    }

    #[tokio::test]
    async fn test_stub_routing_is_deterministic_per_pair() {
        let provider = StubRoutingProvider;
        let first = provider.route_leg(10, 20).await.unwrap();
        let second = provider.route_leg(10, 20).await.unwrap();
        assert_eq!(first.distance_km, second.distance_km);
        assert_eq!(first.pickup.coordinates, second.pickup.coordinates);
    }

    #[tokio::test]
    async fn test_stub_routing_distance_in_range() {
        let provider = StubRoutingProvider;
        for pickup in 0..10 {
            let leg = provider.route_leg(pickup, pickup + 100).await.unwrap();
            assert!((5.0..20.0).contains(&leg.distance_km), "{}", leg.distance_km);
            assert!(leg.pickup.coordinates.is_valid());
            assert!(leg.dropoff.coordinates.is_valid());
        }
    }

    #[tokio::test]
    async fn test_stub_traffic_multiplier_never_speeds_up() {
        let provider = StubTrafficProvider;
        for pickup in 0..10 {
            let multiplier = provider.multiplier(pickup, pickup + 1).await.unwrap();
            assert!((1.0..1.5).contains(&multiplier), "{multiplier}");
        }
    }

    #[tokio::test]
    async fn test_stub_traffic_is_deterministic_per_pair() {
        let provider = StubTrafficProvider;
        let first = provider.multiplier(3, 4).await.unwrap();
        let second = provider.multiplier(3, 4).await.unwrap();
        assert_eq!(first, second);
    }
}
