//! Geofencing engine.
//!
//! Keeps an in-memory registry of active zones keyed by (driver, delivery)
//! and recomputes zone membership on every tracked location ping. The
//! registry is shared mutable state across requests; DashMap gives per-key
//! locking, and same-key registrations are idempotent overwrites (last write
//! wins).

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::warn;

use crate::geo::{haversine_km, Coordinates};
use crate::models::geo_point::GeoPoint;
use crate::models::geofence::{
    GeofenceAlert, GeofenceStatus, GeofenceZone, SetupGeofenceRequest,
};

/// Default registration lifetime. Zones are also cleared explicitly when a
/// delivery completes; the TTL is the backstop against abandoned
/// registrations leaking.
pub const DEFAULT_ZONE_TTL_HOURS: i64 = 24;

/// In-memory store of active geofence zones.
///
/// One zone per (driver, delivery) pair. Expired entries are dropped lazily
/// on read.
#[derive(Debug, Default)]
pub struct GeofenceRegistry {
    zones: DashMap<(i64, i64), GeofenceZone>,
    ttl: Option<Duration>,
}

impl GeofenceRegistry {
    pub fn new() -> Self {
        Self {
            zones: DashMap::new(),
            ttl: Some(Duration::hours(DEFAULT_ZONE_TTL_HOURS)),
        }
    }

    /// Registry with a custom TTL; `None` disables expiry.
    pub fn with_ttl(ttl: Option<Duration>) -> Self {
        Self {
            zones: DashMap::new(),
            ttl,
        }
    }

    /// Registers or overwrites the zone for a (driver, delivery) pair.
    pub fn register(&self, request: &SetupGeofenceRequest, now: DateTime<Utc>) -> GeofenceZone {
        let expires_at = match self.ttl {
            Some(ttl) => now + ttl,
            None => DateTime::<Utc>::MAX_UTC,
        };
        let zone = GeofenceZone {
            driver_id: request.driver_id,
            delivery_id: request.delivery_id,
            center: Coordinates::new(request.center_lat, request.center_long),
            radius_km: request.radius_km,
            alerts_enabled: request.enable_alerts,
            registered_at: now,
            expires_at,
        };
        self.zones
            .insert((request.driver_id, request.delivery_id), zone.clone());
        zone
    }

    /// Active zone for a pair, dropping it if expired.
    pub fn get(&self, driver_id: i64, delivery_id: i64, now: DateTime<Utc>) -> Option<GeofenceZone> {
        let key = (driver_id, delivery_id);
        let expired = match self.zones.get(&key) {
            Some(entry) => entry.is_expired(now),
            None => return None,
        };
        if expired {
            self.zones.remove(&key);
            return None;
        }
        self.zones.get(&key).map(|entry| entry.value().clone())
    }

    /// Removes the registration for a pair (delivery completed or tracking
    /// stopped). Returns true if a zone was present.
    pub fn clear(&self, driver_id: i64, delivery_id: i64) -> bool {
        self.zones.remove(&(driver_id, delivery_id)).is_some()
    }

    /// Number of live (possibly expired-but-unreaped) registrations.
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

/// Zone membership for a position against a zone: inside when the distance
/// to center does not exceed the radius.
///
/// Purely a function of the current snapshot; no memory of prior status.
pub fn determine_status(position: Coordinates, zone: &GeofenceZone) -> GeofenceStatus {
    let distance = haversine_km(position, zone.center);
    if distance >= 0.0 && distance <= zone.radius_km {
        GeofenceStatus::InsideZone
    } else {
        GeofenceStatus::OutsideZone
    }
}

/// Evaluates the registered zone (if any, with alerts enabled) against a new
/// location ping. Returns the alert for breach statuses so the caller can
/// publish it; in-zone pings evaluate silently.
pub fn evaluate_ping(
    registry: &GeofenceRegistry,
    point: &GeoPoint,
    now: DateTime<Utc>,
) -> Option<GeofenceAlert> {
    let delivery_id = point.delivery_id?;
    let zone = registry.get(point.driver_id, delivery_id, now)?;
    if !zone.alerts_enabled {
        return None;
    }

    let status = determine_status(point.coordinates(), &zone);
    if !status.is_breach() {
        return None;
    }

    warn!(
        driver_id = point.driver_id,
        delivery_id,
        status = %status,
        "Driver has left geofence zone"
    );

    Some(build_alert(&zone, status, Some(point), now))
}

/// Current alert view for a pair: recomputes status against the latest known
/// point. Zero or one record; no persisted alert history.
pub fn current_alerts(
    registry: &GeofenceRegistry,
    driver_id: i64,
    delivery_id: i64,
    latest_point: Option<&GeoPoint>,
    now: DateTime<Utc>,
) -> Vec<GeofenceAlert> {
    let Some(zone) = registry.get(driver_id, delivery_id, now) else {
        return Vec::new();
    };
    let Some(point) = latest_point else {
        return Vec::new();
    };

    let status = determine_status(point.coordinates(), &zone);
    vec![build_alert(&zone, status, Some(point), point.timestamp)]
}

/// Confirmation record for a fresh registration. Initial status is
/// INSIDE_ZONE by convention; no position recheck happens at setup time.
pub fn registration_alert(zone: &GeofenceZone, now: DateTime<Utc>) -> GeofenceAlert {
    GeofenceAlert {
        alert_id: now.timestamp_millis(),
        driver_id: zone.driver_id,
        delivery_id: zone.delivery_id,
        status: GeofenceStatus::InsideZone,
        driver_lat: None,
        driver_long: None,
        zone_center_lat: zone.center.lat,
        zone_center_long: zone.center.long,
        zone_radius_km: zone.radius_km,
        distance_from_center_km: None,
        timestamp: now,
        alert_message: "Geofencing alert activated".to_string(),
        is_active: true,
    }
}

fn build_alert(
    zone: &GeofenceZone,
    status: GeofenceStatus,
    point: Option<&GeoPoint>,
    timestamp: DateTime<Utc>,
) -> GeofenceAlert {
    let distance = point.map(|p| haversine_km(p.coordinates(), zone.center));
    GeofenceAlert {
        alert_id: timestamp.timestamp_millis(),
        driver_id: zone.driver_id,
        delivery_id: zone.delivery_id,
        status,
        driver_lat: point.map(|p| p.lat),
        driver_long: point.map(|p| p.long),
        zone_center_lat: zone.center.lat,
        zone_center_long: zone.center.long,
        zone_radius_km: zone.radius_km,
        distance_from_center_km: distance,
        timestamp,
        alert_message: status.alert_message().to_string(),
        is_active: true,
    }
}
