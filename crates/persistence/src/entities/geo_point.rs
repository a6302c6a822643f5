//! GeoPoint entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row mapping for the geo_points table.
#[derive(Debug, Clone, FromRow)]
pub struct GeoPointEntity {
    pub id: i64,
    pub driver_id: i64,
    pub delivery_id: Option<i64>,
    pub lat: f64,
    pub long: f64,
    pub timestamp: DateTime<Utc>,
    pub speed_kmh: Option<f64>,
    pub heading_degrees: Option<f64>,
    pub accuracy_meters: Option<f64>,
    pub active: bool,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<GeoPointEntity> for domain::models::GeoPoint {
    fn from(entity: GeoPointEntity) -> Self {
        Self {
            id: entity.id,
            driver_id: entity.driver_id,
            delivery_id: entity.delivery_id,
            lat: entity.lat,
            long: entity.long,
            timestamp: entity.timestamp,
            speed_kmh: entity.speed_kmh,
            heading_degrees: entity.heading_degrees,
            accuracy_meters: entity.accuracy_meters,
            active: entity.active,
            version: entity.version,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
