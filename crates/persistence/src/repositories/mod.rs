//! Repository implementations for database operations.

pub mod analytics;
pub mod audit_log;
pub mod delivery;
pub mod geo_point;

pub use analytics::AnalyticsRepository;
pub use audit_log::AuditLogRepository;
pub use delivery::DeliveryRepository;
pub use geo_point::GeoPointRepository;
