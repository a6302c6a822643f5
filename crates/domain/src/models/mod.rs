//! Domain models for the Lastmile backend.

pub mod audit_log;
pub mod cluster;
pub mod compliance;
pub mod geo_point;
pub mod geofence;
pub mod heatmap;
pub mod route;

pub use audit_log::{AuditAction, AuditEntityType, AuditLogEntry};
pub use cluster::DriverCluster;
pub use compliance::ComplianceStatus;
pub use geo_point::GeoPoint;
pub use geofence::{GeofenceStatus, GeofenceZone};
pub use route::{RouteResult, TransportMode};
