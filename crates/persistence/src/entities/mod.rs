//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod audit_log;
pub mod delivery;
pub mod geo_point;

pub use audit_log::AuditLogEntity;
pub use delivery::{DriverComplianceAggregate, HeatmapAggregate, PartnerComplianceAggregate};
pub use geo_point::GeoPointEntity;
