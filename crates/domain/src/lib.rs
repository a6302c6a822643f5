//! Domain layer for the Lastmile backend.
//!
//! This crate contains:
//! - Domain models (GeoPoint, Geofence, Route, Cluster, AuditLog, Compliance)
//! - Geometry primitives (haversine distance, coordinate validity)
//! - Business logic engines (geofencing, clustering, route estimation,
//!   compliance scoring) and collaborator traits at the seams

pub mod geo;
pub mod models;
pub mod services;
