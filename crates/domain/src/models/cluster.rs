//! Driver cluster domain models.

use serde::Serialize;

use crate::models::geo_point::DriverLocationRecord;

/// A spatial grouping of driver positions within a caller-specified radius.
///
/// Derived per query; the centroid is the unweighted mean of member
/// coordinates.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverCluster {
    pub cluster_id: String,
    pub center_lat: f64,
    pub center_long: f64,
    pub driver_count: usize,
    pub radius_km: f64,
    pub drivers: Vec<DriverLocationRecord>,
}

/// Summary wrapper for the clustered map view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSummary {
    pub total_clusters: usize,
    pub total_drivers: usize,
    pub clusters: Vec<DriverCluster>,
}
