//! Driver clustering engine.
//!
//! Greedy single-pass clustering over a snapshot of latest driver positions.
//! O(n²) pairwise distances; fine at fleet scale (hundreds of drivers). A
//! spatial index would be the next step if fleets grow past that.

use crate::models::geo_point::GeoPoint;

/// A cluster of driver positions produced by [`cluster_points`].
#[derive(Debug, Clone)]
pub struct PointCluster {
    pub center_lat: f64,
    pub center_long: f64,
    /// Indices into the input slice for the member points.
    pub member_indices: Vec<usize>,
}

/// Groups points so that every valid point belongs to exactly one cluster.
///
/// Iterates points in input order; each unprocessed point seeds a cluster of
/// itself plus every other unprocessed point within `radius_km` of the seed.
/// The centroid is the unweighted mean of member coordinates. Points with
/// invalid coordinates are skipped entirely (the distance sentinel would
/// otherwise poison membership tests).
///
/// Output ordering follows seed order but is not part of the contract;
/// callers must rely on membership and centroids only.
pub fn cluster_points(points: &[GeoPoint], radius_km: f64) -> Vec<PointCluster> {
    let mut clusters = Vec::new();
    let mut processed = vec![false; points.len()];

    for seed_idx in 0..points.len() {
        if processed[seed_idx] {
            continue;
        }
        let seed = &points[seed_idx];
        if !seed.is_valid_location() {
            processed[seed_idx] = true;
            continue;
        }

        // The seed is always a member of its own cluster; singleton clusters
        // are valid output.
        let mut member_indices = vec![seed_idx];
        processed[seed_idx] = true;

        for other_idx in 0..points.len() {
            if processed[other_idx] {
                continue;
            }
            let other = &points[other_idx];
            if !other.is_valid_location() {
                continue;
            }
            let distance = seed.distance_to(other);
            if (0.0..=radius_km).contains(&distance) {
                member_indices.push(other_idx);
                processed[other_idx] = true;
            }
        }

        let count = member_indices.len() as f64;
        let center_lat = member_indices.iter().map(|&i| points[i].lat).sum::<f64>() / count;
        let center_long = member_indices.iter().map(|&i| points[i].long).sum::<f64>() / count;

        clusters.push(PointCluster {
            center_lat,
            center_long,
            member_indices,
        });
    }

    clusters
}
