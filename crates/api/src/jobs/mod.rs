//! Background job scheduler and job implementations.

mod cleanup_geo_points;
mod pool_metrics;
mod scheduler;

pub use cleanup_geo_points::CleanupGeoPointsJob;
pub use pool_metrics::PoolMetricsJob;
pub use scheduler::JobScheduler;
