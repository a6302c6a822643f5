//! GeoPoint retention cleanup background job.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use tracing::info;

use persistence::repositories::GeoPointRepository;

use super::scheduler::{Job, JobFrequency};

/// Background job that removes position records past the retention window.
///
/// Deletes in batches to avoid long locks on the hot geo_points table.
pub struct CleanupGeoPointsJob {
    repository: GeoPointRepository,
    retention_days: u32,
    batch_size: i64,
}

impl CleanupGeoPointsJob {
    /// Create a new cleanup job.
    ///
    /// # Arguments
    /// * `pool` - Database connection pool
    /// * `retention_days` - Number of days to retain position records
    pub fn new(pool: PgPool, retention_days: u32) -> Self {
        Self {
            repository: GeoPointRepository::new(pool),
            retention_days,
            batch_size: 10_000,
        }
    }

    async fn delete_old_points(&self) -> Result<u64, sqlx::Error> {
        let cutoff = Utc::now() - Duration::days(self.retention_days as i64);
        let mut total_deleted: u64 = 0;

        loop {
            let deleted = self
                .repository
                .delete_batch_before(cutoff, self.batch_size)
                .await?;
            total_deleted += deleted;

            if deleted < self.batch_size as u64 {
                break;
            }

            // Small yield to prevent starving other operations
            tokio::task::yield_now().await;
        }

        Ok(total_deleted)
    }
}

#[async_trait::async_trait]
impl Job for CleanupGeoPointsJob {
    fn name(&self) -> &'static str {
        "cleanup_geo_points"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Hourly
    }

    async fn execute(&self) -> Result<(), String> {
        let deleted = self
            .delete_old_points()
            .await
            .map_err(|e| format!("Failed to delete old geo points: {}", e))?;

        info!(
            deleted,
            retention_days = self.retention_days,
            "Cleaned up old geo points"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_frequency_is_hourly() {
        let freq = JobFrequency::Hourly;
        assert_eq!(freq.duration(), std::time::Duration::from_secs(3600));
    }

    #[test]
    fn test_batch_size_reasonable() {
        let batch_size = 10_000i64;
        assert!(batch_size >= 1000);
        assert!(batch_size <= 100_000);
    }
}
