//! GeoPoint repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::entities::GeoPointEntity;
use crate::metrics::QueryTimer;

/// Repository for driver position time-series operations.
///
/// The table is append-only: rows are inserted on each ping and removed only
/// by the retention job.
#[derive(Clone)]
pub struct GeoPointRepository {
    pool: PgPool,
}

impl GeoPointRepository {
    /// Creates a new GeoPointRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new position observation.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        &self,
        driver_id: i64,
        delivery_id: Option<i64>,
        lat: f64,
        long: f64,
        speed_kmh: Option<f64>,
        heading_degrees: Option<f64>,
        accuracy_meters: Option<f64>,
    ) -> Result<GeoPointEntity, sqlx::Error> {
        let timer = QueryTimer::new("insert_geo_point");
        let result = sqlx::query_as::<_, GeoPointEntity>(
            r#"
            INSERT INTO geo_points (driver_id, delivery_id, lat, long, timestamp,
                                    speed_kmh, heading_degrees, accuracy_meters)
            VALUES ($1, $2, $3, $4, NOW(), $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(driver_id)
        .bind(delivery_id)
        .bind(lat)
        .bind(long)
        .bind(speed_kmh)
        .bind(heading_degrees)
        .bind(accuracy_meters)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Latest active position per distinct driver.
    ///
    /// Rows with out-of-range coordinates are excluded; they are unusable in
    /// distance and geofence computations.
    pub async fn find_latest_per_driver(&self) -> Result<Vec<GeoPointEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_latest_per_driver");
        let result = sqlx::query_as::<_, GeoPointEntity>(
            r#"
            SELECT DISTINCT ON (driver_id) *
            FROM geo_points
            WHERE active = true
              AND lat BETWEEN -90 AND 90
              AND long BETWEEN -180 AND 180
            ORDER BY driver_id, timestamp DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Latest active position for a (driver, delivery) pair.
    pub async fn find_latest_for_pair(
        &self,
        driver_id: i64,
        delivery_id: i64,
    ) -> Result<Option<GeoPointEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_latest_for_pair");
        let result = sqlx::query_as::<_, GeoPointEntity>(
            r#"
            SELECT * FROM geo_points
            WHERE driver_id = $1 AND delivery_id = $2 AND active = true
            ORDER BY timestamp DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(driver_id)
        .bind(delivery_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Chronological (newest-first) position history for a driver, keyed by
    /// a composite (timestamp, id) cursor. Fetches `limit + 1` rows so the
    /// caller can detect whether more pages exist.
    pub async fn history_by_driver(
        &self,
        driver_id: i64,
        cursor: Option<(DateTime<Utc>, i64)>,
        limit: i64,
    ) -> Result<Vec<GeoPointEntity>, sqlx::Error> {
        let timer = QueryTimer::new("geo_point_history_by_driver");
        let result = match cursor {
            Some((timestamp, id)) => {
                sqlx::query_as::<_, GeoPointEntity>(
                    r#"
                    SELECT * FROM geo_points
                    WHERE driver_id = $1 AND active = true
                      AND (timestamp, id) < ($2, $3)
                    ORDER BY timestamp DESC, id DESC
                    LIMIT $4
                    "#,
                )
                .bind(driver_id)
                .bind(timestamp)
                .bind(id)
                .bind(limit + 1)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, GeoPointEntity>(
                    r#"
                    SELECT * FROM geo_points
                    WHERE driver_id = $1 AND active = true
                    ORDER BY timestamp DESC, id DESC
                    LIMIT $2
                    "#,
                )
                .bind(driver_id)
                .bind(limit + 1)
                .fetch_all(&self.pool)
                .await
            }
        };
        timer.record();
        result
    }

    /// Position history for a delivery (the route actually travelled).
    pub async fn history_by_delivery(
        &self,
        delivery_id: i64,
        cursor: Option<(DateTime<Utc>, i64)>,
        limit: i64,
    ) -> Result<Vec<GeoPointEntity>, sqlx::Error> {
        let timer = QueryTimer::new("geo_point_history_by_delivery");
        let result = match cursor {
            Some((timestamp, id)) => {
                sqlx::query_as::<_, GeoPointEntity>(
                    r#"
                    SELECT * FROM geo_points
                    WHERE delivery_id = $1 AND active = true
                      AND (timestamp, id) < ($2, $3)
                    ORDER BY timestamp DESC, id DESC
                    LIMIT $4
                    "#,
                )
                .bind(delivery_id)
                .bind(timestamp)
                .bind(id)
                .bind(limit + 1)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, GeoPointEntity>(
                    r#"
                    SELECT * FROM geo_points
                    WHERE delivery_id = $1 AND active = true
                    ORDER BY timestamp DESC, id DESC
                    LIMIT $2
                    "#,
                )
                .bind(delivery_id)
                .bind(limit + 1)
                .fetch_all(&self.pool)
                .await
            }
        };
        timer.record();
        result
    }

    /// Delete one batch of points created before the cutoff. Returns the
    /// number of rows removed; callers loop until a short batch comes back.
    pub async fn delete_batch_before(
        &self,
        cutoff: DateTime<Utc>,
        batch_size: i64,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_geo_points_before");
        let result = sqlx::query(
            r#"
            WITH to_delete AS (
                SELECT id FROM geo_points
                WHERE created_at < $1
                LIMIT $2
            )
            DELETE FROM geo_points
            WHERE id IN (SELECT id FROM to_delete)
            "#,
        )
        .bind(cutoff)
        .bind(batch_size)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }
}
