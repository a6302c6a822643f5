//! Delivery repository.
//!
//! Read-only views over deliveries and partner-owned entities, used for
//! compliance relatedness joins, existence checks, and the heatmap
//! aggregation.

use sqlx::PgPool;
use std::collections::HashSet;

use crate::entities::HeatmapAggregate;
use crate::metrics::QueryTimer;

/// Repository for delivery-related read operations.
#[derive(Clone)]
pub struct DeliveryRepository {
    pool: PgPool,
}

impl DeliveryRepository {
    /// Creates a new DeliveryRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Whether a delivery exists.
    pub async fn exists(&self, delivery_id: i64) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delivery_exists");
        let row: (bool,) =
            sqlx::query_as(r#"SELECT EXISTS(SELECT 1 FROM deliveries WHERE id = $1)"#)
                .bind(delivery_id)
                .fetch_one(&self.pool)
                .await?;
        timer.record();
        Ok(row.0)
    }

    /// Ids of deliveries assigned to a driver.
    pub async fn delivery_ids_for_driver(
        &self,
        driver_id: i64,
    ) -> Result<HashSet<i64>, sqlx::Error> {
        let timer = QueryTimer::new("delivery_ids_for_driver");
        let rows: Vec<(i64,)> =
            sqlx::query_as(r#"SELECT id FROM deliveries WHERE driver_id = $1"#)
                .bind(driver_id)
                .fetch_all(&self.pool)
                .await?;
        timer.record();
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Ids of deliveries originating from a partner.
    pub async fn delivery_ids_for_partner(
        &self,
        partner_id: i64,
    ) -> Result<HashSet<i64>, sqlx::Error> {
        let timer = QueryTimer::new("delivery_ids_for_partner");
        let rows: Vec<(i64,)> =
            sqlx::query_as(r#"SELECT id FROM deliveries WHERE partner_id = $1"#)
                .bind(partner_id)
                .fetch_all(&self.pool)
                .await?;
        timer.record();
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Ids of inventory items owned by a partner.
    pub async fn inventory_item_ids_for_partner(
        &self,
        partner_id: i64,
    ) -> Result<HashSet<i64>, sqlx::Error> {
        let timer = QueryTimer::new("inventory_item_ids_for_partner");
        let rows: Vec<(i64,)> =
            sqlx::query_as(r#"SELECT id FROM inventory_items WHERE partner_id = $1"#)
                .bind(partner_id)
                .fetch_all(&self.pool)
                .await?;
        timer.record();
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Ids of products owned by a partner.
    pub async fn product_ids_for_partner(
        &self,
        partner_id: i64,
    ) -> Result<HashSet<i64>, sqlx::Error> {
        let timer = QueryTimer::new("product_ids_for_partner");
        let rows: Vec<(i64,)> =
            sqlx::query_as(r#"SELECT id FROM products WHERE partner_id = $1"#)
                .bind(partner_id)
                .fetch_all(&self.pool)
                .await?;
        timer.record();
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Delivery volume grouped by region/woreda, optionally narrowed to one
    /// region or woreda. Cell centers are the mean dropoff coordinates.
    pub async fn heatmap_aggregates(
        &self,
        region: Option<&str>,
        woreda: Option<&str>,
    ) -> Result<Vec<HeatmapAggregate>, sqlx::Error> {
        let timer = QueryTimer::new("delivery_heatmap_aggregates");
        let result = sqlx::query_as::<_, HeatmapAggregate>(
            r#"
            SELECT region, woreda,
                   COUNT(*) AS delivery_count,
                   AVG(dropoff_lat) AS center_lat,
                   AVG(dropoff_long) AS center_long
            FROM deliveries
            WHERE region IS NOT NULL AND woreda IS NOT NULL
              AND ($1::TEXT IS NULL OR region = $1)
              AND ($2::TEXT IS NULL OR woreda = $2)
            GROUP BY region, woreda
            ORDER BY delivery_count DESC
            "#,
        )
        .bind(region)
        .bind(woreda)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
