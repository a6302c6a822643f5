//! Analytics repository.
//!
//! Aggregate projections feeding the compliance report.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::entities::{DriverComplianceAggregate, PartnerComplianceAggregate};
use crate::metrics::QueryTimer;

/// Repository for reporting aggregates.
#[derive(Clone)]
pub struct AnalyticsRepository {
    pool: PgPool,
}

impl AnalyticsRepository {
    /// Creates a new AnalyticsRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Per-driver delivery counts within [from, to]: total, missed
    /// (failed/canceled), and late (delivered past the due time).
    pub async fn driver_compliance_aggregates(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<DriverComplianceAggregate>, sqlx::Error> {
        let timer = QueryTimer::new("driver_compliance_aggregates");
        let result = sqlx::query_as::<_, DriverComplianceAggregate>(
            r#"
            SELECT d.id AS driver_id,
                   d.name AS driver_name,
                   d.phone_number,
                   COUNT(del.id) AS total_deliveries,
                   COUNT(del.id) FILTER (
                       WHERE del.status IN ('DELIVERY_FAILED', 'CANCELED')
                   ) AS missed_deliveries,
                   COUNT(del.id) FILTER (
                       WHERE del.status = 'DELIVERED'
                         AND del.due_at IS NOT NULL
                         AND del.delivered_at > del.due_at
                   ) AS late_deliveries
            FROM drivers d
            LEFT JOIN deliveries del
                   ON del.driver_id = d.id
                  AND del.created_at >= $1
                  AND del.created_at <= $2
            GROUP BY d.id, d.name, d.phone_number
            ORDER BY d.id
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Per-partner order counts and inventory health: expired items, items
    /// at or below their low-stock threshold, and KYC completion.
    pub async fn partner_compliance_aggregates(
        &self,
    ) -> Result<Vec<PartnerComplianceAggregate>, sqlx::Error> {
        let timer = QueryTimer::new("partner_compliance_aggregates");
        let result = sqlx::query_as::<_, PartnerComplianceAggregate>(
            r#"
            SELECT p.id AS partner_id,
                   p.name AS partner_name,
                   p.business_name,
                   (SELECT COUNT(*) FROM deliveries del WHERE del.partner_id = p.id)
                       AS total_orders,
                   (SELECT COUNT(*) FROM inventory_items i
                     WHERE i.partner_id = p.id AND i.expires_at < NOW())
                       AS expired_items,
                   (SELECT COUNT(*) FROM inventory_items i
                     WHERE i.partner_id = p.id
                       AND i.quantity <= i.low_stock_threshold)
                       AS low_stock_items,
                   p.kyc_completed
            FROM partners p
            ORDER BY p.id
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_repository_creation() {
        // Aggregate SQL is exercised against a live database.
    }
}
