//! Delivery aggregate row mappings.
//!
//! Delivery CRUD itself lives elsewhere in the platform; this core only
//! reads aggregate projections for the compliance report and the heatmap
//! GROUP BY.

use sqlx::FromRow;

/// Aggregate row for the driver compliance report.
#[derive(Debug, Clone, FromRow)]
pub struct DriverComplianceAggregate {
    pub driver_id: i64,
    pub driver_name: String,
    pub phone_number: Option<String>,
    pub total_deliveries: i64,
    pub missed_deliveries: i64,
    pub late_deliveries: i64,
}

/// Aggregate row for the partner compliance report.
#[derive(Debug, Clone, FromRow)]
pub struct PartnerComplianceAggregate {
    pub partner_id: i64,
    pub partner_name: String,
    pub business_name: Option<String>,
    pub total_orders: i64,
    pub expired_items: i64,
    pub low_stock_items: i64,
    pub kyc_completed: bool,
}

/// Aggregate row for the delivery heatmap.
#[derive(Debug, Clone, FromRow)]
pub struct HeatmapAggregate {
    pub region: String,
    pub woreda: String,
    pub delivery_count: i64,
    pub center_lat: Option<f64>,
    pub center_long: Option<f64>,
}
