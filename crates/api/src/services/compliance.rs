//! Compliance scoring service.
//!
//! Orchestrates audit-log slices, ownership joins, and the scoring engine.
//! Scores are recomputed from source events on every call; there is no
//! cached score state.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::info;

use domain::models::audit_log::AuditEntityType;
use domain::models::compliance::{
    ComplianceReport, ComplianceStatus, ComplianceSummary, ComplianceTrend, ComplianceTrendQuery,
    DriverComplianceRow, PartnerComplianceRow, ScoreOutcome, ScoredEntityKind,
};
use domain::services::scoring;
use persistence::repositories::{AnalyticsRepository, AuditLogRepository, DeliveryRepository};

use crate::error::ApiError;

/// Report rows with scores at or above this are counted compliant.
const COMPLIANT_THRESHOLD: f64 = 70.0;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Orchestrator for compliance scoring and reporting.
pub struct ComplianceScoringService {
    audit_logs: AuditLogRepository,
    deliveries: DeliveryRepository,
    analytics: AnalyticsRepository,
}

impl ComplianceScoringService {
    pub fn new(
        audit_logs: AuditLogRepository,
        deliveries: DeliveryRepository,
        analytics: AnalyticsRepository,
    ) -> Self {
        Self {
            audit_logs,
            deliveries,
            analytics,
        }
    }

    /// Driver score over the audit entries related to the driver within
    /// [from, to].
    pub async fn driver_score(
        &self,
        driver_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<ScoreOutcome, ApiError> {
        info!(driver_id, %from, %to, "Calculating driver compliance score");

        let entries = self
            .audit_logs
            .find_for_compliance(&AuditEntityType::DRIVER_RELEVANT, from, to)
            .await
            .map_err(audit_store_unavailable)?;

        let relations = scoring::DriverRelations {
            delivery_ids: self.deliveries.delivery_ids_for_driver(driver_id).await?,
        };

        Ok(scoring::driver_score(&entries, driver_id, &relations))
    }

    /// Partner score over the audit entries related to the partner within
    /// [from, to].
    pub async fn partner_score(
        &self,
        partner_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<ScoreOutcome, ApiError> {
        info!(partner_id, %from, %to, "Calculating partner compliance score");

        let entries = self
            .audit_logs
            .find_for_compliance(&AuditEntityType::PARTNER_RELEVANT, from, to)
            .await
            .map_err(audit_store_unavailable)?;

        let relations = scoring::PartnerRelations {
            delivery_ids: self.deliveries.delivery_ids_for_partner(partner_id).await?,
            inventory_item_ids: self
                .deliveries
                .inventory_item_ids_for_partner(partner_id)
                .await?,
            product_ids: self.deliveries.product_ids_for_partner(partner_id).await?,
        };

        Ok(scoring::partner_score(&entries, partner_id, &relations))
    }

    /// System-wide score over all entity types within [from, to].
    pub async fn system_score(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<ScoreOutcome, ApiError> {
        info!(%from, %to, "Calculating system compliance score");

        let entries = self
            .audit_logs
            .find_for_compliance(&AuditEntityType::ALL, from, to)
            .await
            .map_err(audit_store_unavailable)?;

        Ok(scoring::system_score(&entries))
    }

    /// Score for the trailing window versus the window immediately before
    /// it.
    pub async fn trends(&self, query: &ComplianceTrendQuery) -> Result<ComplianceTrend, ApiError> {
        if query.window_days <= 0 {
            return Err(ApiError::Validation("Window must be positive".into()));
        }

        let now = Utc::now();
        let window = Duration::days(query.window_days);
        let current_from = now - window;
        let previous_from = current_from - window;

        let (current, previous) = match query.entity_type {
            ScoredEntityKind::Driver => (
                self.driver_score(query.entity_id, current_from, now).await?,
                self.driver_score(query.entity_id, previous_from, current_from)
                    .await?,
            ),
            ScoredEntityKind::Partner => (
                self.partner_score(query.entity_id, current_from, now).await?,
                self.partner_score(query.entity_id, previous_from, current_from)
                    .await?,
            ),
        };

        Ok(ComplianceTrend {
            current_score: current.score,
            previous_score: previous.score,
            trend: round2(current.score - previous.score),
        })
    }

    /// Aggregate compliance report for dashboards: per-driver and
    /// per-partner rows plus the roll-up summary.
    pub async fn report(
        &self,
        from_date: NaiveDate,
        to_date: NaiveDate,
    ) -> Result<ComplianceReport, ApiError> {
        if from_date > to_date {
            return Err(ApiError::Validation("fromDate must not be after toDate".into()));
        }

        info!(%from_date, %to_date, "Generating compliance report");

        let from = from_date
            .and_hms_opt(0, 0, 0)
            .expect("midnight is always valid")
            .and_utc();
        let to = to_date
            .and_hms_opt(23, 59, 59)
            .expect("end of day is always valid")
            .and_utc();

        let driver_aggregates = self.analytics.driver_compliance_aggregates(from, to).await?;
        let driver_compliance: Vec<DriverComplianceRow> = driver_aggregates
            .into_iter()
            .map(|row| {
                let on_time = row.total_deliveries - row.missed_deliveries - row.late_deliveries;
                let score = scoring::driver_report_score(
                    row.total_deliveries,
                    row.missed_deliveries,
                    row.late_deliveries,
                );
                DriverComplianceRow {
                    driver_id: row.driver_id,
                    driver_name: row.driver_name,
                    phone_number: row.phone_number,
                    total_deliveries: row.total_deliveries,
                    missed_deliveries: row.missed_deliveries,
                    late_deliveries: row.late_deliveries,
                    on_time_deliveries: on_time,
                    compliance_score: score,
                    status: ComplianceStatus::from_report_score(score),
                }
            })
            .collect();

        let partner_aggregates = self.analytics.partner_compliance_aggregates().await?;
        let partner_compliance: Vec<PartnerComplianceRow> = partner_aggregates
            .into_iter()
            .map(|row| {
                let score = scoring::partner_report_score(
                    row.expired_items,
                    row.low_stock_items,
                    row.kyc_completed,
                );
                PartnerComplianceRow {
                    partner_id: row.partner_id,
                    partner_name: row.partner_name,
                    business_name: row.business_name,
                    total_orders: row.total_orders,
                    expired_inventory_items: row.expired_items,
                    low_stock_items: row.low_stock_items,
                    kyc_completed: row.kyc_completed,
                    compliance_score: score,
                    status: ComplianceStatus::from_report_score(score),
                }
            })
            .collect();

        let summary = build_summary(&driver_compliance, &partner_compliance);

        Ok(ComplianceReport {
            from_date,
            to_date,
            driver_compliance,
            partner_compliance,
            summary,
        })
    }
}

fn audit_store_unavailable(err: sqlx::Error) -> ApiError {
    ApiError::ServiceUnavailable(format!("Audit log store unavailable: {}", err))
}

fn build_summary(
    drivers: &[DriverComplianceRow],
    partners: &[PartnerComplianceRow],
) -> ComplianceSummary {
    let compliant_drivers = drivers
        .iter()
        .filter(|d| d.compliance_score >= COMPLIANT_THRESHOLD)
        .count() as i64;
    let average_driver_score = if drivers.is_empty() {
        0.0
    } else {
        round2(drivers.iter().map(|d| d.compliance_score).sum::<f64>() / drivers.len() as f64)
    };

    let compliant_partners = partners
        .iter()
        .filter(|p| p.compliance_score >= COMPLIANT_THRESHOLD)
        .count() as i64;
    let average_partner_score = if partners.is_empty() {
        0.0
    } else {
        round2(partners.iter().map(|p| p.compliance_score).sum::<f64>() / partners.len() as f64)
    };

    ComplianceSummary {
        total_drivers: drivers.len() as i64,
        compliant_drivers,
        average_driver_score,
        total_partners: partners.len() as i64,
        compliant_partners,
        average_partner_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver_row(driver_id: i64, score: f64) -> DriverComplianceRow {
        DriverComplianceRow {
            driver_id,
            driver_name: format!("Driver {}", driver_id),
            phone_number: None,
            total_deliveries: 10,
            missed_deliveries: 0,
            late_deliveries: 0,
            on_time_deliveries: 10,
            compliance_score: score,
            status: ComplianceStatus::from_report_score(score),
        }
    }

    fn partner_row(partner_id: i64, score: f64) -> PartnerComplianceRow {
        PartnerComplianceRow {
            partner_id,
            partner_name: format!("Partner {}", partner_id),
            business_name: None,
            total_orders: 5,
            expired_inventory_items: 0,
            low_stock_items: 0,
            kyc_completed: true,
            compliance_score: score,
            status: ComplianceStatus::from_report_score(score),
        }
    }

    #[test]
    fn test_summary_counts_compliant_at_70() {
        let drivers = vec![driver_row(1, 95.0), driver_row(2, 70.0), driver_row(3, 69.9)];
        let partners = vec![partner_row(1, 50.0), partner_row(2, 100.0)];

        let summary = build_summary(&drivers, &partners);
        assert_eq!(summary.total_drivers, 3);
        assert_eq!(summary.compliant_drivers, 2);
        assert_eq!(summary.total_partners, 2);
        assert_eq!(summary.compliant_partners, 1);
    }

    #[test]
    fn test_summary_averages_rounded() {
        let drivers = vec![driver_row(1, 80.0), driver_row(2, 85.55)];
        let summary = build_summary(&drivers, &[]);
        assert_eq!(summary.average_driver_score, 82.78);
        assert_eq!(summary.average_partner_score, 0.0);
    }

    #[test]
    fn test_summary_empty_inputs() {
        let summary = build_summary(&[], &[]);
        assert_eq!(summary.total_drivers, 0);
        assert_eq!(summary.average_driver_score, 0.0);
        assert_eq!(summary.compliant_partners, 0);
    }
}
