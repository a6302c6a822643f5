//! Compliance scoring domain models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Categorical compliance status derived from a [0, 100] score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceStatus {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

impl ComplianceStatus {
    /// Five-level ladder used by the scoring engine.
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Self::Excellent
        } else if score >= 80.0 {
            Self::Good
        } else if score >= 70.0 {
            Self::Fair
        } else if score >= 60.0 {
            Self::Poor
        } else {
            Self::Critical
        }
    }

    /// Coarser ladder used by the aggregate report (everything below 70 is
    /// POOR, matching the reporting dashboard's buckets).
    pub fn from_report_score(score: f64) -> Self {
        if score >= 90.0 {
            Self::Excellent
        } else if score >= 80.0 {
            Self::Good
        } else if score >= 70.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    /// Ordering rank: CRITICAL < POOR < FAIR < GOOD < EXCELLENT.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::Poor => 1,
            Self::Fair => 2,
            Self::Good => 3,
            Self::Excellent => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "EXCELLENT",
            Self::Good => "GOOD",
            Self::Fair => "FAIR",
            Self::Poor => "POOR",
            Self::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a score computation over an audit-log slice.
///
/// Distinguishes "no events in range" from a genuinely poor score of zero,
/// so dashboards do not flag idle entities as non-compliant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreOutcome {
    /// Score in [0, 100], rounded to 2 decimals. Zero when no data.
    pub score: f64,
    /// Number of audit entries the score was computed from.
    pub sample_size: usize,
}

impl ScoreOutcome {
    pub fn no_data() -> Self {
        Self {
            score: 0.0,
            sample_size: 0,
        }
    }

    pub fn has_data(&self) -> bool {
        self.sample_size > 0
    }

    pub fn status(&self) -> ComplianceStatus {
        ComplianceStatus::from_score(self.score)
    }
}

/// Entity kind a score or trend query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoredEntityKind {
    Driver,
    Partner,
}

/// Query parameters for a score over a date window.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreWindowQuery {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// Query parameters for compliance trends.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceTrendQuery {
    pub entity_id: i64,
    pub entity_type: ScoredEntityKind,
    #[serde(default = "default_window_days")]
    pub window_days: i64,
}

fn default_window_days() -> i64 {
    30
}

/// Score for the trailing window versus the window immediately preceding it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceTrend {
    pub current_score: f64,
    pub previous_score: f64,
    /// current − previous; positive means improving.
    pub trend: f64,
}

/// Per-driver row in the aggregate compliance report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverComplianceRow {
    pub driver_id: i64,
    pub driver_name: String,
    pub phone_number: Option<String>,
    pub total_deliveries: i64,
    pub missed_deliveries: i64,
    pub late_deliveries: i64,
    pub on_time_deliveries: i64,
    pub compliance_score: f64,
    pub status: ComplianceStatus,
}

/// Per-partner row in the aggregate compliance report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerComplianceRow {
    pub partner_id: i64,
    pub partner_name: String,
    pub business_name: Option<String>,
    pub total_orders: i64,
    pub expired_inventory_items: i64,
    pub low_stock_items: i64,
    pub kyc_completed: bool,
    pub compliance_score: f64,
    pub status: ComplianceStatus,
}

/// Roll-up block for the aggregate report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceSummary {
    pub total_drivers: i64,
    pub compliant_drivers: i64,
    pub average_driver_score: f64,
    pub total_partners: i64,
    pub compliant_partners: i64,
    pub average_partner_score: f64,
}

/// The aggregate compliance report consumed by reporting dashboards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReport {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub driver_compliance: Vec<DriverComplianceRow>,
    pub partner_compliance: Vec<PartnerComplianceRow>,
    pub summary: ComplianceSummary,
}
