//! Compliance scoring endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use domain::models::compliance::{
    ComplianceReport, ComplianceStatus, ComplianceTrend, ComplianceTrendQuery, ScoreOutcome,
    ScoreWindowQuery,
};

use crate::app::AppState;
use crate::error::ApiError;

/// Score response with its classification and the window it covers.
///
/// `sampleSize` lets consumers distinguish a zero score earned from events
/// from a zero reported because no events were in range.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<i64>,
    pub score: f64,
    pub sample_size: usize,
    pub status: ComplianceStatus,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl ScoreResponse {
    fn new(entity_id: Option<i64>, outcome: ScoreOutcome, window: &ScoreWindowQuery) -> Self {
        Self {
            entity_id,
            score: outcome.score,
            sample_size: outcome.sample_size,
            status: outcome.status(),
            from: window.from,
            to: window.to,
        }
    }
}

/// Driver compliance score over a window.
///
/// GET /api/v1/compliance/drivers/:driver_id/score?from=..&to=..
pub async fn driver_score(
    State(state): State<AppState>,
    Path(driver_id): Path<i64>,
    Query(window): Query<ScoreWindowQuery>,
) -> Result<Json<ScoreResponse>, ApiError> {
    let outcome = state
        .compliance
        .driver_score(driver_id, window.from, window.to)
        .await?;
    Ok(Json(ScoreResponse::new(Some(driver_id), outcome, &window)))
}

/// Partner compliance score over a window.
///
/// GET /api/v1/compliance/partners/:partner_id/score?from=..&to=..
pub async fn partner_score(
    State(state): State<AppState>,
    Path(partner_id): Path<i64>,
    Query(window): Query<ScoreWindowQuery>,
) -> Result<Json<ScoreResponse>, ApiError> {
    let outcome = state
        .compliance
        .partner_score(partner_id, window.from, window.to)
        .await?;
    Ok(Json(ScoreResponse::new(Some(partner_id), outcome, &window)))
}

/// System-wide compliance score over a window.
///
/// GET /api/v1/compliance/system/score?from=..&to=..
pub async fn system_score(
    State(state): State<AppState>,
    Query(window): Query<ScoreWindowQuery>,
) -> Result<Json<ScoreResponse>, ApiError> {
    let outcome = state.compliance.system_score(window.from, window.to).await?;
    Ok(Json(ScoreResponse::new(None, outcome, &window)))
}

/// Compliance trend: trailing window versus the window before it.
///
/// GET /api/v1/compliance/trends?entityId=..&entityType=..&windowDays=..
pub async fn trends(
    State(state): State<AppState>,
    Query(query): Query<ComplianceTrendQuery>,
) -> Result<Json<ComplianceTrend>, ApiError> {
    let trend = state.compliance.trends(&query).await?;
    Ok(Json(trend))
}

/// Query parameters for the aggregate report.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
}

/// Aggregate compliance report for dashboards.
///
/// GET /api/v1/compliance/report?fromDate=..&toDate=..
pub async fn report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ComplianceReport>, ApiError> {
    let report = state
        .compliance
        .report(query.from_date, query.to_date)
        .await?;
    Ok(Json(report))
}
