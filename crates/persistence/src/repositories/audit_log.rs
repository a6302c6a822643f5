//! Audit log repository.
//!
//! The audit log is written by the wider platform; this repository only
//! reads time-bounded slices for compliance scoring.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::warn;

use domain::models::audit_log::{AuditEntityType, AuditLogEntry};

use crate::entities::AuditLogEntity;
use crate::metrics::QueryTimer;

/// Repository for audit log read operations.
#[derive(Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    /// Creates a new AuditLogRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Entries of the given entity types created within [from, to].
    ///
    /// Rows with entity types or actions unknown to this build are skipped
    /// with a warning rather than failing the slice.
    pub async fn find_for_compliance(
        &self,
        entity_types: &[AuditEntityType],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AuditLogEntry>, sqlx::Error> {
        let type_names: Vec<String> = entity_types.iter().map(|t| t.to_string()).collect();

        let timer = QueryTimer::new("find_audit_logs_for_compliance");
        let entities = sqlx::query_as::<_, AuditLogEntity>(
            r#"
            SELECT id, entity_type, entity_id, action, actor_id, actor_email,
                   before_snapshot, after_snapshot, created_at
            FROM audit_logs
            WHERE entity_type = ANY($1)
              AND created_at >= $2
              AND created_at <= $3
            ORDER BY created_at DESC
            "#,
        )
        .bind(&type_names)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await;
        timer.record();

        let entities = entities?;
        let mut entries = Vec::with_capacity(entities.len());
        for entity in entities {
            let id = entity.id;
            match AuditLogEntry::try_from(entity) {
                Ok(entry) => entries.push(entry),
                Err(reason) => {
                    warn!(audit_log_id = id, %reason, "Skipping unparsable audit log row");
                }
            }
        }
        Ok(entries)
    }
}
