//! Audit log entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use domain::models::audit_log::AuditLogEntry;

/// Database row mapping for the audit_logs table.
///
/// Entity type and action are stored as their string representations; rows
/// with values this build does not know are skipped by the repository
/// rather than failing the whole slice.
#[derive(Debug, Clone, FromRow)]
pub struct AuditLogEntity {
    pub id: i64,
    pub entity_type: String,
    pub entity_id: i64,
    pub action: String,
    pub actor_id: Option<i64>,
    pub actor_email: Option<String>,
    pub before_snapshot: Option<serde_json::Value>,
    pub after_snapshot: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<AuditLogEntity> for AuditLogEntry {
    type Error = String;

    fn try_from(entity: AuditLogEntity) -> Result<Self, Self::Error> {
        Ok(Self {
            id: entity.id,
            entity_type: entity.entity_type.parse()?,
            entity_id: entity.entity_id,
            action: entity.action.parse()?,
            actor_id: entity.actor_id,
            actor_email: entity.actor_email,
            before_snapshot: entity.before_snapshot,
            after_snapshot: entity.after_snapshot,
            created_at: entity.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::audit_log::{AuditAction, AuditEntityType};

    fn entity(entity_type: &str, action: &str) -> AuditLogEntity {
        AuditLogEntity {
            id: 1,
            entity_type: entity_type.to_string(),
            entity_id: 42,
            action: action.to_string(),
            actor_id: Some(7),
            actor_email: None,
            before_snapshot: None,
            after_snapshot: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_entity_to_domain_conversion() {
        let entry: AuditLogEntry = entity("DELIVERY", "COMPLETE").try_into().unwrap();
        assert_eq!(entry.entity_type, AuditEntityType::Delivery);
        assert_eq!(entry.action, AuditAction::Complete);
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let result: Result<AuditLogEntry, _> = entity("DELIVERY", "TELEPORT").try_into();
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_entity_type_is_rejected() {
        let result: Result<AuditLogEntry, _> = entity("SPACESHIP", "CREATE").try_into();
        assert!(result.is_err());
    }
}
