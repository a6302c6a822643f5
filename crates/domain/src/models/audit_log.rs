//! Audit log domain models.
//!
//! The audit log is owned by the wider platform; this core consumes
//! time-bounded, entity-type-filtered slices as the sole input to compliance
//! scoring.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Entity types that appear in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEntityType {
    User,
    Driver,
    Partner,
    Customer,
    Delivery,
    Payment,
    InventoryItem,
    Product,
    Wallet,
    Notification,
}

impl AuditEntityType {
    /// All entity types, used for system-wide scoring.
    pub const ALL: [AuditEntityType; 10] = [
        Self::User,
        Self::Driver,
        Self::Partner,
        Self::Customer,
        Self::Delivery,
        Self::Payment,
        Self::InventoryItem,
        Self::Product,
        Self::Wallet,
        Self::Notification,
    ];

    /// Entity types consulted for driver compliance scoring.
    pub const DRIVER_RELEVANT: [AuditEntityType; 3] =
        [Self::Delivery, Self::Driver, Self::Payment];

    /// Entity types consulted for partner compliance scoring.
    pub const PARTNER_RELEVANT: [AuditEntityType; 5] = [
        Self::Delivery,
        Self::Partner,
        Self::InventoryItem,
        Self::Product,
        Self::Payment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Driver => "DRIVER",
            Self::Partner => "PARTNER",
            Self::Customer => "CUSTOMER",
            Self::Delivery => "DELIVERY",
            Self::Payment => "PAYMENT",
            Self::InventoryItem => "INVENTORY_ITEM",
            Self::Product => "PRODUCT",
            Self::Wallet => "WALLET",
            Self::Notification => "NOTIFICATION",
        }
    }
}

impl FromStr for AuditEntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USER" => Ok(Self::User),
            "DRIVER" => Ok(Self::Driver),
            "PARTNER" => Ok(Self::Partner),
            "CUSTOMER" => Ok(Self::Customer),
            "DELIVERY" => Ok(Self::Delivery),
            "PAYMENT" => Ok(Self::Payment),
            "INVENTORY_ITEM" => Ok(Self::InventoryItem),
            "PRODUCT" => Ok(Self::Product),
            "WALLET" => Ok(Self::Wallet),
            "NOTIFICATION" => Ok(Self::Notification),
            _ => Err(format!("Unknown audit entity type: {}", s)),
        }
    }
}

impl std::fmt::Display for AuditEntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Audited actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Activate,
    Deactivate,
    Verify,
    Unverify,
    Assign,
    Unassign,
    Complete,
    Cancel,
    PaymentInitiated,
    PaymentCompleted,
    PaymentFailed,
    Login,
    Logout,
    PasswordChange,
    RoleChange,
    PermissionChange,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Activate => "ACTIVATE",
            Self::Deactivate => "DEACTIVATE",
            Self::Verify => "VERIFY",
            Self::Unverify => "UNVERIFY",
            Self::Assign => "ASSIGN",
            Self::Unassign => "UNASSIGN",
            Self::Complete => "COMPLETE",
            Self::Cancel => "CANCEL",
            Self::PaymentInitiated => "PAYMENT_INITIATED",
            Self::PaymentCompleted => "PAYMENT_COMPLETED",
            Self::PaymentFailed => "PAYMENT_FAILED",
            Self::Login => "LOGIN",
            Self::Logout => "LOGOUT",
            Self::PasswordChange => "PASSWORD_CHANGE",
            Self::RoleChange => "ROLE_CHANGE",
            Self::PermissionChange => "PERMISSION_CHANGE",
        }
    }
}

impl FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CREATE" => Ok(Self::Create),
            "UPDATE" => Ok(Self::Update),
            "DELETE" => Ok(Self::Delete),
            "ACTIVATE" => Ok(Self::Activate),
            "DEACTIVATE" => Ok(Self::Deactivate),
            "VERIFY" => Ok(Self::Verify),
            "UNVERIFY" => Ok(Self::Unverify),
            "ASSIGN" => Ok(Self::Assign),
            "UNASSIGN" => Ok(Self::Unassign),
            "COMPLETE" => Ok(Self::Complete),
            "CANCEL" => Ok(Self::Cancel),
            "PAYMENT_INITIATED" => Ok(Self::PaymentInitiated),
            "PAYMENT_COMPLETED" => Ok(Self::PaymentCompleted),
            "PAYMENT_FAILED" => Ok(Self::PaymentFailed),
            "LOGIN" => Ok(Self::Login),
            "LOGOUT" => Ok(Self::Logout),
            "PASSWORD_CHANGE" => Ok(Self::PasswordChange),
            "ROLE_CHANGE" => Ok(Self::RoleChange),
            "PERMISSION_CHANGE" => Ok(Self::PermissionChange),
            _ => Err(format!("Unknown audit action: {}", s)),
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single audit log entry, as read from the audit store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: i64,
    pub entity_type: AuditEntityType,
    pub entity_id: i64,
    pub action: AuditAction,
    pub actor_id: Option<i64>,
    pub actor_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_snapshot: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_snapshot: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_type_round_trip() {
        for entity_type in AuditEntityType::ALL {
            let parsed: AuditEntityType = entity_type.as_str().parse().unwrap();
            assert_eq!(parsed, entity_type);
        }
    }

    #[test]
    fn test_entity_type_from_str_case_insensitive() {
        assert_eq!(
            "inventory_item".parse::<AuditEntityType>().unwrap(),
            AuditEntityType::InventoryItem
        );
        assert!("unknown".parse::<AuditEntityType>().is_err());
    }

    #[test]
    fn test_action_from_str() {
        assert_eq!(
            "PAYMENT_FAILED".parse::<AuditAction>().unwrap(),
            AuditAction::PaymentFailed
        );
        assert_eq!("complete".parse::<AuditAction>().unwrap(), AuditAction::Complete);
        assert!("invalid".parse::<AuditAction>().is_err());
    }

    #[test]
    fn test_action_display() {
        assert_eq!(AuditAction::PaymentCompleted.to_string(), "PAYMENT_COMPLETED");
        assert_eq!(AuditAction::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_driver_relevant_types() {
        assert!(AuditEntityType::DRIVER_RELEVANT.contains(&AuditEntityType::Delivery));
        assert!(AuditEntityType::DRIVER_RELEVANT.contains(&AuditEntityType::Driver));
        assert!(AuditEntityType::DRIVER_RELEVANT.contains(&AuditEntityType::Payment));
        assert!(!AuditEntityType::DRIVER_RELEVANT.contains(&AuditEntityType::Product));
    }

    #[test]
    fn test_entry_serialization() {
        let entry = AuditLogEntry {
            id: 1,
            entity_type: AuditEntityType::Delivery,
            entity_id: 42,
            action: AuditAction::Complete,
            actor_id: Some(7),
            actor_email: Some("dispatcher@example.com".to_string()),
            before_snapshot: None,
            after_snapshot: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"entityType\":\"DELIVERY\""));
        assert!(json.contains("\"action\":\"COMPLETE\""));
        assert!(!json.contains("beforeSnapshot"));
    }
}
