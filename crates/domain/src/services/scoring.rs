//! Compliance scoring engine.
//!
//! Stateless: every score is recomputed from a time-bounded audit-log slice.
//! Nothing is cached or persisted; recomputation cost is proportional to the
//! audit volume in range.

use std::collections::{HashMap, HashSet};

use crate::models::audit_log::{AuditAction, AuditEntityType, AuditLogEntry};
use crate::models::compliance::ScoreOutcome;

/// Weight an action contributes toward compliance, if it is a positive
/// signal.
pub fn positive_weight(action: AuditAction) -> Option<f64> {
    match action {
        AuditAction::Complete => Some(10.0),
        AuditAction::Verify => Some(5.0),
        AuditAction::Activate => Some(3.0),
        AuditAction::PaymentCompleted => Some(8.0),
        AuditAction::Login => Some(1.0),
        _ => None,
    }
}

/// Weight an action deducts from compliance, if it is a negative signal.
pub fn negative_weight(action: AuditAction) -> Option<f64> {
    match action {
        AuditAction::Delete => Some(15.0),
        AuditAction::Deactivate => Some(10.0),
        AuditAction::Unverify => Some(8.0),
        AuditAction::Cancel => Some(12.0),
        AuditAction::PaymentFailed => Some(20.0),
        AuditAction::Logout => Some(1.0),
        _ => None,
    }
}

/// Rounds half-up to 2 decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Score over an audit-log slice: (positive − negative) weighted by action
/// counts, normalized by the total action count, scaled to [0, 100], rounded
/// to 2 decimals.
///
/// An empty slice is a distinguishable no-data outcome, not a zero score
/// earned through poor compliance.
pub fn score_from_entries(entries: &[AuditLogEntry]) -> ScoreOutcome {
    if entries.is_empty() {
        return ScoreOutcome::no_data();
    }

    let mut action_counts: HashMap<AuditAction, u64> = HashMap::new();
    for entry in entries {
        *action_counts.entry(entry.action).or_insert(0) += 1;
    }

    let mut total = 0.0;
    for (action, count) in &action_counts {
        if let Some(weight) = positive_weight(*action) {
            total += weight * *count as f64;
        }
        if let Some(weight) = negative_weight(*action) {
            total -= weight * *count as f64;
        }
    }

    let normalized = round2(total / entries.len() as f64) * 100.0;
    let clamped = normalized.clamp(0.0, 100.0);

    ScoreOutcome {
        score: round2(clamped),
        sample_size: entries.len(),
    }
}

/// Delivery/inventory ownership sets resolved by the persistence layer,
/// used to relate audit entries to a specific driver.
#[derive(Debug, Default, Clone)]
pub struct DriverRelations {
    /// Deliveries assigned to the driver.
    pub delivery_ids: HashSet<i64>,
}

/// Ownership sets used to relate audit entries to a specific partner.
#[derive(Debug, Default, Clone)]
pub struct PartnerRelations {
    /// Deliveries originating from the partner.
    pub delivery_ids: HashSet<i64>,
    /// Inventory items owned by the partner.
    pub inventory_item_ids: HashSet<i64>,
    /// Products owned by the partner.
    pub product_ids: HashSet<i64>,
}

/// Whether an audit entry concerns the given driver: a DRIVER entry with the
/// matching id, or a DELIVERY entry for a delivery assigned to that driver.
pub fn is_driver_related(
    entry: &AuditLogEntry,
    driver_id: i64,
    relations: &DriverRelations,
) -> bool {
    match entry.entity_type {
        AuditEntityType::Driver => entry.entity_id == driver_id,
        AuditEntityType::Delivery => relations.delivery_ids.contains(&entry.entity_id),
        _ => false,
    }
}

/// Whether an audit entry concerns the given partner: a PARTNER entry with
/// the matching id, or a DELIVERY/INVENTORY_ITEM/PRODUCT entry for an entity
/// the partner owns.
pub fn is_partner_related(
    entry: &AuditLogEntry,
    partner_id: i64,
    relations: &PartnerRelations,
) -> bool {
    match entry.entity_type {
        AuditEntityType::Partner => entry.entity_id == partner_id,
        AuditEntityType::Delivery => relations.delivery_ids.contains(&entry.entity_id),
        AuditEntityType::InventoryItem => relations.inventory_item_ids.contains(&entry.entity_id),
        AuditEntityType::Product => relations.product_ids.contains(&entry.entity_id),
        _ => false,
    }
}

/// Driver score: the slice filtered to entries related to the driver.
pub fn driver_score(
    entries: &[AuditLogEntry],
    driver_id: i64,
    relations: &DriverRelations,
) -> ScoreOutcome {
    let related: Vec<AuditLogEntry> = entries
        .iter()
        .filter(|entry| is_driver_related(entry, driver_id, relations))
        .cloned()
        .collect();
    score_from_entries(&related)
}

/// Partner score: the slice filtered to entries related to the partner.
pub fn partner_score(
    entries: &[AuditLogEntry],
    partner_id: i64,
    relations: &PartnerRelations,
) -> ScoreOutcome {
    let related: Vec<AuditLogEntry> = entries
        .iter()
        .filter(|entry| is_partner_related(entry, partner_id, relations))
        .cloned()
        .collect();
    score_from_entries(&related)
}

/// System-wide score: the whole slice, unfiltered by entity id.
pub fn system_score(entries: &[AuditLogEntry]) -> ScoreOutcome {
    score_from_entries(entries)
}

/// Driver row score for the aggregate report: percentage of deliveries that
/// were on time.
pub fn driver_report_score(
    total_deliveries: i64,
    missed_deliveries: i64,
    late_deliveries: i64,
) -> f64 {
    if total_deliveries == 0 {
        return 0.0;
    }
    let on_time = total_deliveries - missed_deliveries - late_deliveries;
    round2(on_time as f64 / total_deliveries as f64 * 100.0)
}

/// Partner row score for the aggregate report: deduction-based, starting
/// from 100.
///
/// - 10 points per expired inventory item, capped at 30
/// - 5 points per low-stock item, capped at 20
/// - 20 points when KYC is incomplete
///
/// Floored at 0.
pub fn partner_report_score(
    expired_items: i64,
    low_stock_items: i64,
    kyc_completed: bool,
) -> f64 {
    let mut score = 100.0;

    if expired_items > 0 {
        score -= (expired_items as f64 * 10.0).min(30.0);
    }
    if low_stock_items > 0 {
        score -= (low_stock_items as f64 * 5.0).min(20.0);
    }
    if !kyc_completed {
        score -= 20.0;
    }

    round2(score.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::compliance::ComplianceStatus;
    use chrono::Utc;

    fn entry(entity_type: AuditEntityType, entity_id: i64, action: AuditAction) -> AuditLogEntry {
        AuditLogEntry {
            id: 0,
            entity_type,
            entity_id,
            action,
            actor_id: None,
            actor_email: None,
            before_snapshot: None,
            after_snapshot: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_slice_is_no_data() {
        let outcome = score_from_entries(&[]);
        assert!(!outcome.has_data());
        assert_eq!(outcome.score, 0.0);
    }

    #[test]
    fn test_positive_actions_raise_score() {
        let entries = vec![
            entry(AuditEntityType::Delivery, 1, AuditAction::Complete),
            entry(AuditEntityType::Delivery, 2, AuditAction::Complete),
        ];
        let outcome = score_from_entries(&entries);
        assert!(outcome.has_data());
        // 20 points over 2 actions, normalized x100 and clamped
        assert_eq!(outcome.score, 100.0);
    }

    #[test]
    fn test_negative_actions_floor_at_zero() {
        let entries = vec![
            entry(AuditEntityType::Payment, 1, AuditAction::PaymentFailed),
            entry(AuditEntityType::Delivery, 2, AuditAction::Cancel),
        ];
        let outcome = score_from_entries(&entries);
        assert_eq!(outcome.score, 0.0);
        assert_eq!(outcome.sample_size, 2);
    }

    #[test]
    fn test_mixed_actions_normalized() {
        // +10 (COMPLETE) -1 (LOGOUT) = 9 over 2 actions -> 4.5 -> 450 -> clamp 100
        let entries = vec![
            entry(AuditEntityType::Delivery, 1, AuditAction::Complete),
            entry(AuditEntityType::User, 2, AuditAction::Logout),
        ];
        assert_eq!(score_from_entries(&entries).score, 100.0);
    }

    #[test]
    fn test_unweighted_actions_dilute_score() {
        // +1 (LOGIN) over 4 actions -> 0.25 -> 25.00
        let entries = vec![
            entry(AuditEntityType::User, 1, AuditAction::Login),
            entry(AuditEntityType::Delivery, 2, AuditAction::Update),
            entry(AuditEntityType::Delivery, 3, AuditAction::Update),
            entry(AuditEntityType::Delivery, 4, AuditAction::Update),
        ];
        assert_eq!(score_from_entries(&entries).score, 25.0);
    }

    #[test]
    fn test_score_always_within_bounds() {
        let actions = [
            AuditAction::Complete,
            AuditAction::Delete,
            AuditAction::PaymentFailed,
            AuditAction::Verify,
            AuditAction::Cancel,
            AuditAction::Login,
            AuditAction::Logout,
            AuditAction::Update,
        ];
        for (i, &action) in actions.iter().enumerate() {
            let entries: Vec<_> = (0..=i)
                .map(|j| entry(AuditEntityType::Delivery, j as i64, action))
                .collect();
            let outcome = score_from_entries(&entries);
            assert!(
                (0.0..=100.0).contains(&outcome.score),
                "{action:?} scored {}",
                outcome.score
            );
        }
    }

    #[test]
    fn test_driver_relatedness_requires_assignment() {
        let relations = DriverRelations {
            delivery_ids: HashSet::from([10]),
        };

        let own_profile = entry(AuditEntityType::Driver, 5, AuditAction::Verify);
        let assigned = entry(AuditEntityType::Delivery, 10, AuditAction::Complete);
        let unassigned = entry(AuditEntityType::Delivery, 99, AuditAction::Cancel);
        let other_driver = entry(AuditEntityType::Driver, 6, AuditAction::Deactivate);

        assert!(is_driver_related(&own_profile, 5, &relations));
        assert!(is_driver_related(&assigned, 5, &relations));
        assert!(!is_driver_related(&unassigned, 5, &relations));
        assert!(!is_driver_related(&other_driver, 5, &relations));
    }

    #[test]
    fn test_driver_score_ignores_other_drivers_cancellations() {
        let relations = DriverRelations {
            delivery_ids: HashSet::from([10, 11]),
        };
        let entries = vec![
            entry(AuditEntityType::Delivery, 10, AuditAction::Complete),
            entry(AuditEntityType::Delivery, 11, AuditAction::Complete),
            // Another driver's cancelled delivery must not drag this score down
            entry(AuditEntityType::Delivery, 99, AuditAction::Cancel),
        ];
        let outcome = driver_score(&entries, 5, &relations);
        assert_eq!(outcome.sample_size, 2);
        assert_eq!(outcome.score, 100.0);
    }

    #[test]
    fn test_partner_relatedness_over_owned_entities() {
        let relations = PartnerRelations {
            delivery_ids: HashSet::from([20]),
            inventory_item_ids: HashSet::from([30]),
            product_ids: HashSet::from([40]),
        };

        assert!(is_partner_related(
            &entry(AuditEntityType::Partner, 7, AuditAction::Verify),
            7,
            &relations
        ));
        assert!(is_partner_related(
            &entry(AuditEntityType::InventoryItem, 30, AuditAction::Update),
            7,
            &relations
        ));
        assert!(is_partner_related(
            &entry(AuditEntityType::Product, 40, AuditAction::Deactivate),
            7,
            &relations
        ));
        assert!(!is_partner_related(
            &entry(AuditEntityType::InventoryItem, 31, AuditAction::Delete),
            7,
            &relations
        ));
        assert!(!is_partner_related(
            &entry(AuditEntityType::Payment, 7, AuditAction::PaymentFailed),
            7,
            &relations
        ));
    }

    #[test]
    fn test_system_score_unfiltered() {
        let entries = vec![
            entry(AuditEntityType::Delivery, 1, AuditAction::Complete),
            entry(AuditEntityType::Partner, 2, AuditAction::Verify),
            entry(AuditEntityType::Payment, 3, AuditAction::PaymentCompleted),
        ];
        let outcome = system_score(&entries);
        assert_eq!(outcome.sample_size, 3);
        assert!((0.0..=100.0).contains(&outcome.score));
    }

    #[test]
    fn test_driver_report_score_scenario() {
        // 20 deliveries, 2 missed, 3 late -> 15 on time -> 75.00, FAIR
        let score = driver_report_score(20, 2, 3);
        assert_eq!(score, 75.0);
        assert_eq!(ComplianceStatus::from_report_score(score), ComplianceStatus::Fair);
    }

    #[test]
    fn test_driver_report_score_zero_deliveries() {
        assert_eq!(driver_report_score(0, 0, 0), 0.0);
    }

    #[test]
    fn test_partner_report_score_clean_partner() {
        let score = partner_report_score(0, 0, true);
        assert_eq!(score, 100.0);
        assert_eq!(
            ComplianceStatus::from_report_score(score),
            ComplianceStatus::Excellent
        );
    }

    #[test]
    fn test_partner_report_score_capped_deductions() {
        // 4 expired items cap at 30; incomplete KYC deducts 20 -> 50, POOR
        let score = partner_report_score(4, 0, false);
        assert_eq!(score, 50.0);
        assert_eq!(ComplianceStatus::from_report_score(score), ComplianceStatus::Poor);
    }

    #[test]
    fn test_partner_report_score_floors_at_zero() {
        let score = partner_report_score(10, 10, false);
        // 100 - 30 - 20 - 20 = 30
        assert_eq!(score, 30.0);
        let score = partner_report_score(100, 100, false);
        assert!(score >= 0.0);
    }
}
