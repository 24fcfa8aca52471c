//! Audit logging constants for state-changing administrative actions.
//!
//! The audit trail records who did what to which group booking; the
//! constants here are the only legal `action_type` values for the
//! `audit_log` table.

/// Known action types for audit log entries.
pub mod action_types {
    pub const GROUP_LOCK: &str = "group_lock";
    pub const GROUP_SEATING: &str = "group_seating";
    pub const ORDER_REFUND: &str = "order_refund";
}

/// Known log categories for retention grouping.
pub mod log_categories {
    pub const GROUPS: &str = "groups";
    pub const ORDERS: &str = "orders";
}

/// Map an action type to its log category.
pub fn action_to_category(action_type: &str) -> &'static str {
    match action_type {
        action_types::GROUP_LOCK | action_types::GROUP_SEATING => log_categories::GROUPS,
        _ => log_categories::ORDERS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_actions_map_to_groups_category() {
        assert_eq!(action_to_category(action_types::GROUP_LOCK), "groups");
        assert_eq!(action_to_category(action_types::GROUP_SEATING), "groups");
        assert_eq!(action_to_category(action_types::ORDER_REFUND), "orders");
    }
}
