//! Status state machines for bookings, orders, tickets, and groups.
//!
//! Every entity status is stored as a TEXT column; the enums here are the
//! single source of truth for the legal column values and for the legal
//! transitions between them. Handlers and repositories never compare raw
//! status strings; they go through [`as_str`](BookingStatus::as_str) /
//! `parse` and the per-entity `transition` functions, so an illegal
//! transition is rejected the same way everywhere.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $entity:literal {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// The exact value stored in the status column.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $val ),+
                }
            }

            /// Parse a status column value.
            pub fn parse(value: &str) -> Result<Self, CoreError> {
                match value {
                    $( $val => Ok(Self::$variant), )+
                    other => Err(CoreError::Internal(format!(
                        concat!("unknown ", $entity, " status: {}"),
                        other
                    ))),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

define_status_enum! {
    /// Quick single-tier booking lifecycle.
    BookingStatus, "booking" {
        Pending = "pending",
        Confirmed = "confirmed",
        CheckedIn = "checked_in",
        Cancelled = "cancelled",
    }
}

define_status_enum! {
    /// Order payment lifecycle.
    PaymentStatus, "payment" {
        Pending = "pending",
        Completed = "completed",
        Failed = "failed",
        Refunded = "refunded",
    }
}

define_status_enum! {
    /// Individual ticket lifecycle.
    TicketStatus, "ticket" {
        Active = "active",
        Used = "used",
        Cancelled = "cancelled",
        Refunded = "refunded",
    }
}

define_status_enum! {
    /// Group booking lifecycle.
    GroupStatus, "group booking" {
        Active = "active",
        Locked = "locked",
        Completed = "completed",
        Cancelled = "cancelled",
    }
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// Actions that drive a booking's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingAction {
    Confirm,
    CheckIn,
    Cancel,
}

impl BookingStatus {
    /// Apply an action, returning the next status or `FailedPrecondition`.
    ///
    /// `checked_in` and `cancelled` are absorbing.
    pub fn transition(self, action: BookingAction) -> Result<BookingStatus, CoreError> {
        use BookingAction as A;
        use BookingStatus as S;
        match (self, action) {
            (S::Pending, A::Confirm) => Ok(S::Confirmed),
            (S::Confirmed, A::CheckIn) => Ok(S::CheckedIn),
            (S::Pending | S::Confirmed, A::Cancel) => Ok(S::Cancelled),
            (state, action) => Err(CoreError::FailedPrecondition(format!(
                "cannot {action:?} a {state} booking"
            ))),
        }
    }
}

/// Actions that drive an order's payment lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentAction {
    Complete,
    Fail,
    Refund,
}

impl PaymentStatus {
    /// Apply an action, returning the next status or `FailedPrecondition`.
    ///
    /// Only `pending` orders can complete or fail; only `completed` orders
    /// can refund. This is the idempotency guard for ticket minting: a
    /// second completion attempt finds a non-pending order and is rejected.
    pub fn transition(self, action: PaymentAction) -> Result<PaymentStatus, CoreError> {
        use PaymentAction as A;
        use PaymentStatus as S;
        match (self, action) {
            (S::Pending, A::Complete) => Ok(S::Completed),
            (S::Pending, A::Fail) => Ok(S::Failed),
            (S::Completed, A::Refund) => Ok(S::Refunded),
            (state, action) => Err(CoreError::FailedPrecondition(format!(
                "cannot {action:?} a {state} order"
            ))),
        }
    }
}

/// Actions that drive a ticket's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketAction {
    Use,
    Cancel,
    Refund,
}

impl TicketStatus {
    /// Apply an action, returning the next status or `FailedPrecondition`.
    ///
    /// All non-`active` states are terminal.
    pub fn transition(self, action: TicketAction) -> Result<TicketStatus, CoreError> {
        use TicketAction as A;
        use TicketStatus as S;
        match (self, action) {
            (S::Active, A::Use) => Ok(S::Used),
            (S::Active, A::Cancel) => Ok(S::Cancelled),
            (S::Active, A::Refund) => Ok(S::Refunded),
            (state, action) => Err(CoreError::FailedPrecondition(format!(
                "cannot {action:?} a {state} ticket"
            ))),
        }
    }
}

/// Actions that drive a group booking's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupAction {
    Lock,
    Complete,
    Cancel,
}

impl GroupStatus {
    /// Apply an action, returning the next status or `FailedPrecondition`.
    ///
    /// Locking is one-way: there is no unlock action.
    pub fn transition(self, action: GroupAction) -> Result<GroupStatus, CoreError> {
        use GroupAction as A;
        use GroupStatus as S;
        match (self, action) {
            (S::Active, A::Lock) => Ok(S::Locked),
            (S::Active | S::Locked, A::Complete) => Ok(S::Completed),
            (S::Active, A::Cancel) => Ok(S::Cancelled),
            (state, action) => Err(CoreError::FailedPrecondition(format!(
                "cannot {action:?} a {state} group booking"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn status_strings_round_trip() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::CheckedIn,
            BookingStatus::Cancelled,
        ] {
            assert_eq!(BookingStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(BookingStatus::parse("bogus").is_err());
    }

    #[test]
    fn booking_happy_path() {
        let s = BookingStatus::Pending
            .transition(BookingAction::Confirm)
            .unwrap();
        let s = s.transition(BookingAction::CheckIn).unwrap();
        assert_eq!(s, BookingStatus::CheckedIn);
    }

    #[test]
    fn checked_in_booking_is_terminal() {
        assert_matches!(
            BookingStatus::CheckedIn.transition(BookingAction::CheckIn),
            Err(CoreError::FailedPrecondition(_))
        );
        assert_matches!(
            BookingStatus::CheckedIn.transition(BookingAction::Cancel),
            Err(CoreError::FailedPrecondition(_))
        );
    }

    #[test]
    fn completed_order_cannot_complete_again() {
        assert_matches!(
            PaymentStatus::Completed.transition(PaymentAction::Complete),
            Err(CoreError::FailedPrecondition(_))
        );
    }

    #[test]
    fn refund_requires_completed_order() {
        assert_matches!(
            PaymentStatus::Pending.transition(PaymentAction::Refund),
            Err(CoreError::FailedPrecondition(_))
        );
        assert_eq!(
            PaymentStatus::Completed
                .transition(PaymentAction::Refund)
                .unwrap(),
            PaymentStatus::Refunded
        );
    }

    #[test]
    fn used_ticket_stays_used() {
        assert_eq!(
            TicketStatus::Active.transition(TicketAction::Use).unwrap(),
            TicketStatus::Used
        );
        for action in [TicketAction::Use, TicketAction::Cancel, TicketAction::Refund] {
            assert_matches!(
                TicketStatus::Used.transition(action),
                Err(CoreError::FailedPrecondition(_))
            );
        }
    }

    #[test]
    fn group_lock_is_one_way() {
        assert_eq!(
            GroupStatus::Active.transition(GroupAction::Lock).unwrap(),
            GroupStatus::Locked
        );
        assert_matches!(
            GroupStatus::Locked.transition(GroupAction::Lock),
            Err(CoreError::FailedPrecondition(_))
        );
        assert_matches!(
            GroupStatus::Locked.transition(GroupAction::Cancel),
            Err(CoreError::FailedPrecondition(_))
        );
    }
}
