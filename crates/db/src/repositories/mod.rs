//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept a pool or executor as the first argument. Simple reads return
//! `sqlx::Error`; multi-step transactional operations return
//! [`CoreError`](gatelist_core::CoreError) with the full domain taxonomy.

pub mod audit_repo;
pub mod booking_repo;
pub mod event_repo;
pub mod group_repo;
pub mod order_repo;
pub mod ticket_repo;
pub mod tier_repo;

pub use audit_repo::AuditRepo;
pub use booking_repo::BookingRepo;
pub use event_repo::EventRepo;
pub use group_repo::GroupRepo;
pub use order_repo::OrderRepo;
pub use ticket_repo::TicketRepo;
pub use tier_repo::TierRepo;

use gatelist_core::CoreError;

/// Convert an unexpected sqlx failure into an opaque internal error.
///
/// Used by the transactional repositories after they have handled the
/// error shapes they care about (row-not-found, unique violations).
pub(crate) fn internal(err: sqlx::Error) -> CoreError {
    tracing::error!(error = %err, "Unexpected database error");
    CoreError::Internal("database failure".into())
}

/// Whether `err` is a PostgreSQL unique violation (23505) on the named
/// constraint.
pub(crate) fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some("23505") && db_err.constraint() == Some(constraint)
        }
        _ => false,
    }
}
