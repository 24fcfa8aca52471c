//! External collaborator seams.
//!
//! The engine treats notification delivery and payment processing as
//! external services behind async traits. Their calls happen strictly
//! after the relevant database transaction has committed, and a failure
//! is logged, never converted into a user-visible failure of the
//! already-committed operation.

pub mod notification;
pub mod payment;

pub use notification::{LoggingNotifier, Notifier};
pub use payment::{CheckoutSession, LoggingPaymentGateway, PaymentGateway};
