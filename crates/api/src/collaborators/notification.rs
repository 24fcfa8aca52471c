//! Notification collaborator: confirmation email dispatch.

use async_trait::async_trait;
use gatelist_db::models::booking::Booking;
use gatelist_db::models::ticket::Ticket;

/// Outbound notification service.
///
/// Implementations are best-effort: callers invoke them after commit and
/// log failures without retrying (retry policy belongs to the provider).
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send a booking confirmation to the customer.
    async fn send_booking_confirmation(&self, booking: &Booking) -> Result<(), NotifyError>;

    /// Send the minted tickets for a completed order.
    async fn send_ticket_confirmation(
        &self,
        customer_user_id: i64,
        tickets: &[Ticket],
    ) -> Result<(), NotifyError>;
}

/// Opaque delivery failure from the notification provider.
#[derive(Debug, thiserror::Error)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Default implementation that records deliveries in the log.
///
/// Stands in for the real email/SMS provider in development and tests.
pub struct LoggingNotifier;

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn send_booking_confirmation(&self, booking: &Booking) -> Result<(), NotifyError> {
        tracing::info!(
            booking_code = %booking.booking_code,
            customer_email = %booking.customer_email,
            "Would send booking confirmation"
        );
        Ok(())
    }

    async fn send_ticket_confirmation(
        &self,
        customer_user_id: i64,
        tickets: &[Ticket],
    ) -> Result<(), NotifyError> {
        tracing::info!(
            user_id = customer_user_id,
            ticket_count = tickets.len(),
            "Would send ticket confirmation"
        );
        Ok(())
    }
}
