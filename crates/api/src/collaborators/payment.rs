//! Payment gateway collaborator.

use async_trait::async_trait;
use gatelist_core::types::{Cents, DbId};

/// A checkout session created with the external gateway.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CheckoutSession {
    pub session_id: String,
    pub checkout_url: String,
}

/// External payment processor.
///
/// The engine calls `create_checkout_session` after an order is created
/// and `confirm_payment` before completing it. Settlement, capture, and
/// refunds live entirely on the gateway's side.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a checkout session for a pending order.
    async fn create_checkout_session(
        &self,
        order_id: DbId,
        amount_cents: Cents,
    ) -> Result<CheckoutSession, PaymentError>;

    /// Verify that a payment reference corresponds to a settled payment.
    async fn confirm_payment(&self, payment_reference: &str) -> Result<(), PaymentError>;
}

/// Failure reported by the payment gateway.
#[derive(Debug, thiserror::Error)]
#[error("payment gateway error: {0}")]
pub struct PaymentError(pub String);

/// Default implementation that accepts everything and logs.
///
/// Stands in for the real gateway in development and tests.
pub struct LoggingPaymentGateway;

#[async_trait]
impl PaymentGateway for LoggingPaymentGateway {
    async fn create_checkout_session(
        &self,
        order_id: DbId,
        amount_cents: Cents,
    ) -> Result<CheckoutSession, PaymentError> {
        tracing::info!(order_id, amount_cents, "Would create checkout session");
        Ok(CheckoutSession {
            session_id: format!("session-{order_id}"),
            checkout_url: format!("https://payments.invalid/checkout/{order_id}"),
        })
    }

    async fn confirm_payment(&self, payment_reference: &str) -> Result<(), PaymentError> {
        tracing::info!(payment_reference, "Would confirm payment");
        Ok(())
    }
}
