//! Route definitions for the `/tickets` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::tickets;
use crate::state::AppState;

/// Routes mounted at `/tickets`.
///
/// ```text
/// POST   /orders                  -> create_order
/// POST   /orders/complete         -> complete_order
/// POST   /orders/refund           -> refund_order
/// POST   /validate/{scan_code}    -> validate_ticket
/// GET    /users/{user_id}         -> list_user_tickets
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", post(tickets::create_order))
        .route("/orders/complete", post(tickets::complete_order))
        .route("/orders/refund", post(tickets::refund_order))
        .route("/validate/{scan_code}", post(tickets::validate_ticket))
        .route("/users/{user_id}", get(tickets::list_user_tickets))
}
