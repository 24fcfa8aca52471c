//! Handlers for the multi-tier order path and ticket lifecycle.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use validator::Validate;

use gatelist_core::types::DbId;
use gatelist_core::CoreError;
use gatelist_core::audit::action_types;
use gatelist_db::models::audit::RecordAction;
use gatelist_db::models::order::{CompleteOrder, CreateOrder, OrderWithItems, RefundOrder};
use gatelist_db::models::ticket::{Ticket, TicketListQuery};
use gatelist_db::repositories::{AuditRepo, OrderRepo, TicketRepo};
use gatelist_events::BookingEvent;

use crate::collaborators::CheckoutSession;
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response payload for order creation: the priced order plus the
/// checkout session, when the gateway produced one.
#[derive(Debug, Serialize)]
pub struct OrderCreated {
    #[serde(flatten)]
    pub order: OrderWithItems,
    pub checkout: Option<CheckoutSession>,
}

/// POST /api/v1/tickets/orders
///
/// Create a pending order: every line's capacity is reserved inside one
/// transaction, and the whole order fails if any line cannot be
/// reserved. The checkout session is opened after commit; a gateway
/// hiccup leaves the order pending rather than failing the request.
pub async fn create_order(
    State(state): State<AppState>,
    Json(input): Json<CreateOrder>,
) -> AppResult<impl IntoResponse> {
    if input.items.is_empty() {
        return Err(CoreError::InvalidArgument(
            "order must contain at least one item".into(),
        )
        .into());
    }
    input.validate()?;

    let order = OrderRepo::create(&state.pool, &input).await?;

    tracing::info!(
        order_id = order.order.id,
        user_id = order.order.user_id,
        total_amount_cents = order.order.total_amount_cents,
        items = order.items.len(),
        "Order created"
    );

    let checkout = match state
        .payments
        .create_checkout_session(order.order.id, order.order.total_amount_cents)
        .await
    {
        Ok(session) => Some(session),
        Err(e) => {
            tracing::warn!(order_id = order.order.id, error = %e, "Checkout session failed");
            None
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: OrderCreated { order, checkout },
        }),
    ))
}

/// POST /api/v1/tickets/orders/complete
///
/// Confirm payment with the gateway, then mint one ticket per purchased
/// unit. Safe to retry: a second call observes a non-pending order and
/// fails without re-minting.
pub async fn complete_order(
    State(state): State<AppState>,
    Json(input): Json<CompleteOrder>,
) -> AppResult<impl IntoResponse> {
    state
        .payments
        .confirm_payment(&input.payment_reference)
        .await
        .map_err(|e| {
            CoreError::FailedPrecondition(format!("payment not confirmed: {e}"))
        })?;

    let (order, tickets) =
        OrderRepo::complete(&state.pool, input.order_id, &input.payment_reference).await?;

    tracing::info!(
        order_id = order.id,
        tickets = tickets.len(),
        "Order completed and tickets minted"
    );

    // Post-commit side effects: ticket email (spawned) and dashboard event.
    let notifier = state.notifier.clone();
    let for_email = tickets.clone();
    let user_id = order.user_id;
    tokio::spawn(async move {
        if let Err(e) = notifier.send_ticket_confirmation(user_id, &for_email).await {
            tracing::warn!(user_id, error = %e, "Ticket confirmation delivery failed");
        }
    });

    let event = BookingEvent::new(
        BookingEvent::ORDER_COMPLETED,
        order.event_id,
        serde_json::json!({
            "order_id": order.id,
            "ticket_count": tickets.len(),
        }),
    );
    state.fanout.publish(event).await;

    #[derive(Serialize)]
    struct Minted {
        order: gatelist_db::models::order::Order,
        tickets: Vec<Ticket>,
    }
    Ok(Json(DataResponse {
        data: Minted { order, tickets },
    }))
}

/// Response payload for an order refund.
#[derive(Debug, Serialize)]
pub struct Refunded {
    #[serde(flatten)]
    pub order: gatelist_db::models::order::Order,
    pub refunded_tickets: u64,
}

/// POST /api/v1/tickets/orders/refund
///
/// Refund a completed order: active tickets are voided and every line's
/// capacity returns to its tier. Pending or already-refunded orders are
/// rejected.
pub async fn refund_order(
    State(state): State<AppState>,
    Json(input): Json<RefundOrder>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let (order, refunded_tickets) = OrderRepo::refund(&state.pool, input.order_id).await?;

    tracing::info!(
        order_id = order.id,
        refunded_tickets,
        "Order refunded"
    );

    let action = RecordAction {
        action_type: action_types::ORDER_REFUND,
        actor_email: input.actor_email,
        entity_type: "order",
        entity_id: order.id,
        details: serde_json::json!({ "refunded_tickets": refunded_tickets }),
    };
    if let Err(e) = AuditRepo::record(&state.pool, &action).await {
        tracing::warn!(order_id = order.id, error = %e, "Failed to record audit entry");
    }

    Ok(Json(DataResponse {
        data: Refunded {
            order,
            refunded_tickets,
        },
    }))
}

/// POST /api/v1/tickets/validate/{scan_code}
///
/// Check a ticket in by scan code. Always returns 200 with the outcome;
/// the response distinguishes "already used" from "cancelled/refunded"
/// from success so door UIs can show the right message.
pub async fn validate_ticket(
    State(state): State<AppState>,
    Path(scan_code): Path<String>,
) -> AppResult<impl IntoResponse> {
    let outcome = TicketRepo::validate_scan(&state.pool, &scan_code).await?;

    tracing::info!(
        is_valid = outcome.is_valid,
        message = %outcome.message,
        "Ticket scan processed"
    );

    Ok(Json(DataResponse { data: outcome }))
}

/// GET /api/v1/tickets/users/{user_id}
///
/// Paginated listing of a user's tickets with optional status/event filters.
pub async fn list_user_tickets(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Query(query): Query<TicketListQuery>,
) -> AppResult<impl IntoResponse> {
    let tickets = TicketRepo::list_for_user(&state.pool, user_id, &query).await?;
    Ok(Json(DataResponse { data: tickets }))
}
