//! Order and order item models for the multi-tier cart path.

use gatelist_core::types::{Cents, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `orders` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Order {
    pub id: DbId,
    pub user_id: DbId,
    pub event_id: DbId,
    pub total_amount_cents: Cents,
    pub payment_status: String,
    pub payment_reference: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `order_items` table.
///
/// `unit_price_cents` is the early-bird-aware price snapshot taken at
/// order creation; later tier price changes never affect an existing order.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OrderItem {
    pub id: DbId,
    pub order_id: DbId,
    pub tier_id: DbId,
    pub quantity: i32,
    pub unit_price_cents: Cents,
    pub line_total_cents: Cents,
}

/// One requested line in a new order.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct OrderItemRequest {
    pub tier_id: DbId,
    #[validate(range(min = 1, max = 100))]
    pub quantity: i32,
}

/// DTO for `POST /tickets/orders`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrder {
    pub user_id: DbId,
    pub event_id: DbId,
    #[validate(length(min = 1), nested)]
    pub items: Vec<OrderItemRequest>,
}

/// DTO for `POST /tickets/orders/complete`.
#[derive(Debug, Deserialize)]
pub struct CompleteOrder {
    pub order_id: DbId,
    pub payment_reference: String,
}

/// DTO for `POST /tickets/orders/refund`.
#[derive(Debug, Deserialize, Validate)]
pub struct RefundOrder {
    pub order_id: DbId,
    #[validate(email)]
    pub actor_email: String,
}

/// Order plus its items, returned from order creation.
#[derive(Debug, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}
