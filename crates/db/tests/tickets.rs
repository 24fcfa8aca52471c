//! Integration tests for door-scan validation and ticket listing.

use sqlx::PgPool;

use gatelist_db::models::order::{CreateOrder, OrderItemRequest};
use gatelist_db::models::ticket::TicketListQuery;
use gatelist_db::repositories::{OrderRepo, TicketRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_event(pool: &PgPool) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO events \
            (name, status, capacity, starts_at, ends_at, \
             registration_opens_at, registration_closes_at) \
         VALUES ('Test Conf', 'published', 1000, \
                 NOW() + INTERVAL '7 days', NOW() + INTERVAL '8 days', \
                 NOW() - INTERVAL '1 day', NOW() + INTERVAL '6 days') \
         RETURNING id",
    )
    .fetch_one(pool)
    .await
    .expect("seed event")
}

async fn seed_tier(pool: &PgPool, event_id: i64) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO ticket_tiers \
            (event_id, name, base_price_cents, max_quantity) \
         VALUES ($1, 'GA', 5000, 100) \
         RETURNING id",
    )
    .bind(event_id)
    .fetch_one(pool)
    .await
    .expect("seed tier")
}

/// Create and complete an order, returning the minted tickets' scan codes.
async fn mint_tickets(pool: &PgPool, user_id: i64, quantity: i32) -> Vec<String> {
    let event_id = seed_event(pool).await;
    let tier_id = seed_tier(pool, event_id).await;
    let input = CreateOrder {
        user_id,
        event_id,
        items: vec![OrderItemRequest {
            tier_id,
            quantity,
        }],
    };
    let created = OrderRepo::create(pool, &input).await.expect("create order");
    let (_, tickets) = OrderRepo::complete(pool, created.order.id, "pay_x")
        .await
        .expect("complete order");
    tickets.into_iter().map(|t| t.scan_code).collect()
}

// ---------------------------------------------------------------------------
// Scanning
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn first_scan_accepts_second_scan_rejects(pool: PgPool) {
    let codes = mint_tickets(&pool, 1, 1).await;

    let first = TicketRepo::validate_scan(&pool, &codes[0]).await.unwrap();
    assert!(first.is_valid);
    let ticket = first.ticket.expect("accepted scan carries the ticket");
    assert_eq!(ticket.status, "used");
    assert!(ticket.used_at.is_some());

    let second = TicketRepo::validate_scan(&pool, &codes[0]).await.unwrap();
    assert!(!second.is_valid);
    assert_eq!(second.message, "Ticket already used");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_scan_code_is_invalid_not_an_error(pool: PgPool) {
    let outcome = TicketRepo::validate_scan(&pool, "no-such-code").await.unwrap();
    assert!(!outcome.is_valid);
    assert!(outcome.ticket.is_none());
    assert_eq!(outcome.message, "Ticket not found");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_scans_admit_exactly_one(pool: PgPool) {
    let codes = mint_tickets(&pool, 1, 1).await;
    let code = codes[0].clone();

    let mut handles = Vec::new();
    for _ in 0..4 {
        let pool = pool.clone();
        let code = code.clone();
        handles.push(tokio::spawn(async move {
            TicketRepo::validate_scan(&pool, &code).await
        }));
    }

    let mut admitted = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap().is_valid {
            admitted += 1;
        }
    }
    assert_eq!(admitted, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn refunded_ticket_is_rejected_at_the_door(pool: PgPool) {
    let codes = mint_tickets(&pool, 1, 1).await;
    sqlx::query("UPDATE tickets SET status = 'refunded' WHERE scan_code = $1")
        .bind(&codes[0])
        .execute(&pool)
        .await
        .unwrap();

    let outcome = TicketRepo::validate_scan(&pool, &codes[0]).await.unwrap();
    assert!(!outcome.is_valid);
    assert_eq!(outcome.message, "Ticket was refunded");
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn listing_filters_by_status_and_clamps_the_page(pool: PgPool) {
    let codes = mint_tickets(&pool, 7, 3).await;
    TicketRepo::validate_scan(&pool, &codes[0]).await.unwrap();

    let all = TicketRepo::list_for_user(&pool, 7, &TicketListQuery::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 3);

    let active = TicketRepo::list_for_user(
        &pool,
        7,
        &TicketListQuery {
            status: Some("active".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(active.len(), 2);

    // Another user's listing is empty.
    let other = TicketRepo::list_for_user(&pool, 8, &TicketListQuery::default())
        .await
        .unwrap();
    assert!(other.is_empty());

    // An absurd limit is clamped rather than passed through.
    let clamped = TicketRepo::list_for_user(
        &pool,
        7,
        &TicketListQuery {
            limit: Some(1_000_000),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(clamped.len(), 3);
}
