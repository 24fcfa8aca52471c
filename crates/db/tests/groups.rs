//! Integration tests for group bookings: membership, the one-way lock,
//! seating batches, and the check-in roster.

use assert_matches::assert_matches;
use sqlx::PgPool;

use gatelist_core::CoreError;
use gatelist_db::models::booking::CreateBooking;
use gatelist_db::models::group::SeatRequest;
use gatelist_db::repositories::{BookingRepo, GroupRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const ORGANIZER: &str = "grace@example.com";

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

async fn seed_booking(pool: &PgPool, event_id: i64, tier_id: i64, email: &str) -> i64 {
    let input = CreateBooking {
        event_id,
        ticket_tier_id: tier_id,
        quantity: 1,
        customer_email: email.into(),
        customer_name: email.into(),
    };
    BookingRepo::create_confirmed(pool, &input)
        .await
        .expect("seed booking")
        .id
}

fn seat(booking_id: i64, seat_number: &str) -> SeatRequest {
    SeatRequest {
        booking_id,
        section: "A".into(),
        row_label: "1".into(),
        seat_number: seat_number.into(),
    }
}

// ---------------------------------------------------------------------------
// Membership
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_and_join_up_to_capacity(pool: PgPool) {
    let event_id = seed_event(&pool).await;
    let tier_id = seed_tier(&pool, event_id).await;
    let group = GroupRepo::create(&pool, event_id, ORGANIZER, "Grace", 2)
        .await
        .unwrap();
    assert!(group.invite_code.starts_with("GRP-"));
    assert_eq!(group.status, "active");

    let b1 = seed_booking(&pool, event_id, tier_id, "m1@example.com").await;
    let b2 = seed_booking(&pool, event_id, tier_id, "m2@example.com").await;
    let b3 = seed_booking(&pool, event_id, tier_id, "m3@example.com").await;

    GroupRepo::add_member(&pool, &group.invite_code, b1, "M1").await.unwrap();
    GroupRepo::add_member(&pool, &group.invite_code, b2, "M2").await.unwrap();

    // Third member exceeds max_size.
    let err = GroupRepo::add_member(&pool, &group.invite_code, b3, "M3")
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::ResourceExhausted(_));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn a_booking_joins_at_most_one_group(pool: PgPool) {
    let event_id = seed_event(&pool).await;
    let tier_id = seed_tier(&pool, event_id).await;
    let group_a = GroupRepo::create(&pool, event_id, ORGANIZER, "Grace", 5)
        .await
        .unwrap();
    let group_b = GroupRepo::create(&pool, event_id, "other@example.com", "Other", 5)
        .await
        .unwrap();
    let booking_id = seed_booking(&pool, event_id, tier_id, "m1@example.com").await;

    GroupRepo::add_member(&pool, &group_a.invite_code, booking_id, "M1")
        .await
        .unwrap();
    let err = GroupRepo::add_member(&pool, &group_b.invite_code, booking_id, "M1")
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::AlreadyExists(_));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn joining_an_unknown_invite_code_is_not_found(pool: PgPool) {
    let event_id = seed_event(&pool).await;
    let tier_id = seed_tier(&pool, event_id).await;
    let booking_id = seed_booking(&pool, event_id, tier_id, "m1@example.com").await;

    let err = GroupRepo::add_member(&pool, "GRP-NOPE9999", booking_id, "M1")
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::NotFound { entity: "GroupBooking", .. });
}

// ---------------------------------------------------------------------------
// Locking
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn lock_freezes_membership_and_appends_a_system_message(pool: PgPool) {
    let event_id = seed_event(&pool).await;
    let tier_id = seed_tier(&pool, event_id).await;
    let group = GroupRepo::create(&pool, event_id, ORGANIZER, "Grace", 5)
        .await
        .unwrap();
    let b1 = seed_booking(&pool, event_id, tier_id, "m1@example.com").await;
    GroupRepo::add_member(&pool, &group.invite_code, b1, "M1").await.unwrap();

    let locked = GroupRepo::lock(&pool, &group.invite_code, ORGANIZER).await.unwrap();
    assert_eq!(locked.status, "locked");

    // Joining after the lock is rejected.
    let b2 = seed_booking(&pool, event_id, tier_id, "m2@example.com").await;
    let err = GroupRepo::add_member(&pool, &group.invite_code, b2, "M2")
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::FailedPrecondition(_));

    // Locking again is rejected too: the transition is one-way.
    let err = GroupRepo::lock(&pool, &group.invite_code, ORGANIZER).await.unwrap_err();
    assert_matches!(err, CoreError::FailedPrecondition(_));

    let messages = GroupRepo::list_messages(&pool, group.id).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].sender, "system");
    assert!(messages[0].body.contains("locked by Grace"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn lock_requires_the_organizer_email(pool: PgPool) {
    let event_id = seed_event(&pool).await;
    let group = GroupRepo::create(&pool, event_id, ORGANIZER, "Grace", 5)
        .await
        .unwrap();

    // A non-organizer holding the code learns nothing beyond "not found".
    let err = GroupRepo::lock(&pool, &group.invite_code, "mallory@example.com")
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::NotFound { entity: "GroupBooking", .. });

    // Email comparison ignores case.
    GroupRepo::lock(&pool, &group.invite_code, "GRACE@Example.COM")
        .await
        .unwrap();
}

// ---------------------------------------------------------------------------
// Seating
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn seating_applies_members_and_skips_strangers(pool: PgPool) {
    let event_id = seed_event(&pool).await;
    let tier_id = seed_tier(&pool, event_id).await;
    let group = GroupRepo::create(&pool, event_id, ORGANIZER, "Grace", 5)
        .await
        .unwrap();
    let b1 = seed_booking(&pool, event_id, tier_id, "m1@example.com").await;
    let b2 = seed_booking(&pool, event_id, tier_id, "m2@example.com").await;
    let outsider = seed_booking(&pool, event_id, tier_id, "out@example.com").await;
    GroupRepo::add_member(&pool, &group.invite_code, b1, "M1").await.unwrap();
    GroupRepo::add_member(&pool, &group.invite_code, b2, "M2").await.unwrap();

    let applied = GroupRepo::replace_seating(
        &pool,
        &group.invite_code,
        ORGANIZER,
        &[seat(b1, "1"), seat(b2, "2"), seat(outsider, "3")],
    )
    .await
    .unwrap();
    assert_eq!(applied, 2);

    let seats: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM seating_assignments WHERE group_booking_id = $1",
    )
    .bind(group.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(seats, 2);

    // Reassigning replaces, never duplicates.
    let applied = GroupRepo::replace_seating(
        &pool,
        &group.invite_code,
        ORGANIZER,
        &[seat(b1, "7")],
    )
    .await
    .unwrap();
    assert_eq!(applied, 1);

    let seat_number: String = sqlx::query_scalar(
        "SELECT seat_number FROM seating_assignments WHERE booking_id = $1",
    )
    .bind(b1)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(seat_number, "7");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn seating_is_frozen_after_lock(pool: PgPool) {
    let event_id = seed_event(&pool).await;
    let tier_id = seed_tier(&pool, event_id).await;
    let group = GroupRepo::create(&pool, event_id, ORGANIZER, "Grace", 5)
        .await
        .unwrap();
    let b1 = seed_booking(&pool, event_id, tier_id, "m1@example.com").await;
    GroupRepo::add_member(&pool, &group.invite_code, b1, "M1").await.unwrap();
    GroupRepo::lock(&pool, &group.invite_code, ORGANIZER).await.unwrap();

    let err = GroupRepo::replace_seating(&pool, &group.invite_code, ORGANIZER, &[seat(b1, "1")])
        .await
        .unwrap_err();
    assert_matches!(&err, CoreError::FailedPrecondition(msg) => {
        assert!(msg.contains("seating is frozen"), "got: {msg}");
    });
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn roster_counts_checked_in_members_and_carries_seats(pool: PgPool) {
    let event_id = seed_event(&pool).await;
    let tier_id = seed_tier(&pool, event_id).await;
    let group = GroupRepo::create(&pool, event_id, ORGANIZER, "Grace", 5)
        .await
        .unwrap();
    let b1 = seed_booking(&pool, event_id, tier_id, "m1@example.com").await;
    let b2 = seed_booking(&pool, event_id, tier_id, "m2@example.com").await;
    GroupRepo::add_member(&pool, &group.invite_code, b1, "M1").await.unwrap();
    GroupRepo::add_member(&pool, &group.invite_code, b2, "M2").await.unwrap();
    GroupRepo::replace_seating(&pool, &group.invite_code, ORGANIZER, &[seat(b1, "1")])
        .await
        .unwrap();

    let code: String = sqlx::query_scalar("SELECT booking_code FROM bookings WHERE id = $1")
        .bind(b1)
        .fetch_one(&pool)
        .await
        .unwrap();
    BookingRepo::check_in(&pool, &code).await.unwrap().expect("check-in");

    let roster = GroupRepo::check_in_roster(&pool, &group.invite_code).await.unwrap();
    assert_eq!(roster.total_count, 2);
    assert_eq!(roster.checked_in_count, 1);

    let first = &roster.members[0];
    assert_eq!(first.booking_id, b1);
    assert_eq!(first.booking_status, "checked_in");
    assert_eq!(first.seat_number.as_deref(), Some("1"));
    assert!(roster.members[1].seat_number.is_none());
}
