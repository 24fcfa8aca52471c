//! Read-only access to the `events` table.
//!
//! Events are administered by the surrounding platform; the booking
//! engine only needs to look them up to validate status and
//! registration windows.

use gatelist_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::event::Event;

/// Column list for `events` queries.
const COLUMNS: &str = "\
    id, name, status, capacity, starts_at, ends_at, \
    registration_opens_at, registration_closes_at, created_at, updated_at";

pub struct EventRepo;

impl EventRepo {
    /// Fetch an event by id.
    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        event_id: DbId,
    ) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE id = $1");
        sqlx::query_as::<_, Event>(&query)
            .bind(event_id)
            .fetch_optional(executor)
            .await
    }
}
