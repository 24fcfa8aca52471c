//! Per-event subscriber registry with push fanout.
//!
//! [`EventFanout`] owns the `event_id → subscribers` map outright; the map
//! is never exposed, only `subscribe` / `unsubscribe` / `publish`. It is
//! designed to be shared via `Arc<EventFanout>` across the application.
//!
//! Each subscriber holds the receiving half of an unbounded channel; the
//! registry holds the sending half. Publishing never blocks on slow
//! consumers, and a send failure (receiver dropped, i.e. the connection
//! closed) evicts only that subscriber without affecting delivery to its
//! siblings. When an event's last subscriber goes away the whole entry is
//! removed so the registry does not grow with dead event ids.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, RwLock};

use gatelist_core::types::DbId;

// ---------------------------------------------------------------------------
// BookingEvent
// ---------------------------------------------------------------------------

/// A domain event scoped to one event's dashboard feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingEvent {
    /// Dot-separated event name, e.g. `"booking.created"`.
    pub event_type: String,

    /// The event whose subscribers should receive this.
    pub event_id: DbId,

    /// Free-form JSON payload (typically the serialized booking).
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl BookingEvent {
    /// Well-known event type for a freshly confirmed booking.
    pub const BOOKING_CREATED: &'static str = "booking.created";

    /// Well-known event type for a booking check-in.
    pub const BOOKING_CHECKED_IN: &'static str = "booking.checked_in";

    /// Well-known event type for a completed order.
    pub const ORDER_COMPLETED: &'static str = "order.completed";

    /// Create an event with the given type and payload.
    pub fn new(event_type: impl Into<String>, event_id: DbId, payload: serde_json::Value) -> Self {
        Self {
            event_type: event_type.into(),
            event_id,
            payload,
            timestamp: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// EventFanout
// ---------------------------------------------------------------------------

/// Opaque handle identifying one subscription within its event's set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Subscribers = HashMap<SubscriberId, mpsc::UnboundedSender<BookingEvent>>;

/// Per-event fanout hub.
#[derive(Default)]
pub struct EventFanout {
    registry: RwLock<HashMap<DbId, Subscribers>>,
    next_id: AtomicU64,
}

impl EventFanout {
    /// Create an empty fanout hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber for `event_id`.
    ///
    /// Returns the subscription handle (pass it to
    /// [`unsubscribe`](Self::unsubscribe) on disconnect) and the receiver
    /// the connection task should drain until the client goes away.
    pub async fn subscribe(
        &self,
        event_id: DbId,
    ) -> (SubscriberId, mpsc::UnboundedReceiver<BookingEvent>) {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::unbounded_channel();
        self.registry
            .write()
            .await
            .entry(event_id)
            .or_default()
            .insert(id, tx);
        tracing::debug!(event_id, subscriber = id.0, "Dashboard subscribed");
        (id, rx)
    }

    /// Remove a subscriber, dropping its event's entry if it was the last.
    pub async fn unsubscribe(&self, event_id: DbId, subscriber: SubscriberId) {
        let mut registry = self.registry.write().await;
        if let Some(subscribers) = registry.get_mut(&event_id) {
            subscribers.remove(&subscriber);
            if subscribers.is_empty() {
                registry.remove(&event_id);
            }
        }
        tracing::debug!(event_id, subscriber = subscriber.0, "Dashboard unsubscribed");
    }

    /// Push an event to every subscriber of `event.event_id`.
    ///
    /// A failed send means the receiver is gone; that subscriber is
    /// evicted and delivery continues to the rest. Returns the number of
    /// subscribers the event was delivered to.
    pub async fn publish(&self, event: BookingEvent) -> usize {
        let mut registry = self.registry.write().await;
        let Some(subscribers) = registry.get_mut(&event.event_id) else {
            return 0;
        };

        let mut delivered = 0;
        subscribers.retain(|id, tx| match tx.send(event.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(_) => {
                tracing::debug!(
                    event_id = event.event_id,
                    subscriber = id.0,
                    "Evicting disconnected subscriber"
                );
                false
            }
        });

        if subscribers.is_empty() {
            registry.remove(&event.event_id);
        }
        delivered
    }

    /// Number of live subscribers for an event.
    pub async fn subscriber_count(&self, event_id: DbId) -> usize {
        self.registry
            .read()
            .await
            .get(&event_id)
            .map_or(0, Subscribers::len)
    }

    /// Number of events with at least one subscriber.
    pub async fn tracked_event_count(&self) -> usize {
        self.registry.read().await.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn booking_created(event_id: DbId) -> BookingEvent {
        BookingEvent::new(
            BookingEvent::BOOKING_CREATED,
            event_id,
            serde_json::json!({"bookingCode": "BK-TEST"}),
        )
    }

    #[tokio::test]
    async fn subscriber_receives_events_for_its_event_only() {
        let fanout = EventFanout::new();
        let (_id1, mut rx1) = fanout.subscribe(1).await;
        let (_id2, mut rx2) = fanout.subscribe(2).await;

        fanout.publish(booking_created(1)).await;

        let received = rx1.recv().await.expect("event 1 subscriber should receive");
        assert_eq!(received.event_id, 1);
        assert_eq!(received.event_type, BookingEvent::BOOKING_CREATED);

        // Nothing must have been routed to the event 2 subscriber.
        assert!(rx2.try_recv().is_err());
    }

    #[tokio::test]
    async fn publish_with_no_subscribers_delivers_to_none() {
        let fanout = EventFanout::new();
        assert_eq!(fanout.publish(booking_created(42)).await, 0);
    }

    #[tokio::test]
    async fn all_sibling_subscribers_receive_the_event() {
        let fanout = EventFanout::new();
        let (_a, mut rx_a) = fanout.subscribe(7).await;
        let (_b, mut rx_b) = fanout.subscribe(7).await;

        assert_eq!(fanout.publish(booking_created(7)).await, 2);
        assert_eq!(rx_a.recv().await.unwrap().event_id, 7);
        assert_eq!(rx_b.recv().await.unwrap().event_id, 7);
    }

    #[tokio::test]
    async fn dropped_receiver_is_evicted_without_affecting_siblings() {
        let fanout = EventFanout::new();
        let (_a, rx_a) = fanout.subscribe(7).await;
        let (_b, mut rx_b) = fanout.subscribe(7).await;

        drop(rx_a);

        // First publish evicts the dead subscriber, still delivers to b.
        assert_eq!(fanout.publish(booking_created(7)).await, 1);
        assert_eq!(rx_b.recv().await.unwrap().event_id, 7);
        assert_eq!(fanout.subscriber_count(7).await, 1);
    }

    #[tokio::test]
    async fn unsubscribe_removes_empty_event_entries() {
        let fanout = EventFanout::new();
        let (id, _rx) = fanout.subscribe(9).await;
        assert_eq!(fanout.tracked_event_count().await, 1);

        fanout.unsubscribe(9, id).await;
        assert_eq!(fanout.subscriber_count(9).await, 0);
        assert_eq!(fanout.tracked_event_count().await, 0);

        // A later publish for the dead event is a clean no-op.
        assert_eq!(fanout.publish(booking_created(9)).await, 0);
    }

    #[tokio::test]
    async fn eviction_of_last_subscriber_removes_the_entry() {
        let fanout = EventFanout::new();
        let (_id, rx) = fanout.subscribe(3).await;
        drop(rx);

        fanout.publish(booking_created(3)).await;
        assert_eq!(fanout.tracked_event_count().await, 0);
    }
}
