//! Realtime fanout infrastructure for the gatelist ticketing engine.
//!
//! - [`BookingEvent`]: the domain event envelope pushed to dashboards.
//! - [`EventFanout`]: per-event subscriber registry; dashboards subscribe
//!   to a single event and receive only that event's bookings.

pub mod fanout;

pub use fanout::{BookingEvent, EventFanout, SubscriberId};
