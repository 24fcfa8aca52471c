//! HTTP handlers, one module per resource.
//!
//! Handlers validate the request, call into the repository layer (which
//! owns all transactions), and run post-commit side effects: customer
//! notification and dashboard fanout. Side-effect failures are logged and
//! never turned into a user-visible error: by the time they run, the
//! booking or order is already durably committed.

pub mod bookings;
pub mod group_bookings;
pub mod tickets;
