//! Pure domain logic for the gatelist ticketing engine.
//!
//! This crate has zero internal dependencies so it can be used by the
//! repository layer, the API server, and any future worker or CLI tooling:
//!
//! - [`error`]: the domain error taxonomy shared by all layers.
//! - [`pricing`]: early-bird price resolution and total computation.
//! - [`codes`]: booking / invite / scan code generation.
//! - [`states`]: explicit per-entity status state machines.
//! - [`audit`]: audit action constants for administrative operations.

pub mod audit;
pub mod codes;
pub mod error;
pub mod pricing;
pub mod states;
pub mod types;

pub use error::CoreError;
