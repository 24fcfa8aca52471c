use std::sync::Arc;

use gatelist_events::EventFanout;

use crate::collaborators::{Notifier, PaymentGateway};
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: gatelist_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Per-event dashboard fanout hub.
    pub fanout: Arc<EventFanout>,
    /// External notification collaborator (fire-and-forget).
    pub notifier: Arc<dyn Notifier>,
    /// External payment gateway collaborator.
    pub payments: Arc<dyn PaymentGateway>,
}
