//! Per-event dashboard subscription over WebSocket.
//!
//! `GET /api/v1/events/{event_id}/subscribe` upgrades the connection and
//! holds it open indefinitely; every booking event published for that
//! event is forwarded as a JSON text frame. There is no natural
//! completion; the subscription ends only when the client disconnects,
//! at which point the connection unregisters itself from the fanout.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};

use gatelist_core::types::DbId;
use gatelist_core::CoreError;
use gatelist_events::EventFanout;
use gatelist_db::repositories::EventRepo;

use crate::error::AppResult;
use crate::state::AppState;

/// HTTP handler that upgrades the connection to WebSocket.
///
/// The event must exist; subscribing to an unknown event is a 404 rather
/// than a connection that will never receive anything.
pub async fn subscribe_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    EventRepo::find_by_id(&state.pool, event_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Event", event_id))?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state.fanout, event_id)))
}

/// Manage a single subscription after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers with the fanout for `event_id`.
///   2. Spawns a sender task forwarding fanout events as JSON frames.
///   3. Drains inbound messages on the current task until disconnect.
///   4. Unsubscribes and stops the sender on the way out.
async fn handle_socket(socket: WebSocket, fanout: Arc<EventFanout>, event_id: DbId) {
    let (subscriber, mut events) = fanout.subscribe(event_id).await;
    tracing::info!(event_id, "Dashboard connection opened");

    let (mut sink, mut stream) = socket.split();

    let send_task = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let frame = match serde_json::to_string(&event) {
                Ok(json) => Message::text(json),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize booking event");
                    continue;
                }
            };
            if sink.send(frame).await.is_err() {
                // Transport gone; the read loop will observe it too.
                break;
            }
        }
    });

    // Inbound loop: dashboards do not send application messages, so this
    // exists purely for disconnect detection.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(event_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    fanout.unsubscribe(event_id, subscriber).await;
    send_task.abort();
    tracing::info!(event_id, "Dashboard connection closed");
}
