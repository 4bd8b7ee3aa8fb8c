//! `WebSocket` handler for real-time `count_update` events.
//!
//! Clients connect to `GET /ws`. Each one immediately receives the
//! current snapshot, then one frame per detected change. Frames are
//! JSON [`CountUpdate`] envelopes.
//!
//! A failed send ends only that client's task; other clients keep
//! their own receivers.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use headcount_types::{CountUpdate, Snapshot};
use tracing::{debug, info, warn};

use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming snapshot updates.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_count(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Outcome of pushing one frame to a client.
enum Delivery {
    Sent,
    Gone,
}

/// Send a snapshot as a `count_update` text frame.
async fn push_snapshot(socket: &mut WebSocket, snapshot: Snapshot) -> Delivery {
    let json = match CountUpdate::new(snapshot).to_json() {
        Ok(json) => json,
        Err(e) => {
            // Nothing sent, but the connection is still usable.
            warn!("Failed to serialize count update: {e}");
            return Delivery::Sent;
        }
    };

    if socket.send(Message::Text(json.into())).await.is_err() {
        Delivery::Gone
    } else {
        Delivery::Sent
    }
}

/// Handle the `WebSocket` lifecycle: push the current snapshot, then
/// forward each broadcast until either side goes away.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let mut subscription = state.broadcaster.on_connect().await;
    let client_id = subscription.client_id();
    info!(
        %client_id,
        clients = state.broadcaster.client_count(),
        "Client connected"
    );

    let initial = subscription.initial().clone();
    if matches!(push_snapshot(&mut socket, initial).await, Delivery::Sent) {
        loop {
            tokio::select! {
                update = subscription.next() => {
                    let Some(snapshot) = update else {
                        debug!(%client_id, "Broadcast channel closed, shutting down WebSocket");
                        break;
                    };
                    if matches!(push_snapshot(&mut socket, snapshot).await, Delivery::Gone) {
                        debug!(%client_id, "Send failed");
                        break;
                    }
                }
                msg = socket.recv() => {
                    match msg {
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Ok(Message::Ping(data))) => {
                            if socket.send(Message::Pong(data)).await.is_err() {
                                break;
                            }
                        }
                        Some(Err(e)) => {
                            debug!(%client_id, "WebSocket error: {e}");
                            break;
                        }
                        _ => {
                            // Clients have nothing to say; ignore text and binary frames.
                        }
                    }
                }
            }
        }
    }

    state.broadcaster.on_disconnect(subscription);
    info!(
        %client_id,
        clients = state.broadcaster.client_count(),
        "Client disconnected"
    );
}
