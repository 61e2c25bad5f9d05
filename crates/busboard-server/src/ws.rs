//! `WebSocket` push channel for live departure boards.
//!
//! Clients connect to `GET /ws` and receive the full board as a JSON
//! array right away and then once per push interval, until they
//! disconnect. Each connection owns its own ticker, so a slow or failing
//! subscriber never affects the others.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::push::spawn_ticker;
use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` connection and begin pushing
/// departure boards.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_departures(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Handle the `WebSocket` lifecycle: register, forward ticker payloads as
/// text frames, and tear down on disconnect.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let guard = state.subscribers.register();
    let subscriber = guard.id();
    info!(
        subscriber = %subscriber,
        active = state.subscribers.len(),
        "push subscriber connected"
    );

    let (tx, mut rx) = watch::channel(String::new());
    let ticker = spawn_ticker(Arc::clone(&state), subscriber, state.push_interval, tx);

    loop {
        tokio::select! {
            // Newest board from this connection's ticker.
            changed = rx.changed() => {
                if changed.is_err() {
                    debug!(subscriber = %subscriber, "push ticker stopped");
                    break;
                }
                let json = rx.borrow_and_update().clone();
                if socket.send(Message::Text(json.into())).await.is_err() {
                    debug!(subscriber = %subscriber, "WebSocket client disconnected (send failed)");
                    break;
                }
            }
            // Check if the client sent a close frame or disconnected.
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(subscriber = %subscriber, "WebSocket client disconnected");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!(subscriber = %subscriber, "WebSocket client disconnected (pong failed)");
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(subscriber = %subscriber, "WebSocket error: {e}");
                        break;
                    }
                    _ => {
                        // Client text and binary frames carry no meaning.
                    }
                }
            }
        }
    }

    drop(ticker);
    drop(guard);
    info!(
        subscriber = %subscriber,
        active = state.subscribers.len(),
        "push subscriber disconnected"
    );
}
