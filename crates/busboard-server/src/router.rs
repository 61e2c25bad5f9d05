//! Axum router construction for the busboard server.
//!
//! Assembles the REST route, the `WebSocket` push channel, and the static
//! browser client into a single [`Router`] with CORS and request tracing.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /next-departure` -- current board as a JSON array
/// - `GET /ws` -- `WebSocket` push of the board every push interval
/// - everything else -- files from [`AppState::static_dir`], with
///   `index.html` served for `/`
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let assets = ServeDir::new(&state.static_dir);

    Router::new()
        .route("/next-departure", get(handlers::next_departure))
        .route("/ws", get(ws::ws_departures))
        .fallback_service(assets)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
