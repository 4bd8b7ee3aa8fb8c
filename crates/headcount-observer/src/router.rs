//! Axum router construction for the dashboard server.
//!
//! Assembles all routes (HTTP + `WebSocket`) into a single [`Router`]
//! with CORS enabled for cross-origin dashboard access.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /` -- dashboard page
/// - `GET /api/count` -- current snapshot
/// - `GET /health` -- liveness
/// - `GET /ws` -- `count_update` event stream
///
/// CORS allows any origin, matching the dashboard's public, read-only
/// nature.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/api/count", get(handlers::get_count))
        .route("/health", get(handlers::health))
        .route("/ws", get(ws::ws_count))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
