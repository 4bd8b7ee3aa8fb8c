//! HTTP endpoint handlers for the dashboard server.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Dashboard page |
//! | `GET` | `/api/count` | Current snapshot |
//! | `GET` | `/health` | Liveness plus client count |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::{Html, IntoResponse};
use headcount_types::Snapshot;

use crate::state::AppState;

/// Static dashboard page. Loads `/api/count` once and then follows
/// `count_update` events on `/ws`.
const DASHBOARD_HTML: &str = include_str!("../assets/dashboard.html");

/// Serve the dashboard page.
pub async fn index() -> impl IntoResponse {
    Html(DASHBOARD_HTML)
}

/// Return the current snapshot verbatim.
///
/// # Route
///
/// `GET /api/count`
pub async fn get_count(State(state): State<Arc<AppState>>) -> Json<Snapshot> {
    Json(state.store.get().await)
}

/// Report liveness, connected clients and snapshot age.
///
/// # Route
///
/// `GET /health`
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.store.get().await;
    Json(serde_json::json!({
        "status": "ok",
        "clients": state.broadcaster.client_count(),
        "last_updated": snapshot.last_updated,
    }))
}
