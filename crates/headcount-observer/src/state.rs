//! Shared application state for the dashboard server.
//!
//! [`AppState`] bundles the snapshot store and the broadcaster. The
//! poller writes through the same handles the HTTP layer reads from.

use crate::broadcast::Broadcaster;
use crate::store::SnapshotStore;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`](std::sync::Arc) and injected via Axum's `State`
/// extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The current snapshot.
    pub store: SnapshotStore,
    /// Fan-out to connected `WebSocket` clients.
    pub broadcaster: Broadcaster,
}

impl AppState {
    /// Create application state around an existing store.
    pub fn new(store: SnapshotStore) -> Self {
        let broadcaster = Broadcaster::new(store.clone());
        Self { store, broadcaster }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(SnapshotStore::new())
    }
}
