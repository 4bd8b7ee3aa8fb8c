//! In-memory holder of the current snapshot.

use std::sync::Arc;

use headcount_types::Snapshot;
use tokio::sync::RwLock;

/// Single-writer, multi-reader handle to the current [`Snapshot`].
///
/// Cloning the store clones the handle, not the snapshot. Writes
/// replace the whole value, so a reader never observes a partially
/// updated snapshot.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    inner: Arc<RwLock<Snapshot>>,
}

impl SnapshotStore {
    /// Create a store holding the zeroed initial snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with `snapshot`.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(snapshot)),
        }
    }

    /// A copy of the current snapshot.
    pub async fn get(&self) -> Snapshot {
        self.inner.read().await.clone()
    }

    /// Replace the current snapshot.
    pub async fn replace(&self, snapshot: Snapshot) {
        *self.inner.write().await = snapshot;
    }
}
