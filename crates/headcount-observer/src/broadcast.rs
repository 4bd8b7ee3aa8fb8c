//! Fan-out of snapshot changes to connected real-time clients.
//!
//! [`Broadcaster::emit`] publishes a snapshot to every subscriber.
//! [`Broadcaster::on_connect`] registers a client and hands back the
//! current snapshot for its initial push. Delivery is best effort: a
//! client that falls behind skips to the newest snapshot, and a client
//! that disconnects only affects its own task.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use headcount_types::Snapshot;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::debug;
use uuid::Uuid;

use crate::store::SnapshotStore;

/// Capacity of the broadcast channel for snapshot updates.
///
/// Only the newest snapshot matters to a client, so a receiver that
/// falls behind by more than this simply skips ahead.
const BROADCAST_CAPACITY: usize = 64;

/// Pushes snapshots to all connected clients.
#[derive(Debug, Clone)]
pub struct Broadcaster {
    tx: broadcast::Sender<Snapshot>,
    store: SnapshotStore,
    clients: Arc<AtomicUsize>,
}

impl Broadcaster {
    /// Create a broadcaster that serves initial pushes from `store`.
    pub fn new(store: SnapshotStore) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            tx,
            store,
            clients: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Publish a snapshot to every connected client.
    ///
    /// Returns the number of receivers that got the message, 0 when no
    /// client is connected.
    pub fn emit(&self, snapshot: &Snapshot) -> usize {
        // send only errors when there are no receivers.
        self.tx.send(snapshot.clone()).unwrap_or(0)
    }

    /// Register a new client.
    ///
    /// The returned [`Subscription`] carries the current snapshot for
    /// the initial push. The receiver is created before the store is
    /// read, so a change landing in between is delivered rather than
    /// lost.
    pub async fn on_connect(&self) -> Subscription {
        let receiver = self.tx.subscribe();
        let initial = self.store.get().await;
        self.clients.fetch_add(1, Ordering::Relaxed);

        Subscription {
            client_id: Uuid::new_v4(),
            delivered: initial.clone(),
            initial,
            receiver,
        }
    }

    /// Release a client's subscription.
    pub fn on_disconnect(&self, subscription: Subscription) {
        self.clients.fetch_sub(1, Ordering::Relaxed);
        debug!(client_id = %subscription.client_id, "Subscription released");
    }

    /// Number of currently connected clients.
    pub fn client_count(&self) -> usize {
        self.clients.load(Ordering::Relaxed)
    }
}

/// A connected client's view of the update stream.
#[derive(Debug)]
pub struct Subscription {
    client_id: Uuid,
    initial: Snapshot,
    /// Last snapshot handed to the client, starting with `initial`.
    delivered: Snapshot,
    receiver: broadcast::Receiver<Snapshot>,
}

impl Subscription {
    /// Identifier used in connection logs.
    pub const fn client_id(&self) -> Uuid {
        self.client_id
    }

    /// The snapshot current at connect time.
    pub const fn initial(&self) -> &Snapshot {
        &self.initial
    }

    /// Wait for the next snapshot the client has not seen yet.
    ///
    /// Anything already queued behind it is coalesced so the newest
    /// snapshot wins. A broadcast equal to the last delivered snapshot
    /// is skipped: a client connecting between a store replace and its
    /// emit already got that snapshot as `initial`. Returns `None` once
    /// the broadcaster is gone. Cancel-safe.
    pub async fn next(&mut self) -> Option<Snapshot> {
        loop {
            let latest = self.recv_latest().await?;
            if latest == self.delivered {
                debug!(client_id = %self.client_id, "Skipping already delivered snapshot");
                continue;
            }
            self.delivered.clone_from(&latest);
            return Some(latest);
        }
    }

    /// Receive the newest queued snapshot.
    async fn recv_latest(&mut self) -> Option<Snapshot> {
        let mut latest = loop {
            match self.receiver.recv().await {
                Ok(snapshot) => break snapshot,
                Err(RecvError::Lagged(skipped)) => {
                    debug!(client_id = %self.client_id, skipped, "Client lagged, skipping ahead");
                }
                Err(RecvError::Closed) => return None,
            }
        };

        loop {
            match self.receiver.try_recv() {
                Ok(snapshot) => latest = snapshot,
                Err(TryRecvError::Lagged(_)) => {}
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }

        Some(latest)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::time::Duration;

    use headcount_types::DepartmentCount;

    use super::*;

    fn snapshot(total: u64) -> Snapshot {
        Snapshot {
            departments: vec![DepartmentCount {
                department: String::from("Engineering"),
                male_count: total,
                female_count: 0,
                total_count: total,
            }],
            total_alumni: total,
            male_count: total,
            female_count: 0,
            last_updated: Some(String::from("2024-01-01 12:00:00")),
        }
    }

    #[test]
    fn emit_without_clients_reaches_nobody() {
        let broadcaster = Broadcaster::new(SnapshotStore::new());
        assert_eq!(broadcaster.emit(&snapshot(1)), 0);
    }

    #[tokio::test]
    async fn on_connect_returns_current_snapshot() {
        let store = SnapshotStore::with_snapshot(snapshot(42));
        let broadcaster = Broadcaster::new(store);

        let sub = broadcaster.on_connect().await;
        assert_eq!(sub.initial(), &snapshot(42));
        assert_eq!(broadcaster.client_count(), 1);
    }

    #[tokio::test]
    async fn emit_reaches_every_subscriber() {
        let broadcaster = Broadcaster::new(SnapshotStore::new());
        let mut a = broadcaster.on_connect().await;
        let mut b = broadcaster.on_connect().await;
        assert_ne!(a.client_id(), b.client_id());

        assert_eq!(broadcaster.emit(&snapshot(7)), 2);
        assert_eq!(a.next().await.unwrap(), snapshot(7));
        assert_eq!(b.next().await.unwrap(), snapshot(7));
    }

    #[tokio::test]
    async fn no_update_without_emit() {
        let broadcaster = Broadcaster::new(SnapshotStore::new());
        let mut sub = broadcaster.on_connect().await;
        let waited = tokio::time::timeout(Duration::from_millis(50), sub.next()).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn lagging_client_gets_newest_snapshot() {
        let broadcaster = Broadcaster::new(SnapshotStore::new());
        let mut sub = broadcaster.on_connect().await;

        for total in 0..100 {
            broadcaster.emit(&snapshot(total));
        }

        assert_eq!(sub.next().await.unwrap(), snapshot(99));
    }

    #[tokio::test]
    async fn disconnect_releases_client() {
        let broadcaster = Broadcaster::new(SnapshotStore::new());
        let sub = broadcaster.on_connect().await;
        let mut other = broadcaster.on_connect().await;
        assert_eq!(broadcaster.client_count(), 2);

        broadcaster.on_disconnect(sub);
        assert_eq!(broadcaster.client_count(), 1);

        // Remaining clients are unaffected.
        assert_eq!(broadcaster.emit(&snapshot(3)), 1);
        assert_eq!(other.next().await.unwrap(), snapshot(3));
    }

    #[tokio::test]
    async fn client_connecting_before_emit_gets_snapshot_once() {
        let store = SnapshotStore::new();
        let broadcaster = Broadcaster::new(store.clone());

        // Poller replaces the store, a client connects, then the emit lands.
        store.replace(snapshot(5)).await;
        let mut sub = broadcaster.on_connect().await;
        assert_eq!(broadcaster.emit(&snapshot(5)), 1);

        assert_eq!(sub.initial(), &snapshot(5));
        let waited = tokio::time::timeout(Duration::from_millis(50), sub.next()).await;
        assert!(waited.is_err());

        // Later changes still arrive.
        broadcaster.emit(&snapshot(6));
        assert_eq!(sub.next().await.unwrap(), snapshot(6));
    }

    #[tokio::test]
    async fn repeated_emit_of_delivered_snapshot_is_skipped() {
        let broadcaster = Broadcaster::new(SnapshotStore::new());
        let mut sub = broadcaster.on_connect().await;

        broadcaster.emit(&snapshot(1));
        assert_eq!(sub.next().await.unwrap(), snapshot(1));

        broadcaster.emit(&snapshot(1));
        let waited = tokio::time::timeout(Duration::from_millis(50), sub.next()).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn closed_channel_ends_subscription() {
        let broadcaster = Broadcaster::new(SnapshotStore::new());
        let mut sub = broadcaster.on_connect().await;
        drop(broadcaster);
        assert!(sub.next().await.is_none());
    }
}
