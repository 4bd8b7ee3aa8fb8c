//! Dashboard server for the alumni headcount snapshot.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Dashboard page** (`GET /`) that renders the live counts
//! - **Query endpoint** (`GET /api/count`) returning the current
//!   [`Snapshot`] as JSON
//! - **`WebSocket` endpoint** (`GET /ws`) pushing a `count_update` event
//!   on connect and on every detected change
//! - **Health endpoint** (`GET /health`)
//!
//! # Architecture
//!
//! The poller is the only writer of the [`SnapshotStore`]. Readers
//! always get a complete snapshot because the store is replaced as a
//! whole under a lock. Change notifications flow through the
//! [`Broadcaster`], a [`tokio::sync::broadcast`] fan-out with one
//! receiver per connected client.
//!
//! [`Snapshot`]: headcount_types::Snapshot
//! [`SnapshotStore`]: store::SnapshotStore
//! [`Broadcaster`]: broadcast::Broadcaster

pub mod broadcast;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod store;
pub mod ws;

// Re-export primary types for convenience.
pub use broadcast::{Broadcaster, Subscription};
pub use router::build_router;
pub use server::{ServerConfig, ServerError, serve, start_server};
pub use state::AppState;
pub use store::SnapshotStore;
