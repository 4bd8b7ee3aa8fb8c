//! Shared type definitions for the alumni headcount dashboard.
//!
//! These types are the single wire contract between the poller, the
//! query endpoint and the real-time push channel. They flow to
//! `TypeScript` via `ts-rs` for the dashboard page.
//!
//! # Modules
//!
//! - [`snapshot`] -- Per-department counts and the aggregated snapshot
//! - [`event`] -- Real-time event envelope pushed to connected clients

pub mod event;
pub mod snapshot;

pub use event::{COUNT_UPDATE_EVENT, CountUpdate};
pub use snapshot::{DepartmentCount, Snapshot, TIMESTAMP_FORMAT, UNKNOWN_DEPARTMENT};
