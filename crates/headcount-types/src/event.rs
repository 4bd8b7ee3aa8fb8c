//! Real-time event envelope.
//!
//! Every frame pushed over the WebSocket is a [`CountUpdate`] encoded as
//! `{"event": "count_update", "data": { ...snapshot... }}` so the
//! dashboard can dispatch on the event name.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::snapshot::Snapshot;

/// Name of the event carrying a snapshot.
pub const COUNT_UPDATE_EVENT: &str = "count_update";

/// A `count_update` event carrying the full snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CountUpdate {
    /// Event name, always [`COUNT_UPDATE_EVENT`].
    pub event: String,
    /// The snapshot payload, same shape as `GET /api/count`.
    pub data: Snapshot,
}

impl CountUpdate {
    /// Wrap a snapshot in a `count_update` envelope.
    pub fn new(data: Snapshot) -> Self {
        Self {
            event: String::from(COUNT_UPDATE_EVENT),
            data,
        }
    }

    /// Encode as a JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error if encoding fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
