//! Sheet polling loop.
//!
//! Each cycle fetches the sheet, extracts a snapshot and compares it to
//! the stored one. A difference in any count replaces the stored
//! snapshot and broadcasts it once. Failures are logged and the cycle
//! is skipped; the loop itself never ends.
//!
//! The cadence is "sleep after work": the interval is measured from the
//! end of one cycle to the start of the next, so a slow fetch delays
//! everything after it rather than overlapping it.

use std::time::Duration;

use headcount_observer::{Broadcaster, SnapshotStore};
use headcount_sheets::{RowSource, extract};
use headcount_types::Snapshot;
use tracing::{debug, info, warn};

/// What a single poll cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Counts changed; the snapshot was replaced and broadcast.
    Updated {
        /// Number of clients the broadcast reached.
        receivers: usize,
    },
    /// Counts matched the stored snapshot; nothing was broadcast.
    Unchanged,
    /// The fetch returned no rows; the stored snapshot was kept.
    Empty,
    /// The fetch failed; the stored snapshot was kept.
    Failed,
}

/// The background poller. Sole writer of the [`SnapshotStore`].
pub struct PollLoop<S> {
    source: S,
    store: SnapshotStore,
    broadcaster: Broadcaster,
    interval: Duration,
}

impl<S> PollLoop<S>
where
    S: RowSource + Send + Sync,
{
    /// Create a poller that writes to `store` and announces changes on
    /// `broadcaster`.
    pub const fn new(
        source: S,
        store: SnapshotStore,
        broadcaster: Broadcaster,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            store,
            broadcaster,
            interval,
        }
    }

    /// Run one fetch, extract and compare cycle.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let rows = match self.source.fetch_rows().await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "Sheet fetch failed, keeping last snapshot");
                return CycleOutcome::Failed;
            }
        };

        if rows.is_empty() {
            debug!("Sheet returned no rows, keeping last snapshot");
            return CycleOutcome::Empty;
        }

        let next = extract(&rows);
        let current = self.store.get().await;
        if !is_change(&current, &next) {
            debug!(total = next.total_alumni, "Counts unchanged");
            return CycleOutcome::Unchanged;
        }

        self.store.replace(next.clone()).await;
        let receivers = self.broadcaster.emit(&next);

        info!(
            last_updated = next.last_updated.as_deref().unwrap_or_default(),
            total = next.total_alumni,
            male = next.male_count,
            female = next.female_count,
            departments = next.departments.len(),
            receivers,
            "Count data updated"
        );

        CycleOutcome::Updated { receivers }
    }

    /// Poll forever: run a cycle, then sleep for the interval.
    pub async fn run(self) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Poll loop started"
        );

        loop {
            match self.run_cycle().await {
                CycleOutcome::Updated { receivers } => {
                    debug!(receivers, "Poll cycle broadcast update");
                }
                outcome => debug!(?outcome, "Poll cycle finished"),
            }
            tokio::time::sleep(self.interval).await;
        }
    }
}

/// Whether `next` should replace `current`.
///
/// The timestamp is ignored because every extraction refreshes it. The
/// first successful extraction always counts as a change, so
/// `last_updated` is set even when the sheet is all zeros.
fn is_change(current: &Snapshot, next: &Snapshot) -> bool {
    current.is_initial() || !current.same_counts(next)
}
