//! Headcount snapshot types.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Department name used when the source row carries none.
pub const UNKNOWN_DEPARTMENT: &str = "Unknown";

/// `strftime` format of [`Snapshot::last_updated`].
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---------------------------------------------------------------------------
// DepartmentCount
// ---------------------------------------------------------------------------

/// Alumni counts for a single department row of the source sheet.
///
/// Every count is 0 when its source cell is missing or not a plain
/// run of ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DepartmentCount {
    /// Department name from column 0.
    pub department: String,
    /// Male alumni registered for this department.
    #[ts(type = "number")]
    pub male_count: u64,
    /// Female alumni registered for this department.
    #[ts(type = "number")]
    pub female_count: u64,
    /// Total alumni as reported by the sheet (not recomputed).
    #[ts(type = "number")]
    pub total_count: u64,
}

impl DepartmentCount {
    /// Create a department entry with all counts zeroed.
    pub fn empty(department: impl Into<String>) -> Self {
        Self {
            department: department.into(),
            male_count: 0,
            female_count: 0,
            total_count: 0,
        }
    }
}

impl Default for DepartmentCount {
    fn default() -> Self {
        Self::empty(UNKNOWN_DEPARTMENT)
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// The single current view of alumni counts.
///
/// Created zeroed at process start and replaced as a whole whenever the
/// poller detects a change. `departments` keeps source row order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Snapshot {
    /// Department rows in sheet order.
    pub departments: Vec<DepartmentCount>,
    /// Overall alumni total.
    #[ts(type = "number")]
    pub total_alumni: u64,
    /// Overall male count.
    #[ts(type = "number")]
    pub male_count: u64,
    /// Overall female count.
    #[ts(type = "number")]
    pub female_count: u64,
    /// Local time of the extraction that produced this snapshot,
    /// formatted with [`TIMESTAMP_FORMAT`]. `None` until the first
    /// successful fetch.
    pub last_updated: Option<String>,
}

impl Snapshot {
    /// Whether two snapshots carry the same counts, ignoring
    /// `last_updated`.
    ///
    /// Every extraction stamps a fresh timestamp, so this is the
    /// comparison used for change detection.
    pub fn same_counts(&self, other: &Self) -> bool {
        self.total_alumni == other.total_alumni
            && self.male_count == other.male_count
            && self.female_count == other.female_count
            && self.departments == other.departments
    }

    /// Whether this is the zeroed snapshot held before the first fetch.
    pub const fn is_initial(&self) -> bool {
        self.last_updated.is_none()
    }
}
