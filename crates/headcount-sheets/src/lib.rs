//! Spreadsheet polling inputs for the alumni headcount dashboard.
//!
//! Two leaf components live here:
//!
//! - [`fetch`] -- resolves a spreadsheet URL plus tab name to a CSV
//!   export endpoint and downloads it as rows of raw cells
//! - [`extract`] -- interprets those rows as a [`Snapshot`], coercing
//!   malformed cells to zero instead of failing
//!
//! The poller only sees the [`RowSource`] seam, so tests can feed rows
//! without a network.
//!
//! [`Snapshot`]: headcount_types::Snapshot

pub mod csv;
pub mod error;
pub mod extract;
pub mod fetch;

pub use error::FetchError;
pub use extract::{extract, extract_at, parse_count};
pub use fetch::{Row, RowSource, SheetFetcher, SheetSource, sheet_id_from_url};
