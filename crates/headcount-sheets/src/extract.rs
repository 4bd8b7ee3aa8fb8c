//! Count extraction from sheet rows.
//!
//! The sheet lists one department per row: name, male, female, total.
//! Near the bottom it may carry an overall row whose values are
//! authoritative. Cells are coerced rather than rejected: anything that
//! is not a plain run of ASCII digits counts as 0. Signs, decimal
//! points and thousands separators all fall in that bucket.

use chrono::{Local, NaiveDateTime};
use headcount_types::{DepartmentCount, Snapshot, TIMESTAMP_FORMAT};
use tracing::debug;

use crate::fetch::Row;

/// Number of leading rows scanned for departments.
pub const DEPARTMENT_WINDOW: usize = 21;

/// The overall-row search only runs when the sheet has more rows than this.
pub const OVERALL_SEARCH_THRESHOLD: usize = 19;

/// Number of trailing rows searched for an overall row.
pub const OVERALL_SEARCH_WINDOW: usize = 5;

/// Case-insensitive markers identifying an overall row by its first cell.
const OVERALL_MARKERS: [&str; 2] = ["total", "overall"];

const MALE_COLUMN: usize = 1;
const FEMALE_COLUMN: usize = 2;
const TOTAL_COLUMN: usize = 3;

/// Parse a count cell.
///
/// Returns `Some` only for a present, non-empty cell made entirely of
/// ASCII digits whose value fits in a `u64`.
pub fn parse_count(cell: Option<&str>) -> Option<u64> {
    let cell = cell?;
    if cell.is_empty() || !cell.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    cell.parse().ok()
}

/// The count in `column` of `row`, or 0 when absent or malformed.
fn count_at(row: &[String], column: usize) -> u64 {
    parse_count(row.get(column).map(String::as_str)).unwrap_or(0)
}

/// Male, female and total columns of a row.
fn counts_of(row: &[String]) -> (u64, u64, u64) {
    (
        count_at(row, MALE_COLUMN),
        count_at(row, FEMALE_COLUMN),
        count_at(row, TOTAL_COLUMN),
    )
}

/// Whether the first cell marks an overall row.
fn is_overall_row(row: &[String]) -> bool {
    row.first().is_some_and(|name| {
        let name = name.to_lowercase();
        OVERALL_MARKERS.iter().any(|marker| name.contains(marker))
    })
}

/// Find the first overall row among the trailing rows, if the sheet is
/// long enough to have one.
fn find_overall_row(rows: &[Row]) -> Option<&Row> {
    if rows.len() <= OVERALL_SEARCH_THRESHOLD {
        return None;
    }
    let start = rows.len().saturating_sub(OVERALL_SEARCH_WINDOW);
    rows.iter().skip(start).find(|row| is_overall_row(row))
}

/// Extract a snapshot stamped with the current local time.
pub fn extract(rows: &[Row]) -> Snapshot {
    extract_at(rows, Local::now().naive_local())
}

/// Extract a snapshot stamped with `now`.
///
/// Departments come from the first [`DEPARTMENT_WINDOW`] rows with a
/// non-empty name, in row order, and their counts are summed. If an
/// overall row is found its counts replace those sums, even where they
/// are smaller.
pub fn extract_at(rows: &[Row], now: NaiveDateTime) -> Snapshot {
    let mut departments = Vec::new();
    let mut male_sum: u64 = 0;
    let mut female_sum: u64 = 0;
    let mut total_sum: u64 = 0;

    for row in rows.iter().take(DEPARTMENT_WINDOW) {
        let Some(name) = row.first().filter(|name| !name.is_empty()) else {
            continue;
        };

        let (male_count, female_count, total_count) = counts_of(row);
        male_sum = male_sum.saturating_add(male_count);
        female_sum = female_sum.saturating_add(female_count);
        total_sum = total_sum.saturating_add(total_count);

        departments.push(DepartmentCount {
            department: name.clone(),
            male_count,
            female_count,
            total_count,
        });
    }

    let (male_count, female_count, total_alumni) = match find_overall_row(rows) {
        Some(overall) => {
            let counts = counts_of(overall);
            debug!(
                label = overall.first().map_or("", String::as_str),
                male = counts.0,
                female = counts.1,
                total = counts.2,
                "Overall row overrides department sums"
            );
            counts
        }
        None => (male_sum, female_sum, total_sum),
    };

    Snapshot {
        departments,
        total_alumni,
        male_count,
        female_count,
        last_updated: Some(now.format(TIMESTAMP_FORMAT).to_string()),
    }
}
