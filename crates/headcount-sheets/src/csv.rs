//! CSV decoding for spreadsheet exports.
//!
//! Handles quoted fields, doubled-quote escapes, embedded newlines and
//! CRLF or LF line endings. The first non-blank line of an export is
//! the sheet's header row and is not returned.

use std::mem::take;

use crate::error::FetchError;
use crate::fetch::Row;

/// Decode an export payload into data rows.
///
/// Cells are trimmed, rows that are empty in every column are dropped,
/// and the header row is consumed.
///
/// # Errors
///
/// Returns [`FetchError::Parse`] if a quoted field is never closed.
pub fn decode_rows(text: &str) -> Result<Vec<Row>, FetchError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let records = parse_records(text)?;

    Ok(records
        .into_iter()
        .map(|record| record.iter().map(|cell| cell.trim().to_owned()).collect::<Row>())
        .filter(|row| row.iter().any(|cell| !cell.is_empty()))
        .skip(1)
        .collect())
}

/// Split CSV text into raw records.
fn parse_records(text: &str) -> Result<Vec<Row>, FetchError> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.next_if_eq(&'"').is_some() {
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => record.push(take(&mut field)),
            '\r' | '\n' if !in_quotes => {
                if ch == '\r' {
                    let _ = chars.next_if_eq(&'\n');
                }
                record.push(take(&mut field));
                records.push(take(&mut record));
            }
            _ => field.push(ch),
        }
    }

    if in_quotes {
        return Err(FetchError::Parse(String::from("unterminated quoted field")));
    }

    // Trailing record without a final newline.
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    Ok(records)
}
