//! Spreadsheet export fetching.
//!
//! A spreadsheet is addressed by its sharing URL. [`sheet_id_from_url`]
//! pulls the document id out of it, [`SheetFetcher::export_url`] turns
//! the id plus an optional tab name into a CSV export endpoint, and
//! [`SheetFetcher::fetch`] downloads and decodes it.
//!
//! All fetch failures are returned, never panicked on. The poller logs
//! them and tries again on its next cycle.

use std::fmt::Write as _;
use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::csv::decode_rows;
use crate::error::FetchError;

/// Export host used when none is configured.
pub const DEFAULT_EXPORT_BASE: &str = "https://docs.google.com";

/// One row of raw cell values, in column order.
pub type Row = Vec<String>;

// ---------------------------------------------------------------------------
// Row source seam
// ---------------------------------------------------------------------------

/// A source of raw sheet rows, polled once per cycle.
///
/// [`SheetSource`] is the production implementation; tests supply
/// scripted rows instead.
pub trait RowSource {
    /// Fetch the current rows.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the rows could not be obtained.
    fn fetch_rows(&self) -> impl Future<Output = Result<Vec<Row>, FetchError>> + Send;
}

// ---------------------------------------------------------------------------
// URL handling
// ---------------------------------------------------------------------------

/// Extract the document id from a spreadsheet URL.
///
/// Takes the path segment following `/d/`. Without that marker, falls
/// back to the second-to-last `/`-separated segment, and a string with
/// no `/` at all is taken as the id itself.
pub fn sheet_id_from_url(url: &str) -> &str {
    if let Some((_, rest)) = url.split_once("/d/") {
        return rest.split(['/', '?', '#']).next().unwrap_or(rest);
    }

    let mut segments = url.rsplit('/');
    let _last = segments.next();
    segments.next().unwrap_or(url)
}

/// Percent-encode a tab name for use in a query string.
///
/// ASCII alphanumerics and `-._~/` pass through; every other byte is
/// written as `%XX`.
fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~' | b'/') {
            out.push(char::from(byte));
        } else {
            let _ = write!(out, "%{byte:02X}");
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Fetcher
// ---------------------------------------------------------------------------

/// Downloads spreadsheet tabs as CSV.
///
/// Holds one [`reqwest::Client`] for the life of the process so
/// connections are pooled across poll cycles.
#[derive(Debug, Clone)]
pub struct SheetFetcher {
    client: reqwest::Client,
    export_base: String,
}

impl SheetFetcher {
    /// Create a fetcher against the given export host.
    ///
    /// `timeout` bounds each request; `None` keeps the client default
    /// (no timeout).
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] if the HTTP client cannot be built.
    pub fn new(export_base: &str, timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            export_base: export_base.trim_end_matches('/').to_owned(),
        })
    }

    /// Resolve the CSV export endpoint for a spreadsheet and tab.
    ///
    /// A named tab goes through the `gviz` query endpoint; without one
    /// the first tab is exported.
    pub fn export_url(&self, resource_url: &str, tab_name: Option<&str>) -> String {
        let sheet_id = sheet_id_from_url(resource_url);
        match tab_name {
            Some(tab) => format!(
                "{}/spreadsheets/d/{sheet_id}/gviz/tq?tqx=out:csv&sheet={}",
                self.export_base,
                percent_encode(tab)
            ),
            None => format!(
                "{}/spreadsheets/d/{sheet_id}/export?format=csv",
                self.export_base
            ),
        }
    }

    /// Fetch a tab of the spreadsheet as data rows.
    ///
    /// The header row is consumed and entirely empty rows are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Request`] on transport failure,
    /// [`FetchError::Status`] on a non-2xx response, and
    /// [`FetchError::Parse`] if the body is not decodable CSV.
    pub async fn fetch(
        &self,
        resource_url: &str,
        tab_name: Option<&str>,
    ) -> Result<Vec<Row>, FetchError> {
        let url = self.export_url(resource_url, tab_name);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Request {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| FetchError::Request {
            url: url.clone(),
            message: e.to_string(),
        })?;
        let text = std::str::from_utf8(&bytes)
            .map_err(|e| FetchError::Parse(format!("payload is not UTF-8: {e}")))?;

        let rows = decode_rows(text)?;
        debug!(url, rows = rows.len(), "Sheet export fetched");
        Ok(rows)
    }
}

/// A configured spreadsheet tab polled through a [`SheetFetcher`].
#[derive(Debug, Clone)]
pub struct SheetSource {
    fetcher: SheetFetcher,
    resource_url: String,
    tab_name: Option<String>,
}

impl SheetSource {
    /// Bind a fetcher to one spreadsheet URL and optional tab.
    pub const fn new(fetcher: SheetFetcher, resource_url: String, tab_name: Option<String>) -> Self {
        Self {
            fetcher,
            resource_url,
            tab_name,
        }
    }

    /// The export endpoint this source polls.
    pub fn export_url(&self) -> String {
        self.fetcher
            .export_url(&self.resource_url, self.tab_name.as_deref())
    }
}

impl RowSource for SheetSource {
    fn fetch_rows(&self) -> impl Future<Output = Result<Vec<Row>, FetchError>> + Send {
        self.fetcher
            .fetch(&self.resource_url, self.tab_name.as_deref())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    const SHARE_URL: &str = "https://docs.google.com/spreadsheets/d/1DNcOHB334c9H2QZ24CsGasgam4sj-WkpPOgvyn4yPzg/edit?usp=sharing";

    #[test]
    fn sheet_id_after_d_marker() {
        assert_eq!(
            sheet_id_from_url(SHARE_URL),
            "1DNcOHB334c9H2QZ24CsGasgam4sj-WkpPOgvyn4yPzg"
        );
        assert_eq!(
            sheet_id_from_url("https://docs.google.com/spreadsheets/d/abc123"),
            "abc123"
        );
        assert_eq!(
            sheet_id_from_url("https://docs.google.com/spreadsheets/d/abc123?usp=sharing"),
            "abc123"
        );
    }

    #[test]
    fn sheet_id_falls_back_to_second_to_last_segment() {
        assert_eq!(sheet_id_from_url("https://example.com/sheets/xyz/view"), "xyz");
        assert_eq!(sheet_id_from_url("plain-id"), "plain-id");
    }

    #[test]
    fn percent_encoding_of_tab_names() {
        assert_eq!(percent_encode("LIVE COUNT"), "LIVE%20COUNT");
        assert_eq!(percent_encode("Sheet1"), "Sheet1");
        assert_eq!(percent_encode("a&b=c"), "a%26b%3Dc");
        assert_eq!(percent_encode("é"), "%C3%A9");
        assert_eq!(percent_encode("x-y_z.~/"), "x-y_z.~/");
    }

    #[test]
    fn export_url_for_named_tab() {
        let fetcher = SheetFetcher::new(DEFAULT_EXPORT_BASE, None).unwrap();
        assert_eq!(
            fetcher.export_url(SHARE_URL, Some("LIVE COUNT")),
            "https://docs.google.com/spreadsheets/d/1DNcOHB334c9H2QZ24CsGasgam4sj-WkpPOgvyn4yPzg/gviz/tq?tqx=out:csv&sheet=LIVE%20COUNT"
        );
    }

    #[test]
    fn export_url_for_default_tab() {
        let fetcher = SheetFetcher::new("http://127.0.0.1:9/", None).unwrap();
        let source = SheetSource::new(fetcher, String::from(SHARE_URL), None);
        assert_eq!(
            source.export_url(),
            "http://127.0.0.1:9/spreadsheets/d/1DNcOHB334c9H2QZ24CsGasgam4sj-WkpPOgvyn4yPzg/export?format=csv"
        );
    }
}
