//! Error types for spreadsheet fetching.
//!
//! Cell-level malformation is never an error: the extractor coerces it
//! to defaults. Only failures to obtain rows at all surface here.

/// Errors that can occur while fetching a sheet export.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(String),

    /// The request failed at the transport level.
    #[error("request to {url} failed: {message}")]
    Request {
        /// The export URL that was requested.
        url: String,
        /// Description of the transport failure.
        message: String,
    },

    /// The export endpoint answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status {
        /// The export URL that was requested.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The payload could not be interpreted as rows.
    #[error("unparsable tabular payload: {0}")]
    Parse(String),
}
