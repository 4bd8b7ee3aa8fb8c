//! Error types for the headcount engine binary.
//!
//! [`EngineError`] is the top-level error that `main` propagates. None
//! of these occur once the poll loop is running: poll failures are
//! logged and retried, never returned.

use headcount_observer::ServerError;
use headcount_sheets::FetchError;

use crate::config::ConfigError;

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The sheet fetcher could not be constructed.
    #[error("fetcher error: {source}")]
    Fetcher {
        /// The underlying fetch error.
        #[from]
        source: FetchError,
    },

    /// The dashboard server failed to start or stopped with an error.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: ServerError,
    },
}
