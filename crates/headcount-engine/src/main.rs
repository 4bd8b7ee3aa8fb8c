//! Headcount engine binary.
//!
//! Polls the alumni spreadsheet and serves the dashboard. The poll loop
//! runs on its own Tokio task and only touches the request path through
//! the shared snapshot store and broadcaster.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `headcount-config.yaml` and the environment
//! 3. Build the sheet fetcher for the configured spreadsheet and tab
//! 4. Create the snapshot store and broadcaster (zeroed snapshot)
//! 5. Spawn the poll loop
//! 6. Serve HTTP until Ctrl-C, then stop the poll loop
//!
//! Startup never waits for the first fetch to succeed.

mod config;
mod error;
mod poller;

use std::sync::Arc;

use headcount_observer::{AppState, ServerConfig, start_server};
use headcount_sheets::{SheetFetcher, SheetSource};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::poller::PollLoop;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the server cannot
/// bind. Poll failures are never fatal.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("headcount-engine starting");

    // 2. Load configuration.
    let config = config::load()?;
    info!(
        sheet_url = config.sheet.url,
        sheet_tab = config.sheet.tab.as_deref().unwrap_or("<first tab>"),
        poll_interval_secs = config.poll.interval_secs,
        host = config.server.host,
        port = config.server.port,
        "Configuration loaded"
    );
    if !config.server.has_secret_key() {
        warn!("SECRET_KEY is not set; no development default is applied");
    }

    // 3. Build the fetcher.
    let fetcher = SheetFetcher::new(&config.sheet.export_base, config.poll.fetch_timeout())?;
    let source = SheetSource::new(fetcher, config.sheet.url.clone(), config.sheet.tab.clone());
    info!(export_url = source.export_url(), "Sheet source configured");

    // 4. Shared state, zeroed until the first successful poll.
    let state = Arc::new(AppState::default());

    // 5. Spawn the poll loop.
    let poller = PollLoop::new(
        source,
        state.store.clone(),
        state.broadcaster.clone(),
        config.poll.interval(),
    );
    let poll_handle = tokio::spawn(poller.run());

    // 6. Serve until shutdown.
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    let result = start_server(&server_config, state, shutdown_signal()).await;

    poll_handle.abort();
    info!("headcount-engine stopped");

    result.map_err(EngineError::from)
}

/// Resolve on Ctrl-C.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!(error = %e, "Failed to listen for Ctrl-C; running until killed");
            std::future::pending::<()>().await;
        }
    }
}
