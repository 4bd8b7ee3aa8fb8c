//! Configuration loading and typed config structures.
//!
//! Configuration comes from an optional YAML file
//! (`headcount-config.yaml`, or the path in `HEADCOUNT_CONFIG`) with
//! every field defaulted, then environment variables override it:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `SHEET_URL` | `sheet.url` |
//! | `SHEET_TAB` | `sheet.tab` (empty means the first tab) |
//! | `SHEET_EXPORT_BASE` | `sheet.export_base` |
//! | `POLL_INTERVAL_SECS` | `poll.interval_secs` |
//! | `FETCH_TIMEOUT_SECS` | `poll.fetch_timeout_secs` |
//! | `HOST` / `PORT` | `server.host` / `server.port` |
//! | `SECRET_KEY` | `server.secret_key` |

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use tracing::info;

/// Default config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "headcount-config.yaml";

/// Spreadsheet polled when none is configured.
pub const DEFAULT_SHEET_URL: &str = "https://docs.google.com/spreadsheets/d/1DNcOHB334c9H2QZ24CsGasgam4sj-WkpPOgvyn4yPzg/edit?usp=sharing";

/// Tab polled when none is configured.
pub const DEFAULT_SHEET_TAB: &str = "LIVE COUNT";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override could not be parsed.
    #[error("invalid {name}: {message}")]
    Env {
        /// The environment variable name.
        name: &'static str,
        /// Why the value was rejected.
        message: String,
    },

    /// The merged configuration is unusable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Which spreadsheet and tab to poll.
    #[serde(default)]
    pub sheet: SheetConfig,

    /// Polling cadence.
    #[serde(default)]
    pub poll: PollConfig,

    /// HTTP bind settings.
    #[serde(default)]
    pub server: ServerSection,
}

/// Spreadsheet source settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    /// Sharing URL of the spreadsheet.
    pub url: String,
    /// Tab to export; `None` exports the first tab.
    pub tab: Option<String>,
    /// Export host, overridable for testing against a local server.
    pub export_base: String,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            url: String::from(DEFAULT_SHEET_URL),
            tab: Some(String::from(DEFAULT_SHEET_TAB)),
            export_base: String::from(headcount_sheets::fetch::DEFAULT_EXPORT_BASE),
        }
    }
}

/// Poll loop settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Seconds to sleep after each cycle finishes.
    pub interval_secs: u64,
    /// Per-request timeout in seconds; `None` leaves fetches unbounded.
    pub fetch_timeout_secs: Option<u64>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            fetch_timeout_secs: None,
        }
    }
}

impl PollConfig {
    /// Sleep between cycles.
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Per-request fetch timeout, if any.
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_secs.map(Duration::from_secs)
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Signing secret, normally supplied through `SECRET_KEY`.
    pub secret_key: Option<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 5000,
            secret_key: None,
        }
    }
}

impl ServerSection {
    /// Whether a non-empty secret key is configured.
    ///
    /// There is no built-in development key to fall back on; the engine
    /// warns at startup when this is false.
    pub fn has_secret_key(&self) -> bool {
        self.secret_key.as_deref().is_some_and(|key| !key.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl EngineConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Apply environment overrides read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] if a numeric variable does not parse.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("SHEET_URL") {
            self.sheet.url = url;
        }
        if let Some(tab) = lookup("SHEET_TAB") {
            self.sheet.tab = Some(tab).filter(|t| !t.is_empty());
        }
        if let Some(base) = lookup("SHEET_EXPORT_BASE") {
            self.sheet.export_base = base;
        }
        if let Some(value) = lookup("POLL_INTERVAL_SECS") {
            self.poll.interval_secs = parse_env("POLL_INTERVAL_SECS", &value)?;
        }
        if let Some(value) = lookup("FETCH_TIMEOUT_SECS") {
            self.poll.fetch_timeout_secs = Some(parse_env("FETCH_TIMEOUT_SECS", &value)?);
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(value) = lookup("PORT") {
            self.server.port = parse_env("PORT", &value)?;
        }
        if let Some(secret) = lookup("SECRET_KEY") {
            self.server.secret_key = Some(secret);
        }
        Ok(())
    }

    /// Reject configurations the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for an empty sheet URL or a
    /// zero poll interval.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sheet.url.trim().is_empty() {
            return Err(ConfigError::Invalid(String::from("sheet.url is empty")));
        }
        if self.poll.interval_secs == 0 {
            return Err(ConfigError::Invalid(String::from(
                "poll.interval_secs must be at least 1",
            )));
        }
        Ok(())
    }
}

/// Parse an environment value.
fn parse_env<T>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Env {
        name,
        message: format!("{value:?}: {e}"),
    })
}

/// Load configuration from the default file (if present) and the
/// process environment.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file is unreadable or malformed, an
/// override does not parse, or validation fails.
pub fn load() -> Result<EngineConfig, ConfigError> {
    let path = std::env::var("HEADCOUNT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());
    let path = Path::new(&path);

    let mut config = if path.exists() {
        info!(path = %path.display(), "Loading config file");
        EngineConfig::from_file(path)?
    } else {
        info!(path = %path.display(), "Config file not found, using defaults");
        EngineConfig::default()
    };

    config.apply_env_overrides(|name| std::env::var(name).ok())?;
    config.validate()?;
    Ok(config)
}
