use thiserror::Error;

use crate::browser::BrowserError;

/// Errors produced by either fetch path
///
/// The rendered `Display` text is what callers see in a failed
/// [`PipelineOutcome`](crate::PipelineOutcome); it is not meant to be matched on.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request timed out after {timeout_ms}ms: {message}")]
    Timeout { timeout_ms: u64, message: String },

    #[error("network failure: {0}")]
    Network(String),

    #[error("HTTP status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("invalid request URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("browser launch failure: {0}")]
    BrowserLaunch(String),

    #[error("navigation timeout after {timeout_ms}ms for URL: {url}")]
    NavigationTimeout { timeout_ms: u64, url: String },

    #[error("render failure: {0}")]
    Render(String),
}

impl From<BrowserError> for FetchError {
    fn from(err: BrowserError) -> Self {
        match err {
            BrowserError::NotFound(_) | BrowserError::LaunchFailed(_) => {
                FetchError::BrowserLaunch(err.to_string())
            }
            other => FetchError::Render(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return FetchError::Status {
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            };
        }
        FetchError::Network(err.to_string())
    }
}

/// Errors raised while assembling a [`ScrapeConfig`](crate::ScrapeConfig)
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {message}")]
    Io { path: String, message: String },

    #[error("invalid YAML in {path}: {message}")]
    Yaml { path: String, message: String },

    #[error("{name} must be between 1 and {max_ms}ms. Received: {received_ms}ms")]
    InvalidTimeout {
        name: &'static str,
        max_ms: u64,
        received_ms: u64,
    },

    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}
