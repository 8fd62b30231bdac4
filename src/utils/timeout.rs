//! Timeout validation utilities for fetch operations

use std::time::Duration;

use super::errors::ConfigError;

/// Maximum timeout for the static HTTP fetch (2 minutes)
pub const MAX_FETCH_TIMEOUT_MS: u64 = 120_000;

/// Maximum timeout for browser navigation + network idle (5 minutes)
/// Covers slow-loading sites, heavy SPAs, and network delays
pub const MAX_NAVIGATION_TIMEOUT_MS: u64 = 300_000;

/// Validate timeout for the static document fetch
///
/// # Arguments
/// * `timeout_ms` - Optional timeout in milliseconds
/// * `default_ms` - Default timeout if None provided
///
/// # Example
/// ```rust
/// use kodegen_tools_metascrape::utils::validate_fetch_timeout;
///
/// let timeout = validate_fetch_timeout(Some(5_000), 15_000).unwrap();
/// assert_eq!(timeout.as_secs(), 5);
/// ```
pub fn validate_fetch_timeout(
    timeout_ms: Option<u64>,
    default_ms: u64,
) -> Result<Duration, ConfigError> {
    validate("fetch timeout", timeout_ms.unwrap_or(default_ms), MAX_FETCH_TIMEOUT_MS)
}

/// Validate timeout for render navigation (goto + network idle wait)
pub fn validate_navigation_timeout(
    timeout_ms: Option<u64>,
    default_ms: u64,
) -> Result<Duration, ConfigError> {
    validate(
        "render timeout",
        timeout_ms.unwrap_or(default_ms),
        MAX_NAVIGATION_TIMEOUT_MS,
    )
}

fn validate(name: &'static str, ms: u64, max_ms: u64) -> Result<Duration, ConfigError> {
    if ms == 0 || ms > max_ms {
        return Err(ConfigError::InvalidTimeout {
            name,
            max_ms,
            received_ms: ms,
        });
    }
    Ok(Duration::from_millis(ms))
}
