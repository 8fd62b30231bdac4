// Shared utility modules - no feature gating
pub mod constants;
mod errors;
mod timeout;

pub use errors::{ConfigError, FetchError};
pub use timeout::{
    MAX_FETCH_TIMEOUT_MS, MAX_NAVIGATION_TIMEOUT_MS, validate_fetch_timeout,
    validate_navigation_timeout,
};
