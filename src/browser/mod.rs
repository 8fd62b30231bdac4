//! Browser infrastructure for launching and tearing down Chrome instances
//!
//! Every render gets its own browser; nothing here is shared between calls.

mod wrapper;

pub use wrapper::{BrowserWrapper, create_blank_page, launch_isolated_browser};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Failed to find browser executable: {0}")]
    NotFound(String),

    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("Failed to create page: {0}")]
    PageCreationFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),
}

pub type BrowserResult<T> = Result<T, BrowserError>;
