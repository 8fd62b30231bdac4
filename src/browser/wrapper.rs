//! Browser lifecycle for a single render
//!
//! Launches a chromiumoxide browser with a private profile directory and
//! guarantees the process, handler task and profile are released afterwards.

use chromiumoxide::browser::Browser;
use chromiumoxide::page::Page;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::{BrowserError, BrowserResult};
use crate::BrowserConfig;
use crate::browser_setup::{find_browser_executable, launch_browser};

/// Wrapper for Browser and its event handler task
///
/// Handler MUST be aborted to prevent it running indefinitely after
/// browser is closed. Call [`BrowserWrapper::shutdown`] on every path;
/// `Drop` is only a last resort.
pub struct BrowserWrapper {
    browser: Browser,
    handler: JoinHandle<()>,
    user_data_dir: Option<PathBuf>,
}

impl BrowserWrapper {
    pub(crate) fn new(browser: Browser, handler: JoinHandle<()>, user_data_dir: PathBuf) -> Self {
        Self {
            browser,
            handler,
            user_data_dir: Some(user_data_dir),
        }
    }

    /// Get reference to inner browser
    pub(crate) fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Close the browser, wait for the process to exit, then remove the profile.
    ///
    /// Both `close()` and `wait()` are required: dropping `Browser` alone
    /// leaves a zombie Chrome process. Errors are logged, never returned, so
    /// callers can run this unconditionally after a render.
    pub async fn shutdown(mut self) {
        info!("Shutting down render browser");

        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser cleanly: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            warn!("Failed to wait for browser exit: {}", e);
        }

        self.handler.abort();
        self.cleanup_temp_dir();
    }

    /// Clean up temp directory (blocking operation)
    ///
    /// MUST be called AFTER `browser.wait()` completes to ensure Chrome
    /// has released all file handles. Windows will fail to remove locked files.
    fn cleanup_temp_dir(&mut self) {
        if let Some(path) = self.user_data_dir.take() {
            remove_profile_dir(&path);
        }
    }
}

impl Drop for BrowserWrapper {
    fn drop(&mut self) {
        self.handler.abort();
        // Browser::drop() kills the Chrome process

        if let Some(path) = self.user_data_dir.as_ref() {
            warn!(
                "BrowserWrapper dropped without shutdown(). Temp directory will be orphaned: {}",
                path.display()
            );
        }
    }
}

/// Launch a browser with a unique profile directory
///
/// The directory name carries the process id and a random suffix so
/// concurrent renders never contend for a Chrome profile lock. A missing
/// executable fails before anything is created; `timeout` bounds start-up.
pub async fn launch_isolated_browser(
    config: &BrowserConfig,
    timeout: Duration,
) -> BrowserResult<BrowserWrapper> {
    let executable = find_browser_executable(config)?;

    let user_data_dir = std::env::temp_dir().join(format!(
        "kodegen_metascrape_{}_{}",
        std::process::id(),
        uuid::Uuid::new_v4().simple()
    ));
    std::fs::create_dir_all(&user_data_dir).map_err(|e| {
        BrowserError::LaunchFailed(format!(
            "cannot create profile directory {}: {e}",
            user_data_dir.display()
        ))
    })?;

    match launch_browser(config, executable, &user_data_dir, timeout).await {
        Ok((browser, handler)) => Ok(BrowserWrapper::new(browser, handler, user_data_dir)),
        Err(e) => {
            remove_profile_dir(&user_data_dir);
            Err(BrowserError::LaunchFailed(format!("{e:#}")))
        }
    }
}

fn remove_profile_dir(path: &Path) {
    info!("Cleaning up temp directory: {}", path.display());
    if let Err(e) = std::fs::remove_dir_all(path) {
        warn!(
            "Failed to clean up temp directory {}: {}. Manual cleanup may be required.",
            path.display(),
            e
        );
    }
}

/// Create a blank page to navigate from
///
/// Starting from about:blank lets callers subscribe to page events before
/// the real navigation begins.
pub async fn create_blank_page(wrapper: &BrowserWrapper) -> BrowserResult<Page> {
    wrapper
        .browser()
        .new_page("about:blank")
        .await
        .map_err(|e| BrowserError::PageCreationFailed(e.to_string()))
}
