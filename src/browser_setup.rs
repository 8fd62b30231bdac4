//! Locating and launching the Chrome used by the render fallback
//!
//! Nothing is ever downloaded. When no executable can be found the render
//! fails immediately with [`BrowserError::NotFound`].

use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use futures::StreamExt;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::BrowserConfig;
use crate::browser::{BrowserError, BrowserResult};
use crate::utils::constants::ENV_CHROMIUM_PATH;

#[cfg(target_os = "macos")]
const INSTALL_PATHS: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
];

#[cfg(target_os = "windows")]
const INSTALL_PATHS: &[&str] = &[
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
];

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const INSTALL_PATHS: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/opt/google/chrome/chrome",
];

/// Executable names looked up on `PATH`, in preference order
const PATH_NAMES: &[&str] = &[
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
    "chrome",
];

/// Pick the browser executable for a render.
///
/// Order: `browser.chrome_path`, then `CHROMIUM_PATH`, then well-known
/// install locations, then `PATH`. An explicit path that does not exist is
/// an error rather than a reason to keep searching.
pub fn find_browser_executable(config: &BrowserConfig) -> BrowserResult<PathBuf> {
    resolve_executable(
        config.chrome_path.as_deref(),
        std::env::var_os(ENV_CHROMIUM_PATH),
        std::env::var_os("PATH"),
        INSTALL_PATHS,
    )
}

fn resolve_executable(
    configured: Option<&Path>,
    env_override: Option<OsString>,
    search_path: Option<OsString>,
    install_paths: &[&str],
) -> BrowserResult<PathBuf> {
    let explicit = [
        ("browser.chrome_path", configured.map(Path::to_path_buf)),
        (ENV_CHROMIUM_PATH, env_override.map(PathBuf::from)),
    ];
    for (source, path) in explicit {
        let Some(path) = path else { continue };
        if path.is_file() {
            debug!(source, path = %path.display(), "Using explicitly configured browser");
            return Ok(path);
        }
        return Err(BrowserError::NotFound(format!(
            "{source} points to {}, which is not a file",
            path.display()
        )));
    }

    if let Some(path) = install_paths.iter().map(PathBuf::from).find(|p| p.is_file()) {
        debug!(path = %path.display(), "Found installed browser");
        return Ok(path);
    }

    for dir in search_path.iter().flat_map(|p| std::env::split_paths(p)) {
        for name in PATH_NAMES {
            let candidate = dir.join(format!("{name}{}", std::env::consts::EXE_SUFFIX));
            if candidate.is_file() {
                debug!(path = %candidate.display(), "Found browser on PATH");
                return Ok(candidate);
            }
        }
    }

    Err(BrowserError::NotFound(format!(
        "no Chrome or Chromium executable found; install one or set {ENV_CHROMIUM_PATH}"
    )))
}

/// Launch `executable` headless with its own profile directory and the
/// sandbox disabled, so it runs unprivileged inside containers.
///
/// `timeout` bounds process start-up and every CDP request.
pub async fn launch_browser(
    config: &BrowserConfig,
    executable: PathBuf,
    profile_dir: &Path,
    timeout: Duration,
) -> Result<(Browser, JoinHandle<()>)> {
    let mut builder = BrowserConfigBuilder::default()
        .chrome_executable(executable)
        .user_data_dir(profile_dir)
        .window_size(config.window.width, config.window.height)
        .launch_timeout(timeout)
        .request_timeout(timeout)
        .no_sandbox()
        .arg("--disable-setuid-sandbox")
        .arg("--disable-dev-shm-usage")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--disable-extensions")
        .arg("--mute-audio")
        .arg(format!("--user-agent={}", config.user_agent));

    builder = if config.headless {
        builder.headless_mode(HeadlessMode::default())
    } else {
        builder.with_head()
    };

    let launch_config = builder
        .build()
        .map_err(|e| anyhow::anyhow!("invalid browser configuration: {e}"))?;

    info!(profile = %profile_dir.display(), "Launching render browser");
    let (browser, mut handler) = Browser::launch(launch_config)
        .await
        .context("browser process did not start")?;

    let handler_task = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            match event {
                Ok(()) => {}
                Err(e) if is_unrecognized_cdp_message(&e.to_string()) => {
                    trace!("Ignoring unrecognized CDP message: {}", e);
                }
                Err(e) => warn!("Render browser handler error: {}", e),
            }
        }
        debug!("Render browser handler finished");
    });

    Ok((browser, handler_task))
}

/// Chrome emits CDP messages newer than chromiumoxide's protocol tables;
/// those fail to deserialize but do not affect the session.
fn is_unrecognized_cdp_message(message: &str) -> bool {
    message.contains("data did not match any variant of untagged enum Message")
        || message.contains("Failed to deserialize WS response")
}
