//! Shared configuration constants for metadata scraping
//!
//! This module contains default values and configuration constants used
//! throughout the codebase to ensure consistency and avoid magic numbers.

/// Default User-Agent sent by the static document fetcher
///
/// Overridable via `SCRAPER_USER_AGENT`.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; KodegenMetaBot/0.2; +https://kodegen.ai/bot)";

/// Default Accept-Language sent by the static document fetcher
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Chrome user agent string for the render fallback browser
///
/// Updated: 2025-01-29 to Chrome 132 (current stable)
///
/// Reference: https://chromiumdash.appspot.com/schedule
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";

/// Static fetch timeout (15 seconds)
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 15_000;

/// Render fallback navigation + network idle timeout (20 seconds)
pub const DEFAULT_RENDER_TIMEOUT_MS: u64 = 20_000;

/// Maximum number of image URLs collected per page
pub const MAX_IMAGES: usize = 6;

/// Environment variable overriding the static fetch User-Agent
pub const ENV_USER_AGENT: &str = "SCRAPER_USER_AGENT";

/// Environment variable enabling the render fallback (`"1"` enables)
pub const ENV_RENDER_FALLBACK: &str = "USE_PLAYWRIGHT";

pub const ENV_ACCEPT_LANGUAGE: &str = "SCRAPER_ACCEPT_LANGUAGE";
pub const ENV_FETCH_TIMEOUT_MS: &str = "SCRAPER_FETCH_TIMEOUT_MS";
pub const ENV_RENDER_TIMEOUT_MS: &str = "SCRAPER_RENDER_TIMEOUT_MS";

/// Environment variable pointing at a YAML config file
pub const ENV_CONFIG_PATH: &str = "SCRAPER_CONFIG";

/// Environment variable naming the Chrome/Chromium executable for renders
pub const ENV_CHROMIUM_PATH: &str = "CHROMIUM_PATH";
