//! Page metadata scraping for link previews, aggregators and catalog importers
//!
//! Fetches a page over plain HTTP, optionally falls back to a headless Chrome
//! render, and extracts a normalized summary: title, description, canonical
//! URL, images, Open Graph / Twitter meta, JSON-LD and the first
//! schema.org product.
//!
//! ```no_run
//! # async fn demo() {
//! let outcome = kodegen_tools_metascrape::scrape("https://www.rust-lang.org").await;
//! if let Some(result) = outcome.result() {
//!     println!("{} ({} images)", result.title, result.images.len());
//! }
//! # }
//! ```

mod browser;
pub mod browser_setup;
pub mod fetch;
pub mod page_extractor;
mod pipeline;
pub mod utils;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use utils::constants::{
    CHROME_USER_AGENT, DEFAULT_ACCEPT_LANGUAGE, DEFAULT_FETCH_TIMEOUT_MS,
    DEFAULT_RENDER_TIMEOUT_MS, DEFAULT_USER_AGENT, ENV_ACCEPT_LANGUAGE, ENV_CONFIG_PATH,
    ENV_FETCH_TIMEOUT_MS, ENV_RENDER_FALLBACK, ENV_RENDER_TIMEOUT_MS, ENV_USER_AGENT, MAX_IMAGES,
};
use utils::{ConfigError, validate_fetch_timeout, validate_navigation_timeout};

/// Runtime configuration for [`MetaScraper`]
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeConfig {
    /// User-Agent for the static fetch
    pub user_agent: String,

    pub accept_language: String,

    /// Retry failed static fetches through a headless browser
    pub enable_render_fallback: bool,

    pub fetch_timeout: Duration,

    /// Budget for browser navigation plus the network idle wait
    pub render_timeout: Duration,

    pub max_images: usize,

    pub browser: BrowserConfig,
}

/// Browser launch configuration for the render fallback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// User-Agent the browser presents
    #[serde(default = "default_browser_user_agent")]
    pub user_agent: String,

    /// Window dimensions
    #[serde(default)]
    pub window: WindowConfig,

    /// Explicit Chrome/Chromium executable; discovery is used when unset or missing
    #[serde(default)]
    pub chrome_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_window_width")]
    pub width: u32,

    #[serde(default = "default_window_height")]
    pub height: u32,
}

fn default_headless() -> bool {
    true
}

fn default_browser_user_agent() -> String {
    CHROME_USER_AGENT.to_string()
}

fn default_window_width() -> u32 {
    1920
}

fn default_window_height() -> u32 {
    1080
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            enable_render_fallback: false,
            fetch_timeout: Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
            render_timeout: Duration::from_millis(DEFAULT_RENDER_TIMEOUT_MS),
            max_images: MAX_IMAGES,
            browser: BrowserConfig::default(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            user_agent: default_browser_user_agent(),
            window: WindowConfig::default(),
            chrome_path: None,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_window_width(),
            height: default_window_height(),
        }
    }
}

/// On-disk YAML shape; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    user_agent: Option<String>,
    accept_language: Option<String>,
    enable_render_fallback: Option<bool>,
    fetch_timeout_ms: Option<u64>,
    render_timeout_ms: Option<u64>,
    max_images: Option<usize>,
    browser: Option<BrowserConfig>,
}

impl ScrapeConfig {
    /// Defaults overlaid with `SCRAPER_CONFIG` (if set) and the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Defaults, then the YAML file at `path` (or `SCRAPER_CONFIG`), then the environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    fn load_with(
        path: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let file = match path
            .map(Path::to_path_buf)
            .or_else(|| env(ENV_CONFIG_PATH).map(PathBuf::from))
        {
            Some(path) => load_yaml_config(&path)?,
            None => ConfigFile::default(),
        };

        let mut config = ScrapeConfig::default();

        if let Some(ua) = env(ENV_USER_AGENT).or(file.user_agent) {
            config.user_agent = ua;
        }
        if let Some(lang) = env(ENV_ACCEPT_LANGUAGE).or(file.accept_language) {
            config.accept_language = lang;
        }
        config.enable_render_fallback = match env(ENV_RENDER_FALLBACK) {
            Some(flag) => flag == "1",
            None => file.enable_render_fallback.unwrap_or(false),
        };

        let fetch_ms = parse_env_ms(&env, ENV_FETCH_TIMEOUT_MS)?.or(file.fetch_timeout_ms);
        config.fetch_timeout = validate_fetch_timeout(fetch_ms, DEFAULT_FETCH_TIMEOUT_MS)?;

        let render_ms = parse_env_ms(&env, ENV_RENDER_TIMEOUT_MS)?.or(file.render_timeout_ms);
        config.render_timeout = validate_navigation_timeout(render_ms, DEFAULT_RENDER_TIMEOUT_MS)?;

        if let Some(max) = file.max_images {
            if !(1..=MAX_IMAGES).contains(&max) {
                return Err(ConfigError::InvalidValue {
                    name: "max_images",
                    value: format!("{max} (allowed 1..={MAX_IMAGES})"),
                });
            }
            config.max_images = max;
        }
        if let Some(browser) = file.browser {
            config.browser = browser;
        }

        debug!(
            render_fallback = config.enable_render_fallback,
            fetch_timeout_ms = config.fetch_timeout.as_millis() as u64,
            render_timeout_ms = config.render_timeout.as_millis() as u64,
            "Loaded scrape configuration"
        );
        Ok(config)
    }
}

fn parse_env_ms(
    env: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<u64>, ConfigError> {
    env(name)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidValue { name, value: raw })
        })
        .transpose()
}

fn load_yaml_config(path: &Path) -> Result<ConfigFile, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    serde_yaml::from_str::<Option<ConfigFile>>(&contents)
        .map(Option::unwrap_or_default)
        .map_err(|e| ConfigError::Yaml {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

/// Scrape `url` with configuration from the environment.
///
/// Configuration problems are reported as a [`PipelineOutcome::Failure`]
/// rather than an error, so callers always get an outcome to branch on.
pub async fn scrape(url: &str) -> PipelineOutcome {
    let scraper = ScrapeConfig::from_env()
        .map_err(|e| e.to_string())
        .and_then(|config| MetaScraper::new(config).map_err(|e| e.to_string()));

    match scraper {
        Ok(scraper) => scraper.scrape(url).await,
        Err(error) => PipelineOutcome::Failure {
            url: url.to_string(),
            error,
        },
    }
}

pub use browser::{BrowserError, BrowserResult};
pub use fetch::{DocumentFetcher, HtmlFetcher, RawDocument, RenderFetcher};
pub use page_extractor::{ExtractionResult, extract_page_info};
pub use pipeline::{MetaScraper, PipelineOutcome};
pub use utils::FetchError;
