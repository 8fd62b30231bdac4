//! Retrieval-and-extraction pipeline
//!
//! ```text
//! Start -> TryStatic -> Done
//!                    -> TryRendered -> Done
//!                                   -> Failed
//!                    -> Failed (fallback disabled)
//! ```
//!
//! The render path is only attempted after the static fetch has definitively
//! failed, and only when `enable_render_fallback` is set. When both paths
//! fail the caller sees the *static* error; the render error is logged and
//! dropped.

use serde::{Serialize, Serializer};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::ScrapeConfig;
use crate::fetch::{DocumentFetcher, HtmlFetcher, RawDocument, RenderFetcher};
use crate::page_extractor::{ExtractionResult, HtmlDocument, extract_from_document};
use crate::utils::FetchError;

/// Result of one [`MetaScraper::scrape`] call
///
/// Serializes to the flat envelope
/// `{"success": true, "url", "canonical", "title", ...}` or
/// `{"success": false, "url", "error"}`.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    Success { url: String, result: ExtractionResult },
    Failure { url: String, error: String },
}

impl PipelineOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PipelineOutcome::Success { .. })
    }

    /// The URL that was requested
    pub fn url(&self) -> &str {
        match self {
            PipelineOutcome::Success { url, .. } | PipelineOutcome::Failure { url, .. } => url,
        }
    }

    pub fn result(&self) -> Option<&ExtractionResult> {
        match self {
            PipelineOutcome::Success { result, .. } => Some(result),
            PipelineOutcome::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            PipelineOutcome::Success { .. } => None,
            PipelineOutcome::Failure { error, .. } => Some(error),
        }
    }
}

#[derive(Serialize)]
struct SuccessEnvelope<'a> {
    success: bool,
    url: &'a str,
    #[serde(flatten)]
    result: &'a ExtractionResult,
}

#[derive(Serialize)]
struct FailureEnvelope<'a> {
    success: bool,
    url: &'a str,
    error: &'a str,
}

impl Serialize for PipelineOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PipelineOutcome::Success { url, result } => SuccessEnvelope {
                success: true,
                url,
                result,
            }
            .serialize(serializer),
            PipelineOutcome::Failure { url, error } => FailureEnvelope {
                success: false,
                url,
                error,
            }
            .serialize(serializer),
        }
    }
}

/// Orchestrates static fetch, optional render fallback, and extraction
///
/// Holds no per-call state; one instance can serve concurrent `scrape` calls.
///
/// # Example
/// ```no_run
/// use kodegen_tools_metascrape::{MetaScraper, ScrapeConfig};
///
/// # async fn demo() -> anyhow::Result<()> {
/// let scraper = MetaScraper::new(ScrapeConfig::from_env()?)?;
/// let outcome = scraper.scrape("https://www.rust-lang.org").await;
/// println!("{}", serde_json::to_string_pretty(&outcome)?);
/// # Ok(()) }
/// ```
#[derive(Clone)]
pub struct MetaScraper {
    config: ScrapeConfig,
    document: Arc<dyn HtmlFetcher>,
    render: Arc<dyn HtmlFetcher>,
}

impl MetaScraper {
    /// Build a scraper backed by the HTTP and headless-browser fetchers
    pub fn new(config: ScrapeConfig) -> Result<Self, FetchError> {
        let document = Arc::new(DocumentFetcher::new(&config)?);
        let render = Arc::new(RenderFetcher::new(&config));
        Ok(Self::with_fetchers(config, document, render))
    }

    /// Build a scraper from arbitrary fetchers
    ///
    /// `render` is only consulted when `config.enable_render_fallback` is set.
    pub fn with_fetchers(
        config: ScrapeConfig,
        document: Arc<dyn HtmlFetcher>,
        render: Arc<dyn HtmlFetcher>,
    ) -> Self {
        Self {
            config,
            document,
            render,
        }
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    /// Fetch `url` and extract its metadata. Never fails; errors come back as
    /// [`PipelineOutcome::Failure`].
    pub async fn scrape(&self, url: &str) -> PipelineOutcome {
        debug!(url, "pipeline.try_static");
        let static_err = match self.document.fetch(url).await {
            Ok(doc) => return self.extract(url, doc, false),
            Err(e) => e,
        };

        if !self.config.enable_render_fallback {
            debug!(url, error = %static_err, "pipeline.failed (render fallback disabled)");
            return failure(url, &static_err);
        }

        info!(url, error = %static_err, "pipeline.try_rendered");
        match self.render.fetch(url).await {
            Ok(doc) => self.extract(url, doc, true),
            Err(render_err) => {
                warn!(
                    url,
                    static_error = %static_err,
                    render_error = %render_err,
                    "pipeline.failed (render error swallowed)"
                );
                failure(url, &static_err)
            }
        }
    }

    fn extract(&self, url: &str, doc: RawDocument, rendered: bool) -> PipelineOutcome {
        let parsed = HtmlDocument::parse(&doc.html);
        let result = extract_from_document(&parsed, url, rendered, self.config.max_images);
        debug!(url, rendered, "pipeline.done");
        PipelineOutcome::Success {
            url: url.to_string(),
            result,
        }
    }
}

fn failure(url: &str, err: &FetchError) -> PipelineOutcome {
    PipelineOutcome::Failure {
        url: url.to_string(),
        error: err.to_string(),
    }
}
