//! HTML retrieval
//!
//! Two interchangeable [`HtmlFetcher`]s: a plain HTTP GET ([`DocumentFetcher`])
//! and a headless-browser render ([`RenderFetcher`]). The pipeline only ever
//! sees the trait, which keeps both paths swappable in tests.

mod document;
mod render;

pub use document::DocumentFetcher;
pub use render::RenderFetcher;

use async_trait::async_trait;

use crate::utils::FetchError;

/// HTML obtained for one pipeline invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub html: String,
    /// True when the HTML is a browser-rendered DOM snapshot
    pub rendered: bool,
}

/// Capability to turn a URL into HTML
#[async_trait]
pub trait HtmlFetcher: Send + Sync {
    /// Retrieve `url`. Implementations do not retry.
    async fn fetch(&self, url: &str) -> Result<RawDocument, FetchError>;
}
