//! Shared page metadata extraction
//!
//! Both fetch paths hand their HTML to [`extract_page_info`]; the only
//! difference in output is the `rendered` flag.

use tracing::debug;

use super::document::{HtmlDocument, QueryableDocument};
use super::extractors::{
    collect_images, detect_product, extract_json_ld, extract_meta_tags, resolve_canonical,
    resolve_description, resolve_title,
};
use super::schema::ExtractionResult;
use crate::utils::constants::MAX_IMAGES;

/// Parse `html` and extract metadata for the page requested as `url`.
///
/// Deterministic and side-effect free: identical input yields identical output.
///
/// # Example
/// ```rust
/// use kodegen_tools_metascrape::page_extractor::extract_page_info;
///
/// let html = r#"<head><title>Hi</title><meta property="og:image" content="http://x/a.png"></head>"#;
/// let info = extract_page_info(html, "http://x/", false);
/// assert_eq!(info.title, "Hi");
/// assert_eq!(info.images, vec!["http://x/a.png"]);
/// ```
pub fn extract_page_info(html: &str, url: &str, rendered: bool) -> ExtractionResult {
    let doc = HtmlDocument::parse(html);
    extract_from_document(&doc, url, rendered, MAX_IMAGES)
}

/// Extraction over any [`QueryableDocument`] implementation
///
/// `max_images` is capped at [`MAX_IMAGES`].
pub fn extract_from_document<D: QueryableDocument>(
    doc: &D,
    url: &str,
    rendered: bool,
    max_images: usize,
) -> ExtractionResult {
    let og = extract_meta_tags(doc);
    let json_ld = extract_json_ld(doc);
    let product = detect_product(&json_ld).cloned();

    let result = ExtractionResult {
        canonical: resolve_canonical(doc, url),
        title: resolve_title(doc, &og),
        description: resolve_description(&og),
        images: collect_images(doc, &og, max_images.min(MAX_IMAGES)),
        og,
        json_ld,
        product,
        rendered,
    };

    debug!(
        url,
        rendered,
        images = result.images.len(),
        meta_tags = result.og.len(),
        json_ld_blocks = result.json_ld.len(),
        has_product = result.product.is_some(),
        "Extracted page metadata"
    );

    result
}
