//! Extraction output types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Normalized metadata for one page
///
/// Serialized field names match the outward JSON envelope (`jsonLd` is
/// camel-cased, everything else is already a single word).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Canonical link target, or the requested URL when none is declared
    pub canonical: String,

    /// `<title>` text, falling back to `og:title`
    pub title: String,

    /// `<meta name="description">`, falling back to `og:description`
    pub description: String,

    /// Up to [`MAX_IMAGES`](crate::utils::constants::MAX_IMAGES) unique image URLs, no data URIs
    pub images: Vec<String>,

    /// Lower-cased `og:*`, `twitter:*` and `description` meta keys; last tag wins
    pub og: BTreeMap<String, String>,

    /// Every `application/ld+json` block that parsed, in document order
    pub json_ld: Vec<Value>,

    /// First JSON-LD entry whose `@type` mentions "product"
    pub product: Option<Value>,

    /// True when the HTML came from the headless browser
    pub rendered: bool,
}
