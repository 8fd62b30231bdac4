//! Metadata sub-extractors
//!
//! Each function here reads one facet of a [`QueryableDocument`]. They are
//! pure and composed by [`extract_page_info`](super::extract_page_info).

use std::collections::{BTreeMap, HashSet};

use serde_json::Value;
use tracing::trace;

use super::document::{QueryableDocument, QueryableNode};

const OG_PREFIX: &str = "og:";
const TWITTER_PREFIX: &str = "twitter:";
const DESCRIPTION_KEY: &str = "description";

/// Image keys checked in order; first non-empty value seeds the image list
const SEED_IMAGE_KEYS: [&str; 3] = ["og:image", "og:image:url", "twitter:image"];

/// Lazy-loading attributes checked in order on `<img>`
const IMG_SRC_ATTRS: [&str; 3] = ["src", "data-src", "data-lazy-src"];

/// Collect `og:*`, `twitter:*` and `description` meta tags.
///
/// Key is the lower-cased `property` attribute, or `name` when `property` is
/// absent or blank. Value is `content`, or `value` when `content` is absent or
/// blank. Later tags overwrite earlier ones.
pub fn extract_meta_tags<D: QueryableDocument>(doc: &D) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();

    for meta in doc.select_all("meta") {
        let Some(key) = non_empty_attr(&meta, "property").or_else(|| non_empty_attr(&meta, "name"))
        else {
            continue;
        };
        let key = key.to_lowercase();
        if !is_retained_key(&key) {
            continue;
        }

        let Some(value) = non_empty_attr(&meta, "content").or_else(|| non_empty_attr(&meta, "value"))
        else {
            continue;
        };
        tags.insert(key, value.to_string());
    }

    tags
}

fn non_empty_attr<'n, N: QueryableNode>(node: &'n N, name: &str) -> Option<&'n str> {
    node.attr(name).filter(|v| !v.trim().is_empty())
}

fn is_retained_key(key: &str) -> bool {
    key.starts_with(OG_PREFIX) || key.starts_with(TWITTER_PREFIX) || key == DESCRIPTION_KEY
}

/// Parse JSON, swallowing the error.
///
/// Third-party structured data is frequently malformed; a bad block must not
/// cost the caller the rest of the page.
pub fn try_parse_json(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(e) => {
            trace!("Dropping unparsable JSON-LD block: {}", e);
            None
        }
    }
}

/// Every `<script type="application/ld+json">` that parses, in document order
pub fn extract_json_ld<D: QueryableDocument>(doc: &D) -> Vec<Value> {
    doc.select_all(r#"script[type="application/ld+json"]"#)
        .iter()
        .filter_map(|script| try_parse_json(&script.text()))
        .collect()
}

/// First entry whose `@type` (string or list of strings) contains "product",
/// compared case-insensitively.
pub fn detect_product(json_ld: &[Value]) -> Option<&Value> {
    json_ld.iter().find(|entry| {
        match entry.get("@type") {
            Some(Value::String(t)) => mentions_product(t),
            Some(Value::Array(types)) => types
                .iter()
                .filter_map(Value::as_str)
                .any(mentions_product),
            _ => false,
        }
    })
}

fn mentions_product(type_name: &str) -> bool {
    type_name.to_lowercase().contains("product")
}

/// `<title>` text, then `og:title`, then empty
pub fn resolve_title<D: QueryableDocument>(doc: &D, meta: &BTreeMap<String, String>) -> String {
    let from_element = doc
        .select_all("title")
        .first()
        .map(|title| title.text().trim().to_string())
        .unwrap_or_default();

    first_non_empty([Some(from_element), meta.get("og:title").cloned()])
}

/// `description` meta, then `og:description`, then empty
pub fn resolve_description(meta: &BTreeMap<String, String>) -> String {
    first_non_empty([
        meta.get(DESCRIPTION_KEY).cloned(),
        meta.get("og:description").cloned(),
    ])
}

fn first_non_empty<const N: usize>(candidates: [Option<String>; N]) -> String {
    candidates
        .into_iter()
        .flatten()
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

/// `href` of the first `<link rel=canonical>`, else the requested URL
pub fn resolve_canonical<D: QueryableDocument>(doc: &D, url: &str) -> String {
    link_href(doc, "canonical").unwrap_or_else(|| url.to_string())
}

/// First non-empty `href` on a `<link>` whose `rel` contains `rel_token`
fn link_href<D: QueryableDocument>(doc: &D, rel_token: &str) -> Option<String> {
    doc.select_all("link[rel][href]").iter().find_map(|link| {
        let rel = link.attr("rel")?;
        if !rel
            .split_ascii_whitespace()
            .any(|token| token.eq_ignore_ascii_case(rel_token))
        {
            return None;
        }
        let href = link.attr("href")?.trim();
        (!href.is_empty()).then(|| href.to_string())
    })
}

/// Representative images in priority order.
///
/// Seeds with the social image (`og:image`, `og:image:url`, `twitter:image`,
/// first present wins) and `<link rel=image_src>`, then walks `<img>` in
/// document order until `max` entries are gathered. Duplicates are removed
/// last, so the result may be shorter than `max`.
pub fn collect_images<D: QueryableDocument>(
    doc: &D,
    meta: &BTreeMap<String, String>,
    max: usize,
) -> Vec<String> {
    let mut images: Vec<String> = Vec::with_capacity(max);

    let social = SEED_IMAGE_KEYS
        .iter()
        .find_map(|key| meta.get(*key).filter(|v| !v.trim().is_empty()));
    if let Some(src) = social {
        push_image(&mut images, src);
    }
    if let Some(src) = link_href(doc, "image_src") {
        push_image(&mut images, &src);
    }

    for img in doc.select_all("img") {
        if images.len() >= max {
            break;
        }
        let src = IMG_SRC_ATTRS
            .iter()
            .find_map(|attr| non_empty_attr(&img, attr))
            .unwrap_or("");
        push_image(&mut images, src);
    }

    images.truncate(max);
    dedupe_preserving_order(images)
}

fn push_image(images: &mut Vec<String>, src: &str) {
    let src = src.trim();
    if src.is_empty() || is_data_uri(src) {
        return;
    }
    images.push(src.to_string());
}

fn is_data_uri(src: &str) -> bool {
    src.get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
}

fn dedupe_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
