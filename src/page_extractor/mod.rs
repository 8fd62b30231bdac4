//! Page metadata extraction module
//!
//! Turns raw HTML into an [`ExtractionResult`]: title, description, canonical
//! URL, representative images, Open Graph / Twitter meta, JSON-LD blocks and
//! the first schema.org product.

pub mod document;
pub mod extractors;
pub mod page_info;
pub mod schema;

// Re-export commonly used types
pub use document::{HtmlDocument, QueryableDocument, QueryableNode};
pub use extractors::try_parse_json;
pub use page_info::{extract_from_document, extract_page_info};
pub use schema::ExtractionResult;
