//! Queryable document capability
//!
//! Extraction only needs three things from an HTML tree: select elements by
//! CSS selector, read an attribute, and read text content. Any parser that can
//! provide those can back [`extract_page_info`](super::extract_page_info).

use scraper::{ElementRef, Html, Selector};
use tracing::warn;

/// A parsed HTML document that can be queried with CSS selectors
pub trait QueryableDocument {
    type Node<'a>: QueryableNode
    where
        Self: 'a;

    /// All elements matching `selector`, in document order.
    ///
    /// An invalid selector matches nothing.
    fn select_all(&self, selector: &str) -> Vec<Self::Node<'_>>;
}

/// A single element inside a [`QueryableDocument`]
pub trait QueryableNode {
    fn attr(&self, name: &str) -> Option<&str>;

    /// Concatenated text content of the element and its descendants
    fn text(&self) -> String;
}

/// [`QueryableDocument`] backed by the `scraper` crate (html5ever)
pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    /// Parse a full HTML document. html5ever recovers from malformed markup,
    /// so this never fails.
    pub fn parse(source: &str) -> Self {
        Self {
            html: Html::parse_document(source),
        }
    }
}

impl QueryableDocument for HtmlDocument {
    type Node<'a> = ElementRef<'a>;

    fn select_all(&self, selector: &str) -> Vec<ElementRef<'_>> {
        match Selector::parse(selector) {
            Ok(sel) => self.html.select(&sel).collect(),
            Err(e) => {
                warn!("Invalid CSS selector '{}': {:?}", selector, e);
                Vec::new()
            }
        }
    }
}

impl QueryableNode for ElementRef<'_> {
    fn attr(&self, name: &str) -> Option<&str> {
        self.value().attr(name)
    }

    fn text(&self) -> String {
        ElementRef::text(self).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_in_document_order() {
        let doc = HtmlDocument::parse(r#"<img src="a"><p><img src="b"></p><img src="c">"#);
        let srcs: Vec<_> = doc
            .select_all("img")
            .iter()
            .filter_map(|n| n.attr("src").map(str::to_string))
            .collect();
        assert_eq!(srcs, vec!["a", "b", "c"]);
    }

    #[test]
    fn invalid_selector_matches_nothing() {
        let doc = HtmlDocument::parse("<p>hi</p>");
        assert!(doc.select_all("p[").is_empty());
    }

    #[test]
    fn text_includes_descendants() {
        let doc = HtmlDocument::parse("<div id=x>Hello <b>world</b></div>");
        let nodes = doc.select_all("#x");
        assert_eq!(QueryableNode::text(&nodes[0]), "Hello world");
    }
}
