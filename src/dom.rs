//! Lenient HTML parsing into an owned element tree.
//!
//! The heavy lifting is html5ever via `scraper`: it recovers from unclosed
//! tags, missing doctypes, and stray markup the way browsers do. The parsed
//! result is converted into an owned [`Element`] tree that holds exactly what
//! the extraction queries need: lowercase tag names, an attribute map, and
//! child elements in document order. Doctype declarations, comments, and text
//! nodes are dropped during conversion.

use std::collections::HashMap;

use crate::error::{ScrapeError, ScrapeResult};

/// Root of a parsed document. Immutable once built, owned by the fetch cycle
/// that requested it.
#[derive(Debug, Clone)]
pub struct Document {
    root: Element,
}

impl Document {
    /// The synthetic document root; its children are the top-level elements
    /// (for any real page, a single `html` element).
    pub fn root(&self) -> &Element {
        &self.root
    }
}

/// A single element: lowercase tag name, attributes, child elements.
#[derive(Debug, Clone)]
pub struct Element {
    name: String,
    attrs: HashMap<String, String>,
    children: Vec<Element>,
}

impl Element {
    /// Lowercase tag name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute value by lowercase name; `None` when absent.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Child elements in document order.
    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter()
    }

    /// Child elements with the given tag name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }
}

/// Parse a byte stream of possibly-malformed HTML into a [`Document`].
///
/// The body is decoded as UTF-8 after BOM sniffing (a UTF-16 BOM switches
/// the decoder). Undecodable bytes and blank input fail with
/// [`ScrapeError::Parse`]; merely malformed markup never does.
pub fn parse(bytes: &[u8]) -> ScrapeResult<Document> {
    let (text, _, had_errors) = encoding_rs::UTF_8.decode(bytes);
    if had_errors {
        return Err(ScrapeError::Parse("body is not decodable as text".into()));
    }
    if text.trim().is_empty() {
        return Err(ScrapeError::Parse("empty document".into()));
    }

    let html = scraper::Html::parse_document(&text);
    let root = Element {
        name: "#document".to_string(),
        attrs: HashMap::new(),
        children: vec![convert(html.root_element())],
    };
    Ok(Document { root })
}

fn convert(element: scraper::ElementRef<'_>) -> Element {
    Element {
        name: element.value().name().to_ascii_lowercase(),
        attrs: element
            .value()
            .attrs()
            .map(|(name, value)| (name.to_ascii_lowercase(), value.to_string()))
            .collect(),
        children: element
            .children()
            .filter_map(scraper::ElementRef::wrap)
            .map(convert)
            .collect(),
    }
}
