//! Small XML/HTML accessors shared by the scanners.
//!
//! Element lookups match on local name only, so namespaced manifests and
//! un-namespaced metadata files are read the same way.

use lazy_static::lazy_static;
use roxmltree::{Document, Node, ParsingOptions};
use scraper::{Html, Selector};

lazy_static! {
    static ref TITLE_SELECTOR: Selector = Selector::parse("title").unwrap();
    static ref META_SELECTOR: Selector = Selector::parse("meta[name]").unwrap();
    static ref BODY_SELECTOR: Selector = Selector::parse("body").unwrap();
}

/// Parse an XML document, tolerating a DTD.
pub fn parse_xml(text: &str) -> Result<Document<'_>, roxmltree::Error> {
    let mut options = ParsingOptions::default();
    options.allow_dtd = true;
    Document::parse_with_options(text, options)
}

/// Concatenated text of a node and all its descendants.
pub fn text_content(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

/// First descendant element (document order) with the given local name.
pub fn first_element<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.descendants()
        .find(|n| n.is_element() && n.tag_name().name() == tag)
}

/// First direct child element with the given local name.
pub fn child_element<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == tag)
}

/// Text of the first descendant element with the given name.
pub fn first_text(node: Node<'_, '_>, tag: &str) -> Option<String> {
    first_element(node, tag).map(text_content)
}

/// Whether the first `tag` element's text equals `expected`.
pub fn first_text_is(node: Node<'_, '_>, tag: &str, expected: &str) -> bool {
    first_text(node, tag).is_some_and(|t| t.trim() == expected)
}

/// Trimmed, non-empty title or the given default.
pub fn title_or(title: Option<String>, default: &str) -> String {
    title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Text of the first `<title>` in an HTML document.
pub fn html_title(document: &Html) -> Option<String> {
    document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|el| el.text().collect::<String>())
}

/// `content` of the first `<meta name=...>` with the given name.
pub fn html_meta<'a>(document: &'a Html, name: &str) -> Option<&'a str> {
    document
        .select(&META_SELECTOR)
        .find(|el| el.value().attr("name") == Some(name))
        .and_then(|el| el.value().attr("content"))
}

/// Inner markup of `<body>`, when the document has one.
pub fn body_html(document: &Html) -> Option<String> {
    document
        .select(&BODY_SELECTOR)
        .next()
        .map(|body| body.inner_html())
}

/// Whether `<body>` contains at least one element.
pub fn body_has_elements(document: &Html) -> bool {
    document
        .select(&BODY_SELECTOR)
        .next()
        .is_some_and(|body| body.children().any(|c| c.value().is_element()))
}
