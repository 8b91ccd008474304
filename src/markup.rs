// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 noct-ml

//! HTML parsing and cleanup for saved chat pages.
//!
//! Saved pages are large, noisy and occasionally malformed. This module
//! parses them with an HTML5 parser (which recovers from unclosed and
//! misnested tags the way a browser does) and lowers the `<body>` into a
//! small owned tree with everything that cannot hold conversation content
//! removed.
//!
//! # Example
//!
//! ```
//! use echoforge::classify::Heuristics;
//! use echoforge::markup::normalize;
//!
//! let body = normalize(
//!     "<div><script>track()</script><p>Hello <b>there</p>",
//!     &Heuristics::default(),
//! );
//! assert_eq!(body.text(), "Hello there");
//! ```

use crate::classify::Heuristics;
use scraper::{ElementRef, Html, Selector};

/// A node of the cleaned markup tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// An element with its remaining children.
    Element(Element),
    /// Decoded character data.
    Text(String),
}

/// An element of the cleaned markup tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercase tag name.
    pub tag: String,
    /// Attributes in source order.
    pub attrs: Vec<(String, String)>,
    /// Child nodes in document order.
    pub children: Vec<Node>,
}

impl Element {
    /// Creates an element with no attributes or children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Returns the value of the named attribute.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Iterates over the whitespace-separated tokens of the `class` attribute.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_whitespace()
    }

    /// Iterates over the element children, skipping text.
    pub fn child_elements(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter_map(|child| match child {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// Returns all descendant text concatenated, trimmed.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out.trim().to_owned()
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => element.collect_text(out),
            }
        }
    }

    /// Returns `true` if the element has no children left.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    fn has_rendered_text(&self) -> bool {
        self.children.iter().any(|child| match child {
            Node::Text(text) => !text.trim().is_empty(),
            Node::Element(element) => is_break(&element.tag) || element.has_rendered_text(),
        })
    }
}

/// Elements kept even though they hold no text.
fn is_break(tag: &str) -> bool {
    matches!(tag, "br" | "hr")
}

/// Parses raw HTML and returns its cleaned `<body>`.
///
/// Never fails: malformed markup is repaired by the parser, and a page
/// without body content yields an empty `body` element.
#[must_use]
pub fn normalize(html: &str, heuristics: &Heuristics) -> Element {
    let html = html.trim_start_matches('\u{feff}');
    let document = Html::parse_document(html);

    let body = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next());

    let Some(body) = body else {
        tracing::debug!("document has no body");
        return Element::new("body");
    };

    let mut root = Element::new("body");
    root.children = lower_children(body, heuristics, false);
    tracing::debug!(
        profile = heuristics.name,
        nodes = root.children.len(),
        "normalized markup"
    );
    root
}

fn lower_children(parent: ElementRef<'_>, heuristics: &Heuristics, in_code: bool) -> Vec<Node> {
    let mut children = Vec::new();
    for child in parent.children() {
        match child.value() {
            scraper::Node::Text(text) => children.push(Node::Text((**text).to_owned())),
            scraper::Node::Element(_) => {
                if let Some(node) =
                    ElementRef::wrap(child).and_then(|el| lower_element(el, heuristics, in_code))
                {
                    children.push(node);
                }
            }
            // Comments, doctypes and processing instructions carry no content
            _ => {}
        }
    }
    children
}

fn lower_element(source: ElementRef<'_>, heuristics: &Heuristics, in_code: bool) -> Option<Node> {
    let value = source.value();
    let mut element = Element {
        tag: value.name().to_ascii_lowercase(),
        attrs: value
            .attrs()
            .map(|(name, value)| (name.to_owned(), value.to_owned()))
            .collect(),
        children: Vec::new(),
    };

    if heuristics.is_stripped(&element) {
        tracing::trace!(tag = %element.tag, "stripped element");
        return None;
    }

    let in_code = in_code || heuristics.is_code_container(&element);
    element.children = lower_children(source, heuristics, in_code);

    if in_code || is_break(&element.tag) || element.has_rendered_text() {
        return Some(Node::Element(element));
    }

    // Keep word separation when a whitespace-only wrapper disappears
    let has_whitespace = element
        .children
        .iter()
        .any(|child| matches!(child, Node::Text(text) if !text.is_empty()));
    has_whitespace.then(|| Node::Text(" ".into()))
}
