// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 noct-ml

//! Rewriting of in-document anchor links into Obsidian wikilinks.
//!
//! `[Turns](#turns)` becomes `[[#Turns]]` and `[see above](#turns)` becomes
//! `[[#Turns|see above]]`. Slugs are mapped back to the heading text they
//! were derived from by scanning the document's Markdown headings. Only
//! prose chunks are touched; code blocks are passed through unchanged.

use crate::config::ConversionConfig;
use crate::renderer::{Chunk, Document, anchor_slug};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

static ANCHOR_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\[\]]+)\]\(#([^)\s]+)\)").expect("ANCHOR_LINK: hardcoded regex is valid")
});

static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^#{1,6}[ \t]+(.+?)[ \t]*#*[ \t]*$").expect("HEADING: hardcoded regex is valid")
});

/// Rewrites anchor links in the prose of `doc` when `obsidian_links` is set.
///
/// Running it on an already rewritten document changes nothing.
///
/// # Example
///
/// ```
/// use echoforge::config::ConversionConfig;
/// use echoforge::links::rewrite_links;
/// use echoforge::renderer::Document;
///
/// let mut doc = Document::default();
/// doc.push_prose("## Turns\n\nBack to [the list](#turns).\n");
/// let config = ConversionConfig { obsidian_links: true, ..Default::default() };
///
/// let out = rewrite_links(doc, &config).to_string();
/// assert_eq!(out, "## Turns\n\nBack to [[#Turns|the list]].\n");
/// ```
#[must_use]
pub fn rewrite_links(doc: Document, config: &ConversionConfig) -> Document {
    if !config.obsidian_links {
        return doc;
    }

    let headings = heading_map(&doc);
    let mut rewritten = 0usize;
    let doc = doc.map_prose(|text| {
        ANCHOR_LINK
            .replace_all(text, |caps: &Captures<'_>| {
                rewritten += 1;
                let slug = &caps[2];
                let heading = headings.get(slug).map_or(slug, String::as_str);
                wikilink(heading, &caps[1])
            })
            .into_owned()
    });
    tracing::debug!(links = rewritten, "rewrote anchor links");
    doc
}

/// Maps heading slugs to heading text; the first heading wins a slug.
fn heading_map(doc: &Document) -> HashMap<String, String> {
    let mut headings = HashMap::new();
    for chunk in doc.chunks() {
        let Chunk::Prose(text) = chunk else { continue };
        for caps in HEADING.captures_iter(text) {
            let heading = caps[1].to_owned();
            headings.entry(anchor_slug(&heading)).or_insert(heading);
        }
    }
    headings
}

fn wikilink(heading: &str, label: &str) -> String {
    let label = label.split_whitespace().collect::<Vec<_>>().join(" ");
    if label == heading {
        format!("[[#{heading}]]")
    } else {
        format!("[[#{heading}|{label}]]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled() -> ConversionConfig {
        ConversionConfig {
            obsidian_links: true,
            ..Default::default()
        }
    }

    fn prose(text: &str) -> Document {
        let mut doc = Document::default();
        doc.push_prose(text);
        doc
    }

    #[test]
    fn disabled_is_a_no_op() {
        let doc = prose("## Turns\n\n[Turns](#turns)\n");
        let out = rewrite_links(doc.clone(), &ConversionConfig::default());
        assert_eq!(out, doc);
    }

    #[test]
    fn label_matching_heading_becomes_plain_wikilink() {
        let out = rewrite_links(prose("## Turns\n\n- [Turns](#turns)\n"), &enabled());
        assert_eq!(out.to_string(), "## Turns\n\n- [[#Turns]]\n");
    }

    #[test]
    fn resolves_slug_to_heading_text() {
        let out = rewrite_links(
            prose("- [Turn 001 — James](#turn-001--james)\n\n### Turn 001 — James\n"),
            &enabled(),
        );
        assert!(out.to_string().starts_with("- [[#Turn 001 — James]]\n"));
    }

    #[test]
    fn unresolved_slug_is_kept() {
        let out = rewrite_links(prose("see [elsewhere](#missing-section)"), &enabled());
        assert_eq!(out.to_string(), "see [[#missing-section|elsewhere]]");
    }

    #[test]
    fn collapses_whitespace_in_label() {
        let out = rewrite_links(prose("## Notes\n[my\n  notes](#notes)"), &enabled());
        assert!(out.to_string().ends_with("[[#Notes|my notes]]"));
    }

    #[test]
    fn leaves_external_links_alone() {
        let text = "[docs](https://example.com/#intro) and [[#Existing]]";
        let out = rewrite_links(prose(text), &enabled());
        assert_eq!(out.to_string(), text);
    }

    #[test]
    fn never_touches_code() {
        let mut doc = Document::default();
        doc.push_prose("## Turns\n\n");
        doc.push_code("```md\n[Turns](#turns)\n```\n".into());
        doc.push_prose("[Turns](#turns)\n");

        let out = rewrite_links(doc, &enabled()).to_string();
        assert_eq!(out, "## Turns\n\n```md\n[Turns](#turns)\n```\n[[#Turns]]\n");
    }

    #[test]
    fn second_pass_changes_nothing() {
        let doc = prose("## Turns\n\n[Turns](#turns) and [back](#turns)\n");
        let once = rewrite_links(doc, &enabled());
        let twice = rewrite_links(once.clone(), &enabled());
        assert_eq!(once, twice);
    }

    #[test]
    fn document_without_anchors_is_unchanged() {
        let doc = prose("plain text only\n");
        assert_eq!(rewrite_links(doc.clone(), &enabled()), doc);
    }
}
