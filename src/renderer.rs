// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 noct-ml

//! Rendering of labeled turns as Markdown or JSON Lines.
//!
//! # Document mode
//!
//! [`render_document`] produces a [`Document`]: Markdown text kept as a
//! sequence of prose and code chunks so that later passes (such as the link
//! rewriter) can leave code untouched.
//!
//! Plain output separates turns with minimal markers:
//!
//! ```text
//! --- 001 [James] ---
//! How do I list files?
//!
//! --- 002 [ChatGPT] ---
//! Use `ls`.
//! ```
//!
//! Pretty output (`pretty_markdown`) adds a theme preamble, a title, an
//! optional table of contents and `### Turn 001 — James` headings.
//!
//! # Dataset mode
//!
//! [`to_jsonl`] writes one [`Turn`] record per line. Text is never wrapped.
//!
//! # Example
//!
//! ```
//! use echoforge::config::ConversionConfig;
//! use echoforge::model::{Role, Segment, Turn};
//! use echoforge::renderer::render_document;
//!
//! let turns = vec![Turn {
//!     index: 1,
//!     role: Role::User,
//!     label: "James".into(),
//!     segments: vec![Segment::text("Hello!")],
//! }];
//! let config = ConversionConfig {
//!     by_speaker: true,
//!     include_signature: false,
//!     ..Default::default()
//! };
//!
//! let doc = render_document(&turns, &config);
//! assert_eq!(doc.to_string(), "--- 001 [James] ---\nHello!\n");
//! ```

use crate::config::{ConversionConfig, Theme};
use crate::model::{Segment, Turn};
use crate::{Error, SerializeSnafu};
use regex::Regex;
use snafu::ResultExt;
use std::fmt;
use std::sync::LazyLock;
use unicode_width::UnicodeWidthStr;

/// Name of the tool, used in the signature.
pub const TOOL_NAME: &str = "EchoForge";

const VERSION: &str = env!("CARGO_PKG_VERSION");
const PROJECT_URL: &str = env!("CARGO_PKG_REPOSITORY");
const TAGLINE: &str = "Forging echoes into clarity.";

const DARK_STYLE: &str = "\
<style>
body { background-color: #0d1117; color: #c9d1d9; }
code, pre { background-color: #161b22; color: #58a6ff; }
a { color: #58a6ff; }
h1, h2, h3, h4 { color: #e6edf3; }
details > summary { cursor: pointer; }
</style>

";

const AUTO_STYLE: &str = "\
<style>
@media (prefers-color-scheme: dark) {
  body { background-color: #0d1117; color: #c9d1d9; }
  code, pre { background-color: #161b22; color: #58a6ff; }
  a { color: #58a6ff; }
  h1, h2, h3, h4 { color: #e6edf3; }
  details > summary { cursor: pointer; }
}
</style>

";

const OBSIDIAN_FRONT_MATTER: &str = "---\ncssclass: dark-theme\n---\n\n";

/// List item prefixes that get a hanging indent when wrapped.
static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[-*+]|\d+\.)\s+").expect("LIST_ITEM: hardcoded regex is valid")
});

/// A piece of a rendered Markdown document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    /// Markdown prose, headings and decoration.
    Prose(String),
    /// A complete fenced code block, fences included.
    Code(String),
}

/// A rendered Markdown document.
///
/// The text is the concatenation of its chunks; use `to_string()` to get it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    chunks: Vec<Chunk>,
}

impl Document {
    /// Returns the chunks in order.
    #[must_use]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Appends prose, merging with a preceding prose chunk.
    pub fn push_prose(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Chunk::Prose(last)) = self.chunks.last_mut() {
            last.push_str(text);
        } else {
            self.chunks.push(Chunk::Prose(text.to_owned()));
        }
    }

    /// Appends a fenced code block.
    pub fn push_code(&mut self, block: String) {
        self.chunks.push(Chunk::Code(block));
    }

    /// Applies `f` to every prose chunk, leaving code chunks untouched.
    #[must_use]
    pub fn map_prose(self, mut f: impl FnMut(&str) -> String) -> Self {
        let chunks = self
            .chunks
            .into_iter()
            .map(|chunk| match chunk {
                Chunk::Prose(text) => Chunk::Prose(f(&text)),
                code @ Chunk::Code(_) => code,
            })
            .collect();
        Self { chunks }
    }

    /// Ends the document with exactly one newline after its last content.
    fn trim_end(&mut self) {
        while let Some(Chunk::Prose(last)) = self.chunks.last_mut() {
            let trimmed_len = last.trim_end().len();
            if trimmed_len == 0 {
                self.chunks.pop();
                continue;
            }
            last.truncate(trimmed_len);
            last.push('\n');
            return;
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in &self.chunks {
            match chunk {
                Chunk::Prose(text) | Chunk::Code(text) => f.write_str(text)?,
            }
        }
        Ok(())
    }
}

/// Renders turns as a Markdown document.
///
/// The configuration is expected to be valid; see
/// [`ConversionConfig::validate`].
#[must_use]
pub fn render_document(turns: &[Turn], config: &ConversionConfig) -> Document {
    let mut doc = Document::default();

    if config.pretty_markdown {
        render_pretty(&mut doc, turns, config);
    } else {
        render_plain(&mut doc, turns, config);
    }

    doc.trim_end();
    if config.include_signature {
        doc.push_prose(&signature_footer());
    }
    doc
}

fn render_pretty(doc: &mut Document, turns: &[Turn], config: &ConversionConfig) {
    doc.push_prose(theme_preamble(config.theme));
    if config.include_signature {
        doc.push_prose(&format!("<!-- Generated by {TOOL_NAME} v{VERSION} -->\n\n"));
    }
    if let Some(title) = &config.title {
        doc.push_prose(&format!("# {title}\n\n"));
    }

    let depth = config.toc_levels();
    let mut toc = Vec::new();
    if depth >= 1
        && let Some(title) = &config.title
    {
        toc.push(format!("- {}", toc_link(title, config.theme)));
    }
    if depth >= 2 {
        toc.push(format!("- {}", toc_link("Turns", config.theme)));
    }
    if depth >= 3 {
        for turn in turns {
            let heading = turn_heading(turn, config);
            toc.push(format!("  - {}", toc_link(&heading, config.theme)));
        }
    }
    if !toc.is_empty() {
        doc.push_prose(&format!("## Table of Contents\n\n{}\n\n", toc.join("\n")));
    }
    if depth >= 2 {
        doc.push_prose("## Turns\n\n");
    }

    for turn in turns {
        doc.push_prose(&format!("### {}\n\n", turn_heading(turn, config)));
        render_segments(doc, &turn.segments, config);
    }
}

fn render_plain(doc: &mut Document, turns: &[Turn], config: &ConversionConfig) {
    if let Some(title) = &config.title {
        doc.push_prose(&format!("# {title}\n\n"));
    }

    if config.toc_levels() > 0 && !turns.is_empty() {
        let entries: Vec<String> = turns
            .iter()
            .map(|turn| format!("- {}", separator_label(turn, config)))
            .collect();
        doc.push_prose(&format!("## Table of Contents\n\n{}\n\n", entries.join("\n")));
    }

    for turn in turns {
        doc.push_prose(&format!("--- {} ---\n", separator_label(turn, config)));
        render_segments(doc, &turn.segments, config);
    }
}

fn render_segments(doc: &mut Document, segments: &[Segment], config: &ConversionConfig) {
    for segment in segments {
        match segment {
            Segment::Text { content } => {
                let text = escape_xml_tags(content);
                let text = match config.wrap_width() {
                    Some(width) => wrap_prose(&text, width),
                    None => text,
                };
                doc.push_prose(&format!("{text}\n\n"));
            }
            Segment::Code { language, content } => {
                let lines = content.lines().count();
                let collapse = config.pretty_markdown
                    && config
                        .collapse_code_after
                        .is_some_and(|threshold| lines >= threshold);

                if collapse {
                    let of_language = if language.is_empty() {
                        String::new()
                    } else {
                        format!(" of {language}")
                    };
                    doc.push_prose(&format!(
                        "<details>\n<summary>View {lines} lines{of_language}</summary>\n\n"
                    ));
                    doc.push_code(fenced_code(language, content));
                    doc.push_prose("</details>\n\n");
                } else {
                    doc.push_code(fenced_code(language, content));
                    doc.push_prose("\n");
                }
            }
        }
    }
}

/// Returns the heading text of a turn in pretty mode.
fn turn_heading(turn: &Turn, config: &ConversionConfig) -> String {
    if config.by_speaker {
        format!("Turn {:03} — {}", turn.index, turn.label)
    } else {
        format!("Turn {:03}", turn.index)
    }
}

/// Returns the marker text of a turn in plain mode.
fn separator_label(turn: &Turn, config: &ConversionConfig) -> String {
    if config.by_speaker {
        format!("{:03} [{}]", turn.index, turn.label)
    } else {
        format!("{:03}", turn.index)
    }
}

const fn theme_preamble(theme: Theme) -> &'static str {
    match theme {
        Theme::Light => "",
        Theme::Dark => DARK_STYLE,
        Theme::Auto => AUTO_STYLE,
        Theme::Obsidian => OBSIDIAN_FRONT_MATTER,
    }
}

fn toc_link(heading: &str, theme: Theme) -> String {
    match theme {
        Theme::Obsidian => format!("[[#{heading}]]"),
        _ => format!("[{heading}](#{})", anchor_slug(heading)),
    }
}

fn signature_footer() -> String {
    format!("\n---\n> Generated by [{TOOL_NAME} v{VERSION}]({PROJECT_URL}) — \"{TAGLINE}\"\n")
}

/// Returns the anchor a Markdown viewer assigns to a heading.
///
/// Lowercases, drops punctuation other than hyphens, and turns each
/// whitespace character into a hyphen.
#[must_use]
pub fn anchor_slug(heading: &str) -> String {
    heading
        .trim()
        .to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('-')
            } else if c.is_alphanumeric() || c == '-' || c == '_' {
                Some(c)
            } else {
                None
            }
        })
        .collect()
}

/// Wraps code in a fence longer than any backtick run inside it.
fn fenced_code(language: &str, content: &str) -> String {
    let longest_run = content
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(longest_run.max(2) + 1);
    let newline = if content.ends_with('\n') { "" } else { "\n" };
    format!("{fence}{language}\n{content}{newline}{fence}\n")
}

/// Wraps prose at `width` display columns, breaking only at whitespace.
///
/// Paragraphs stay separated by blank lines. Consecutive plain lines are
/// re-flowed together; list items are wrapped on their own with a hanging
/// indent. Words longer than `width` get a line of their own.
fn wrap_prose(text: &str, width: usize) -> String {
    text.split("\n\n")
        .map(|paragraph| wrap_paragraph(paragraph, width))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn wrap_paragraph(paragraph: &str, width: usize) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut pending: Vec<&str> = Vec::new();

    for line in paragraph.lines() {
        if let Some(marker) = LIST_ITEM.find(line) {
            if !pending.is_empty() {
                out.push(fill(&pending.join(" "), width, "", ""));
                pending.clear();
            }
            let prefix = marker.as_str();
            let indent = " ".repeat(prefix.width());
            out.push(fill(&line[marker.end()..], width, prefix, &indent));
        } else {
            pending.push(line);
        }
    }
    if !pending.is_empty() {
        out.push(fill(&pending.join(" "), width, "", ""));
    }
    out.join("\n")
}

fn fill(text: &str, width: usize, first_prefix: &str, rest_prefix: &str) -> String {
    let mut lines = Vec::new();
    let mut line = first_prefix.to_owned();
    let mut line_width = first_prefix.width();
    let mut has_word = false;

    for word in text.split_whitespace() {
        let word_width = word.width();
        if has_word && line_width + 1 + word_width > width {
            lines.push(std::mem::replace(&mut line, rest_prefix.to_owned()));
            line_width = rest_prefix.width();
            has_word = false;
        }
        if has_word {
            line.push(' ');
            line_width += 1;
        }
        line.push_str(word);
        line_width += word_width;
        has_word = true;
    }
    lines.push(line);
    lines.join("\n")
}

/// Escapes tag-like text in prose so it shows literally instead of being
/// interpreted as HTML by Markdown viewers.
///
/// Decoded page text such as `<div>` becomes `&lt;div&gt;`. Inline code
/// spans are copied as-is, since viewers do not decode entities there. A
/// backtick run without a closing run of the same length is literal text.
fn escape_xml_tags(s: &str) -> String {
    let mut result = String::with_capacity(s.len() * 2);
    let mut rest = s;

    while let Some(start) = rest.find('`') {
        result.push_str(&escape_tags(&rest[..start]));
        let run = backtick_run(&rest[start..]);
        let after = &rest[start + run..];
        if let Some(close) = closing_run(after, run) {
            let end = start + run + close + run;
            result.push_str(&rest[start..end]);
            rest = &rest[end..];
        } else {
            result.push_str(&rest[start..start + run]);
            rest = after;
        }
    }
    result.push_str(&escape_tags(rest));
    result
}

fn backtick_run(s: &str) -> usize {
    s.len() - s.trim_start_matches('`').len()
}

/// Returns the offset of the next backtick run of exactly `len` backticks.
fn closing_run(s: &str, len: usize) -> Option<usize> {
    let mut offset = 0;
    while let Some(pos) = s[offset..].find('`') {
        let start = offset + pos;
        let run = backtick_run(&s[start..]);
        if run == len {
            return Some(start);
        }
        offset = start + run;
    }
    None
}

/// Escapes `<` when followed by a letter, `/` or `!`, and the matching `>`,
/// so comparisons like `x < 5` are kept.
fn escape_tags(s: &str) -> String {
    let mut result = String::with_capacity(s.len() * 2);
    let mut chars = s.chars().peekable();
    let mut in_tag = false;

    while let Some(c) = chars.next() {
        if c == '<' {
            let is_tag_start = chars
                .peek()
                .is_some_and(|&next| next.is_ascii_alphabetic() || next == '/' || next == '!');

            if is_tag_start {
                result.push_str("&lt;");
                in_tag = true;
            } else {
                result.push(c);
            }
        } else if c == '>' && in_tag {
            result.push_str("&gt;");
            in_tag = false;
        } else {
            result.push(c);
        }
    }

    result
}

/// Serializes turns as JSON Lines, one record per line.
///
/// # Errors
///
/// Returns an error if a record cannot be serialized.
pub fn to_jsonl(turns: &[Turn]) -> Result<String, Error> {
    let mut out = String::new();
    for turn in turns {
        let line = serde_json::to_string(turn).context(SerializeSnafu { turn: turn.index })?;
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}
