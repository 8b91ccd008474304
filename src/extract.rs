// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 noct-ml

//! Turn extraction from a normalized markup tree.
//!
//! The extractor walks the tree produced by [`crate::markup::normalize`] in
//! document order. Every element the [`Heuristics`] recognize as a turn
//! container becomes one [`RawTurn`]; its content is split into prose and
//! code [`Segment`]s in the order they appear.
//!
//! Extraction never fails. Missing structure degrades to an
//! [`Role::Unknown`] speaker or to plain text.
//!
//! # Example
//!
//! ```
//! use echoforge::classify::Heuristics;
//! use echoforge::extract::extract_turns;
//! use echoforge::markup::normalize;
//! use echoforge::model::{Role, Segment};
//!
//! let h = Heuristics::default();
//! let body = normalize(
//!     r#"<div data-message-author-role="user"><p>Hi!</p></div>"#,
//!     &h,
//! );
//! let turns = extract_turns(&body, &h);
//!
//! assert_eq!(turns.len(), 1);
//! assert_eq!(turns[0].role, Role::User);
//! assert_eq!(turns[0].segments, vec![Segment::text("Hi!")]);
//! ```

use crate::classify::Heuristics;
use crate::markup::{Element, Node};
use crate::model::{Role, Segment};
use regex::Regex;
use std::sync::LazyLock;

/// Lines that end a plain-text code block: Markdown headings, list items
/// and transcript separators such as `--- 002 [ChatGPT] ---`.
static CODE_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:#{1,6}\s|[-*+]\s|\d+\.\s|---\s*\d+\s*\[|```|</?details>|Quick extras?:)")
        .expect("CODE_BOUNDARY: hardcoded regex is valid")
});

/// An extracted turn before labeling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTurn {
    /// The speaker found in the markup, or [`Role::Unknown`].
    pub role: Role,
    /// Content in document order. Never empty.
    pub segments: Vec<Segment>,
}

/// Extracts the conversation turns from a normalized `<body>`.
///
/// Turn containers without extractable content are dropped. When the page
/// contains no turn container at all, its whole content becomes a single
/// turn with an unknown speaker.
#[must_use]
pub fn extract_turns(root: &Element, heuristics: &Heuristics) -> Vec<RawTurn> {
    let mut walker = TurnWalker {
        heuristics,
        turns: Vec::new(),
        containers: 0,
    };
    walker.walk(root, None);

    if walker.containers == 0 {
        tracing::debug!("no turn containers found, treating page as one turn");
        let segments = collect_segments(root, heuristics);
        if segments.is_empty() {
            return Vec::new();
        }
        return vec![RawTurn {
            role: Role::Unknown,
            segments,
        }];
    }

    tracing::debug!(
        containers = walker.containers,
        turns = walker.turns.len(),
        "extracted turns"
    );
    walker.turns
}

struct TurnWalker<'h> {
    heuristics: &'h Heuristics,
    turns: Vec<RawTurn>,
    containers: usize,
}

impl TurnWalker<'_> {
    fn walk(&mut self, element: &Element, inherited: Option<Role>) {
        for child in element.child_elements() {
            if self.is_turn(child) {
                self.containers += 1;
                let role = self
                    .heuristics
                    .role_signal(child)
                    .or(inherited)
                    .or_else(|| self.heuristics.descendant_role(child))
                    .unwrap_or(Role::Unknown);
                let segments = collect_segments(child, self.heuristics);
                if segments.is_empty() {
                    tracing::trace!(?role, "dropped empty turn container");
                } else {
                    self.turns.push(RawTurn { role, segments });
                }
            } else {
                let inherited = self.heuristics.role_signal(child).or(inherited);
                self.walk(child, inherited);
            }
        }
    }

    /// A speaker-tagged element that wraps further turn containers is a
    /// group of messages, not a turn; its speaker passes down instead.
    fn is_turn(&self, element: &Element) -> bool {
        if !self.heuristics.is_turn_container(element) {
            return false;
        }
        self.heuristics.role_signal(element).is_none() || !self.contains_turn(element)
    }

    fn contains_turn(&self, element: &Element) -> bool {
        element.child_elements().any(|child| {
            self.heuristics.is_turn_container(child) || self.contains_turn(child)
        })
    }
}

/// Splits the content of one turn container into segments.
fn collect_segments(container: &Element, heuristics: &Heuristics) -> Vec<Segment> {
    let mut builder = SegmentBuilder {
        heuristics,
        segments: Vec::new(),
        prose: String::new(),
        lists: Vec::new(),
        item_start: None,
    };
    // A code block can itself carry the speaker and be the whole turn
    if heuristics.is_code_container(container) {
        builder.push_code(container);
    } else {
        builder.walk(container);
    }
    builder.flush_prose();
    builder.segments
}

struct SegmentBuilder<'h> {
    heuristics: &'h Heuristics,
    segments: Vec<Segment>,
    prose: String,
    /// Open lists, innermost last; `Some(n)` is an ordered list at item `n`.
    lists: Vec<Option<usize>>,
    /// Length of `prose` right after the last list marker was pushed.
    item_start: Option<usize>,
}

impl SegmentBuilder<'_> {
    fn walk(&mut self, element: &Element) {
        for child in &element.children {
            match child {
                Node::Text(text) => self.push_inline(&collapse_whitespace(text)),
                Node::Element(child) => self.visit(child),
            }
        }
    }

    fn visit(&mut self, element: &Element) {
        if self.heuristics.is_code_container(element) {
            self.push_code(element);
            return;
        }

        match element.tag.as_str() {
            "br" => self.prose.push('\n'),
            "hr" => self.paragraph_break(),
            "ul" | "ol" => {
                self.line_break();
                self.lists.push((element.tag == "ol").then_some(0));
                self.walk(element);
                self.lists.pop();
                self.line_break();
            }
            "li" => {
                self.line_break();
                let indent = " ".repeat(self.list_indent());
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        *n += 1;
                        format!("{indent}{n}. ")
                    }
                    _ => format!("{indent}- "),
                };
                self.prose.push_str(&marker);
                self.item_start = Some(self.prose.len());
                self.walk(element);
                self.line_break();
            }
            "tr" => {
                self.line_break();
                self.walk(element);
                self.line_break();
            }
            "td" | "th" => {
                self.walk(element);
                self.push_inline(" ");
            }
            "code" => {
                self.prose.push('`');
                self.push_inline(&collapse_whitespace(&element.text()));
                self.prose.push('`');
            }
            "a" => self.push_link(element),
            tag if is_block(tag) => {
                self.paragraph_break();
                self.walk(element);
                self.paragraph_break();
            }
            _ => self.walk(element),
        }
    }

    /// Appends collapsed inline text without doubling spaces.
    fn push_inline(&mut self, text: &str) {
        let at_boundary = self.prose.is_empty() || self.prose.ends_with([' ', '\n']);
        let text = if at_boundary {
            text.trim_start_matches(' ')
        } else {
            text
        };
        self.prose.push_str(text);
    }

    fn push_link(&mut self, element: &Element) {
        let text = collapse_whitespace(&element.text());
        let href = element.attr("href").map(str::trim).unwrap_or_default();
        let linkable = !href.is_empty() && !href.starts_with("javascript:");

        if linkable && !text.trim().is_empty() && text.trim() != href {
            self.push_inline(&format!("[{}]({href})", text.trim()));
        } else {
            self.walk(element);
        }
    }

    fn push_code(&mut self, element: &Element) {
        let payload = code_payload(element);
        let mut raw = String::new();
        collect_raw_text(payload, &mut raw);
        let raw = raw.replace("\r\n", "\n").replace('\r', "\n");
        let code = trim_blank_lines(&raw);

        if code.is_empty() {
            tracing::trace!("skipped empty code block");
            return;
        }

        let language = self.heuristics.code_language(element).unwrap_or_default();
        self.flush_prose();
        self.segments.push(Segment::code(language, code));
    }

    /// Columns taken by the markers of the enclosing lists.
    fn list_indent(&self) -> usize {
        let outer = self.lists.len().saturating_sub(1);
        self.lists[..outer]
            .iter()
            .map(|list| if list.is_some() { 3 } else { 2 })
            .sum()
    }

    /// `true` while nothing has followed the current list marker.
    fn at_item_start(&self) -> bool {
        self.item_start == Some(self.prose.len())
    }

    fn line_break(&mut self) {
        if self.at_item_start() {
            return;
        }
        if !self.prose.is_empty() && !self.prose.ends_with('\n') {
            self.prose.push('\n');
        }
    }

    fn paragraph_break(&mut self) {
        // Paragraphs inside a list item stay in the item
        if !self.lists.is_empty() {
            self.line_break();
            return;
        }
        if self.prose.is_empty() {
            return;
        }
        while !self.prose.ends_with("\n\n") {
            self.prose.push('\n');
        }
    }

    fn flush_prose(&mut self) {
        let text = finish_prose(&self.prose, self.heuristics);
        self.prose.clear();
        if !text.is_empty() {
            self.segments.push(Segment::text(text));
        }
    }
}

fn is_block(tag: &str) -> bool {
    matches!(
        tag,
        "p" | "div"
            | "section"
            | "article"
            | "main"
            | "aside"
            | "header"
            | "footer"
            | "blockquote"
            | "figure"
            | "figcaption"
            | "table"
            | "thead"
            | "tbody"
            | "dl"
            | "dt"
            | "dd"
            | "details"
            | "summary"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
    )
}

/// Returns the element holding the code text itself.
///
/// Exported pages often put a language caption and a copy button next to
/// the code inside the same wrapper, so the innermost `code` element wins,
/// then a `pre`, then the container itself.
fn code_payload(container: &Element) -> &Element {
    find_descendant(container, "code")
        .or_else(|| find_descendant(container, "pre"))
        .unwrap_or(container)
}

fn find_descendant<'a>(element: &'a Element, tag: &str) -> Option<&'a Element> {
    element.child_elements().find_map(|child| {
        if child.tag == tag {
            Some(child)
        } else {
            find_descendant(child, tag)
        }
    })
}

/// Collects text exactly as written, with `<br>` as a newline.
fn collect_raw_text(element: &Element, out: &mut String) {
    for child in &element.children {
        match child {
            Node::Text(text) => out.push_str(text),
            Node::Element(child) if child.tag == "br" => out.push('\n'),
            Node::Element(child) => collect_raw_text(child, out),
        }
    }
}

/// Removes whitespace-only lines at both ends, keeping everything between.
fn trim_blank_lines(code: &str) -> &str {
    let mut start = 0;
    for line in code.split_inclusive('\n') {
        if !line.trim().is_empty() {
            break;
        }
        start += line.len();
    }

    let mut code = &code[start..];
    if code.trim().is_empty() {
        return "";
    }
    while let Some(pos) = code.rfind('\n') {
        if code[pos + 1..].trim().is_empty() {
            code = &code[..pos];
        } else {
            break;
        }
    }
    code
}

/// Collapses runs of ASCII whitespace into single spaces.
///
/// Non-ASCII whitespace such as no-break spaces is content and kept.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_ascii_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Trims line ends, drops leaked speaker captions and collapses blank runs.
///
/// Leading spaces only come from nested list markers and are kept.
fn finish_prose(raw: &str, heuristics: &Heuristics) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut blank_pending = false;

    for line in raw.lines() {
        let line = line.trim_end_matches(' ');
        if line.trim().is_empty() {
            blank_pending = true;
            continue;
        }
        if heuristics.is_label_artifact(line) {
            continue;
        }
        if !out.is_empty() {
            out.push_str(if blank_pending { "\n\n" } else { "\n" });
        }
        out.push_str(line);
        blank_pending = false;
    }
    out
}

/// Turns "python / Copy code" headers found in prose into code segments.
///
/// Some saved pages lose the `<pre>` structure and leave the code block
/// caption and copy button as plain lines. A line naming a known language,
/// followed by the copy marker, opens a code block that runs until a
/// boundary line (another header, a heading, a list item, a fence or a
/// transcript separator) or the end of the segment.
#[must_use]
pub fn split_plain_code(turn: RawTurn, heuristics: &Heuristics) -> RawTurn {
    let segments = turn
        .segments
        .into_iter()
        .flat_map(|segment| match segment {
            Segment::Text { content } => split_text(&content, heuristics),
            code @ Segment::Code { .. } => vec![code],
        })
        .collect();
    RawTurn {
        role: turn.role,
        segments,
    }
}

fn split_text(text: &str, heuristics: &Heuristics) -> Vec<Segment> {
    let lines: Vec<&str> = text.lines().collect();
    let mut segments = Vec::new();
    let mut prose: Vec<&str> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let Some((language, body_start)) = code_header_at(&lines, i, heuristics) else {
            prose.push(lines[i]);
            i += 1;
            continue;
        };

        let body_end = (body_start..lines.len())
            .find(|&j| is_code_boundary(lines[j], heuristics))
            .unwrap_or(lines.len());
        let body = lines[body_start..body_end].join("\n");
        let code = trim_blank_lines(&body);

        if code.is_empty() {
            prose.extend_from_slice(&lines[i..body_end]);
        } else {
            push_prose_lines(&mut segments, &mut prose);
            segments.push(Segment::code(language, code));
        }
        i = body_end;
    }

    push_prose_lines(&mut segments, &mut prose);
    segments
}

/// Matches a language line followed (after blank lines) by the copy marker.
fn code_header_at(
    lines: &[&str],
    i: usize,
    heuristics: &Heuristics,
) -> Option<(&'static str, usize)> {
    let language = heuristics.code_header_language(lines[i])?;
    let marker = (i + 1..lines.len()).find(|&j| !lines[j].trim().is_empty())?;
    heuristics
        .is_copy_code_marker(lines[marker])
        .then_some((language, marker + 1))
}

fn is_code_boundary(line: &str, heuristics: &Heuristics) -> bool {
    heuristics.code_header_language(line).is_some()
        || heuristics.is_label_artifact(line)
        || CODE_BOUNDARY.is_match(line)
}

fn push_prose_lines(segments: &mut Vec<Segment>, prose: &mut Vec<&str>) {
    let text = prose.join("\n");
    prose.clear();
    let text = text.trim();
    if !text.is_empty() {
        segments.push(Segment::text(text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::normalize;

    fn turns(html: &str) -> Vec<RawTurn> {
        let h = Heuristics::default();
        extract_turns(&normalize(html, &h), &h)
    }

    fn user(body: &str) -> String {
        format!(r#"<div data-message-author-role="user">{body}</div>"#)
    }

    fn assistant(body: &str) -> String {
        format!(r#"<div data-message-author-role="assistant">{body}</div>"#)
    }

    #[test]
    fn extracts_turns_in_document_order() {
        let html = format!("{}{}", user("<p>Question</p>"), assistant("<p>Answer</p>"));
        let turns = turns(&html);

        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].segments, vec![Segment::text("Question")]);
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[1].segments, vec![Segment::text("Answer")]);
    }

    #[test]
    fn coalesces_inline_text_into_one_segment() {
        let turns = turns(&assistant("<p>Use <b>bold</b> and <em>emphasis</em> here.</p>"));
        assert_eq!(
            turns[0].segments,
            vec![Segment::text("Use bold and emphasis here.")]
        );
    }

    #[test]
    fn separates_paragraphs_with_blank_line() {
        let turns = turns(&assistant("<p>One</p><p>Two</p>"));
        assert_eq!(turns[0].segments, vec![Segment::text("One\n\nTwo")]);
    }

    #[test]
    fn converts_line_breaks() {
        let turns = turns(&user("<p>line one<br>line two</p>"));
        assert_eq!(turns[0].segments, vec![Segment::text("line one\nline two")]);
    }

    #[test]
    fn renders_list_items() {
        let turns = turns(&assistant(
            "<p>Steps:</p><ol><li>First</li><li>Second</li></ol><ul><li>dot</li></ul>",
        ));
        assert_eq!(
            turns[0].segments,
            vec![Segment::text("Steps:\n\n1. First\n2. Second\n- dot")]
        );
    }

    #[test]
    fn keeps_paragraphs_inside_list_items_on_the_marker_line() {
        let turns = turns(&assistant(
            "<ol><li><p><strong>Install</strong> the tool.</p><ul><li>use cargo</li></ul></li><li><p>Run it.</p></li></ol>",
        ));
        assert_eq!(
            turns[0].segments,
            vec![Segment::text("1. Install the tool.\n   - use cargo\n2. Run it.")]
        );
    }

    #[test]
    fn indents_nested_lists_by_depth() {
        let turns = turns(&assistant(
            "<ul><li>a<ul><li>b<ul><li>c</li></ul></li></ul></li><li>d</li></ul>",
        ));
        assert_eq!(
            turns[0].segments,
            vec![Segment::text("- a\n  - b\n    - c\n- d")]
        );
    }

    #[test]
    fn code_block_carrying_the_speaker_stays_code() {
        let turns = turns(r#"<pre data-role="assistant"><code>a</code></pre>"#);
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role, Role::Assistant);
        assert_eq!(turns[0].segments, vec![Segment::code("", "a")]);
    }

    #[test]
    fn keeps_interleaved_text_and_code_in_order() {
        let turns = turns(&assistant(
            r#"<p>Before</p><pre><code class="language-python">print("hi")</code></pre><p>After</p>"#,
        ));
        assert_eq!(
            turns[0].segments,
            vec![
                Segment::text("Before"),
                Segment::code("python", r#"print("hi")"#),
                Segment::text("After"),
            ]
        );
    }

    #[test]
    fn preserves_code_whitespace_exactly() {
        let code = "def f(x):\n    if x:\n\treturn  x  \n\n    return None";
        let html = assistant(&format!(
            "<pre><code>\n\n{code}\n   \n</code></pre>"
        ));
        let turns = turns(&html);
        assert_eq!(turns[0].segments, vec![Segment::code("", code)]);
    }

    #[test]
    fn takes_code_text_without_caption_and_copy_button() {
        let html = assistant(
            r#"<pre><div class="header"><span>rust</span><button>Copy code</button></div><div><code class="hljs language-rust"><span class="kw">fn</span> main() {}</code></div></pre>"#,
        );
        let turns = turns(&html);
        assert_eq!(turns[0].segments, vec![Segment::code("rust", "fn main() {}")]);
    }

    #[test]
    fn reads_language_from_pre_attribute() {
        let turns = turns(&assistant(r#"<pre data-language="sql">SELECT 1;</pre>"#));
        assert_eq!(turns[0].segments, vec![Segment::code("sql", "SELECT 1;")]);
    }

    #[test]
    fn code_line_breaks_from_br_elements() {
        let turns = turns(&assistant("<pre><code>a<br>b</code></pre>"));
        assert_eq!(turns[0].segments, vec![Segment::code("", "a\nb")]);
    }

    #[test]
    fn normalizes_carriage_returns_in_code() {
        let turns = turns(&assistant("<pre><code>a\r\nb</code></pre>"));
        assert_eq!(turns[0].segments, vec![Segment::code("", "a\nb")]);
    }

    #[test]
    fn inline_code_stays_in_prose() {
        let turns = turns(&assistant("<p>Call <code>foo()</code> now.</p>"));
        assert_eq!(turns[0].segments, vec![Segment::text("Call `foo()` now.")]);
    }

    #[test]
    fn keeps_links_as_markdown() {
        let turns = turns(&assistant(
            r##"<p>See <a href="#setup">the setup</a> and <a href="https://x.dev">https://x.dev</a>.</p>"##,
        ));
        assert_eq!(
            turns[0].segments,
            vec![Segment::text("See [the setup](#setup) and https://x.dev.")]
        );
    }

    #[test]
    fn drops_containers_without_content() {
        let html = format!(
            "{}{}{}",
            user("<p>Hi</p>"),
            assistant("<button>Retry</button><span> </span>"),
            assistant("<p>Hello</p>")
        );
        let turns = turns(&html);
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1].segments, vec![Segment::text("Hello")]);
    }

    #[test]
    fn missing_role_signal_is_unknown() {
        let turns = turns(r#"<div class="chat-message"><p>Who am I?</p></div>"#);
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role, Role::Unknown);
    }

    #[test]
    fn inherits_role_from_ancestor_group() {
        let turns = turns(
            r#"<section data-role="assistant">
                 <div class="chat-message"><p>One</p></div>
                 <div class="chat-message"><p>Two</p></div>
               </section>"#,
        );
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::Assistant);
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[1].segments, vec![Segment::text("Two")]);
    }

    #[test]
    fn reads_role_from_descendant_of_article_wrapper() {
        let turns = turns(
            r#"<article data-testid="conversation-turn-1"><h5 class="sr-only">You said:</h5>
               <div><div data-message-author-role="user"><p>Nested</p></div></div></article>
               <article data-testid="conversation-turn-2">
               <div data-message-author-role="assistant"><p>Reply</p></div></article>"#,
        );
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].segments, vec![Segment::text("Nested")]);
        assert_eq!(turns[1].role, Role::Assistant);
    }

    #[test]
    fn page_without_containers_becomes_one_unknown_turn() {
        let turns = turns("<div><p>Loose transcript</p></div>");
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role, Role::Unknown);
        assert_eq!(turns[0].segments, vec![Segment::text("Loose transcript")]);
    }

    #[test]
    fn empty_page_has_no_turns() {
        assert!(turns("").is_empty());
        assert!(turns("<html><body>   </body></html>").is_empty());
    }

    #[test]
    fn removes_leaked_speaker_captions() {
        let turns = turns(&user("<div>You said:</div><p>Real text</p>"));
        assert_eq!(turns[0].segments, vec![Segment::text("Real text")]);
    }

    #[test]
    fn passes_emoji_and_symbols_through() {
        let turns = turns(&user("<p>Ship it 🚀 — “now” → 5°</p>"));
        assert_eq!(turns[0].segments, vec![Segment::text("Ship it 🚀 — “now” → 5°")]);
    }

    #[test]
    fn splits_plain_code_headers() {
        let h = Heuristics::default();
        let turn = RawTurn {
            role: Role::Assistant,
            segments: vec![Segment::text(
                "Try this:\npython\n\nCopy code\nimport os\nprint(os.name)\n# Notes\nDone.",
            )],
        };
        let turn = split_plain_code(turn, &h);
        assert_eq!(
            turn.segments,
            vec![
                Segment::text("Try this:"),
                Segment::code("python", "import os\nprint(os.name)"),
                Segment::text("# Notes\nDone."),
            ]
        );
    }

    #[test]
    fn plain_code_runs_to_end_of_segment() {
        let h = Heuristics::default();
        let turn = RawTurn {
            role: Role::Assistant,
            segments: vec![Segment::text("bash\nCopy code\nls -la")],
        };
        let turn = split_plain_code(turn, &h);
        assert_eq!(turn.segments, vec![Segment::code("bash", "ls -la")]);
    }

    #[test]
    fn language_word_without_copy_marker_stays_prose() {
        let h = Heuristics::default();
        let turn = RawTurn {
            role: Role::User,
            segments: vec![Segment::text("rust\nis nice")],
        };
        let turn = split_plain_code(turn, &h);
        assert_eq!(turn.segments, vec![Segment::text("rust\nis nice")]);
    }

    #[test]
    fn plain_code_split_leaves_code_segments_alone() {
        let h = Heuristics::default();
        let code = Segment::code("", "python\nCopy code\nx");
        let turn = RawTurn {
            role: Role::User,
            segments: vec![code.clone()],
        };
        assert_eq!(split_plain_code(turn, &h).segments, vec![code]);
    }

    #[test]
    fn trims_only_blank_edge_lines() {
        assert_eq!(trim_blank_lines("\n  \n  x\n y \n\n"), "  x\n y ");
        assert_eq!(trim_blank_lines(" \n\t\n"), "");
        assert_eq!(trim_blank_lines("x"), "x");
    }

    #[test]
    fn collapses_ascii_whitespace_only() {
        assert_eq!(collapse_whitespace("a \n\t b"), "a b");
        assert_eq!(collapse_whitespace("a\u{a0}\u{a0}b"), "a\u{a0}\u{a0}b");
    }
}
