// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 noct-ml

//! Element classification heuristics for saved chat pages.
//!
//! Saved chat pages carry no schema: speakers, turns and code blocks are
//! recognized from tag names, attributes and class tokens that change
//! between export versions. Every such rule lives in a [`Heuristics`]
//! value so that supporting a new page layout means adjusting one profile
//! rather than the normalizer or extractor.
//!
//! Class and attribute matching is by TOKEN, not substring: `sr-only`
//! matches `class="sr-only text-sm"` but not `class="not-sr-only"`.

use crate::markup::Element;
use crate::model::Role;

/// Languages recognized in "python / Copy code" plain-text code headers.
const CODE_HEADER_LANGUAGES: &[&str] = &[
    "kotlin",
    "sql",
    "scss",
    "pgsql",
    "bash",
    "vbnet",
    "python",
    "py",
    "javascript",
    "js",
    "typescript",
    "ts",
    "html",
    "css",
    "json",
    "xml",
    "yaml",
    "yml",
    "toml",
    "ini",
    "go",
    "rust",
    "c",
    "cpp",
    "java",
    "powershell",
    "ps1",
    "sh",
    "zsh",
    "dockerfile",
    "makefile",
    "perl",
    "r",
    "lua",
    "swift",
    "php",
    "objc",
    "objective-c",
];

/// A set of classification rules for one family of export layouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heuristics {
    /// Short name of the profile, used in log output.
    pub name: &'static str,

    /// Tags removed together with their content.
    pub stripped_tags: &'static [&'static str],

    /// Class tokens marking UI chrome (buttons, toolbars, screen-reader text).
    pub ui_class_tokens: &'static [&'static str],

    /// Attributes whose value names the speaker of the element.
    pub role_attributes: &'static [&'static str],

    /// Speaker names accepted in role attributes, lowercase.
    pub role_values: &'static [(&'static str, Role)],

    /// Class tokens that both mark a turn container and name its speaker.
    pub role_class_tokens: &'static [(&'static str, Role)],

    /// `data-testid` prefixes of turn wrappers that carry no speaker.
    pub turn_testid_prefixes: &'static [&'static str],

    /// Class tokens of turn wrappers that carry no speaker.
    pub turn_class_tokens: &'static [&'static str],

    /// Class tokens of elements wrapping a code block.
    pub code_class_tokens: &'static [&'static str],

    /// Class token prefixes carrying a language hint (`language-python`).
    pub language_class_prefixes: &'static [&'static str],

    /// Attributes carrying a language hint.
    pub language_attributes: &'static [&'static str],

    /// Visually hidden speaker captions that leak into text as whole lines.
    pub label_artifacts: &'static [&'static str],

    /// Language names recognized as plain-text code block headers.
    pub code_header_languages: &'static [&'static str],

    /// The line that follows a plain-text code block header.
    pub copy_code_marker: &'static str,
}

impl Heuristics {
    /// Rules for pages saved from the ChatGPT web interface.
    ///
    /// Covers the `data-message-author-role` layout and the newer layout
    /// that wraps each message in `<article data-testid="conversation-turn-N">`.
    pub const CHATGPT: Self = Self {
        name: "chatgpt",
        stripped_tags: &[
            "script", "style", "noscript", "template", "svg", "button", "nav", "form", "input",
            "textarea", "select", "option", "iframe", "canvas", "video", "audio", "object",
            "embed", "img", "picture", "link", "meta", "head", "title",
        ],
        ui_class_tokens: &[
            "sr-only",
            "visually-hidden",
            "toolbar",
            "copy-button",
            "copy-code",
            "tooltip",
            "invisible",
        ],
        role_attributes: &["data-message-author-role", "data-author-role", "data-role"],
        role_values: &[
            ("user", Role::User),
            ("human", Role::User),
            ("assistant", Role::Assistant),
            ("model", Role::Assistant),
            ("bot", Role::Assistant),
            ("ai", Role::Assistant),
        ],
        role_class_tokens: &[
            ("user-message", Role::User),
            ("human-message", Role::User),
            ("assistant-message", Role::Assistant),
            ("bot-message", Role::Assistant),
        ],
        turn_testid_prefixes: &["conversation-turn"],
        turn_class_tokens: &["chat-message", "conversation-turn"],
        code_class_tokens: &["code-block", "codehilite", "sourceCode"],
        language_class_prefixes: &["language-", "lang-"],
        language_attributes: &["data-language", "data-lang"],
        label_artifacts: &["You said:", "ChatGPT said:"],
        code_header_languages: CODE_HEADER_LANGUAGES,
        copy_code_marker: "Copy code",
    };

    /// Returns `true` if the element and everything inside it should be removed.
    #[must_use]
    pub fn is_stripped(&self, element: &Element) -> bool {
        if has_token(self.stripped_tags, &element.tag) {
            return true;
        }
        if element.attr("hidden").is_some() || element.attr("aria-hidden") == Some("true") {
            return true;
        }
        element
            .classes()
            .any(|token| has_token(self.ui_class_tokens, token))
    }

    /// Returns the speaker named by the element itself, if any.
    #[must_use]
    pub fn role_signal(&self, element: &Element) -> Option<Role> {
        for name in self.role_attributes {
            if let Some(value) = element.attr(name) {
                let value = value.trim().to_ascii_lowercase();
                if let Some((_, role)) = self.role_values.iter().find(|(v, _)| *v == value) {
                    return Some(*role);
                }
            }
        }
        element.classes().find_map(|token| {
            self.role_class_tokens
                .iter()
                .find(|(t, _)| *t == token)
                .map(|(_, role)| *role)
        })
    }

    /// Returns the first speaker signal found below the element.
    #[must_use]
    pub fn descendant_role(&self, element: &Element) -> Option<Role> {
        element
            .child_elements()
            .find_map(|child| self.role_signal(child).or_else(|| self.descendant_role(child)))
    }

    /// Returns `true` if the element wraps one conversational turn.
    #[must_use]
    pub fn is_turn_container(&self, element: &Element) -> bool {
        if self.role_signal(element).is_some() {
            return true;
        }
        if element.attr("data-testid").is_some_and(|id| {
            self.turn_testid_prefixes
                .iter()
                .any(|prefix| id.starts_with(prefix))
        }) {
            return true;
        }
        element
            .classes()
            .any(|token| has_token(self.turn_class_tokens, token))
    }

    /// Returns `true` if the element wraps a block of code.
    #[must_use]
    pub fn is_code_container(&self, element: &Element) -> bool {
        match element.tag.as_str() {
            "pre" => true,
            "code" => self.own_language(element).is_some(),
            _ => element
                .classes()
                .any(|token| has_token(self.code_class_tokens, token)),
        }
    }

    /// Returns the language hint of a code container, searching its descendants.
    #[must_use]
    pub fn code_language(&self, element: &Element) -> Option<String> {
        self.own_language(element).or_else(|| {
            element
                .child_elements()
                .find_map(|child| self.code_language(child))
        })
    }

    fn own_language(&self, element: &Element) -> Option<String> {
        for name in self.language_attributes {
            if let Some(lang) = element.attr(name).map(str::trim).filter(|l| !l.is_empty()) {
                return Some(lang.to_owned());
            }
        }
        element.classes().find_map(|token| {
            self.language_class_prefixes
                .iter()
                .find_map(|prefix| token.strip_prefix(prefix))
                .filter(|lang| !lang.is_empty())
                .map(str::to_owned)
        })
    }

    /// Returns `true` if the whole line is a leaked speaker caption.
    #[must_use]
    pub fn is_label_artifact(&self, line: &str) -> bool {
        let line = line.trim().trim_end_matches('<').trim_end();
        self.label_artifacts
            .iter()
            .any(|artifact| line.eq_ignore_ascii_case(artifact))
    }

    /// Returns the language named by a plain-text code header line.
    #[must_use]
    pub fn code_header_language(&self, line: &str) -> Option<&'static str> {
        let line = line.trim();
        self.code_header_languages
            .iter()
            .find(|lang| line.eq_ignore_ascii_case(lang))
            .copied()
    }

    /// Returns `true` if the line is the copy affordance under a code header.
    #[must_use]
    pub fn is_copy_code_marker(&self, line: &str) -> bool {
        line.trim().eq_ignore_ascii_case(self.copy_code_marker)
    }
}

fn has_token(tokens: &[&str], token: &str) -> bool {
    tokens.iter().any(|t| *t == token)
}

impl Default for Heuristics {
    fn default() -> Self {
        Self::CHATGPT
    }
}
