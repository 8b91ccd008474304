// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 noct-ml

//! Conversation types shared by the extractor, labeler and renderer.
//!
//! A conversation is an ordered list of [`Turn`]s. Each turn holds the
//! speaker [`Role`] and an ordered list of [`Segment`]s, where a segment is
//! either prose or a verbatim code block.
//!
//! The serde shape of [`Turn`] is the dataset record written one per line
//! in JSON Lines mode:
//!
//! ```
//! use echoforge::model::{Role, Segment, Turn};
//!
//! let turn = Turn {
//!     index: 1,
//!     role: Role::User,
//!     label: "James".into(),
//!     segments: vec![Segment::code("python", "print(1)")],
//! };
//!
//! let json = serde_json::to_string(&turn).unwrap();
//! assert_eq!(
//!     json,
//!     r#"{"turn":1,"role":"user","label":"James","segments":[{"type":"code","language":"python","content":"print(1)"}]}"#
//! );
//! ```

use serde::{Deserialize, Serialize};

/// The speaker of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person talking to the assistant.
    User,
    /// The chat assistant.
    Assistant,
    /// No speaker signal was found in the markup.
    ///
    /// The labeler resolves every unknown turn before rendering.
    Unknown,
}

impl Role {
    /// Returns the other side of the conversation.
    ///
    /// `Unknown` has no opposite and maps to `User`, which is where a
    /// conversation normally starts.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::User => Self::Assistant,
            Self::Assistant | Self::Unknown => Self::User,
        }
    }
}

/// A contiguous piece of turn content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Segment {
    /// Prose with inline markup flattened to plain text and line breaks.
    Text {
        /// The prose text.
        content: String,
    },

    /// A code block, reproduced verbatim.
    Code {
        /// Language hint from the markup (e.g. `python`), possibly empty.
        #[serde(default, skip_serializing_if = "String::is_empty")]
        language: String,
        /// The code exactly as it appeared, minus surrounding blank lines.
        content: String,
    },
}

impl Segment {
    /// Creates a [`Segment::Text`].
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    /// Creates a [`Segment::Code`].
    pub fn code(language: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Code {
            language: language.into(),
            content: content.into(),
        }
    }

    /// Returns the segment's text, prose or code.
    #[must_use]
    pub fn content(&self) -> &str {
        match self {
            Self::Text { content } | Self::Code { content, .. } => content,
        }
    }

    /// Returns `true` for [`Segment::Code`].
    #[must_use]
    pub const fn is_code(&self) -> bool {
        matches!(self, Self::Code { .. })
    }
}

/// A labeled, numbered conversational turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// 1-based position in the conversation.
    #[serde(rename = "turn")]
    pub index: usize,

    /// The resolved speaker.
    pub role: Role,

    /// Display name for the speaker (e.g. the user's name or "ChatGPT").
    pub label: String,

    /// Content in document order.
    pub segments: Vec<Segment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_alternates_known_roles() {
        assert_eq!(Role::User.opposite(), Role::Assistant);
        assert_eq!(Role::Assistant.opposite(), Role::User);
        assert_eq!(Role::Unknown.opposite(), Role::User);
    }

    #[test]
    fn text_segment_serializes_without_language() {
        let json = serde_json::to_string(&Segment::text("hi")).unwrap();
        assert_eq!(json, r#"{"type":"text","content":"hi"}"#);
    }

    #[test]
    fn code_segment_omits_empty_language() {
        let json = serde_json::to_string(&Segment::code("", "x = 1")).unwrap();
        assert_eq!(json, r#"{"type":"code","content":"x = 1"}"#);
    }

    #[test]
    fn code_segment_without_language_deserializes() {
        let segment: Segment = serde_json::from_str(r#"{"type":"code","content":"x"}"#).unwrap();
        assert_eq!(segment, Segment::code("", "x"));
    }

    #[test]
    fn turn_serializes_index_as_turn() {
        let turn = Turn {
            index: 3,
            role: Role::Assistant,
            label: "ChatGPT".into(),
            segments: vec![],
        };
        let value = serde_json::to_value(&turn).unwrap();

        assert_eq!(value["turn"], 3);
        assert_eq!(value["role"], "assistant");
        assert!(value.get("index").is_none());
    }

    #[test]
    fn content_returns_text_of_either_variant() {
        assert_eq!(Segment::text("a").content(), "a");
        assert_eq!(Segment::code("rs", "b").content(), "b");
        assert!(Segment::code("rs", "b").is_code());
        assert!(!Segment::text("a").is_code());
    }
}
