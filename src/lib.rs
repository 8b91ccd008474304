// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 noct-ml

//! Convert saved chat web pages to Markdown or JSON Lines.
//!
//! This crate turns the HTML of a saved ChatGPT conversation page into
//! either a readable Markdown transcript or a JSON Lines dataset with one
//! record per turn.
//!
//! # Overview
//!
//! Conversion is a forward pipeline:
//!
//! 1. [`markup`] parses the page and strips scripts, styles and UI chrome
//! 2. [`extract`] finds the turn containers and splits their content into
//!    prose and code segments
//! 3. [`labeler`] resolves unknown speakers, numbers turns and names them
//! 4. [`renderer`] produces a Markdown [`Document`](renderer::Document) or
//!    JSON Lines records
//! 5. [`links`] optionally rewrites anchor links into Obsidian wikilinks
//!
//! Recognition rules for a particular export layout live in
//! [`classify::Heuristics`].
//!
//! # Example
//!
//! ```
//! use echoforge::config::ConversionConfig;
//!
//! let html = r#"
//!     <div data-message-author-role="user"><p>What is 2 + 2?</p></div>
//!     <div data-message-author-role="assistant"><p>4.</p></div>
//! "#;
//! let config = ConversionConfig {
//!     by_speaker: true,
//!     user_label: "James".into(),
//!     include_signature: false,
//!     ..Default::default()
//! };
//!
//! let output = echoforge::convert(html, &config).unwrap();
//! assert_eq!(
//!     output.into_string().unwrap(),
//!     "--- 001 [James] ---\nWhat is 2 + 2?\n\n--- 002 [ChatGPT] ---\n4.\n",
//! );
//! ```
//!
//! # Modules
//!
//! - [`markup`]: HTML parsing and cleanup
//! - [`classify`]: export-layout heuristics
//! - [`extract`]: turn and segment extraction
//! - [`labeler`]: speaker resolution and labels
//! - [`renderer`]: Markdown and JSON Lines output
//! - [`links`]: Obsidian link rewriting
//! - [`model`]: turn and segment types
//! - [`config`]: conversion options

#![deny(missing_docs)]

pub mod classify;
pub mod config;
pub mod extract;
pub mod labeler;
pub mod links;
pub mod markup;
pub mod model;
pub mod renderer;

use crate::classify::Heuristics;
use crate::config::{ConfigError, ConversionConfig};
use crate::model::Turn;
use crate::renderer::Document;
use snafu::prelude::*;

/// Error type for conversions.
#[derive(Debug, Snafu)]
pub enum Error {
    /// The configuration was rejected before conversion started.
    #[snafu(display("invalid configuration: {source}"))]
    Config {
        /// The validation failure.
        source: ConfigError,
    },

    /// A turn record could not be serialized.
    #[snafu(display("failed to serialize turn {turn}: {source}"))]
    Serialize {
        /// Index of the turn that failed.
        turn: usize,
        /// The underlying serialization error.
        source: serde_json::Error,
    },
}

/// The result of a conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputDocument {
    /// A Markdown transcript.
    Markdown(Document),
    /// Turn records for JSON Lines output.
    Records(Vec<Turn>),
}

impl OutputDocument {
    /// Returns the text to write.
    ///
    /// # Errors
    ///
    /// Returns an error if a record cannot be serialized.
    pub fn into_string(self) -> Result<String, Error> {
        match self {
            Self::Markdown(doc) => Ok(doc.to_string()),
            Self::Records(turns) => renderer::to_jsonl(&turns),
        }
    }
}

/// Converts a saved chat page using the default export heuristics.
///
/// # Errors
///
/// Returns an error if the configuration is invalid. Malformed markup is
/// never an error.
pub fn convert(html: &str, config: &ConversionConfig) -> Result<OutputDocument, Error> {
    convert_with(html, config, &Heuristics::default())
}

/// Converts a saved chat page using the given export heuristics.
///
/// # Errors
///
/// Returns an error if the configuration is invalid.
pub fn convert_with(
    html: &str,
    config: &ConversionConfig,
    heuristics: &Heuristics,
) -> Result<OutputDocument, Error> {
    config.validate().context(ConfigSnafu)?;

    let body = markup::normalize(html, heuristics);
    let mut raw = extract::extract_turns(&body, heuristics);
    if config.detect_plain_code {
        raw = raw
            .into_iter()
            .map(|turn| extract::split_plain_code(turn, heuristics))
            .collect();
    }
    let turns = labeler::label_turns(raw, config);
    tracing::debug!(turns = turns.len(), jsonl = config.jsonl, "converted page");

    if config.jsonl {
        return Ok(OutputDocument::Records(turns));
    }
    let doc = renderer::render_document(&turns, config);
    Ok(OutputDocument::Markdown(links::rewrite_links(doc, config)))
}
