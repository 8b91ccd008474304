// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 noct-ml

//! Conversion options.
//!
//! [`ConversionConfig`] is built once (usually by the command-line layer)
//! and passed by reference to every stage that needs it. It is checked with
//! [`ConversionConfig::validate`] before any markup is parsed.

use snafu::prelude::*;
use std::fmt;
use std::str::FromStr;

/// Error type for rejected configuration values.
#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum ConfigError {
    /// The wrap width was zero or negative.
    #[snafu(display("max width must be a positive number of columns, got {width}"))]
    InvalidMaxWidth {
        /// The rejected width.
        width: i32,
    },

    /// The table of contents depth was negative.
    #[snafu(display("toc depth must be 0 or greater, got {depth}"))]
    InvalidTocDepth {
        /// The rejected depth.
        depth: i32,
    },

    /// The code collapse threshold was zero.
    #[snafu(display("code collapse threshold must be at least 1 line"))]
    InvalidCollapseThreshold,

    /// A theme name that is not one of the supported themes.
    #[snafu(display("unknown theme {name:?} (expected light, dark, auto or obsidian)"))]
    UnknownTheme {
        /// The name that was given.
        name: String,
    },
}

/// Cosmetic styling for document mode.
///
/// Themes only change decoration around the content (a style block, front
/// matter, table of contents link syntax); content is never altered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    /// No styling.
    #[default]
    Light,
    /// Dark colors via an embedded style block.
    Dark,
    /// Dark colors when the viewer prefers a dark color scheme.
    Auto,
    /// Obsidian front matter and wikilinks in the table of contents.
    Obsidian,
}

impl FromStr for Theme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "auto" => Ok(Self::Auto),
            "obsidian" => Ok(Self::Obsidian),
            _ => UnknownThemeSnafu { name: s }.fail(),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::Auto => "auto",
            Self::Obsidian => "obsidian",
        })
    }
}

/// The full set of options for one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ConversionConfig {
    /// Label each turn with its speaker.
    ///
    /// When disabled, turns are separated by numbered headers only.
    pub by_speaker: bool,

    /// Display name for the user's turns.
    pub user_label: String,

    /// Emit JSON Lines records instead of a Markdown document.
    pub jsonl: bool,

    /// Emit a Markdown document with headings, table of contents and theme.
    pub pretty_markdown: bool,

    /// Wrap prose at this many display columns. `None` disables wrapping.
    pub max_width: Option<i32>,

    /// Table of contents depth; 0 disables it.
    ///
    /// 1 lists the title, 2 adds the turns section, 3 adds every turn.
    pub toc_depth: i32,

    /// Document title.
    pub title: Option<String>,

    /// Cosmetic theme for document mode.
    pub theme: Theme,

    /// Rewrite in-document anchor links as Obsidian wikilinks.
    pub obsidian_links: bool,

    /// Append a closing line naming the tool and its version.
    pub include_signature: bool,

    /// Recognize "language / Copy code" headers in plain text as code.
    pub detect_plain_code: bool,

    /// In pretty mode, fold code blocks of at least this many lines into a
    /// collapsible `<details>` element.
    pub collapse_code_after: Option<usize>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            by_speaker: false,
            user_label: "User".into(),
            jsonl: false,
            pretty_markdown: false,
            max_width: None,
            toc_depth: 0,
            title: None,
            theme: Theme::Light,
            obsidian_links: false,
            include_signature: true,
            detect_plain_code: true,
            collapse_code_after: None,
        }
    }
}

impl ConversionConfig {
    /// Checks option values that indicate caller misuse.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_width` is zero or negative, `toc_depth` is
    /// negative, or `collapse_code_after` is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use echoforge::config::ConversionConfig;
    ///
    /// let config = ConversionConfig {
    ///     max_width: Some(0),
    ///     ..Default::default()
    /// };
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(width) = self.max_width {
            ensure!(width > 0, InvalidMaxWidthSnafu { width });
        }
        ensure!(
            self.toc_depth >= 0,
            InvalidTocDepthSnafu {
                depth: self.toc_depth
            }
        );
        ensure!(
            self.collapse_code_after != Some(0),
            InvalidCollapseThresholdSnafu
        );
        Ok(())
    }

    /// Returns the wrap width in columns, if wrapping is enabled.
    #[must_use]
    pub fn wrap_width(&self) -> Option<usize> {
        self.max_width
            .and_then(|width| usize::try_from(width).ok())
            .filter(|&width| width > 0)
    }

    /// Returns the table of contents depth, treating invalid values as 0.
    #[must_use]
    pub fn toc_levels(&self) -> usize {
        usize::try_from(self.toc_depth).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(ConversionConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_zero_max_width() {
        let config = ConversionConfig {
            max_width: Some(0),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidMaxWidth { width: 0 })
        );
    }

    #[test]
    fn rejects_negative_max_width() {
        let config = ConversionConfig {
            max_width: Some(-4),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_negative_toc_depth() {
        let config = ConversionConfig {
            toc_depth: -1,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidTocDepth { depth: -1 })
        );
    }

    #[test]
    fn rejects_zero_collapse_threshold() {
        let config = ConversionConfig {
            collapse_code_after: Some(0),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidCollapseThreshold)
        );
    }

    #[test]
    fn accepts_large_toc_depth() {
        let config = ConversionConfig {
            toc_depth: 9,
            max_width: Some(72),
            ..Default::default()
        };
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.toc_levels(), 9);
        assert_eq!(config.wrap_width(), Some(72));
    }

    #[test]
    fn no_max_width_means_no_wrapping() {
        assert_eq!(ConversionConfig::default().wrap_width(), None);
    }

    #[test]
    fn parses_theme_names() {
        assert_eq!("light".parse(), Ok(Theme::Light));
        assert_eq!("Dark".parse(), Ok(Theme::Dark));
        assert_eq!("auto".parse(), Ok(Theme::Auto));
        assert_eq!("OBSIDIAN".parse(), Ok(Theme::Obsidian));
    }

    #[test]
    fn rejects_unknown_theme() {
        let err = "sepia".parse::<Theme>().unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownTheme {
                name: "sepia".into()
            }
        );
        assert!(err.to_string().contains("sepia"));
    }

    #[test]
    fn theme_display_round_trips() {
        for theme in [Theme::Light, Theme::Dark, Theme::Auto, Theme::Obsidian] {
            assert_eq!(theme.to_string().parse(), Ok(theme));
        }
    }
}
