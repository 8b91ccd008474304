// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 noct-ml

//! Speaker resolution, numbering and display labels.
//!
//! Turns whose speaker could not be read from the markup are assigned one by
//! alternation: a conversation is assumed to switch speakers on every turn.
//! This is a heuristic about typical conversations, not something the markup
//! guarantees.

use crate::config::ConversionConfig;
use crate::extract::RawTurn;
use crate::model::{Role, Turn};

/// Display name of the assistant.
pub const ASSISTANT_LABEL: &str = "ChatGPT";

/// Display name of the user when no custom label is configured.
pub const DEFAULT_USER_LABEL: &str = "User";

/// Resolves roles, numbers turns from 1 and computes display labels.
///
/// An unknown role becomes the opposite of the nearest preceding turn's
/// resolved role; the first turn falls back to [`Role::User`].
///
/// # Example
///
/// ```
/// use echoforge::config::ConversionConfig;
/// use echoforge::extract::RawTurn;
/// use echoforge::labeler::label_turns;
/// use echoforge::model::{Role, Segment};
///
/// let raw = vec![
///     RawTurn { role: Role::Assistant, segments: vec![Segment::text("Hello")] },
///     RawTurn { role: Role::Unknown, segments: vec![Segment::text("Hi")] },
/// ];
/// let config = ConversionConfig { user_label: "James".into(), ..Default::default() };
/// let turns = label_turns(raw, &config);
///
/// assert_eq!(turns[1].index, 2);
/// assert_eq!(turns[1].role, Role::User);
/// assert_eq!(turns[1].label, "James");
/// ```
#[must_use]
pub fn label_turns(raw: Vec<RawTurn>, config: &ConversionConfig) -> Vec<Turn> {
    let mut previous: Option<Role> = None;

    raw.into_iter()
        .enumerate()
        .map(|(i, turn)| {
            let role = match turn.role {
                Role::Unknown => {
                    let resolved = previous.map_or(Role::User, Role::opposite);
                    tracing::debug!(turn = i + 1, ?resolved, "resolved unknown speaker");
                    resolved
                }
                known => known,
            };
            previous = Some(role);

            Turn {
                index: i + 1,
                role,
                label: display_label(role, config),
                segments: turn.segments,
            }
        })
        .collect()
}

/// Returns the display name for a role.
#[must_use]
pub fn display_label(role: Role, config: &ConversionConfig) -> String {
    match role {
        Role::User if config.user_label.trim().is_empty() => DEFAULT_USER_LABEL.to_owned(),
        Role::User => config.user_label.trim().to_owned(),
        Role::Assistant => ASSISTANT_LABEL.to_owned(),
        Role::Unknown => "Unknown".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Segment;

    fn raw(roles: &[Role]) -> Vec<RawTurn> {
        roles
            .iter()
            .map(|&role| RawTurn {
                role,
                segments: vec![Segment::text("x")],
            })
            .collect()
    }

    fn roles(turns: &[Turn]) -> Vec<Role> {
        turns.iter().map(|t| t.role).collect()
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(label_turns(Vec::new(), &ConversionConfig::default()).is_empty());
    }

    #[test]
    fn numbers_turns_contiguously_from_one() {
        let turns = label_turns(
            raw(&[Role::User, Role::Assistant, Role::User]),
            &ConversionConfig::default(),
        );
        let indices: Vec<usize> = turns.iter().map(|t| t.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[test]
    fn first_unknown_defaults_to_user() {
        let turns = label_turns(raw(&[Role::Unknown]), &ConversionConfig::default());
        assert_eq!(roles(&turns), vec![Role::User]);
    }

    #[test]
    fn unknown_after_assistant_is_user() {
        let turns = label_turns(
            raw(&[Role::Assistant, Role::Unknown]),
            &ConversionConfig::default(),
        );
        assert_eq!(roles(&turns), vec![Role::Assistant, Role::User]);
    }

    #[test]
    fn consecutive_unknowns_alternate() {
        let turns = label_turns(
            raw(&[Role::User, Role::Unknown, Role::Unknown, Role::Unknown]),
            &ConversionConfig::default(),
        );
        assert_eq!(
            roles(&turns),
            vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
        );
    }

    #[test]
    fn known_roles_are_never_changed() {
        let turns = label_turns(
            raw(&[Role::User, Role::User, Role::Assistant]),
            &ConversionConfig::default(),
        );
        assert_eq!(roles(&turns), vec![Role::User, Role::User, Role::Assistant]);
    }

    #[test]
    fn labels_use_configured_user_name() {
        let config = ConversionConfig {
            user_label: "James".into(),
            ..Default::default()
        };
        let turns = label_turns(raw(&[Role::User, Role::Assistant]), &config);
        assert_eq!(turns[0].label, "James");
        assert_eq!(turns[1].label, ASSISTANT_LABEL);
    }

    #[test]
    fn blank_user_label_falls_back_to_default() {
        let config = ConversionConfig {
            user_label: "  ".into(),
            ..Default::default()
        };
        assert_eq!(display_label(Role::User, &config), DEFAULT_USER_LABEL);
    }

    #[test]
    fn keeps_segments() {
        let turns = label_turns(raw(&[Role::User]), &ConversionConfig::default());
        assert_eq!(turns[0].segments, vec![Segment::text("x")]);
    }
}
