// SPDX-License-Identifier: GPL-3.0-only

//! Markdown rendering for parsed DeepSeek conversations.
//!
//! This module transforms a [`Conversation`] into a readable Markdown
//! document that keeps the visual shape of the original chat: user
//! messages sit right-aligned and bold, assistant messages left-aligned
//! and plain, and each message is followed by a small italic timestamp.
//!
//! # Output Format
//!
//! The rendered Markdown includes:
//! - A top-level `# <title> (<creation time>)` heading
//! - One block per linearized turn, aligned by speaker
//! - A small italic timestamp under each message
//! - A blank line separating turns
//!
//! # Example
//!
//! ```
//! use ds2md::parser::parse_archive;
//! use ds2md::renderer::{RenderOptions, render_conversation};
//!
//! let json = r#"{
//!     "title": "Greetings",
//!     "inserted_at": "2024-12-05T00:00:00",
//!     "mapping": {
//!         "root": { "children": ["m1"] },
//!         "m1": { "children": [], "message": { "content": "Hi!", "inserted_at": "t1" } }
//!     }
//! }"#;
//!
//! let conversations = parse_archive(json).unwrap();
//! let markdown = render_conversation(&conversations[0], &RenderOptions::default());
//!
//! assert!(markdown.contains("# Greetings (2024-12-05 00:00:00)"));
//! assert!(markdown.contains("**Hi!**"));
//! ```

use crate::linearizer::{Role, Turn, linearize};
use crate::parser::Conversation;
use chrono::{DateTime, NaiveDateTime};
use std::fmt::Write;

/// Title used when a conversation carries none.
pub const DEFAULT_TITLE: &str = "Untitled chat";

/// Configuration options for Markdown rendering.
///
/// The defaults reproduce the full original document layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Whether to include the per-message timestamp blocks.
    pub show_timestamps: bool,

    /// Number of heading levels to shift (0-5).
    ///
    /// A value of 0 produces an H1 title heading (default).
    /// A value of 1 produces H2, useful for embedding.
    pub heading_offset: u8,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_timestamps: true,
            heading_offset: 0,
        }
    }
}

/// Returns a markdown heading prefix with the given level and offset.
///
/// The heading level is clamped to a maximum of 6 (H6).
fn heading(level: u8, offset: u8) -> String {
    let actual = (level + offset).min(6);
    "#".repeat(actual as usize)
}

/// Renders one conversation as a Markdown document.
///
/// The heading combines the title (or [`DEFAULT_TITLE`]) with the
/// conversation's creation time as formatted by [`format_timestamp`].
/// The body is the linearized turn sequence, one aligned block per turn.
#[must_use]
pub fn render_conversation(conversation: &Conversation, opts: &RenderOptions) -> String {
    let mut out = String::new();

    let title = conversation.title.as_deref().unwrap_or(DEFAULT_TITLE);
    let created = conversation
        .inserted_at
        .as_deref()
        .map(format_timestamp)
        .unwrap_or_default();
    writeln!(
        out,
        "{} {title} ({created})\n",
        heading(1, opts.heading_offset)
    )
    .unwrap();

    for turn in linearize(&conversation.mapping) {
        render_turn(&mut out, &turn, opts);
    }

    out
}

fn render_turn(out: &mut String, turn: &Turn, opts: &RenderOptions) {
    match turn.role {
        Role::User => {
            writeln!(out, "<div align=\"right\">\n").unwrap();
            writeln!(out, "**{}**\n", escape_xml_tags(&turn.content)).unwrap();
            if opts.show_timestamps {
                writeln!(out, "<sub>*{}*</sub>\n", escape_xml_tags(&turn.time)).unwrap();
            }
            writeln!(out, "</div>\n").unwrap();
        }
        Role::Assistant => {
            writeln!(out, "{}\n", escape_xml_tags(&turn.content)).unwrap();
            if opts.show_timestamps {
                writeln!(
                    out,
                    "<div align=\"right\"><sub>*{}*</sub></div>\n",
                    escape_xml_tags(&turn.time)
                )
                .unwrap();
            }
        }
    }
}

/// Formats an ISO-8601 timestamp string as `YYYY-MM-DD HH:MM:SS`.
///
/// Accepts both offset-carrying (RFC 3339) and naive timestamps, since
/// exports contain either depending on app version. An unparsable string
/// is returned unchanged rather than treated as an error.
#[must_use]
pub fn format_timestamp(raw: &str) -> String {
    const OUTPUT: &str = "%Y-%m-%d %H:%M:%S";

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format(OUTPUT).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format(OUTPUT).to_string();
    }
    raw.to_owned()
}

/// Maps a conversation title to a safe filename stem.
///
/// Every character that is not alphanumeric, space, underscore, hyphen,
/// or parenthesis becomes an underscore, so titles containing path
/// separators or shell metacharacters cannot escape the output directory.
#[must_use]
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '_' | '-' | '(' | ')') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Escapes XML/HTML-like tags so they render literally in Markdown.
///
/// Uses HTML entities (`&lt;` `&gt;`) which are more reliably rendered across
/// markdown viewers. Only escapes `<` when followed by a letter, `/`, or `!`
/// to avoid false positives on mathematical comparisons like `x < 5`.
fn escape_xml_tags(s: &str) -> String {
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
