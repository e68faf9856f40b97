// SPDX-License-Identifier: GPL-3.0-only

//! JSON parsing for DeepSeek chat exports.
//!
//! This module handles deserialization of the `conversations.json` format
//! produced by DeepSeek's chat export feature. An export is either a single
//! conversation object or an array of them; each conversation stores its
//! messages as a tree of nodes keyed by id.
//!
//! # Format Overview
//!
//! A conversation contains:
//! - Metadata (`title`, `inserted_at`)
//! - A `mapping` from node id to node, rooted at the id `"root"`
//! - Each node holds an ordered list of child ids and an optional message
//!
//! # Example
//!
//! ```
//! use ds2md::parser::parse_archive;
//!
//! let json = r#"{
//!     "title": "Hello",
//!     "inserted_at": "2024-12-05T00:00:00",
//!     "mapping": {
//!         "root": { "children": ["m1"] },
//!         "m1": {
//!             "children": [],
//!             "message": { "content": "Hi", "inserted_at": "2024-12-05T00:00:01" }
//!         }
//!     }
//! }"#;
//!
//! let conversations = parse_archive(json).unwrap();
//! assert_eq!(conversations.len(), 1);
//! ```

use serde::Deserialize;
use snafu::prelude::*;
use std::collections::HashMap;

/// Error type for JSON parsing failures.
#[derive(Debug, Snafu)]
pub enum ParseError {
    /// Failed to parse JSON content.
    #[snafu(display("failed to parse JSON: {source}"))]
    Json {
        /// The underlying JSON parsing error.
        source: serde_json::Error,
    },
}

/// The root of an export file: a single conversation or an array of them.
///
/// DeepSeek exports a bare object when only one conversation is selected,
/// so both shapes have to be accepted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum Archive {
    Many(Vec<Conversation>),
    One(Conversation),
}

/// One exported chat session: metadata plus the message tree.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Conversation {
    /// The conversation title shown in the app. Absent titles fall back to
    /// a generated name when rendering and naming output files.
    #[serde(default)]
    pub title: Option<String>,

    /// ISO-8601 creation timestamp of the conversation.
    #[serde(default)]
    pub inserted_at: Option<String>,

    /// The message tree, keyed by node id. Traversal starts at `"root"`.
    #[serde(default)]
    pub mapping: HashMap<String, Node>,
}

/// An entry in the conversation's message tree.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Node {
    /// Ordered ids of child nodes. Only the first child is ever followed.
    #[serde(default)]
    pub children: Vec<String>,

    /// The message carried by this node, if any. Structural nodes (like
    /// `"root"`) have none.
    #[serde(default)]
    pub message: Option<Message>,
}

/// A single message payload within a node.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Message {
    /// The message text.
    #[serde(default)]
    pub content: String,

    /// ISO-8601 timestamp of when the message was sent.
    #[serde(default)]
    pub inserted_at: String,

    /// The model that produced this message. Present (and truthy) only for
    /// assistant messages; user messages omit it. The export is not
    /// consistent about the value's type, so it is kept as raw JSON.
    #[serde(default)]
    pub model: Option<serde_json::Value>,
}

impl Message {
    /// Returns `true` if every field is absent or empty.
    ///
    /// Exports occasionally contain `"message": {}` placeholders; these
    /// carry nothing worth emitting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() && self.inserted_at.is_empty() && self.model.is_none()
    }
}

/// Parses a JSON string into a list of [`Conversation`]s.
///
/// This is the main entry point for parsing DeepSeek exports. A single
/// top-level conversation object is normalized into a one-element list.
///
/// # Arguments
///
/// * `json_str` - The raw JSON content from a `conversations.json` export
///
/// # Errors
///
/// Returns an error if the JSON is malformed or matches neither a
/// conversation object nor an array of them.
///
/// # Example
///
/// ```
/// use ds2md::parser::parse_archive;
///
/// let conversations = parse_archive("[]").unwrap();
/// assert!(conversations.is_empty());
/// ```
pub fn parse_archive(json_str: &str) -> Result<Vec<Conversation>, ParseError> {
    let archive: Archive = serde_json::from_str(json_str).context(JsonSnafu)?;
    Ok(match archive {
        Archive::Many(conversations) => conversations,
        Archive::One(conversation) => vec![conversation],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation_json(title: &str, mapping_json: &str) -> String {
        format!(
            r#"{{
                "title": "{title}",
                "inserted_at": "2024-12-05T00:00:00",
                "mapping": {{{mapping_json}}}
            }}"#
        )
    }

    #[test]
    fn parses_single_object_as_one_element_list() {
        let json = conversation_json("Solo", "");
        let conversations = parse_archive(&json).unwrap();

        assert_eq!(conversations.len(), 1);
        assert_eq!(conversations[0].title.as_deref(), Some("Solo"));
    }

    #[test]
    fn parses_array_of_conversations() {
        let json = format!(
            "[{}, {}]",
            conversation_json("First", ""),
            conversation_json("Second", "")
        );
        let conversations = parse_archive(&json).unwrap();

        assert_eq!(conversations.len(), 2);
        assert_eq!(conversations[0].title.as_deref(), Some("First"));
        assert_eq!(conversations[1].title.as_deref(), Some("Second"));
    }

    #[test]
    fn parses_empty_array() {
        assert!(parse_archive("[]").unwrap().is_empty());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let conversations = parse_archive("{}").unwrap();

        assert_eq!(conversations.len(), 1);
        assert!(conversations[0].title.is_none());
        assert!(conversations[0].inserted_at.is_none());
        assert!(conversations[0].mapping.is_empty());
    }

    #[test]
    fn parses_node_with_message() {
        let json = conversation_json(
            "Chat",
            r#"
                "root": { "children": ["m1"] },
                "m1": {
                    "children": [],
                    "message": {
                        "content": "Hello",
                        "inserted_at": "2024-12-05T00:00:01",
                        "model": "deepseek-chat"
                    }
                }
            "#,
        );
        let conversations = parse_archive(&json).unwrap();
        let node = &conversations[0].mapping["m1"];

        let message = node.message.as_ref().unwrap();
        assert_eq!(message.content, "Hello");
        assert_eq!(message.inserted_at, "2024-12-05T00:00:01");
        assert_eq!(message.model, Some("deepseek-chat".into()));
    }

    #[test]
    fn parses_node_without_children_or_message() {
        let json = conversation_json("Chat", r#""root": {}"#);
        let conversations = parse_archive(&json).unwrap();
        let node = &conversations[0].mapping["root"];

        assert!(node.children.is_empty());
        assert!(node.message.is_none());
    }

    #[test]
    fn null_message_parses_as_none() {
        let json = conversation_json("Chat", r#""root": { "children": [], "message": null }"#);
        let conversations = parse_archive(&json).unwrap();

        assert!(conversations[0].mapping["root"].message.is_none());
    }

    #[test]
    fn empty_message_object_is_empty() {
        let json = conversation_json("Chat", r#""m1": { "message": {} }"#);
        let conversations = parse_archive(&json).unwrap();

        let message = conversations[0].mapping["m1"].message.as_ref().unwrap();
        assert!(message.is_empty());
    }

    #[test]
    fn model_of_any_json_type_is_preserved() {
        let json = conversation_json(
            "Chat",
            r#""m1": { "message": { "content": "x", "inserted_at": "t", "model": 1 } }"#,
        );
        let conversations = parse_archive(&json).unwrap();

        let message = conversations[0].mapping["m1"].message.as_ref().unwrap();
        assert_eq!(message.model, Some(1.into()));
    }

    #[test]
    fn returns_error_for_invalid_json() {
        let result = parse_archive("not valid json");
        assert!(result.is_err());
    }

    #[test]
    fn returns_error_for_non_conversation_value() {
        let result = parse_archive("42");
        assert!(result.is_err());
    }
}
