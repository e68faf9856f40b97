// SPDX-License-Identifier: GPL-3.0-only

//! Linearization of the conversation message tree.
//!
//! DeepSeek stores each conversation as a forest of nodes keyed by id, with
//! the visible transcript being the chain of first children starting at
//! `"root"`. This module walks that chain and produces the ordered list of
//! speaker turns a document renderer consumes. Sibling branches (edited or
//! regenerated messages) are never visited.
//!
//! The walk is deliberately permissive: missing nodes, dangling child ids,
//! and empty messages shorten the output instead of raising an error, since
//! real exports are messy.
//!
//! # Example
//!
//! ```
//! use ds2md::linearizer::{Role, linearize};
//! use ds2md::parser::parse_archive;
//!
//! let json = r#"{
//!     "mapping": {
//!         "root": { "children": ["m1"] },
//!         "m1": { "children": [], "message": { "content": "Hi", "inserted_at": "t1" } }
//!     }
//! }"#;
//!
//! let conversations = parse_archive(json).unwrap();
//! let turns = linearize(&conversations[0].mapping);
//!
//! assert_eq!(turns.len(), 1);
//! assert_eq!(turns[0].role, Role::User);
//! assert_eq!(turns[0].content, "Hi");
//! ```

use crate::parser::{Message, Node};
use std::collections::{HashMap, HashSet};

/// The speaker of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// A message typed by the person using the chat.
    User,
    /// A message produced by the model.
    Assistant,
}

/// One linearized, role-tagged message ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    /// Who spoke.
    pub role: Role,
    /// The message text.
    pub content: String,
    /// The message's `inserted_at` timestamp, passed through unchanged.
    pub time: String,
}

impl Turn {
    fn from_message(message: &Message) -> Self {
        // The export marks assistant messages by carrying a model field;
        // user messages omit it (or leave it null/empty).
        let role = if message.model.as_ref().is_some_and(is_truthy) {
            Role::Assistant
        } else {
            Role::User
        };
        Self {
            role,
            content: message.content.clone(),
            time: message.inserted_at.clone(),
        }
    }
}

/// Walks the first-child chain from `"root"` and collects speaker turns.
///
/// Starting with the cursor at `"root"`, each step looks up the current
/// node and stops if it is missing or has no children. Otherwise the first
/// child id becomes the next cursor; if the node at that id exists and
/// carries a non-empty message, a [`Turn`] is emitted for it. The cursor
/// advances whether or not a turn was emitted, so a message-less link in
/// the chain is skipped rather than fabricated.
///
/// Turns appear in chain order. A mapping without a `"root"` entry yields
/// an empty list, as does a `"root"` with no children. A child id that is
/// absent from the mapping emits nothing and halts the walk on the next
/// step. A `children` cycle terminates the walk at the first revisited id
/// instead of looping forever.
#[must_use]
pub fn linearize(mapping: &HashMap<String, Node>) -> Vec<Turn> {
    let mut turns = Vec::new();
    let mut visited = HashSet::new();
    let mut cursor = "root";

    while visited.insert(cursor) {
        let Some(node) = mapping.get(cursor) else {
            break;
        };
        let Some(next_id) = node.children.first() else {
            break;
        };

        if let Some(message) = mapping.get(next_id).and_then(|next| next.message.as_ref())
            && !message.is_empty()
        {
            turns.push(Turn::from_message(message));
        }

        cursor = next_id;
    }

    turns
}

/// Mirrors the export producer's notion of a "set" model field: null,
/// `false`, zero, and empty strings/collections all mean unset.
fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(a) => !a.is_empty(),
        serde_json::Value::Object(o) => !o.is_empty(),
    }
}
