// SPDX-License-Identifier: GPL-3.0-only

//! Convert DeepSeek chat exports to Markdown.
//!
//! This crate provides parsing, linearization, and rendering functionality
//! for transforming DeepSeek's `conversations.json` export format into
//! readable Markdown documents, one per conversation.
//!
//! # Overview
//!
//! DeepSeek stores each exported conversation as a tree of message nodes
//! keyed by id, where the visible transcript is the chain of first children
//! starting at the node `"root"`. This crate:
//!
//! 1. Parses the JSON archive into typed Rust representations
//! 2. Linearizes each conversation's node tree into an ordered turn list
//! 3. Renders the turns as a Markdown document preserving speaker layout
//!
//! # Example
//!
//! ```no_run
//! use ds2md::{parser, renderer};
//!
//! let json = std::fs::read_to_string("conversations.json").unwrap();
//! let conversations = parser::parse_archive(&json).unwrap();
//!
//! let opts = renderer::RenderOptions::default();
//! for conversation in &conversations {
//!     let markdown = renderer::render_conversation(conversation, &opts);
//!     println!("{markdown}");
//! }
//! ```
//!
//! # Modules
//!
//! - [`parser`]: JSON parsing and type definitions for DeepSeek exports
//! - [`linearizer`]: first-child-chain traversal of the message tree
//! - [`renderer`]: Markdown generation with configurable output options

#![deny(missing_docs)]

pub mod linearizer;
pub mod parser;
pub mod renderer;
