//! tumblrite-core - post data model and markup tree
//!
//! This crate provides the data structures shared by the `tumblrite` compiler
//! and its collaborators: the decoded post model, the generic markup tree the
//! compiler produces, compilation options and diagnostics.
//!
//! # Architecture
//!
//! ```text
//! NPF JSON ──decode──▶ PostRecord ──compile──▶ MarkupNode ──▶ HTML String
//! ```
//!
//! # Example
//!
//! ```rust
//! use tumblrite_core::{serialize_pretty, MarkupNode};
//!
//! let mut p = MarkupNode::new("p");
//! p.append("This is ");
//! p.append(MarkupNode::new("b").child("bold"));
//! p.append(" text.");
//!
//! assert_eq!(p.outer_html(), "<p>This is <b>bold</b> text.</p>");
//! assert_eq!(serialize_pretty(&p), "<p>This is <b>bold</b> text.</p>\n");
//! ```

mod diagnostics;
mod markup;
mod model;
mod options;
mod serialize;

pub use diagnostics::{Diagnostic, Diagnostics};
pub use markup::{escape_html_attr, escape_html_text, Markup, MarkupNode};
pub use model::{Block, BlogRef, Category, PostRecord, StyleKind, TextSpan};
pub use options::{MalformedPolicy, Options};
pub use serialize::{is_block, is_raw_text, is_void, serialize_document, serialize_pretty};
