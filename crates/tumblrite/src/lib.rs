//! # tumblrite
//!
//! Compile archived Tumblr posts into HTML markup trees.
//!
//! A post arrives as a [`PostRecord`]: content blocks in the Neue Post Format,
//! inline formatting spans over each block's text and a trail of the posts it
//! was reblogged from. The compiler runs in three layers:
//!
//! - [`nest`] resolves one block's spans into nested inline markup,
//! - [`BlockGrouper`] groups adjacent list items and images into lists and
//!   galleries,
//! - [`PostComposer`] renders the reblog trail oldest first, with dividers and
//!   reblog headers, followed by the post's own content.
//!
//! [`ArchiveService`] ties the layers to a set of [`Options`]. Decoding of raw
//! NPF JSON lives in [`npf`], extraction from downloaded search and post pages
//! in [`scrape`] and the page shell in [`html`].
//!
//! ## Example
//!
//! ```rust
//! use tumblrite::{ArchiveService, Block, PostRecord};
//!
//! let service = ArchiveService::new();
//! let post = PostRecord::new("1", vec![
//!     Block::image("https://64.media.tumblr.com/a.jpg"),
//!     Block::image("https://64.media.tumblr.com/b.jpg"),
//!     Block::paragraph("Two pictures"),
//! ]);
//!
//! let rendered = service.render_post(&post).unwrap();
//! let html = rendered.node.outer_html();
//! assert!(html.contains("img-layout-1"));
//! assert!(html.contains("<p>Two pictures</p>"));
//! ```

mod compose;
mod group;
#[cfg(feature = "html")]
pub mod html;
mod nest;
pub mod npf;
#[cfg(feature = "html")]
pub mod scrape;
mod service;
mod utilities;

pub use compose::PostComposer;
pub use group::{layout_discriminator, BlockGrouper};
#[cfg(feature = "html")]
pub use html::PageTemplate;
pub use nest::nest;
pub use service::{ArchiveService, PartialRender, RenderedPost};
pub use tumblrite_core::{
    serialize_document, serialize_pretty, Block, BlogRef, Category, Diagnostic, Diagnostics,
    MalformedPolicy, Markup, MarkupNode, Options, PostRecord, StyleKind, TextSpan,
};
pub use utilities::*;

/// Error type for tumblrite operations
#[derive(Debug, thiserror::Error)]
pub enum TumblriteError {
    #[error("Improperly nested formatting: span {start}..{end} crosses the end of its enclosing span at {enclosing_end}")]
    MalformedNesting {
        start: usize,
        end: usize,
        enclosing_end: usize,
    },

    #[error("Formatting span {start}..{end} is outside the block text of length {len}")]
    InvalidSpanRange {
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("Invalid post record: {0}")]
    InvalidRecord(String),

    #[error("Failed to parse post JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Template has no '{0}' slot")]
    MissingTemplateSlot(String),

    #[error("Page has no {0}")]
    MissingPageData(String),

    #[error("Not a Tumblr post address: {0}")]
    InvalidPostUrl(String),
}

impl TumblriteError {
    /// `true` for errors raised by spans that do not nest inside one block
    pub fn is_nesting_error(&self) -> bool {
        matches!(
            self,
            TumblriteError::MalformedNesting { .. } | TumblriteError::InvalidSpanRange { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, TumblriteError>;
