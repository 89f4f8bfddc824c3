//! Post data model
//!
//! These types describe one archived post after decoding: its content blocks,
//! the inline spans over each block's text and the reblog trail of ancestor
//! posts. They are read-only inputs to the compiler.

/// Inline style carried by a [`TextSpan`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleKind {
    Bold,
    Italic,
    Strikethrough,
    Small,
    /// Hyperlink to an arbitrary URL
    Link { url: String },
    /// Mention of another blog; `url` overrides the default blog address
    Mention {
        blog_name: String,
        url: Option<String>,
    },
    /// Text colour as a CSS colour (usually `#rrggbb`)
    Color { hex: String },
    /// Formatting type we cannot render, kept by its raw name
    Unknown(String),
}

impl StyleKind {
    /// Wire name of this style
    pub fn name(&self) -> &str {
        match self {
            StyleKind::Bold => "bold",
            StyleKind::Italic => "italic",
            StyleKind::Strikethrough => "strikethrough",
            StyleKind::Small => "small",
            StyleKind::Link { .. } => "link",
            StyleKind::Mention { .. } => "mention",
            StyleKind::Color { .. } => "color",
            StyleKind::Unknown(raw) => raw,
        }
    }
}

/// A styled range over one block's text.
///
/// Offsets count characters and are half-open: `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSpan {
    pub start: usize,
    pub end: usize,
    pub kind: StyleKind,
}

impl TextSpan {
    pub fn new(start: usize, end: usize, kind: StyleKind) -> Self {
        Self { start, end, kind }
    }
}

/// Grouping category of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Rendered on its own
    Standalone,
    /// Adjacent items share one ordered list
    List,
    /// Adjacent images share one gallery
    Gallery,
}

/// One structural content unit of a post
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph { text: String, spans: Vec<TextSpan> },

    /// Heading with level 1 or 2
    Heading {
        level: u8,
        text: String,
        spans: Vec<TextSpan>,
    },

    /// Ordered list item
    ListItem { text: String, spans: Vec<TextSpan> },

    Image { url: String },

    /// Block we could not decode.
    ///
    /// `subtype` is set when the block was text with an unsupported subtype;
    /// `None` means the block shape itself was unrecognised. `raw` keeps the
    /// original record for diagnostics.
    Unknown {
        subtype: Option<String>,
        raw: String,
    },
}

impl Block {
    /// Create a plain paragraph
    pub fn paragraph(text: &str) -> Self {
        Block::Paragraph {
            text: text.to_string(),
            spans: Vec::new(),
        }
    }

    /// Create a plain list item
    pub fn list_item(text: &str) -> Self {
        Block::ListItem {
            text: text.to_string(),
            spans: Vec::new(),
        }
    }

    /// Create an image block
    pub fn image(url: &str) -> Self {
        Block::Image {
            url: url.to_string(),
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Block::ListItem { .. } => Category::List,
            Block::Image { .. } => Category::Gallery,
            Block::Paragraph { .. } | Block::Heading { .. } | Block::Unknown { .. } => {
                Category::Standalone
            }
        }
    }
}

/// Author blog of a post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogRef {
    pub name: String,
    pub url: String,
    pub avatar_url: String,
}

/// One post together with its reblog trail.
///
/// `trail` is stored newest first: `trail[0]` is the post this one was
/// reblogged from directly. `blog` is present when the record needs a reblog
/// header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostRecord {
    pub id: String,
    pub blog: Option<BlogRef>,
    pub trail: Vec<PostRecord>,
    pub content: Vec<Block>,
}

impl PostRecord {
    pub fn new(id: &str, content: Vec<Block>) -> Self {
        Self {
            id: id.to_string(),
            blog: None,
            trail: Vec::new(),
            content,
        }
    }

    /// Ancestors from the oldest to the most recent
    pub fn ancestors_oldest_first(&self) -> impl Iterator<Item = &PostRecord> {
        self.trail.iter().rev()
    }
}
