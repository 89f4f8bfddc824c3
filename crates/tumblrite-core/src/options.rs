//! Configuration options for post compilation

/// What to do when a block's spans are not properly nested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedPolicy {
    /// Fail the whole post with the nesting error
    #[default]
    Abort,
    /// Render the offending block as unformatted text and keep going
    PlainText,
}

/// Options for compiling posts into markup
#[derive(Debug, Clone)]
pub struct Options {
    /// Apply inline formatting spans; when off, block text is inserted verbatim
    pub use_formatting: bool,

    /// Emit avatar/name/permalink headers for reblogged posts
    pub include_reblog_headers: bool,

    /// Recovery strategy for improperly nested spans
    pub malformed_policy: MalformedPolicy,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            use_formatting: true,
            include_reblog_headers: true,
            malformed_policy: MalformedPolicy::Abort,
        }
    }
}
