//! Recoverable problems found while compiling a post.
//!
//! Every diagnostic is logged the moment it is pushed and kept so callers can
//! inspect what was substituted.

use std::fmt;

/// A recoverable problem and the fallback that was applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Span type without renderable semantics; its text was left unwrapped
    UnknownStyleKind { kind: String },

    /// Text block with an unsupported subtype
    UnknownBlockSubtype { subtype: String, raw: String },

    /// Block whose shape was not recognised at all
    UnknownParagraphShape { raw: String },

    /// Block rendered as plain text because its spans did not nest
    MalformedNestingFallback { message: String },
}

impl Diagnostic {
    pub fn level(&self) -> log::Level {
        match self {
            Diagnostic::UnknownStyleKind { .. } | Diagnostic::MalformedNestingFallback { .. } => {
                log::Level::Warn
            }
            Diagnostic::UnknownBlockSubtype { .. } | Diagnostic::UnknownParagraphShape { .. } => {
                log::Level::Error
            }
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownStyleKind { kind } => {
                write!(f, "Unknown formatting type '{}', left unformatted", kind)
            }
            Diagnostic::UnknownBlockSubtype { subtype, raw } => {
                write!(f, "Unknown subtype '{}'\n{}", subtype, raw)
            }
            Diagnostic::UnknownParagraphShape { raw } => {
                write!(f, "Unknown paragraph structure\n{}", raw)
            }
            Diagnostic::MalformedNestingFallback { message } => {
                write!(f, "{}, rendering block as plain text", message)
            }
        }
    }
}

/// Collected diagnostics for one compilation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log and record a diagnostic
    pub fn push(&mut self, diagnostic: Diagnostic) {
        log::log!(diagnostic.level(), "{}", diagnostic);
        self.entries.push(diagnostic);
    }

    /// Move the entries of `other` to the end of this sink.
    ///
    /// They were logged when first pushed, so they are not logged again.
    pub fn append(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
