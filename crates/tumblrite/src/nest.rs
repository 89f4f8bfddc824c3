//! Inline span nesting
//!
//! Resolves the formatting spans of one block into a nested inline markup
//! forest. Spans are consumed in the order given and must form a laminar
//! family: two spans are either disjoint or one contains the other. A span
//! that crosses the end of its enclosing span is reported as
//! [`TumblriteError::MalformedNesting`].

use tumblrite_core::{Diagnostic, Diagnostics, Markup, MarkupNode, StyleKind, TextSpan};

use crate::utilities::blog_url;
use crate::{Result, TumblriteError};

/// Nest `spans` over `text` and return the children for the enclosing block
/// element.
///
/// Offsets are character offsets into `text`. Spans of unknown kind are
/// recorded in `diagnostics` and their text is left unwrapped.
pub fn nest(
    text: &str,
    spans: &[TextSpan],
    diagnostics: &mut Diagnostics,
) -> Result<Vec<Markup>> {
    let mut state = SpanNestingState::new(text);

    for span in spans {
        state.open(span, diagnostics)?;
    }

    Ok(state.finish())
}

/// A node under construction and the offset where it closes
#[derive(Debug)]
struct Frame {
    node: MarkupNode,
    end: usize,
}

/// Explicit stack of open frames over one block's text
#[derive(Debug)]
struct SpanNestingState<'a> {
    text: &'a str,
    /// Byte offset of every character boundary, including the end of text
    boundaries: Vec<usize>,
    /// Children of the virtual root frame
    root: Vec<Markup>,
    stack: Vec<Frame>,
    /// Character offset up to which text has been flushed
    cursor: usize,
}

impl<'a> SpanNestingState<'a> {
    fn new(text: &'a str) -> Self {
        let boundaries = text
            .char_indices()
            .map(|(offset, _)| offset)
            .chain(std::iter::once(text.len()))
            .collect();

        Self {
            text,
            boundaries,
            root: Vec::new(),
            stack: Vec::new(),
            cursor: 0,
        }
    }

    /// Number of characters in the text
    fn len(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// Closing offset of the innermost open frame
    fn top_end(&self) -> usize {
        self.stack.last().map_or(self.len(), |frame| frame.end)
    }

    fn open(&mut self, span: &TextSpan, diagnostics: &mut Diagnostics) -> Result<()> {
        // Unknown kinds render nothing, so their bounds are never checked.
        let Some(node) = span_element(&span.kind) else {
            diagnostics.push(Diagnostic::UnknownStyleKind {
                kind: span.kind.name().to_string(),
            });
            return Ok(());
        };

        if span.start >= span.end || span.end > self.len() {
            return Err(TumblriteError::InvalidSpanRange {
                start: span.start,
                end: span.end,
                len: self.len(),
            });
        }

        while !self.stack.is_empty() && self.top_end() <= span.start {
            self.close();
        }

        // A span may start before the cursor when it overlaps a sibling that
        // was already closed.
        if span.start < self.cursor {
            return Err(TumblriteError::MalformedNesting {
                start: span.start,
                end: span.end,
                enclosing_end: self.cursor,
            });
        }
        self.flush(span.start);

        let enclosing_end = self.top_end();
        if span.end > enclosing_end {
            return Err(TumblriteError::MalformedNesting {
                start: span.start,
                end: span.end,
                enclosing_end,
            });
        }

        self.stack.push(Frame {
            node,
            end: span.end,
        });
        Ok(())
    }

    /// Append the text from the cursor up to `offset` to the innermost frame
    fn flush(&mut self, offset: usize) {
        if offset > self.cursor {
            let slice = &self.text[self.boundaries[self.cursor]..self.boundaries[offset]];
            self.push_child(Markup::text(slice));
            self.cursor = offset;
        }
    }

    /// Close the innermost frame and hand its node to the parent
    fn close(&mut self) {
        let end = self.top_end();
        self.flush(end);
        if let Some(frame) = self.stack.pop() {
            self.push_child(Markup::Element(frame.node));
        }
    }

    fn push_child(&mut self, child: Markup) {
        match self.stack.last_mut() {
            Some(frame) => frame.node.append(child),
            None => self.root.push(child),
        }
    }

    fn finish(mut self) -> Vec<Markup> {
        while !self.stack.is_empty() {
            self.close();
        }
        self.flush(self.len());

        if self.root.is_empty() {
            self.root.push(Markup::text(self.text));
        }
        self.root
    }
}

/// Element that renders a span, or `None` for unknown kinds
fn span_element(kind: &StyleKind) -> Option<MarkupNode> {
    let node = match kind {
        StyleKind::Bold => MarkupNode::new("b"),
        StyleKind::Italic => MarkupNode::new("i"),
        StyleKind::Strikethrough => MarkupNode::new("s"),
        StyleKind::Small => MarkupNode::new("small"),
        StyleKind::Link { url } => MarkupNode::with_attrs("a", &[("href", url.as_str())]),
        StyleKind::Mention { blog_name, url } => {
            let href = url.clone().unwrap_or_else(|| blog_url(blog_name));
            MarkupNode::with_attrs("a", &[("class", "tumblr-mention"), ("href", href.as_str())])
        }
        StyleKind::Color { hex } => {
            let style = format!("color: {}", hex);
            MarkupNode::with_attrs("span", &[("style", style.as_str())])
        }
        StyleKind::Unknown(_) => return None,
    };
    Some(node)
}
