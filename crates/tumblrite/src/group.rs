//! Block grouping
//!
//! Turns a flat sequence of blocks into block-level markup. Runs of adjacent
//! list items share one `<ol>` and runs of adjacent images share one gallery
//! `<div>`; everything else is emitted on its own.

use tumblrite_core::{
    Block, Category, Diagnostic, Diagnostics, MalformedPolicy, Markup, MarkupNode, Options,
    TextSpan,
};

use crate::nest::nest;
use crate::Result;

/// Class shared by every image gallery
pub const GALLERY_CLASS: &str = "tumblr-img-list";

/// Class of the placeholder paragraph that replaces an unknown block
pub const UNKNOWN_BLOCK_CLASS: &str = "tumblr-unknown-block";

/// Groups blocks into lists and galleries
#[derive(Debug, Clone, Copy)]
pub struct BlockGrouper<'a> {
    options: &'a Options,
}

impl<'a> BlockGrouper<'a> {
    pub fn new(options: &'a Options) -> Self {
        Self { options }
    }

    /// Render `blocks` into the block-level forest of one post
    pub fn group(&self, blocks: &[Block], diagnostics: &mut Diagnostics) -> Result<Vec<Markup>> {
        let mut state = GroupingState::default();

        for block in blocks {
            let node = self.render_block(block, diagnostics)?;
            state.push(block.category(), node);
        }

        Ok(state.finish())
    }

    /// Render one block without any grouping
    pub fn render_block(&self, block: &Block, diagnostics: &mut Diagnostics) -> Result<MarkupNode> {
        let node = match block {
            Block::Paragraph { text, spans } => {
                self.text_element(MarkupNode::new("p"), text, spans, diagnostics)?
            }
            Block::Heading { level, text, spans } => {
                let tag = if *level <= 1 { "h1" } else { "h2" };
                self.text_element(MarkupNode::new(tag), text, spans, diagnostics)?
            }
            Block::ListItem { text, spans } => {
                self.text_element(MarkupNode::new("li"), text, spans, diagnostics)?
            }
            Block::Image { url } => {
                MarkupNode::with_attrs("img", &[("src", url.as_str()), ("loading", "lazy")])
            }
            Block::Unknown { subtype, raw } => {
                let placeholder = match subtype {
                    Some(subtype) => {
                        diagnostics.push(Diagnostic::UnknownBlockSubtype {
                            subtype: subtype.clone(),
                            raw: raw.clone(),
                        });
                        format!("[unsupported block subtype '{}']", subtype)
                    }
                    None => {
                        diagnostics.push(Diagnostic::UnknownParagraphShape { raw: raw.clone() });
                        "[unsupported block]".to_string()
                    }
                };
                MarkupNode::with_attrs("p", &[("class", UNKNOWN_BLOCK_CLASS)]).child(placeholder)
            }
        };
        Ok(node)
    }

    fn text_element(
        &self,
        mut element: MarkupNode,
        text: &str,
        spans: &[TextSpan],
        diagnostics: &mut Diagnostics,
    ) -> Result<MarkupNode> {
        if !self.options.use_formatting {
            element.append(text);
            return Ok(element);
        }

        // Kept apart so a block that falls back to plain text reports no
        // span diagnostics.
        let mut scratch = Diagnostics::new();
        match nest(text, spans, &mut scratch) {
            Ok(children) => {
                diagnostics.append(scratch);
                element.extend(children);
            }
            Err(err)
                if err.is_nesting_error()
                    && self.options.malformed_policy == MalformedPolicy::PlainText =>
            {
                diagnostics.push(Diagnostic::MalformedNestingFallback {
                    message: err.to_string(),
                });
                element.append(text);
            }
            Err(err) => return Err(err),
        }
        Ok(element)
    }
}

/// Output forest plus the container still accepting children
#[derive(Debug, Default)]
struct GroupingState {
    forest: Vec<Markup>,
    open: Option<(Category, MarkupNode)>,
}

impl GroupingState {
    fn push(&mut self, category: Category, node: MarkupNode) {
        if let Some((open_category, container)) = &mut self.open {
            if *open_category == category {
                container.append(node);
                return;
            }
        }

        self.close();

        match category {
            Category::Standalone => self.forest.push(Markup::Element(node)),
            Category::List => self.open = Some((category, MarkupNode::new("ol").child(node))),
            Category::Gallery => {
                let mut gallery = MarkupNode::with_attrs("div", &[("class", GALLERY_CLASS)]);
                gallery.append(node);
                self.open = Some((category, gallery));
            }
        }
    }

    /// Emit the open container, tagging galleries with their layout
    fn close(&mut self) {
        if let Some((category, mut container)) = self.open.take() {
            if category == Category::Gallery {
                let layout = layout_discriminator(container.children.len());
                container.add_class(&format!("img-layout-{}", layout));
            }
            self.forest.push(Markup::Element(container));
        }
    }

    fn finish(mut self) -> Vec<Markup> {
        self.close();
        self.forest
    }
}

/// Grid pattern for a gallery of `count` images: how many cells the last row
/// of a three-column grid is short by.
pub fn layout_discriminator(count: usize) -> usize {
    (3 - count % 3) % 3
}
