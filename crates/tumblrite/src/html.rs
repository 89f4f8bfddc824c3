//! Page shell templating.
//!
//! A page template is an HTML document with insertion points marked by
//! `data-slot` attributes:
//!
//! - `data-slot="post-list"`: fragment repeated once per post,
//! - `data-slot="post"` inside it: receives the compiled post,
//! - `data-slot="title"` (optional, any number): receives the page title.
//!
//! The template is parsed once with scraper and kept as an immutable
//! [`MarkupNode`] tree; every render works on fresh clones.

use scraper::{ElementRef, Html, Node as ScraperNode};
use tumblrite_core::{serialize_document, Markup, MarkupNode};

use crate::{Result, TumblriteError};

pub const SLOT_ATTR: &str = "data-slot";
pub const POST_LIST_SLOT: &str = "post-list";
pub const POST_SLOT: &str = "post";
pub const TITLE_SLOT: &str = "title";

/// Parsed page shell with validated slots
#[derive(Debug, Clone)]
pub struct PageTemplate {
    document: MarkupNode,
    post_list: MarkupNode,
}

impl PageTemplate {
    /// Parse an HTML template and check its slots
    ///
    /// # Example
    ///
    /// ```rust
    /// use tumblrite::{MarkupNode, PageTemplate};
    ///
    /// let template = PageTemplate::parse(
    ///     r#"<html><body><section data-slot="post-list"><article data-slot="post"></article></section></body></html>"#,
    /// ).unwrap();
    ///
    /// let post = MarkupNode::new("p").child("hello");
    /// let html = template.render_to_string("Cats", &[post]);
    /// assert!(html.contains("<p>hello</p>"));
    /// ```
    pub fn parse(html: &str) -> Result<Self> {
        let document = Html::parse_document(html);
        Self::from_node(scraper_to_node(document.root_element()))
    }

    /// Use an already built tree as the template
    pub fn from_node(document: MarkupNode) -> Result<Self> {
        let missing = |slot: &str| TumblriteError::MissingTemplateSlot(slot.to_string());

        // The post list is replaced inside its parent, so it cannot be the root.
        if document.attr(SLOT_ATTR) == Some(POST_LIST_SLOT) {
            return Err(missing(POST_LIST_SLOT));
        }

        let post_list = document
            .find_by_attr(SLOT_ATTR, POST_LIST_SLOT)
            .ok_or_else(|| missing(POST_LIST_SLOT))?
            .clone();
        if post_list.find_by_attr(SLOT_ATTR, POST_SLOT).is_none() {
            return Err(missing(POST_SLOT));
        }

        Ok(Self {
            document,
            post_list,
        })
    }

    /// Fill the template with a title and posts, in order
    pub fn render(&self, title: &str, posts: &[MarkupNode]) -> MarkupNode {
        let mut document = self.document.clone();

        document.for_each_by_attr_mut(SLOT_ATTR, TITLE_SLOT, &mut |slot| {
            slot.children = vec![Markup::text(title)];
        });

        let entries = posts
            .iter()
            .map(|post| Markup::Element(self.post_entry(post)))
            .collect();
        splice_post_list(&mut document, &mut Some(entries));

        document
    }

    /// Render and serialize as a complete HTML document
    pub fn render_to_string(&self, title: &str, posts: &[MarkupNode]) -> String {
        serialize_document(&self.render(title, posts))
    }

    /// Fresh copy of the post-list fragment holding one post
    fn post_entry(&self, post: &MarkupNode) -> MarkupNode {
        let mut entry = self.post_list.clone();
        if let Some(slot) = entry.find_by_attr_mut(SLOT_ATTR, POST_SLOT) {
            slot.append(post.clone());
        }
        entry
    }
}

/// Replace the first post-list element below `node` with `entries`.
///
/// Children are visited in document order, the same pre-order walk as
/// [`MarkupNode::find_by_attr`], so the replaced element is the one the
/// fragment was cloned from.
fn splice_post_list(node: &mut MarkupNode, entries: &mut Option<Vec<Markup>>) -> bool {
    for index in 0..node.children.len() {
        let Markup::Element(child) = &mut node.children[index] else {
            continue;
        };

        if child.attr(SLOT_ATTR) == Some(POST_LIST_SLOT) {
            let replacement = entries.take().unwrap_or_default();
            node.children.splice(index..index + 1, replacement);
            return true;
        }
        if splice_post_list(child, entries) {
            return true;
        }
    }
    false
}

/// Convert a scraper ElementRef to our MarkupNode structure
fn scraper_to_node(element: ElementRef<'_>) -> MarkupNode {
    let mut node = MarkupNode::new(element.value().name());
    for (name, value) in element.value().attrs() {
        node.set_attr(name, value);
    }

    for child in element.children() {
        match child.value() {
            ScraperNode::Text(text) => {
                let content: &str = &text.text;
                node.append(content);
            }
            ScraperNode::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    node.append(scraper_to_node(child_element));
                }
            }
            _ => {}
        }
    }

    node
}
