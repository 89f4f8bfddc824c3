//! Markup serialization
//!
//! Turns a [`MarkupNode`] tree into HTML text. Compact output comes from
//! [`MarkupNode::outer_html`]; this module adds an indented layout for whole
//! documents where elements that only hold block-level children are broken
//! over several lines. Inline content is never re-flowed.

use crate::markup::{Markup, MarkupNode};

/// Elements laid out on their own line
pub const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "audio", "blockquote", "body", "canvas",
    "center", "dd", "dir", "div", "dl", "dt", "fieldset", "figcaption",
    "figure", "footer", "form", "frameset", "h1", "h2", "h3", "h4", "h5",
    "h6", "head", "header", "hgroup", "hr", "html", "li", "link", "main",
    "menu", "meta", "nav", "noscript", "ol", "p", "pre", "script", "section",
    "style", "table", "tbody", "td", "template", "tfoot", "th", "thead",
    "title", "tr", "ul",
];

/// Void (self-closing) HTML elements
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Elements whose text content is emitted without escaping
pub const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

const INDENT: &str = "  ";

/// Check if a tag is a block-level element
pub fn is_block(tag: &str) -> bool {
    BLOCK_ELEMENTS.contains(&tag.to_lowercase().as_str())
}

/// Check if a tag is a void element
pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag.to_lowercase().as_str())
}

/// Check if a tag holds raw text
pub fn is_raw_text(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag.to_lowercase().as_str())
}

/// Serialize a whole document with a doctype prologue
pub fn serialize_document(root: &MarkupNode) -> String {
    let mut output = String::with_capacity(4096);
    output.push_str("<!DOCTYPE html>\n");
    serialize_node(root, 0, &mut output);
    output
}

/// Serialize a node with indentation
pub fn serialize_pretty(node: &MarkupNode) -> String {
    let mut output = String::new();
    serialize_node(node, 0, &mut output);
    output
}

fn serialize_node(node: &MarkupNode, depth: usize, out: &mut String) {
    push_indent(depth, out);

    if !has_block_layout(node) {
        out.push_str(&node.outer_html());
        out.push('\n');
        return;
    }

    let attrs = node.attributes_string();
    if attrs.is_empty() {
        out.push_str(&format!("<{}>\n", node.tag));
    } else {
        out.push_str(&format!("<{} {}>\n", node.tag, attrs));
    }

    for child in node.element_children() {
        serialize_node(child, depth + 1, out);
    }

    push_indent(depth, out);
    out.push_str(&format!("</{}>\n", node.tag));
}

/// An element gets block layout when it has element children and every child
/// is a block element or whitespace.
fn has_block_layout(node: &MarkupNode) -> bool {
    if node.is_void_element() || is_raw_text(&node.tag) || node.tag == "pre" {
        return false;
    }

    node.element_children().next().is_some()
        && node.children.iter().all(|child| match child {
            Markup::Element(element) => is_block(&element.tag),
            Markup::Text(text) => text.trim().is_empty(),
        })
}

fn push_indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}
