//! Generic markup tree produced by the compiler.
//!
//! A [`MarkupNode`] is an element with a tag name, attributes and ordered
//! children. Children are either nested elements or text ([`Markup`]).
//! Trees are assembled bottom-up and only grow through [`MarkupNode::append`]
//! and friends; nothing rewrites a node once it has been handed to a parent.

use indexmap::IndexMap;

/// One child of a [`MarkupNode`]: an element or a run of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Markup {
    /// Nested element
    Element(MarkupNode),
    /// Raw (unescaped) text
    Text(String),
}

impl Markup {
    /// Create a text child
    pub fn text(content: impl Into<String>) -> Self {
        Markup::Text(content.into())
    }

    /// Get the element if this child is one
    pub fn as_element(&self) -> Option<&MarkupNode> {
        match self {
            Markup::Element(node) => Some(node),
            Markup::Text(_) => None,
        }
    }

    /// Concatenated text of this child and its descendants
    pub fn text_content(&self) -> String {
        match self {
            Markup::Element(node) => node.text_content(),
            Markup::Text(text) => text.clone(),
        }
    }

    /// Element nesting depth; text runs have depth 0
    pub fn depth(&self) -> usize {
        match self {
            Markup::Element(node) => node.depth(),
            Markup::Text(_) => 0,
        }
    }

    /// Compact HTML for this child
    pub fn outer_html(&self) -> String {
        match self {
            Markup::Element(node) => node.outer_html(),
            Markup::Text(text) => escape_html_text(text),
        }
    }
}

impl From<MarkupNode> for Markup {
    fn from(node: MarkupNode) -> Self {
        Markup::Element(node)
    }
}

impl From<String> for Markup {
    fn from(text: String) -> Self {
        Markup::Text(text)
    }
}

impl From<&str> for Markup {
    fn from(text: &str) -> Self {
        Markup::Text(text.to_string())
    }
}

/// An element node: tag, attributes, children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkupNode {
    /// Lowercase tag name
    pub tag: String,
    /// Attributes; insertion order is kept only for stable output
    pub attributes: IndexMap<String, String>,
    /// Ordered children
    pub children: Vec<Markup>,
}

impl MarkupNode {
    /// Create an element without attributes
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_lowercase(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Create an element with attributes
    pub fn with_attrs(tag: &str, attrs: &[(&str, &str)]) -> Self {
        let mut node = Self::new(tag);
        for (name, value) in attrs {
            node.set_attr(name, value);
        }
        node
    }

    /// Append a child (element or text)
    pub fn append(&mut self, child: impl Into<Markup>) {
        self.children.push(child.into());
    }

    /// Append every child of a forest, in order
    pub fn extend(&mut self, children: impl IntoIterator<Item = Markup>) {
        self.children.extend(children);
    }

    /// Builder form of [`MarkupNode::append`]
    pub fn child(mut self, child: impl Into<Markup>) -> Self {
        self.append(child);
        self
    }

    /// Get an attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        let name = name.to_lowercase();
        self.attributes.get(&name).map(String::as_str)
    }

    /// Set an attribute, replacing any previous value
    pub fn set_attr(&mut self, name: &str, value: &str) {
        let name = name.to_lowercase();
        self.attributes.insert(name, value.to_string());
    }

    /// Add a class to the space-separated `class` attribute
    pub fn add_class(&mut self, class: &str) {
        match self.attributes.get_mut("class") {
            Some(existing) if !existing.is_empty() => {
                existing.push(' ');
                existing.push_str(class);
            }
            _ => self.set_attr("class", class),
        }
    }

    /// Check the `class` attribute for a class name
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|classes| classes.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Only the element children
    pub fn element_children(&self) -> impl Iterator<Item = &MarkupNode> {
        self.children.iter().filter_map(Markup::as_element)
    }

    /// Get all text content from this node and descendants
    pub fn text_content(&self) -> String {
        self.children.iter().map(Markup::text_content).collect()
    }

    /// Depth of the element tree rooted here (a leaf element has depth 1)
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(Markup::depth).max().unwrap_or(0)
    }

    /// Depth-first search for the first element with `name="value"`
    pub fn find_by_attr(&self, name: &str, value: &str) -> Option<&MarkupNode> {
        if self.attr(name) == Some(value) {
            return Some(self);
        }
        self.element_children()
            .find_map(|child| child.find_by_attr(name, value))
    }

    /// Mutable form of [`MarkupNode::find_by_attr`]
    pub fn find_by_attr_mut(&mut self, name: &str, value: &str) -> Option<&mut MarkupNode> {
        if self.attr(name) == Some(value) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| match child {
            Markup::Element(node) => node.find_by_attr_mut(name, value),
            Markup::Text(_) => None,
        })
    }

    /// Visit every element with `name="value"`, outermost first
    pub fn for_each_by_attr_mut(
        &mut self,
        name: &str,
        value: &str,
        f: &mut dyn FnMut(&mut MarkupNode),
    ) {
        if self.attr(name) == Some(value) {
            f(self);
        }
        for child in &mut self.children {
            if let Markup::Element(node) = child {
                node.for_each_by_attr_mut(name, value, f);
            }
        }
    }

    /// Reconstruct outer HTML
    pub fn outer_html(&self) -> String {
        let attrs = self.attributes_string();
        let open = if attrs.is_empty() {
            format!("<{}>", self.tag)
        } else {
            format!("<{} {}>", self.tag, attrs)
        };

        if self.is_void_element() {
            open
        } else {
            format!("{}{}</{}>", open, self.inner_html(), self.tag)
        }
    }

    /// Reconstruct inner HTML
    pub fn inner_html(&self) -> String {
        if crate::serialize::is_raw_text(&self.tag) {
            return self.text_content();
        }
        self.children.iter().map(Markup::outer_html).collect()
    }

    /// Get attributes as a string for HTML output
    pub(crate) fn attributes_string(&self) -> String {
        self.attributes
            .iter()
            .map(|(name, value)| {
                if value.is_empty() {
                    name.clone()
                } else {
                    format!("{}=\"{}\"", name, escape_html_attr(value))
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Check if this is a void element
    pub fn is_void_element(&self) -> bool {
        crate::serialize::is_void(&self.tag)
    }
}

/// Escape HTML attribute value
pub fn escape_html_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape text content so the document stays well-formed
pub fn escape_html_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_element() {
        let node = MarkupNode::new("DIV");
        assert_eq!(node.tag, "div");
        assert!(node.children.is_empty());
    }

    #[test]
    fn test_attributes() {
        let node = MarkupNode::with_attrs(
            "a",
            &[("href", "https://example.com"), ("title", "Example")],
        );
        assert_eq!(node.attr("href"), Some("https://example.com"));
        assert_eq!(node.attr("TITLE"), Some("Example"));
        assert_eq!(node.attr("class"), None);
    }

    #[test]
    fn test_add_class() {
        let mut div = MarkupNode::with_attrs("div", &[("class", "tumblr-img-list")]);
        div.add_class("img-layout-2");
        assert_eq!(div.attr("class"), Some("tumblr-img-list img-layout-2"));
        assert!(div.has_class("img-layout-2"));

        let mut bare = MarkupNode::new("div");
        bare.add_class("x");
        assert_eq!(bare.attr("class"), Some("x"));
    }

    #[test]
    fn test_text_content_and_depth() {
        let mut div = MarkupNode::new("div");
        div.append("Hello ");
        let bold = MarkupNode::new("b").child(MarkupNode::new("i").child("World"));
        div.append(bold);

        assert_eq!(div.text_content(), "Hello World");
        assert_eq!(div.depth(), 3);
        assert_eq!(div.element_children().count(), 1);
    }

    #[test]
    fn test_outer_html() {
        let mut a = MarkupNode::with_attrs("a", &[("href", "https://example.com/?a=1&b=2")]);
        a.append("Link");
        assert_eq!(
            a.outer_html(),
            "<a href=\"https://example.com/?a=1&amp;b=2\">Link</a>"
        );
    }

    #[test]
    fn test_text_is_escaped() {
        let p = MarkupNode::new("p").child("1 < 2 & 3 > 2");
        assert_eq!(p.outer_html(), "<p>1 &lt; 2 &amp; 3 &gt; 2</p>");
    }

    #[test]
    fn test_void_element_html() {
        let img = MarkupNode::with_attrs("img", &[("src", "a.png"), ("alt", "")]);
        assert_eq!(img.outer_html(), "<img src=\"a.png\" alt>");
        assert_eq!(MarkupNode::new("hr").outer_html(), "<hr>");
    }

    #[test]
    fn test_find_by_attr() {
        let list = MarkupNode::with_attrs("section", &[("data-slot", "post-list")])
            .child(MarkupNode::with_attrs("article", &[("data-slot", "post")]));
        let mut page = MarkupNode::new("body").child(list);

        let post = page.find_by_attr("data-slot", "post");
        assert_eq!(post.map(|n| n.tag.as_str()), Some("article"));
        assert!(page.find_by_attr("data-slot", "title").is_none());

        if let Some(post) = page.find_by_attr_mut("data-slot", "post") {
            post.append("filled");
        }
        assert_eq!(page.text_content(), "filled");
    }
}
