//! Post composition
//!
//! Renders a post and its reblog trail into one container: every ancestor
//! oldest first, each followed by a divider, then the optional reblog header
//! and the post's own content.

use tumblrite_core::{BlogRef, Diagnostics, MarkupNode, Options, PostRecord};

use crate::group::BlockGrouper;
use crate::utilities::permalink;
use crate::Result;

pub const POST_CLASS: &str = "tumblr-post";
pub const DIVIDER_CLASS: &str = "tumblr-reblog-divider";
pub const HEADER_CLASS: &str = "tumblr-reblog-header";

/// Composes posts with their reblog trails
#[derive(Debug, Clone, Copy)]
pub struct PostComposer<'a> {
    options: &'a Options,
    grouper: BlockGrouper<'a>,
}

impl<'a> PostComposer<'a> {
    pub fn new(options: &'a Options) -> Self {
        Self {
            options,
            grouper: BlockGrouper::new(options),
        }
    }

    /// Render `post` into a fresh container node.
    ///
    /// The input record is only read; the returned tree shares nothing with it.
    pub fn compose(&self, post: &PostRecord, diagnostics: &mut Diagnostics) -> Result<MarkupNode> {
        let mut container = MarkupNode::with_attrs(
            "div",
            &[("class", POST_CLASS), ("data-post-id", post.id.as_str())],
        );

        for ancestor in post.ancestors_oldest_first() {
            container.append(self.compose(ancestor, diagnostics)?);
            container.append(MarkupNode::with_attrs("hr", &[("class", DIVIDER_CLASS)]));
        }

        if let Some(blog) = &post.blog {
            if self.options.include_reblog_headers {
                container.append(reblog_header(blog, &post.id));
            }
        }

        container.extend(self.grouper.group(&post.content, diagnostics)?);

        Ok(container)
    }
}

/// Avatar, blog name and permalink of a reblogged post
fn reblog_header(blog: &BlogRef, post_id: &str) -> MarkupNode {
    let avatar = MarkupNode::with_attrs(
        "img",
        &[
            ("class", "tumblr-avatar"),
            ("src", blog.avatar_url.as_str()),
            ("alt", blog.name.as_str()),
            ("loading", "lazy"),
        ],
    );
    let name = anchor("tumblr-blog-name", &blog.url, &blog.name);
    let href = permalink(&blog.name, post_id);
    let link = anchor("tumblr-permalink", &href, "permalink");

    MarkupNode::with_attrs("div", &[("class", HEADER_CLASS)])
        .child(avatar)
        .child(name)
        .child(link)
}

fn anchor(class: &str, href: &str, text: &str) -> MarkupNode {
    MarkupNode::with_attrs("a", &[("class", class), ("href", href)]).child(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tumblrite_core::{Block, Markup, StyleKind, TextSpan};

    fn blog(name: &str) -> BlogRef {
        BlogRef {
            name: name.to_string(),
            url: format!("https://{}.tumblr.com/", name),
            avatar_url: format!("https://avatars.example/{}.png", name),
        }
    }

    fn post(id: &str, blog_name: Option<&str>, text: &str) -> PostRecord {
        let mut post = PostRecord::new(id, vec![Block::paragraph(text)]);
        post.blog = blog_name.map(blog);
        post
    }

    /// Tag plus identifying detail of each top-level child
    fn outline(node: &MarkupNode) -> Vec<String> {
        node.element_children()
            .map(|child| match child.attr("data-post-id") {
                Some(id) => format!("post:{}", id),
                None => match child.attr("class") {
                    Some(class) => format!("{}.{}", child.tag, class),
                    None => format!("{}:{}", child.tag, child.text_content()),
                },
            })
            .collect()
    }

    #[test]
    fn test_plain_post() {
        let options = Options::default();
        let node = PostComposer::new(&options)
            .compose(&post("1", None, "hello"), &mut Diagnostics::new())
            .unwrap();

        assert_eq!(
            node.outer_html(),
            "<div class=\"tumblr-post\" data-post-id=\"1\"><p>hello</p></div>"
        );
    }

    #[test]
    fn test_trail_is_rendered_oldest_first() {
        let mut post_c = post("c", None, "own content");
        post_c.trail = vec![
            post("b", Some("bee"), "from b"),
            post("a", Some("ay"), "from a"),
        ];

        let options = Options::default();
        let node = PostComposer::new(&options)
            .compose(&post_c, &mut Diagnostics::new())
            .unwrap();

        assert_eq!(
            outline(&node),
            vec![
                "post:a",
                "hr.tumblr-reblog-divider",
                "post:b",
                "hr.tumblr-reblog-divider",
                "p:own content",
            ]
        );

        let first = node.element_children().next().unwrap();
        assert_eq!(outline(first), vec!["div.tumblr-reblog-header", "p:from a"]);
    }

    #[test]
    fn test_reblog_header() {
        let options = Options::default();
        let node = PostComposer::new(&options)
            .compose(&post("42", Some("staff"), "hi"), &mut Diagnostics::new())
            .unwrap();

        let header = node.element_children().next().unwrap();
        assert_eq!(
            header.outer_html(),
            "<div class=\"tumblr-reblog-header\">\
             <img class=\"tumblr-avatar\" src=\"https://avatars.example/staff.png\" alt=\"staff\" loading=\"lazy\">\
             <a class=\"tumblr-blog-name\" href=\"https://staff.tumblr.com/\">staff</a>\
             <a class=\"tumblr-permalink\" href=\"https://staff.tumblr.com/post/42\">permalink</a>\
             </div>"
        );
    }

    #[test]
    fn test_headers_disabled_keeps_dividers() {
        let mut post_b = post("b", None, "mine");
        post_b.trail = vec![post("a", Some("ay"), "theirs")];

        let options = Options {
            include_reblog_headers: false,
            ..Default::default()
        };
        let node = PostComposer::new(&options)
            .compose(&post_b, &mut Diagnostics::new())
            .unwrap();

        assert_eq!(
            outline(&node),
            vec!["post:a", "hr.tumblr-reblog-divider", "p:mine"]
        );
        let ancestor = node.element_children().next().unwrap();
        assert_eq!(outline(ancestor), vec!["p:theirs"]);
    }

    #[test]
    fn test_nested_trails_recurse() {
        let mut middle = post("b", Some("bee"), "middle");
        middle.trail = vec![post("a", Some("ay"), "oldest")];
        let mut top = post("c", None, "newest");
        top.trail = vec![middle];

        let options = Options::default();
        let node = PostComposer::new(&options)
            .compose(&top, &mut Diagnostics::new())
            .unwrap();

        let text: Vec<String> = node.children.iter().map(Markup::text_content).collect();
        assert_eq!(
            text,
            vec!["aypermalinkoldestbeepermalinkmiddle", "", "newest"]
        );
    }

    #[test]
    fn test_nesting_error_aborts_post() {
        let bad = PostRecord::new(
            "x",
            vec![Block::Paragraph {
                text: "abcdefgh".to_string(),
                spans: vec![
                    TextSpan::new(0, 5, StyleKind::Bold),
                    TextSpan::new(2, 7, StyleKind::Italic),
                ],
            }],
        );
        let mut top = post("y", None, "fine");
        top.trail = vec![bad];

        let options = Options::default();
        let err = PostComposer::new(&options)
            .compose(&top, &mut Diagnostics::new())
            .unwrap_err();
        assert!(err.is_nesting_error());
    }
}
