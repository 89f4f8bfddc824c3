//! Neue Post Format decoding.
//!
//! Converts raw post JSON into [`PostRecord`]s. Decoding is lenient about
//! content: a block or formatting entry we do not understand is kept as an
//! `Unknown` variant so the compiler can report it and substitute a fallback.
//! Only the record envelope (an object with an `id`) is mandatory.

use serde::Deserialize;
use serde_json::Value;
use tumblrite_core::{Block, BlogRef, PostRecord, StyleKind, TextSpan};

use crate::utilities::blog_url;
use crate::{Result, TumblriteError};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(id) => id,
            RawId::Number(id) => id.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawPost {
    id: Option<RawId>,
    /// Lossless form of numeric ids; preferred when present
    id_string: Option<String>,
    blog: Option<RawBlog>,
    #[serde(default)]
    trail: Vec<Value>,
    #[serde(default)]
    content: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RawBlog {
    name: String,
    url: Option<String>,
    #[serde(default)]
    avatar: Vec<RawMedia>,
    avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMedia {
    url: String,
    #[serde(default)]
    has_original_dimensions: bool,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RawBlock {
    Text {
        text: String,
        subtype: Option<String>,
        #[serde(default, alias = "spans")]
        formatting: Vec<Value>,
    },
    Image { media: Vec<RawMedia> },
}

#[derive(Debug, Deserialize)]
struct RawFormatting {
    start: usize,
    end: usize,
    #[serde(rename = "type")]
    kind: String,
    url: Option<String>,
    blog: Option<RawMentionBlog>,
    hex: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMentionBlog {
    name: String,
    url: Option<String>,
}

/// Decode a JSON document holding one post or an array of posts
pub fn decode_posts(json: &str) -> Result<Vec<PostRecord>> {
    let value: Value = serde_json::from_str(json)?;
    match value {
        Value::Array(items) => items.iter().map(decode_post).collect(),
        other => Ok(vec![decode_post(&other)?]),
    }
}

/// Decode a single post record and its trail
pub fn decode_post(value: &Value) -> Result<PostRecord> {
    if !value.is_object() {
        return Err(TumblriteError::InvalidRecord(format!(
            "expected an object, found {}",
            value
        )));
    }

    let raw = RawPost::deserialize(value)?;
    let id = raw
        .id_string
        .or_else(|| raw.id.map(RawId::into_string))
        .ok_or_else(|| TumblriteError::InvalidRecord("post has no id".to_string()))?;

    let trail = raw
        .trail
        .iter()
        .map(decode_post)
        .collect::<Result<Vec<_>>>()?;

    Ok(PostRecord {
        id,
        blog: raw.blog.map(decode_blog),
        trail,
        content: raw.content.iter().map(decode_block).collect(),
    })
}

fn decode_blog(raw: RawBlog) -> BlogRef {
    let avatar_url = raw
        .avatar_url
        .or_else(|| raw.avatar.into_iter().next().map(|media| media.url))
        .unwrap_or_default();

    BlogRef {
        url: raw.url.unwrap_or_else(|| blog_url(&raw.name)),
        name: raw.name,
        avatar_url,
    }
}

/// Decode one content block, keeping anything unrecognised as `Unknown`
pub fn decode_block(value: &Value) -> Block {
    let unknown = |subtype: Option<String>| Block::Unknown {
        subtype,
        raw: serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()),
    };

    let Ok(raw) = RawBlock::deserialize(value) else {
        return unknown(None);
    };

    match raw {
        RawBlock::Text {
            text,
            subtype,
            formatting,
        } => {
            let spans = formatting.iter().map(decode_span).collect();
            match subtype.as_deref() {
                None => Block::Paragraph { text, spans },
                Some("heading1") => Block::Heading {
                    level: 1,
                    text,
                    spans,
                },
                Some("heading2") => Block::Heading {
                    level: 2,
                    text,
                    spans,
                },
                Some("ordered-list-item") => Block::ListItem { text, spans },
                Some(other) => unknown(Some(other.to_string())),
            }
        }
        RawBlock::Image { media } => match pick_media(media) {
            Some(url) => Block::Image { url },
            None => unknown(None),
        },
    }
}

/// Prefer the original-size rendition, else the first one listed
fn pick_media(media: Vec<RawMedia>) -> Option<String> {
    let original = media.iter().position(|m| m.has_original_dimensions);
    let index = original.unwrap_or(0);
    media.into_iter().nth(index).map(|m| m.url)
}

/// Decode one formatting entry; a malformed entry becomes an `Unknown` span
/// so the text it covers still renders
fn decode_span(value: &Value) -> TextSpan {
    let raw = match RawFormatting::deserialize(value) {
        Ok(raw) => raw,
        Err(err) => {
            let offset = |key: &str| {
                value
                    .get(key)
                    .and_then(Value::as_u64)
                    .and_then(|offset| usize::try_from(offset).ok())
                    .unwrap_or_default()
            };
            let kind = StyleKind::Unknown(format!("malformed formatting ({})", err));
            return TextSpan::new(offset("start"), offset("end"), kind);
        }
    };

    let kind = match raw.kind.as_str() {
        "bold" => StyleKind::Bold,
        "italic" => StyleKind::Italic,
        "strikethrough" => StyleKind::Strikethrough,
        "small" => StyleKind::Small,
        "link" => match raw.url {
            Some(url) => StyleKind::Link { url },
            None => StyleKind::Unknown("link without url".to_string()),
        },
        "mention" => match raw.blog {
            Some(blog) => StyleKind::Mention {
                blog_name: blog.name,
                url: blog.url,
            },
            None => StyleKind::Unknown("mention without blog".to_string()),
        },
        "color" => match raw.hex {
            Some(hex) => StyleKind::Color { hex },
            None => StyleKind::Unknown("color without hex".to_string()),
        },
        _ => StyleKind::Unknown(raw.kind),
    };

    TextSpan::new(raw.start, raw.end, kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_decode_text_blocks() {
        let post = decode_post(&json!({
            "id": "123",
            "content": [
                {"type": "text", "text": "Title", "subtype": "heading1"},
                {"type": "text", "text": "Hello world", "formatting": [
                    {"start": 0, "end": 5, "type": "bold"},
                    {"start": 6, "end": 11, "type": "link", "url": "https://example.com"}
                ]},
                {"type": "text", "text": "item", "subtype": "ordered-list-item"}
            ]
        }))
        .unwrap();

        assert_eq!(post.id, "123");
        assert_eq!(
            post.content,
            vec![
                Block::Heading {
                    level: 1,
                    text: "Title".to_string(),
                    spans: Vec::new(),
                },
                Block::Paragraph {
                    text: "Hello world".to_string(),
                    spans: vec![
                        TextSpan::new(0, 5, StyleKind::Bold),
                        TextSpan::new(
                            6,
                            11,
                            StyleKind::Link {
                                url: "https://example.com".to_string(),
                            }
                        ),
                    ],
                },
                Block::list_item("item"),
            ]
        );
    }

    #[test]
    fn test_image_prefers_original_dimensions() {
        let block = decode_block(&json!({
            "type": "image",
            "media": [
                {"url": "https://64.media.tumblr.com/s640.jpg"},
                {"url": "https://64.media.tumblr.com/orig.jpg", "has_original_dimensions": true}
            ]
        }));
        assert_eq!(block, Block::image("https://64.media.tumblr.com/orig.jpg"));

        let block = decode_block(&json!({
            "type": "image",
            "media": [{"url": "https://64.media.tumblr.com/only.jpg"}]
        }));
        assert_eq!(block, Block::image("https://64.media.tumblr.com/only.jpg"));
    }

    #[test]
    fn test_unknown_blocks() {
        let block = decode_block(&json!({"type": "text", "text": "x", "subtype": "chat"}));
        assert!(matches!(
            block,
            Block::Unknown { subtype: Some(ref s), .. } if s == "chat"
        ));

        for raw in [
            json!({"type": "poll", "question": "?"}),
            json!({"type": "image", "media": []}),
            json!("not even an object"),
        ] {
            assert!(matches!(
                decode_block(&raw),
                Block::Unknown { subtype: None, .. }
            ));
        }
    }

    #[test]
    fn test_decode_spans() {
        let block = decode_block(&json!({
            "type": "text",
            "text": "hey @staff in red",
            "spans": [
                {"start": 4, "end": 10, "type": "mention", "blog": {"name": "staff"}},
                {"start": 14, "end": 17, "type": "color", "hex": "#ff4930"},
                {"start": 0, "end": 3, "type": "sparkle"},
                {"start": 0, "end": 3, "type": "link"}
            ]
        }));
        let Block::Paragraph { spans, .. } = block else {
            panic!("expected a paragraph");
        };

        let kinds: Vec<StyleKind> = spans.into_iter().map(|span| span.kind).collect();
        assert_eq!(
            kinds,
            vec![
                StyleKind::Mention {
                    blog_name: "staff".to_string(),
                    url: None,
                },
                StyleKind::Color {
                    hex: "#ff4930".to_string(),
                },
                StyleKind::Unknown("sparkle".to_string()),
                StyleKind::Unknown("link without url".to_string()),
            ]
        );
    }

    #[test]
    fn test_malformed_formatting_keeps_text() {
        let block = decode_block(&json!({
            "type": "text",
            "text": "hello world",
            "formatting": [
                {"start": 0, "end": 5, "type": "bold"},
                {"start": 6, "type": "italic"}
            ]
        }));
        let Block::Paragraph { text, spans } = block else {
            panic!("expected a paragraph, found {:?}", block);
        };

        assert_eq!(text, "hello world");
        assert_eq!(spans[0], TextSpan::new(0, 5, StyleKind::Bold));
        assert_eq!(spans[1].start, 6);
        assert!(matches!(
            spans[1].kind,
            StyleKind::Unknown(ref kind) if kind.starts_with("malformed")
        ));
    }

    #[test]
    fn test_decode_blog_and_trail() {
        let post = decode_post(&json!({
            "id_string": "3",
            "content": [],
            "trail": [
                {
                    "id": 2,
                    "blog": {
                        "name": "bee",
                        "avatar": [{"url": "https://64.media.tumblr.com/avatar_bee_128.pnj"}]
                    },
                    "content": [{"type": "text", "text": "b"}]
                }
            ]
        }))
        .unwrap();

        assert_eq!(post.id, "3");
        let ancestor = &post.trail[0];
        assert_eq!(ancestor.id, "2");
        assert_eq!(
            ancestor.blog,
            Some(BlogRef {
                name: "bee".to_string(),
                url: "https://bee.tumblr.com/".to_string(),
                avatar_url: "https://64.media.tumblr.com/avatar_bee_128.pnj".to_string(),
            })
        );
    }

    #[test]
    fn test_invalid_records() {
        assert!(matches!(
            decode_post(&json!({"content": []})),
            Err(TumblriteError::InvalidRecord(_))
        ));
        assert!(matches!(
            decode_post(&json!([1, 2])),
            Err(TumblriteError::InvalidRecord(_))
        ));
        assert!(matches!(decode_posts("{"), Err(TumblriteError::Json(_))));
    }

    #[test]
    fn test_decode_posts_array() {
        let posts = decode_posts(r#"[{"id": "1"}, {"id": "2", "content": []}]"#).unwrap();
        let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }
}
