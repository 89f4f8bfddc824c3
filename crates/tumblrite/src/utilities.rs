//! Utility functions for Tumblr addresses and titles.

use once_cell::sync::Lazy;
use regex::Regex;

static BLOG_POST_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https://([^./]+)\.tumblr\.com/").expect("valid regex"));

static TAGGED_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://[^/]*?\.tumblr\.com/tagged/([^/?#]+)").expect("valid regex")
});

/// Home page of a blog
pub fn blog_url(blog_name: &str) -> String {
    format!("https://{}.tumblr.com/", blog_name)
}

/// Permalink of a post on a blog
pub fn permalink(blog_name: &str, post_id: &str) -> String {
    format!("https://{}.tumblr.com/post/{}", blog_name, post_id)
}

/// Extract the blog name from a `https://NAME.tumblr.com/...` address
pub fn blog_name_from_url(url: &str) -> Option<&str> {
    BLOG_POST_URL
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Derive a page title from a tag search address.
///
/// `https://blog.tumblr.com/tagged/cute+cats` becomes `Cute Cats`.
pub fn tag_title(search_url: &str) -> Option<String> {
    let tag = TAGGED_URL.captures(search_url)?.get(1)?.as_str();
    let words: Vec<String> = tag
        .split(['+', ' '])
        .filter(|word| !word.is_empty())
        .map(title_case)
        .collect();
    Some(words.join(" "))
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
