//! Tag search and post page extraction.
//!
//! A tag search page lists its posts in a JSON-LD carousel
//! (`<script type="application/ld+json">`). A post page embeds the post's NPF
//! JSON in an element with the class `BLOG-npf`. Both are read from HTML the
//! caller already has; [`collect_post_urls`] pulls further search pages
//! through a fetch closure so the crate itself never touches the network.

use scraper::{ElementRef, Html};
use serde::Deserialize;
use serde_json::Value;

use crate::utilities::blog_name_from_url;
use crate::{Result, TumblriteError};

/// Search pages read at most per tag
pub const MAX_SEARCH_PAGES: usize = 10;

/// Posts on a full search page; a shorter page is the last one
pub const SEARCH_PAGE_SIZE: usize = 10;

#[derive(Debug, Deserialize)]
struct Carousel {
    #[serde(rename = "itemListElement", default)]
    items: Vec<CarouselItem>,
}

#[derive(Debug, Deserialize)]
struct CarouselItem {
    url: String,
}

/// Address of the 1-based `page` of a tag search
pub fn search_page_url(search_url: &str, page: usize) -> String {
    if page <= 1 {
        search_url.to_string()
    } else {
        format!("{}/page/{}", search_url.trim_end_matches('/'), page)
    }
}

/// Post addresses listed in the carousel of a search page
pub fn carousel_post_urls(html: &str) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let script = elements(&document)
        .find(|element| {
            element.value().name() == "script"
                && element.value().attr("type") == Some("application/ld+json")
        })
        .ok_or_else(|| TumblriteError::MissingPageData("search carousel".to_string()))?;

    let json: String = script.text().collect();
    let carousel: Carousel = serde_json::from_str(&json)?;
    Ok(carousel.items.into_iter().map(|item| item.url).collect())
}

/// NPF JSON embedded in the page of the post at `post_url`
pub fn post_npf(post_url: &str, html: &str) -> Result<Value> {
    let blog_name = blog_name_from_url(post_url)
        .ok_or_else(|| TumblriteError::InvalidPostUrl(post_url.to_string()))?;
    let class = format!("{}-npf", blog_name);

    let document = Html::parse_document(html);
    let holder = elements(&document)
        .find(|element| element.value().classes().any(|c| c == class))
        .ok_or_else(|| TumblriteError::MissingPageData(format!(".{} in {}", class, post_url)))?;

    let json: String = holder.text().collect();
    Ok(serde_json::from_str(&json)?)
}

/// Walk the search pages of `search_url` and gather their post addresses.
///
/// Stops after `max_pages` pages or at the first page listing fewer than
/// [`SEARCH_PAGE_SIZE`] posts.
pub fn collect_post_urls<F, E>(
    search_url: &str,
    max_pages: usize,
    mut fetch: F,
) -> std::result::Result<Vec<String>, E>
where
    F: FnMut(&str) -> std::result::Result<String, E>,
    E: From<TumblriteError>,
{
    let tag = search_url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    let mut urls = Vec::new();

    for page in 1..=max_pages {
        log::info!("Downloading page {} for search '{}'", page, tag);
        let html = fetch(&search_page_url(search_url, page))?;
        let found = carousel_post_urls(&html)?;
        let last = found.len() < SEARCH_PAGE_SIZE;
        urls.extend(found);
        if last {
            break;
        }
    }

    Ok(urls)
}

fn elements(document: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
}
