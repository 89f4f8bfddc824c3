//! Live retrieval from tumblr.com.
//!
//! Walks the pages of a tag search, then downloads every listed post page and
//! decodes the NPF JSON embedded in it.

use anyhow::Context;
use tumblrite::npf::decode_post;
use tumblrite::scrape::{collect_post_urls, post_npf};
use tumblrite::PostRecord;

/// Download `url` as text
fn get(url: &str) -> anyhow::Result<String> {
    log::debug!("GET {}", url);
    let response = ureq::get(url)
        .call()
        .with_context(|| format!("Failed to download {}", url))?;
    response
        .into_string()
        .with_context(|| format!("Failed to read the body of {}", url))
}

/// Decode the post behind one post page address
pub fn fetch_post(url: &str) -> anyhow::Result<PostRecord> {
    let html = get(url)?;
    let value = post_npf(url, &html)?;
    Ok(decode_post(&value)?)
}

/// Posts of a tag search, in listing order.
///
/// At most `limit` post pages are downloaded. A post that cannot be fetched
/// or decoded aborts the run unless `skip_failed` is set.
pub fn fetch_search(
    search_url: &str,
    max_pages: usize,
    limit: usize,
    skip_failed: bool,
) -> anyhow::Result<Vec<PostRecord>> {
    let urls = collect_post_urls(search_url, max_pages, get)?;
    log::info!("Found {} post(s) for {}", urls.len(), search_url);

    let mut records = Vec::new();
    for url in urls.iter().take(limit) {
        match fetch_post(url) {
            Ok(record) => records.push(record),
            Err(err) if skip_failed => log::warn!("Skipping {}: {:#}", url, err),
            Err(err) => return Err(err),
        }
    }
    Ok(records)
}
