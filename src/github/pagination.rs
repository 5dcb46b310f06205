//! Link-header pagination helpers.
//!
//! GitHub paginates list endpoints and advertises the other pages in an
//! RFC 8288 `Link` header:
//!
//! ```text
//! <https://api.github.com/repositories/1/issues/9/comments?page=2>; rel="next",
//! <https://api.github.com/repositories/1/issues/9/comments?page=4>; rel="last"
//! ```
//!
//! The stale check only wants the `last` page of a comment thread. Listings
//! whose every entry matters (open pull requests, changed files) follow
//! `next` until it runs out.

use parse_link_header::{parse_with_rel, Link};
use reqwest::header::HeaderMap;
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{check_status, GitHubError, HttpClient};

fn relation(link_header: &str, rel: &str) -> Option<Link> {
    parse_with_rel(link_header).ok()?.remove(rel)
}

/// Extract the page number of the `rel="last"` link.
///
/// Returns `None` when the header has no `last` relation (a single-page
/// listing, or the caller is already on the last page) or when its target
/// carries no usable `page` query parameter.
pub fn parse_last_page(link_header: &str) -> Option<u32> {
    relation(link_header, "last")?
        .queries
        .get("page")
        .and_then(|page| page.parse::<u32>().ok())
}

/// Target of the `rel="next"` link, if there is another page.
pub fn next_page_url(link_header: &str) -> Option<String> {
    relation(link_header, "next").map(|link| link.raw_uri)
}

/// Return `url` with its `page` query parameter set to `page`, keeping any
/// other query parameters.
pub fn with_page(url: &str, page: u32) -> Result<String, GitHubError> {
    let mut parsed = Url::parse(url).map_err(|_| GitHubError::InvalidUrl(url.to_string()))?;
    let retained: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| key != "page")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    parsed
        .query_pairs_mut()
        .clear()
        .extend_pairs(retained)
        .append_pair("page", &page.to_string());

    Ok(parsed.into())
}

/// GET a paginated listing and collect every page, in order.
///
/// Stops when a page has no `next` link, or when `next` points back at the
/// page just read.
pub async fn fetch_all_pages<T: DeserializeOwned>(
    client: &dyn HttpClient,
    url: &str,
    headers: &HeaderMap,
) -> Result<Vec<T>, GitHubError> {
    let mut items = Vec::new();
    let mut current = url.to_string();
    loop {
        let response = check_status(client.get(&current, headers).await?)?;
        let page: Vec<T> = response.json()?;
        items.extend(page);

        match response.link.as_deref().and_then(next_page_url) {
            Some(next) if next != current => {
                debug!(%next, "following next page");
                current = next;
            }
            _ => return Ok(items),
        }
    }
}
