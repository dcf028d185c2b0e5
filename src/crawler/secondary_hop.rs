//! Secondary hop
//!
//! When primary extraction finds nothing for a query, the fallback site's
//! search results are mined for links that look like book pages. A bounded
//! number of them are visited, and each one that actually mentions the query
//! becomes a minimal record.

use super::fetcher::Navigator;
use super::parser::{body_excerpt, find_download_link, first_text, resolve_link, selector};
use crate::book::{BookRecord, Source};
use crate::browser::PageSnapshot;
use crate::sites::SiteStrategy;
use crate::text::clean_text;
use crate::url::is_same_site;
use scraper::Html;
use std::collections::HashSet;
use tracing::{debug, info};
use url::form_urlencoded::byte_serialize;
use url::Url;

/// Characters of page body searched for the query
const EXCERPT_CHARS: usize = 2000;

/// Lowercased query plus its individual keywords
struct QueryTerms {
    phrase: String,
    keywords: Vec<String>,
}

impl QueryTerms {
    fn new(query: &str) -> Self {
        let phrase = query.trim().to_lowercase();
        let keywords = phrase
            .split_whitespace()
            .filter(|w| w.chars().count() >= 2)
            .map(str::to_string)
            .collect();
        Self { phrase, keywords }
    }

    /// Whether an href mentions the query, raw or percent-encoded
    fn in_href(&self, href: &str) -> bool {
        let href = href.to_lowercase();
        self.keywords
            .iter()
            .chain(std::iter::once(&self.phrase))
            .filter(|term| !term.is_empty())
            .any(|term| href.contains(term.as_str()) || href.contains(&encoded(term)))
    }
}

/// Lowercase percent-encoding of a term, as it appears in URLs
fn encoded(term: &str) -> String {
    byte_serialize(term.as_bytes()).collect::<String>().to_lowercase()
}

/// Picks candidate book links from a search results page
///
/// Links mentioning the query come first, then links matching the site's
/// book-page hints. Only same-site links are kept, each once, at most
/// `max_follow` of them.
fn candidate_links(
    page: &PageSnapshot,
    site: &dyn SiteStrategy,
    terms: &QueryTerms,
    max_follow: usize,
) -> Vec<Url> {
    let document = Html::parse_document(&page.html);
    let Some(anchors) = selector("a[href]") else {
        return Vec::new();
    };

    let mut by_query = Vec::new();
    let mut by_hint = Vec::new();
    let mut seen = HashSet::new();

    for anchor in document.select(&anchors) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(mut url) = resolve_link(href, &page.url) else {
            continue;
        };
        url.set_fragment(None);

        if url == page.url || !is_same_site(site.base_url(), &url) {
            continue;
        }

        let lower = href.to_lowercase();
        let bucket = if terms.in_href(href) {
            &mut by_query
        } else if site.secondary_hop_hints().iter().any(|h| lower.contains(h)) {
            &mut by_hint
        } else {
            continue;
        };

        if seen.insert(url.to_string()) {
            bucket.push(url);
        }
    }

    by_query
        .into_iter()
        .chain(by_hint)
        .take(max_follow)
        .collect()
}

/// Turns a visited candidate into a record if it matches the query
fn inspect_candidate(source: Source, page: &PageSnapshot, terms: &QueryTerms) -> Option<BookRecord> {
    let document = Html::parse_document(&page.html);

    let title = clean_text(&first_text(&document, &["h1", "h2", ".entry-title"])?);
    if title.is_empty() {
        return None;
    }

    let download = find_download_link(document.root_element(), &page.url, true);
    let excerpt = body_excerpt(&document, EXCERPT_CHARS).to_lowercase();
    let file_name = download
        .as_deref()
        .and_then(|d| d.rsplit('/').next())
        .unwrap_or_default()
        .to_lowercase();

    let phrase = &terms.phrase;
    let matched = title.to_lowercase().contains(phrase.as_str())
        || excerpt.contains(phrase.as_str())
        || file_name.contains(phrase.as_str())
        || (!file_name.is_empty() && file_name.contains(&encoded(phrase)));
    if !matched {
        debug!("Candidate {} does not mention the query", page.url);
        return None;
    }

    let mut record = BookRecord::new(title, source, page.url.to_string());
    record.download_url = download;
    Some(record)
}

/// Runs the secondary hop against `site`
///
/// Search pages are tried in order until one of them yields a matching
/// record or `max_follow` candidate pages have been visited in total. Every
/// failure is swallowed: the hop contributes records or nothing.
pub async fn secondary_hop(
    site: &dyn SiteStrategy,
    nav: &mut Navigator,
    query: &str,
    max_follow: u32,
) -> Vec<BookRecord> {
    let terms = QueryTerms::new(query);
    if max_follow == 0 || terms.phrase.is_empty() {
        return Vec::new();
    }

    let mut budget = max_follow as usize;
    let mut followed = HashSet::new();
    let mut records = Vec::new();

    for search_url in site.search_urls(query) {
        if budget == 0 {
            break;
        }

        let results = match nav.visit(&search_url).await {
            Ok(Some(page)) => page,
            Ok(None) => continue,
            Err(e) => {
                debug!("Secondary hop search {} failed: {}", search_url, e);
                continue;
            }
        };

        let candidates: Vec<Url> = candidate_links(&results, site, &terms, max_follow as usize)
            .into_iter()
            .filter(|url| followed.insert(url.to_string()))
            .take(budget)
            .collect();
        if candidates.is_empty() {
            continue;
        }
        debug!(
            "Secondary hop following {} candidates from {}",
            candidates.len(),
            search_url
        );

        budget -= candidates.len();
        for candidate in candidates {
            match nav.visit(&candidate).await {
                Ok(Some(page)) => {
                    if let Some(record) = inspect_candidate(site.source(), &page, &terms) {
                        records.push(record);
                    }
                }
                Ok(None) => {}
                Err(e) => debug!("Secondary hop candidate {} failed: {}", candidate, e),
            }
        }

        if !records.is_empty() {
            break;
        }
    }

    info!(
        "Secondary hop on {} matched {} pages",
        site.source(),
        records.len()
    );
    records
}
