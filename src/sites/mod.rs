//! Per-site scraping strategies
//!
//! A [`SiteStrategy`] knows where a site's listings live, how its pages are
//! numbered, and how to turn its markup into [`BookRecord`]s. Navigation,
//! pagination and retries live in the crawler; strategies only interpret
//! snapshots.

mod christianlib;
mod coptic;
mod extract;
mod selectors;

pub use christianlib::ChristianLib;
pub use coptic::CopticTreasures;
pub use extract::{
    enrich_from_details, extract_record, list_entries, pages_from_text, size_from_text, RawEntry,
    MAX_TITLE_CHARS, MIN_TITLE_CHARS,
};
pub use selectors::{first_text, Matcher, SelectorTable, AUTHOR_CHAIN, TITLE_CHAIN};

use crate::book::{BookRecord, Source};
use crate::browser::PageSnapshot;
use crate::config::{SiteConfig, SitesConfig};
use crate::url::resolve_url;
use crate::{ConfigError, LibraryError};
use std::sync::Arc;
use url::Url;

/// How one library site is scraped
pub trait SiteStrategy: Send + Sync {
    fn source(&self) -> Source;

    /// Site root, used for same-site checks
    fn base_url(&self) -> &Url;

    fn selectors(&self) -> &SelectorTable;

    /// Listing start pages, tried in order until one yields records
    fn listing_roots(&self) -> Vec<Url>;

    /// Site search result pages for a query, most specific first
    ///
    /// Sites without a search endpoint return nothing and are queried by
    /// filtering their first listing page.
    fn search_urls(&self, _query: &str) -> Vec<Url> {
        Vec::new()
    }

    /// URL of listing page `page` (1-based) under `root`
    fn page_url(&self, root: &Url, page: u32) -> Option<Url> {
        if page <= 1 {
            return Some(root.clone());
        }
        root.join(&format!("page/{}/", page)).ok()
    }

    /// Hard limit on listing pages walked per root
    fn page_ceiling(&self) -> u32;

    /// Whether this site backs the secondary hop
    fn supports_secondary_hop(&self) -> bool {
        false
    }

    /// Href substrings marking a likely book page among search results
    fn secondary_hop_hints(&self) -> &'static [&'static str] {
        &[]
    }

    fn list_page(&self, page: &PageSnapshot) -> Vec<RawEntry> {
        list_entries(&page.html, &page.url, self.selectors())
    }

    fn extract_entry(&self, entry: &RawEntry) -> Option<BookRecord> {
        extract_record(entry, self.selectors(), self.source())
    }

    /// Fills missing fields from a record's details page
    fn enrich(&self, record: &mut BookRecord, details: &PageSnapshot) {
        enrich_from_details(record, details)
    }
}

/// Parses a configured base URL, normalized to end with `/`
fn parse_base(name: &str, site: &SiteConfig) -> Result<Url, ConfigError> {
    let raw = format!("{}/", site.base_url.trim_end_matches('/'));
    let root = Url::parse(&raw)
        .map_err(|e| ConfigError::InvalidUrl(format!("sites.{}.base-url: {}", name, e)))?;
    resolve_url(root.as_str(), &root)
        .map_err(|e| ConfigError::InvalidUrl(format!("sites.{}.base-url: {}", name, e)))
}

/// Builds the enabled site strategies, in the order results are merged
pub fn build_sites(config: &SitesConfig) -> Result<Vec<Arc<dyn SiteStrategy>>, LibraryError> {
    let mut sites: Vec<Arc<dyn SiteStrategy>> = Vec::new();

    if config.coptic.enabled {
        let base = parse_base("coptic", &config.coptic)?;
        sites.push(Arc::new(CopticTreasures::new(base)));
    }
    if config.christianlib.enabled {
        let base = parse_base("christianlib", &config.christianlib)?;
        sites.push(Arc::new(ChristianLib::new(base)));
    }

    Ok(sites)
}
