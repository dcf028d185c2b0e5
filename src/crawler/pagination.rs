//! Listing and pagination driver
//!
//! # Flow
//!
//! **With a query:** load the site's search pages in order (or its listing
//! roots when it has no search endpoint); the first page that yields entries
//! is filtered by the query and the site stops there.
//!
//! **Without a query:** walk each listing root page by page, up to the
//! smaller of the request's `max_pages` and the site's ceiling. A page with
//! no entries or without a "next" link ends the walk. The first root that
//! yields records wins.
//!
//! Records without a PDF link get their details page visited, up to a
//! per-site budget.

use super::fetcher::Navigator;
use super::parser::has_next_page;
use crate::book::BookRecord;
use crate::sites::SiteStrategy;
use crate::LibraryError;
use tracing::{debug, info, warn};
use url::Url;

/// Per-site limits for one search
#[derive(Debug, Clone, Copy)]
pub struct HarvestLimits {
    pub max_pages: u32,

    /// Details pages that may be visited to find missing PDF links
    pub detail_fetch_limit: u32,
}

/// Collects records from one site
///
/// Strategy names are appended to `trail` as they are attempted
/// (`search:<site>` or `listing:<site>`).
///
/// # Errors
///
/// Only when nothing could be loaded at all; a failure after some records
/// were gathered ends the walk and keeps them.
pub async fn harvest_site(
    site: &dyn SiteStrategy,
    nav: &mut Navigator,
    query: Option<&str>,
    limits: HarvestLimits,
    trail: &mut Vec<String>,
) -> Result<Vec<BookRecord>, LibraryError> {
    let mut budget = limits.detail_fetch_limit;

    let records = match query {
        Some(query) => harvest_query(site, nav, query, &mut budget, trail).await?,
        None => harvest_listing(site, nav, limits.max_pages, &mut budget, trail).await?,
    };

    info!(
        "{}: {} records ({} navigations)",
        site.source(),
        records.len(),
        nav.visits()
    );
    Ok(records)
}

async fn harvest_query(
    site: &dyn SiteStrategy,
    nav: &mut Navigator,
    query: &str,
    budget: &mut u32,
    trail: &mut Vec<String>,
) -> Result<Vec<BookRecord>, LibraryError> {
    let mut targets = site.search_urls(query);
    if targets.is_empty() {
        trail.push(format!("listing:{}", site.source()));
        targets = site.listing_roots();
    } else {
        trail.push(format!("search:{}", site.source()));
    }

    let mut last_error = None;
    let mut loaded_any = false;

    for url in targets {
        let snapshot = match nav.visit(&url).await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => continue,
            Err(e) => {
                warn!("{}: {} failed: {}", site.source(), url, e);
                last_error = Some(e);
                continue;
            }
        };
        loaded_any = true;

        let entries = site.list_page(&snapshot);
        if entries.is_empty() {
            debug!("{}: no entries at {}", site.source(), url);
            continue;
        }

        let mut records: Vec<BookRecord> = entries
            .iter()
            .filter_map(|entry| site.extract_entry(entry))
            .filter(|record| record.matches_query(query))
            .collect();
        debug!(
            "{}: {} of {} entries match {:?}",
            site.source(),
            records.len(),
            entries.len(),
            query
        );

        enrich_records(site, nav, &mut records, &snapshot.url, budget).await;
        return Ok(records);
    }

    match last_error {
        Some(e) if !loaded_any => Err(e),
        _ => Ok(Vec::new()),
    }
}

async fn harvest_listing(
    site: &dyn SiteStrategy,
    nav: &mut Navigator,
    max_pages: u32,
    budget: &mut u32,
    trail: &mut Vec<String>,
) -> Result<Vec<BookRecord>, LibraryError> {
    trail.push(format!("listing:{}", site.source()));
    let ceiling = max_pages.min(site.page_ceiling()).max(1);

    let mut last_error = None;
    for root in site.listing_roots() {
        match walk_root(site, nav, &root, ceiling, budget).await {
            Ok(records) if !records.is_empty() => return Ok(records),
            Ok(_) => debug!("{}: nothing under {}", site.source(), root),
            Err(e) => {
                warn!("{}: {} failed: {}", site.source(), root, e);
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) => Err(e),
        None => Ok(Vec::new()),
    }
}

/// Walks listing pages `1..=ceiling` under one root
async fn walk_root(
    site: &dyn SiteStrategy,
    nav: &mut Navigator,
    root: &Url,
    ceiling: u32,
    budget: &mut u32,
) -> Result<Vec<BookRecord>, LibraryError> {
    let mut records = Vec::new();

    for page in 1..=ceiling {
        let Some(url) = site.page_url(root, page) else {
            break;
        };

        let snapshot = match nav.visit(&url).await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => break,
            Err(e) if records.is_empty() => return Err(e),
            Err(e) => {
                warn!(
                    "{}: stopping at page {} of {}: {}",
                    site.source(),
                    page,
                    root,
                    e
                );
                break;
            }
        };

        let mut page_records: Vec<BookRecord> = site
            .list_page(&snapshot)
            .iter()
            .filter_map(|entry| site.extract_entry(entry))
            .collect();
        if page_records.is_empty() {
            debug!("{}: page {} of {} is empty", site.source(), page, root);
            break;
        }

        enrich_records(site, nav, &mut page_records, &snapshot.url, budget).await;
        info!(
            "{}: page {} yielded {} records",
            site.source(),
            page,
            page_records.len()
        );
        records.extend(page_records);

        if !has_next_page(&snapshot.html) {
            break;
        }
    }

    Ok(records)
}

/// Visits details pages for records still missing a PDF link
///
/// Failures only cost the enrichment; the record is kept as is.
async fn enrich_records(
    site: &dyn SiteStrategy,
    nav: &mut Navigator,
    records: &mut [BookRecord],
    listing_url: &Url,
    budget: &mut u32,
) {
    for record in records.iter_mut() {
        if record.download_url.is_some() {
            continue;
        }
        if *budget == 0 {
            debug!("{}: details budget exhausted", site.source());
            return;
        }
        let Ok(details_url) = Url::parse(&record.details_url) else {
            continue;
        };
        if &details_url == listing_url {
            continue;
        }

        *budget -= 1;
        match nav.visit(&details_url).await {
            Ok(Some(details)) => site.enrich(record, &details),
            Ok(None) => {}
            Err(e) => debug!("Details page {} failed: {}", details_url, e),
        }
    }
}
