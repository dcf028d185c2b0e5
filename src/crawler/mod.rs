//! Crawler module for page navigation and extraction
//!
//! This module contains the core scraping logic, including:
//! - Navigation with robots checks, polite delays, timeouts and retries
//! - HTML helpers shared by the site strategies
//! - Listing pagination and details-page enrichment
//! - The secondary hop over search results
//! - Overall search coordination

mod coordinator;
mod fetcher;
mod pagination;
mod parser;
mod politeness;
mod secondary_hop;

pub use coordinator::{Coordinator, SearchOutcome};
pub use fetcher::{build_http_client, Navigator, RetryPolicy};
pub use pagination::{harvest_site, HarvestLimits};
pub use parser::{
    body_excerpt, element_text, find_download_link, first_text, has_next_page, resolve_link,
    selector,
};
pub use politeness::Politeness;
pub use secondary_hop::secondary_hop;
