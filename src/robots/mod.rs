//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching
//! robots.txt files. Every navigation the crawler makes is checked here first;
//! a disallowed path is skipped silently rather than treated as an error.

mod cache;
mod parser;

pub use cache::CachedRobots;
pub use parser::ParsedRobots;

use crate::url::origin_of;
use crate::LibraryError;
use reqwest::{Client, StatusCode};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use url::Url;

/// Timeout for a single robots.txt request
const ROBOTS_TIMEOUT: Duration = Duration::from_secs(8);

/// Fetches and parses robots.txt for an origin
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `origin` - The `scheme://host[:port]` origin
///
/// # Returns
///
/// * `Ok(ParsedRobots)` - Parsed rules; allow-all when the file is missing (non-200)
/// * `Err(LibraryError)` - The request itself failed
pub async fn fetch_robots(client: &Client, origin: &str) -> Result<ParsedRobots, LibraryError> {
    let robots_url = format!("{}/robots.txt", origin.trim_end_matches('/'));

    let response = client
        .get(&robots_url)
        .timeout(ROBOTS_TIMEOUT)
        .send()
        .await
        .map_err(|source| LibraryError::Http {
            url: robots_url.clone(),
            source,
        })?;

    if response.status() != StatusCode::OK {
        tracing::debug!("No robots.txt at {} ({})", robots_url, response.status());
        return Ok(ParsedRobots::allow_all());
    }

    let body = response.text().await.map_err(|source| LibraryError::Http {
        url: robots_url.clone(),
        source,
    })?;

    Ok(ParsedRobots::from_content(&body))
}

/// Process-wide robots.txt rules, fetched lazily per origin
pub struct RobotsCache {
    /// `None` disables robots checks entirely
    client: Option<Client>,
    entries: RwLock<HashMap<String, CachedRobots>>,
}

impl RobotsCache {
    /// Creates a cache that fetches robots.txt with the given client
    pub fn new(client: Client) -> Self {
        Self {
            client: Some(client),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a cache that allows every URL without fetching anything
    pub fn disabled() -> Self {
        Self {
            client: None,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the rules for the URL's origin, fetching them if needed
    ///
    /// Fetch failures are logged and treated as allow-all; that verdict is
    /// cached for a shorter time than real rules.
    pub async fn rules_for(&self, url: &Url) -> ParsedRobots {
        let Some(client) = &self.client else {
            return ParsedRobots::allow_all();
        };
        let Some(origin) = origin_of(url) else {
            return ParsedRobots::allow_all();
        };

        {
            let entries = self.entries.read().await;
            if let Some(cached) = entries.get(&origin) {
                if !cached.is_stale() {
                    return cached.content.clone();
                }
            }
        }

        let entry = match fetch_robots(client, &origin).await {
            Ok(rules) => CachedRobots::fetched(rules),
            Err(e) => {
                tracing::debug!("robots.txt unavailable for {}: {}", origin, e);
                CachedRobots::unreachable()
            }
        };

        let rules = entry.content.clone();
        self.entries.write().await.insert(origin, entry);
        rules
    }

    /// Checks if the URL may be visited
    pub async fn is_allowed(&self, url: &Url) -> bool {
        self.rules_for(url).await.is_allowed(url.as_str())
    }

    /// Returns the wildcard crawl delay declared for the URL's origin
    ///
    /// Values too large for a `Duration` saturate; the politeness layer caps
    /// them anyway.
    pub async fn crawl_delay(&self, url: &Url) -> Option<Duration> {
        self.rules_for(url)
            .await
            .crawl_delay()
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .map(|secs| Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX))
    }
}
