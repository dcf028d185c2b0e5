//! In-memory TTL cache for search results
//!
//! Results are keyed by a fingerprint of the request. Expired entries are
//! evicted lazily on lookup and in bulk by [`SearchCache::purge_expired`].
//! Empty result lists are never stored, so a search that found nothing is
//! retried on the next request.

use crate::book::{BookRecord, SearchRequest};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Builds the cache key for a request
///
/// Format: `v{version}|site={scope}|q={query}|p={max_pages}|f={max_follow}`,
/// lowercased, with the query whitespace-collapsed.
///
/// # Examples
///
/// ```
/// use elmafdein_library::book::{SearchRequest, SiteScope};
/// use elmafdein_library::cache::fingerprint;
///
/// let req = SearchRequest::new(Some("  Liturgy "), SiteScope::All, 2, 6).unwrap();
/// assert_eq!(fingerprint("1", &req), "v1|site=all|q=liturgy|p=2|f=6");
/// ```
pub fn fingerprint(version: &str, request: &SearchRequest) -> String {
    format!(
        "v{}|site={}|q={}|p={}|f={}",
        version,
        request.scope.as_str(),
        request.normalized_query(),
        request.max_pages,
        request.max_follow
    )
    .to_lowercase()
}

struct CacheEntry {
    items: Vec<BookRecord>,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Process-wide search result cache
pub struct SearchCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl SearchCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Creates a cache with a TTL in hours
    pub fn with_ttl_hours(hours: u64) -> Self {
        Self::new(Duration::from_secs(hours * 3600))
    }

    /// Get cached items, or None if expired/missing
    ///
    /// A poisoned lock is reported and treated as a miss.
    pub fn get(&self, key: &str) -> Option<Vec<BookRecord>> {
        let now = Instant::now();
        {
            let guard = match self.entries.read() {
                Ok(guard) => guard,
                Err(_) => {
                    warn!("Search cache lock poisoned; treating as miss");
                    return None;
                }
            };
            match guard.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired(now) => return Some(entry.items.clone()),
                Some(_) => {}
            }
        }

        if let Ok(mut guard) = self.entries.write() {
            if guard.get(key).is_some_and(|e| e.is_expired(now)) {
                guard.remove(key);
                debug!("Evicted expired cache entry {}", key);
            }
        }
        None
    }

    /// Stores items under `key`; empty lists are ignored
    pub fn set(&self, key: &str, items: Vec<BookRecord>) {
        if items.is_empty() {
            return;
        }
        match self.entries.write() {
            Ok(mut guard) => {
                guard.insert(
                    key.to_string(),
                    CacheEntry {
                        items,
                        expires_at: Instant::now() + self.ttl,
                    },
                );
            }
            Err(_) => warn!("Search cache lock poisoned; result not cached"),
        }
    }

    /// Removes every expired entry, returning how many were dropped
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        match self.entries.write() {
            Ok(mut guard) => {
                let before = guard.len();
                guard.retain(|_, entry| !entry.is_expired(now));
                before - guard.len()
            }
            Err(_) => 0,
        }
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries.read().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
