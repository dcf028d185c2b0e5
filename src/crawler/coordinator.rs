//! Search coordinator - main search orchestration logic
//!
//! This module ties the pieces of a search together:
//! - Cache lookup by request fingerprint
//! - One browser session per search, one tab per site
//! - Sequential or concurrent site harvesting, with per-site failure isolation
//! - The secondary hop when primary extraction comes back empty
//! - Merging, de-duplication, sanitizing and caching of the results

use super::fetcher::{build_http_client, Navigator, RetryPolicy};
use super::pagination::{harvest_site, HarvestLimits};
use super::politeness::Politeness;
use super::secondary_hop::secondary_hop;
use crate::book::{dedup, sanitize, BookRecord, SearchRequest};
use crate::browser::{launcher_for, BrowserLauncher, BrowserSession};
use crate::cache::{fingerprint, SearchCache};
use crate::config::Config;
use crate::robots::RobotsCache;
use crate::sites::{build_sites, SiteStrategy};
use crate::LibraryError;
use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Result of one search
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// De-duplicated, sanitized records in site order
    pub items: Vec<BookRecord>,

    /// Whether the items came from the cache
    pub cached: bool,

    /// Strategies attempted, in order (`listing:coptic`, `search:christianlib`,
    /// `error:coptic`, `secondary_hop`, `error:secondary`)
    ///
    /// A cache hit is reported as the single marker `cache`, which names no
    /// site.
    pub tried: Vec<String>,
}

/// Main search coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    launcher: Arc<dyn BrowserLauncher>,
    robots: Arc<RobotsCache>,
    cache: SearchCache,
    sites: Vec<Arc<dyn SiteStrategy>>,
}

impl Coordinator {
    /// Creates a coordinator using the browser engine named in the config
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to search
    /// * `Err(LibraryError)` - HTTP client or site setup failed
    pub fn new(config: Config) -> Result<Self, LibraryError> {
        let client = build_http_client(
            &config.user_agent,
            Duration::from_secs(config.scraper.navigation_timeout_secs),
        )?;
        let launcher = launcher_for(&config, client);
        Self::with_launcher(config, launcher)
    }

    /// Creates a coordinator driving the given browser launcher
    pub fn with_launcher(
        config: Config,
        launcher: Arc<dyn BrowserLauncher>,
    ) -> Result<Self, LibraryError> {
        let robots = if config.scraper.respect_robots {
            let client = build_http_client(
                &config.user_agent,
                Duration::from_secs(config.scraper.navigation_timeout_secs),
            )?;
            RobotsCache::new(client)
        } else {
            warn!("robots.txt checks are disabled");
            RobotsCache::disabled()
        };

        let sites = build_sites(&config.sites)?;
        let cache = SearchCache::with_ttl_hours(config.cache.ttl_hours);

        Ok(Self {
            config: Arc::new(config),
            launcher,
            robots: Arc::new(robots),
            cache,
            sites,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &SearchCache {
        &self.cache
    }

    fn cache_key(&self, request: &SearchRequest) -> String {
        fingerprint(&self.config.cache.schema_version, request)
    }

    /// Runs a search, answering from the cache when possible
    ///
    /// # Errors
    ///
    /// Only whole-search failures (the browser could not be launched). Site
    /// failures are recorded in [`SearchOutcome::tried`] instead.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchOutcome, LibraryError> {
        let key = self.cache_key(request);
        if let Some(items) = self.cache.get(&key) {
            debug!("Cache hit for {}", key);
            return Ok(SearchOutcome {
                items,
                cached: true,
                tried: vec!["cache".to_string()],
            });
        }

        let outcome = self.scrape(request).await?;
        self.cache.set(&key, outcome.items.clone());
        Ok(outcome)
    }

    /// Runs a search without reading the cache, then stores the result
    ///
    /// Expired entries are swept first.
    pub async fn refresh(&self, request: &SearchRequest) -> Result<SearchOutcome, LibraryError> {
        let purged = self.cache.purge_expired();
        if purged > 0 {
            info!("Purged {} expired cache entries", purged);
        }

        let outcome = self.scrape(request).await?;
        self.cache.set(&self.cache_key(request), outcome.items.clone());
        Ok(outcome)
    }

    async fn scrape(&self, request: &SearchRequest) -> Result<SearchOutcome, LibraryError> {
        let started = Instant::now();
        info!(
            "LIB start q={:?} site={} p={} f={}",
            request.query.as_deref().unwrap_or(""),
            request.scope,
            request.max_pages,
            request.max_follow
        );

        let sites: Vec<Arc<dyn SiteStrategy>> = self
            .sites
            .iter()
            .filter(|site| request.scope.includes(site.source()))
            .cloned()
            .collect();
        if sites.is_empty() {
            warn!("No enabled site covers scope {}", request.scope);
            return Ok(SearchOutcome {
                items: Vec::new(),
                cached: false,
                tried: Vec::new(),
            });
        }

        let session = self.launcher.launch().await?;

        let harvests = if self.config.scraper.parallel_sites {
            join_all(
                sites
                    .iter()
                    .map(|site| self.harvest_one(session.as_ref(), site.as_ref(), request)),
            )
            .await
        } else {
            let mut harvests = Vec::with_capacity(sites.len());
            for site in &sites {
                harvests.push(
                    self.harvest_one(session.as_ref(), site.as_ref(), request)
                        .await,
                );
            }
            harvests
        };

        let mut items = Vec::new();
        let mut tried = Vec::new();
        for (records, trail) in harvests {
            items.extend(records);
            tried.extend(trail);
        }

        if let Some(query) = request.query.as_deref() {
            if items.len() < self.config.scraper.secondary_hop_threshold {
                if let Some(site) = sites.iter().find(|site| site.supports_secondary_hop()) {
                    match self.open_navigator(session.as_ref()).await {
                        Ok(mut nav) => {
                            let found =
                                secondary_hop(site.as_ref(), &mut nav, query, request.max_follow)
                                    .await;
                            nav.close().await;
                            if !found.is_empty() {
                                tried.push("secondary_hop".to_string());
                                items.extend(found);
                            }
                        }
                        Err(e) => {
                            warn!("Secondary hop could not open a tab: {}", e);
                            tried.push("error:secondary".to_string());
                        }
                    }
                }
            }
        }

        session.close().await;

        let items = sanitize(dedup(items));
        let took = started.elapsed().as_millis();
        if items.is_empty() {
            info!("LIB empty tried={:?} took={}ms", tried, took);
        } else {
            info!("LIB ok items={} took={}ms", items.len(), took);
        }

        Ok(SearchOutcome {
            items,
            cached: false,
            tried,
        })
    }

    async fn open_navigator(&self, session: &dyn BrowserSession) -> Result<Navigator, LibraryError> {
        let page = session.new_page().await?;
        Ok(Navigator::new(
            page,
            self.robots.clone(),
            RetryPolicy::from_config(&self.config.scraper),
            Politeness::from_config(&self.config.scraper),
        ))
    }

    /// Harvests one site on its own tab; failures become an `error:<site>` entry
    async fn harvest_one(
        &self,
        session: &dyn BrowserSession,
        site: &dyn SiteStrategy,
        request: &SearchRequest,
    ) -> (Vec<BookRecord>, Vec<String>) {
        let mut trail = Vec::new();

        let mut nav = match self.open_navigator(session).await {
            Ok(nav) => nav,
            Err(e) => {
                warn!("{}: could not open a tab: {}", site.source(), e);
                trail.push(format!("error:{}", site.source()));
                return (Vec::new(), trail);
            }
        };

        let limits = HarvestLimits {
            max_pages: request.max_pages,
            detail_fetch_limit: self.config.scraper.detail_fetch_limit,
        };
        let result = harvest_site(
            site,
            &mut nav,
            request.query.as_deref(),
            limits,
            &mut trail,
        )
        .await;
        nav.close().await;

        match result {
            Ok(records) => (records, trail),
            Err(e) => {
                warn!("LIB fail site={}: {}", site.source(), e);
                trail.push(format!("error:{}", site.source()));
                (Vec::new(), trail)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::{SiteScope, Source};
    use crate::browser::{BrowserPage, PageSnapshot};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use url::Url;

    /// Serves a fixed set of pages; anything else fails to load
    struct FakeLauncher {
        pages: Arc<HashMap<String, String>>,
        launches: AtomicU32,
        broken: bool,
    }

    struct FakeSession {
        pages: Arc<HashMap<String, String>>,
    }

    struct FakePage {
        pages: Arc<HashMap<String, String>>,
    }

    #[async_trait]
    impl BrowserLauncher for FakeLauncher {
        async fn launch(&self) -> Result<Arc<dyn BrowserSession>, LibraryError> {
            self.launches.fetch_add(1, Ordering::SeqCst);
            if self.broken {
                return Err(LibraryError::Browser("no chrome".into()));
            }
            Ok(Arc::new(FakeSession {
                pages: self.pages.clone(),
            }))
        }
    }

    #[async_trait]
    impl BrowserSession for FakeSession {
        async fn new_page(&self) -> Result<Box<dyn BrowserPage>, LibraryError> {
            Ok(Box::new(FakePage {
                pages: self.pages.clone(),
            }))
        }

        async fn close(&self) {}
    }

    #[async_trait]
    impl BrowserPage for FakePage {
        async fn navigate(&mut self, url: &Url) -> Result<PageSnapshot, LibraryError> {
            match self.pages.get(url.as_str()) {
                Some(html) => Ok(PageSnapshot {
                    url: url.clone(),
                    html: html.clone(),
                }),
                None => Err(LibraryError::Browser(format!("not served: {}", url))),
            }
        }

        async fn close(&mut self) {}
    }

    fn test_config() -> Config {
        let mut config = Config::default();
        config.scraper.delay_min_ms = 0;
        config.scraper.delay_max_ms = 0;
        config.scraper.respect_robots = false;
        config
    }

    fn coordinator(pages: &[(&str, &str)], broken: bool) -> (Coordinator, Arc<FakeLauncher>) {
        let launcher = Arc::new(FakeLauncher {
            pages: Arc::new(
                pages
                    .iter()
                    .map(|(url, html)| (url.to_string(), html.to_string()))
                    .collect(),
            ),
            launches: AtomicU32::new(0),
            broken,
        });
        let coordinator = Coordinator::with_launcher(test_config(), launcher.clone()).unwrap();
        (coordinator, launcher)
    }

    const COPTIC_LISTING: &str = "https://coptic-treasures.com/sections/books/";
    const CHRISTIANLIB_BOOKS: &str = "https://www.christianlib.com/books/";

    const COPTIC_HTML: &str = r#"
        <article><h2><a href="/files/liturgy.pdf">The Divine Liturgy</a></h2></article>
        <article><h2><a href="/files/agpeya.pdf">The Agpeya</a></h2></article>
    "#;

    const CHRISTIANLIB_HTML: &str = r#"
        <article><h2><a href="/files/fathers.pdf">Sayings of the Desert Fathers</a></h2></article>
    "#;

    fn request(query: Option<&str>, scope: SiteScope) -> SearchRequest {
        SearchRequest::new(query, scope, 1, 6).unwrap()
    }

    #[tokio::test]
    async fn test_search_merges_sites_in_order() {
        let (coordinator, _) = coordinator(
            &[
                (COPTIC_LISTING, COPTIC_HTML),
                (CHRISTIANLIB_BOOKS, CHRISTIANLIB_HTML),
            ],
            false,
        );

        let outcome = coordinator
            .search(&request(None, SiteScope::All))
            .await
            .unwrap();

        let sources: Vec<Source> = outcome.items.iter().map(|r| r.source).collect();
        assert_eq!(
            sources,
            vec![Source::Coptic, Source::Coptic, Source::ChristianLib]
        );
        assert!(!outcome.cached);
        assert_eq!(outcome.tried, vec!["listing:coptic", "listing:christianlib"]);
    }

    #[tokio::test]
    async fn test_second_search_is_cached() {
        let (coordinator, launcher) = coordinator(&[(COPTIC_LISTING, COPTIC_HTML)], false);
        let req = request(None, SiteScope::Only(Source::Coptic));

        let first = coordinator.search(&req).await.unwrap();
        let second = coordinator.search(&req).await.unwrap();

        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(first.items, second.items);
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refresh_bypasses_cache() {
        let (coordinator, launcher) = coordinator(&[(COPTIC_LISTING, COPTIC_HTML)], false);
        let req = request(None, SiteScope::Only(Source::Coptic));

        coordinator.search(&req).await.unwrap();
        let refreshed = coordinator.refresh(&req).await.unwrap();

        assert!(!refreshed.cached);
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 2);
        assert_eq!(coordinator.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_site_failure_does_not_abort_search() {
        // coptic listing is not served
        let (coordinator, _) = coordinator(&[(CHRISTIANLIB_BOOKS, CHRISTIANLIB_HTML)], false);

        let outcome = coordinator
            .search(&request(None, SiteScope::All))
            .await
            .unwrap();

        assert_eq!(outcome.items.len(), 1);
        assert!(outcome.tried.contains(&"error:coptic".to_string()));
    }

    #[tokio::test]
    async fn test_parallel_sites_keep_site_order() {
        let mut config = test_config();
        config.scraper.parallel_sites = true;
        let launcher = Arc::new(FakeLauncher {
            pages: Arc::new(
                [
                    (COPTIC_LISTING.to_string(), COPTIC_HTML.to_string()),
                    (CHRISTIANLIB_BOOKS.to_string(), CHRISTIANLIB_HTML.to_string()),
                ]
                .into_iter()
                .collect(),
            ),
            launches: AtomicU32::new(0),
            broken: false,
        });
        let coordinator = Coordinator::with_launcher(config, launcher).unwrap();

        let outcome = coordinator
            .search(&request(None, SiteScope::All))
            .await
            .unwrap();
        assert_eq!(outcome.items.len(), 3);
        assert_eq!(outcome.items[2].source, Source::ChristianLib);
    }

    #[tokio::test]
    async fn test_secondary_hop_when_primary_empty() {
        let results = r#"<a href="/life-of-antony/">Life of Antony</a>"#;
        let candidate = r#"<h1>The Life of Antony</h1><a href="/files/antony.pdf">PDF</a>"#;
        let (coordinator, _) = coordinator(
            &[
                (COPTIC_LISTING, COPTIC_HTML),
                ("https://www.christianlib.com/?s=antony", results),
                ("https://www.christianlib.com/life-of-antony/", candidate),
            ],
            false,
        );

        let outcome = coordinator
            .search(&request(Some("antony"), SiteScope::All))
            .await
            .unwrap();

        assert_eq!(outcome.items.len(), 1);
        assert_eq!(outcome.items[0].title, "The Life of Antony");
        assert_eq!(outcome.items[0].source, Source::ChristianLib);
        assert_eq!(outcome.tried.last().map(String::as_str), Some("secondary_hop"));
    }

    #[tokio::test]
    async fn test_no_secondary_hop_when_primary_succeeds() {
        let (coordinator, _) = coordinator(
            &[
                (COPTIC_LISTING, COPTIC_HTML),
                (
                    "https://www.christianlib.com/?s=liturgy",
                    r#"<a href="/liturgy-book/">Liturgy</a>"#,
                ),
            ],
            false,
        );

        let outcome = coordinator
            .search(&request(Some("liturgy"), SiteScope::All))
            .await
            .unwrap();

        assert_eq!(outcome.items.len(), 1);
        assert!(!outcome.tried.iter().any(|t| t == "secondary_hop"));
    }

    #[tokio::test]
    async fn test_secondary_hop_needs_fallback_site_in_scope() {
        let (coordinator, _) = coordinator(&[(COPTIC_LISTING, COPTIC_HTML)], false);

        let outcome = coordinator
            .search(&request(Some("antony"), SiteScope::Only(Source::Coptic)))
            .await
            .unwrap();

        assert!(outcome.items.is_empty());
        assert_eq!(outcome.tried, vec!["listing:coptic"]);
    }

    #[tokio::test]
    async fn test_empty_results_not_cached() {
        let (coordinator, launcher) = coordinator(&[(COPTIC_LISTING, "<p>empty</p>")], false);
        let req = request(None, SiteScope::Only(Source::Coptic));

        assert!(coordinator.search(&req).await.unwrap().items.is_empty());
        assert!(!coordinator.search(&req).await.unwrap().cached);
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_launch_failure_is_whole_search_failure() {
        let (coordinator, _) = coordinator(&[], true);
        let result = coordinator.search(&request(None, SiteScope::All)).await;
        assert!(matches!(result, Err(LibraryError::Browser(_))));
    }

    #[tokio::test]
    async fn test_no_enabled_sites() {
        let mut config = test_config();
        config.sites.coptic.enabled = false;
        config.sites.christianlib.enabled = false;
        let launcher = Arc::new(FakeLauncher {
            pages: Arc::new(HashMap::new()),
            launches: AtomicU32::new(0),
            broken: true,
        });
        let coordinator = Coordinator::with_launcher(config, launcher).unwrap();

        let outcome = coordinator
            .search(&request(None, SiteScope::All))
            .await
            .unwrap();
        assert!(outcome.items.is_empty());
    }
}
