use serde::Deserialize;

/// Main configuration structure
///
/// Every section is optional; missing sections and keys fall back to the
/// production defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default, rename = "rate-limit")]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub sites: SitesConfig,
}

/// HTTP API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,

    /// Port to bind
    pub port: u16,

    /// Name reported by the health endpoint
    #[serde(rename = "service-name")]
    pub service_name: String,

    /// Broken-link reports kept in memory
    #[serde(rename = "report-capacity")]
    pub report_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            service_name: "Elmafdein Library API".to_string(),
            report_capacity: 200,
        }
    }
}

/// Scraper behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Per-navigation timeout (seconds)
    #[serde(rename = "navigation-timeout-secs")]
    pub navigation_timeout_secs: u64,

    /// Attempts per navigation, including the first
    #[serde(rename = "retry-attempts")]
    pub retry_attempts: u32,

    /// Backoff before the first retry, doubled on each further retry (milliseconds)
    #[serde(rename = "retry-base-delay-ms")]
    pub retry_base_delay_ms: u64,

    /// Lower bound of the randomized delay before each navigation (milliseconds)
    #[serde(rename = "delay-min-ms")]
    pub delay_min_ms: u64,

    /// Upper bound of the randomized delay before each navigation (milliseconds)
    #[serde(rename = "delay-max-ms")]
    pub delay_max_ms: u64,

    /// Wait after the DOM is ready so late scripts can render (milliseconds)
    #[serde(rename = "settle-ms")]
    pub settle_ms: u64,

    /// Details pages fetched per site per search to find download links
    #[serde(rename = "detail-fetch-limit")]
    pub detail_fetch_limit: u32,

    /// The secondary hop runs when primary results are fewer than this
    #[serde(rename = "secondary-hop-threshold")]
    pub secondary_hop_threshold: usize,

    /// Scrape sites concurrently (one tab each) instead of one after another
    #[serde(rename = "parallel-sites")]
    pub parallel_sites: bool,

    /// Check robots.txt before every navigation
    #[serde(rename = "respect-robots")]
    pub respect_robots: bool,

    /// Upper bound for honoring a robots.txt Crawl-delay (seconds)
    #[serde(rename = "max-crawl-delay-secs")]
    pub max_crawl_delay_secs: u64,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            navigation_timeout_secs: 15,
            retry_attempts: 3,
            retry_base_delay_ms: 500,
            delay_min_ms: 400,
            delay_max_ms: 700,
            settle_ms: 500,
            detail_fetch_limit: 24,
            secondary_hop_threshold: 1,
            parallel_sites: false,
            respect_robots: true,
            max_crawl_delay_secs: 10,
        }
    }
}

/// Page rendering engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserEngine {
    /// Headless Chromium over the DevTools protocol
    #[default]
    Chromium,
    /// Plain HTTP fetch without JavaScript
    Http,
}

/// Headless browser configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub engine: BrowserEngine,

    /// Run without a visible window
    pub headless: bool,

    /// Explicit Chrome/Chromium executable
    #[serde(rename = "chrome-path")]
    pub chrome_path: Option<String>,

    /// Extra Chrome command-line arguments
    #[serde(rename = "chrome-args")]
    pub chrome_args: Vec<String>,

    /// DevTools endpoint of an already running browser (e.g. "ws://localhost:9222")
    #[serde(rename = "remote-url")]
    pub remote_url: Option<String>,

    /// Accept-Language sent by the browser
    pub locale: String,

    #[serde(rename = "viewport-width")]
    pub viewport_width: u32,

    #[serde(rename = "viewport-height")]
    pub viewport_height: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            engine: BrowserEngine::Chromium,
            headless: true,
            chrome_path: None,
            chrome_args: Vec::new(),
            remote_url: None,
            locale: "ar-EG".to_string(),
            viewport_width: 1280,
            viewport_height: 900,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "ElmafdeinBot".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://elmafdein.com/library".to_string(),
            contact_email: "library@elmafdein.com".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the polite bot user agent: `Name/Version (+ContactURL; ContactEmail)`
    pub fn user_agent(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Search result cache configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Lifetime of a cached result list (hours)
    #[serde(rename = "ttl-hours")]
    pub ttl_hours: u64,

    /// Bumped whenever record extraction changes, invalidating old fingerprints
    #[serde(rename = "schema-version")]
    pub schema_version: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_hours: 24,
            schema_version: "1".to_string(),
        }
    }
}

/// Per-client request limiting for the search endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Requests allowed per window; 0 disables limiting
    #[serde(rename = "max-requests")]
    pub max_requests: u32,

    /// Window length (seconds)
    #[serde(rename = "window-secs")]
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 30,
            window_secs: 300,
        }
    }
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SitesConfig {
    #[serde(default = "SiteConfig::coptic")]
    pub coptic: SiteConfig,
    #[serde(default = "SiteConfig::christianlib")]
    pub christianlib: SiteConfig,
}

impl Default for SitesConfig {
    fn default() -> Self {
        Self {
            coptic: SiteConfig::coptic(),
            christianlib: SiteConfig::christianlib(),
        }
    }
}

/// A single target site
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Site root, e.g. "https://coptic-treasures.com"
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Whether searches visit this site at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl SiteConfig {
    pub fn coptic() -> Self {
        Self {
            base_url: "https://coptic-treasures.com".to_string(),
            enabled: true,
        }
    }

    pub fn christianlib() -> Self {
        Self {
            base_url: "https://www.christianlib.com".to_string(),
            enabled: true,
        }
    }
}
