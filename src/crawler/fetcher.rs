//! Navigation primitive
//!
//! This module handles every page load the crawler makes, including:
//! - Building the HTTP client with the polite bot user agent
//! - Robots.txt checks (disallowed URLs are skipped, not errors)
//! - Politeness delays before each navigation
//! - Per-navigation timeouts
//! - Retry with exponential backoff for transient failures

use super::politeness::Politeness;
use crate::browser::{BrowserPage, PageSnapshot};
use crate::config::{ScraperConfig, UserAgentConfig};
use crate::robots::RobotsCache;
use crate::LibraryError;
use reqwest::{redirect::Policy, Client};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Longest wait between two attempts
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Whole-request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use elmafdein_library::config::UserAgentConfig;
/// use elmafdein_library::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(15)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Retry policy applied to every navigation
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | Timeout | Retry with backoff |
/// | Connection failure / HTTP 5xx / 429 | Retry with backoff |
/// | Any other error | Immediate failure |
/// | Attempts exhausted | Last error surfaces as a site-level failure |
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,

    /// Delay after the first failure; doubled after each further one
    pub base_delay: Duration,

    /// Limit for a single navigation
    pub timeout: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &ScraperConfig) -> Self {
        Self {
            max_attempts: config.retry_attempts.max(1),
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
            timeout: Duration::from_secs(config.navigation_timeout_secs),
        }
    }

    /// Backoff after the `attempt`-th failed attempt (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(MAX_BACKOFF)
    }
}

/// A browser tab wrapped with the crawler's navigation rules
///
/// Site strategies and the secondary hop only ever load pages through
/// [`Navigator::visit`].
pub struct Navigator {
    page: Box<dyn BrowserPage>,
    robots: Arc<RobotsCache>,
    retry: RetryPolicy,
    politeness: Politeness,
    visits: u32,
}

impl Navigator {
    pub fn new(
        page: Box<dyn BrowserPage>,
        robots: Arc<RobotsCache>,
        retry: RetryPolicy,
        politeness: Politeness,
    ) -> Self {
        Self {
            page,
            robots,
            retry,
            politeness,
            visits: 0,
        }
    }

    /// Number of successful navigations so far
    pub fn visits(&self) -> u32 {
        self.visits
    }

    /// Loads a page
    ///
    /// # Returns
    ///
    /// * `Ok(Some(snapshot))` - The rendered page
    /// * `Ok(None)` - robots.txt disallows the URL; nothing was requested
    /// * `Err(LibraryError)` - Every attempt failed, or a non-retryable error
    pub async fn visit(&mut self, url: &Url) -> Result<Option<PageSnapshot>, LibraryError> {
        if !self.robots.is_allowed(url).await {
            debug!("Skipping {} (disallowed by robots.txt)", url);
            return Ok(None);
        }
        let crawl_delay = self.robots.crawl_delay(url).await;

        let mut attempt = 0;
        loop {
            attempt += 1;
            tokio::time::sleep(self.politeness.delay_for(crawl_delay)).await;

            let result = match tokio::time::timeout(self.retry.timeout, self.page.navigate(url))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(LibraryError::Timeout {
                    url: url.to_string(),
                }),
            };

            match result {
                Ok(snapshot) => {
                    self.visits += 1;
                    debug!("Loaded {} ({} bytes)", snapshot.url, snapshot.html.len());
                    return Ok(Some(snapshot));
                }
                Err(e) if e.is_retryable() && attempt < self.retry.max_attempts => {
                    let backoff = self.retry.backoff(attempt);
                    warn!(
                        "Navigation to {} failed (attempt {}/{}): {}; retrying in {:?}",
                        url, attempt, self.retry.max_attempts, e, backoff
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Closes the underlying tab
    pub async fn close(mut self) {
        self.page.close().await;
    }
}
