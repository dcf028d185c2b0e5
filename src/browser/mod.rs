//! Headless browser driver interface
//!
//! Site strategies never talk to a browser directly. They receive rendered
//! [`PageSnapshot`]s from a [`BrowserPage`], which is opened from a
//! [`BrowserSession`], which is started by a [`BrowserLauncher`]. One session
//! is launched per search and each site gets its own page.
//!
//! Two engines are provided:
//! - [`ChromiumLauncher`]: drives Chrome/Chromium over CDP (feature `browser`)
//! - [`HttpLauncher`]: plain HTTP fetches, for static pages and tests

#[cfg(feature = "browser")]
mod chromium;
mod http;

#[cfg(feature = "browser")]
pub use chromium::ChromiumLauncher;
pub use http::HttpLauncher;

use crate::config::{BrowserEngine, Config};
use crate::LibraryError;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use url::Url;

/// The rendered state of a page after navigation
#[derive(Debug, Clone)]
pub struct PageSnapshot {
    /// Final URL after redirects
    pub url: Url,

    /// Serialized DOM
    pub html: String,
}

/// A single browser tab
#[async_trait]
pub trait BrowserPage: Send {
    /// Navigates to `url` and returns the DOM once the document is ready
    async fn navigate(&mut self, url: &Url) -> Result<PageSnapshot, LibraryError>;

    /// Closes the tab
    async fn close(&mut self);
}

/// A running browser that can open tabs
#[async_trait]
pub trait BrowserSession: Send + Sync {
    async fn new_page(&self) -> Result<Box<dyn BrowserPage>, LibraryError>;

    /// Shuts the browser down; pages opened from it become unusable
    async fn close(&self);
}

/// Starts browser sessions
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Arc<dyn BrowserSession>, LibraryError>;
}

/// Builds the launcher selected by `[browser] engine`
///
/// `client` is used by the HTTP engine; the Chromium engine sets the same
/// user agent on each of its tabs.
pub fn launcher_for(config: &Config, client: Client) -> Arc<dyn BrowserLauncher> {
    match config.browser.engine {
        BrowserEngine::Http => Arc::new(HttpLauncher::new(client)),
        BrowserEngine::Chromium => chromium_launcher(config),
    }
}

#[cfg(feature = "browser")]
fn chromium_launcher(config: &Config) -> Arc<dyn BrowserLauncher> {
    Arc::new(ChromiumLauncher::new(
        config.browser.clone(),
        config.user_agent.user_agent(),
        std::time::Duration::from_millis(config.scraper.settle_ms),
        std::time::Duration::from_secs(config.scraper.navigation_timeout_secs),
    ))
}

#[cfg(not(feature = "browser"))]
fn chromium_launcher(_config: &Config) -> Arc<dyn BrowserLauncher> {
    Arc::new(ChromiumUnavailable)
}

/// Stand-in used when Chromium support is not compiled
#[cfg(not(feature = "browser"))]
struct ChromiumUnavailable;

#[cfg(not(feature = "browser"))]
#[async_trait]
impl BrowserLauncher for ChromiumUnavailable {
    async fn launch(&self) -> Result<Arc<dyn BrowserSession>, LibraryError> {
        Err(LibraryError::Browser(
            "Chromium support not compiled. Rebuild with `--features browser` or set [browser] engine = \"http\"".to_string(),
        ))
    }
}
