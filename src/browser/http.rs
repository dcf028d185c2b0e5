//! Plain HTTP page engine
//!
//! Fetches pages with reqwest instead of rendering them. Sites whose listings
//! are server-rendered work the same way through this engine, and it lets the
//! whole pipeline run against mock servers.

use super::{BrowserLauncher, BrowserPage, BrowserSession, PageSnapshot};
use crate::LibraryError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use url::Url;

/// Launches [`HttpSession`]s sharing one client
pub struct HttpLauncher {
    client: Client,
}

impl HttpLauncher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BrowserLauncher for HttpLauncher {
    async fn launch(&self) -> Result<Arc<dyn BrowserSession>, LibraryError> {
        Ok(Arc::new(HttpSession {
            client: self.client.clone(),
        }))
    }
}

struct HttpSession {
    client: Client,
}

#[async_trait]
impl BrowserSession for HttpSession {
    async fn new_page(&self) -> Result<Box<dyn BrowserPage>, LibraryError> {
        Ok(Box::new(HttpPage {
            client: self.client.clone(),
        }))
    }

    async fn close(&self) {}
}

struct HttpPage {
    client: Client,
}

/// Maps a transport error onto the navigation error taxonomy
fn navigation_error(url: &Url, error: reqwest::Error) -> LibraryError {
    if error.is_timeout() {
        LibraryError::Timeout {
            url: url.to_string(),
        }
    } else {
        LibraryError::Navigation {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

#[async_trait]
impl BrowserPage for HttpPage {
    async fn navigate(&mut self, url: &Url) -> Result<PageSnapshot, LibraryError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| navigation_error(url, e))?;

        let status = response.status();
        // A browser would render error pages too; only overload signals fail
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(LibraryError::Navigation {
                url: url.to_string(),
                message: format!("HTTP {}", status.as_u16()),
            });
        }

        let final_url = response.url().clone();
        let html = response.text().await.map_err(|e| navigation_error(url, e))?;

        Ok(PageSnapshot {
            url: final_url,
            html,
        })
    }

    async fn close(&mut self) {}
}
