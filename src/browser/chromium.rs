//! Chromium engine over the DevTools protocol

use super::{BrowserLauncher, BrowserPage, BrowserSession, PageSnapshot};
use crate::config::BrowserConfig;
use crate::LibraryError;
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::{Browser, BrowserConfig as CdpConfig, Page};
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

/// Common Chrome executable paths to check
const CHROME_PATHS: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/opt/google/chrome/google-chrome",
];

/// Resolves when the document is interactive or the fallback fires
const READY_SCRIPT: &str = r#"
    new Promise((resolve) => {
        if (document.readyState === 'complete' || document.readyState === 'interactive') {
            resolve(document.readyState);
        } else {
            document.addEventListener('DOMContentLoaded', () => resolve(document.readyState));
            setTimeout(() => resolve('timeout'), 10000);
        }
    })
"#;

fn browser_error(context: &str, error: impl std::fmt::Display) -> LibraryError {
    LibraryError::Browser(format!("{}: {}", context, error))
}

/// Locates a Chrome/Chromium executable
fn find_chrome(configured: Option<&str>) -> Result<PathBuf, LibraryError> {
    if let Some(path) = configured {
        return Ok(PathBuf::from(path));
    }

    for path in CHROME_PATHS {
        let p = std::path::Path::new(path);
        if p.exists() {
            info!("Found Chrome at: {}", path);
            return Ok(p.to_path_buf());
        }
    }

    for cmd in &[
        "google-chrome",
        "google-chrome-stable",
        "chromium",
        "chromium-browser",
    ] {
        if let Ok(output) = std::process::Command::new("which").arg(cmd).output() {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    info!("Found Chrome in PATH: {}", path);
                    return Ok(PathBuf::from(path));
                }
            }
        }
    }

    Err(LibraryError::Browser(
        "Chrome/Chromium not found; install it, set [browser] chrome-path, or use engine = \"http\""
            .to_string(),
    ))
}

/// Launches (or connects to) Chromium once per search
pub struct ChromiumLauncher {
    config: BrowserConfig,
    user_agent: String,
    settle: Duration,
    ready_timeout: Duration,
}

impl ChromiumLauncher {
    pub fn new(
        config: BrowserConfig,
        user_agent: String,
        settle: Duration,
        ready_timeout: Duration,
    ) -> Self {
        Self {
            config,
            user_agent,
            settle,
            ready_timeout,
        }
    }

    async fn start_local(&self) -> Result<(Browser, JoinHandle<()>), LibraryError> {
        info!("Launching browser (headless={})", self.config.headless);

        let chrome_path = find_chrome(self.config.chrome_path.as_deref())?;
        let mut builder = CdpConfig::builder().chrome_executable(chrome_path);

        // with_head means NOT headless
        if !self.config.headless {
            builder = builder.with_head();
        }

        builder = builder
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg(format!("--lang={}", self.config.locale))
            .arg(format!(
                "--window-size={},{}",
                self.config.viewport_width, self.config.viewport_height
            ));

        for arg in &self.config.chrome_args {
            builder = builder.arg(arg);
        }

        let cdp_config = builder
            .build()
            .map_err(|e| browser_error("Failed to build browser config", e))?;

        let (browser, mut handler) = Browser::launch(cdp_config)
            .await
            .map_err(|e| browser_error("Failed to launch browser", e))?;

        let handler_task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok((browser, handler_task))
    }

    async fn connect_remote(&self, url: &str) -> Result<(Browser, JoinHandle<()>), LibraryError> {
        info!("Connecting to remote browser at {}", url);

        let http_url = url
            .replace("ws://", "http://")
            .replace("wss://", "https://");
        let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));

        let version: serde_json::Value = reqwest::Client::new()
            .get(&version_url)
            .send()
            .await
            .map_err(|e| browser_error("Failed to reach remote browser", e))?
            .json()
            .await
            .map_err(|e| browser_error("Failed to parse browser version info", e))?;

        let ws_url = version
            .get("webSocketDebuggerUrl")
            .and_then(|v| v.as_str())
            .ok_or_else(|| LibraryError::Browser("No webSocketDebuggerUrl in response".into()))?;

        let (browser, mut handler) = Browser::connect(ws_url)
            .await
            .map_err(|e| browser_error("Failed to connect to remote browser", e))?;

        let handler_task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok((browser, handler_task))
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Arc<dyn BrowserSession>, LibraryError> {
        let (browser, handler_task) = match self.config.remote_url.as_deref() {
            Some(remote) => self.connect_remote(remote).await?,
            None => self.start_local().await?,
        };

        Ok(Arc::new(ChromiumSession {
            browser: Mutex::new(browser),
            handler: handler_task,
            user_agent: self.user_agent.clone(),
            settle: self.settle,
            ready_timeout: self.ready_timeout,
        }))
    }
}

struct ChromiumSession {
    browser: Mutex<Browser>,
    handler: JoinHandle<()>,
    user_agent: String,
    settle: Duration,
    ready_timeout: Duration,
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn new_page(&self) -> Result<Box<dyn BrowserPage>, LibraryError> {
        let browser = self.browser.lock().await;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| browser_error("Failed to open tab", e))?;

        page.execute(SetUserAgentOverrideParams::new(self.user_agent.clone()))
            .await
            .map_err(|e| browser_error("Failed to set user agent", e))?;

        Ok(Box::new(ChromiumPage {
            page,
            settle: self.settle,
            ready_timeout: self.ready_timeout,
        }))
    }

    async fn close(&self) {
        let mut browser = self.browser.lock().await;
        if let Err(e) = browser.close().await {
            debug!("Browser close failed: {}", e);
        }
        self.handler.abort();
    }
}

struct ChromiumPage {
    page: Page,
    settle: Duration,
    ready_timeout: Duration,
}

#[async_trait]
impl BrowserPage for ChromiumPage {
    async fn navigate(&mut self, url: &Url) -> Result<PageSnapshot, LibraryError> {
        let navigation_failed = |e: &dyn std::fmt::Display| LibraryError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        };

        let nav_params = NavigateParams::builder()
            .url(url.as_str())
            .build()
            .map_err(|e| navigation_failed(&e))?;

        self.page
            .execute(nav_params)
            .await
            .map_err(|e| navigation_failed(&e))?;

        match tokio::time::timeout(
            self.ready_timeout,
            self.page.evaluate(READY_SCRIPT.to_string()),
        )
        .await
        {
            Ok(Ok(result)) => {
                let state: String = result
                    .into_value()
                    .unwrap_or_else(|_| "unknown".to_string());
                debug!("Page ready state: {}", state);
            }
            Ok(Err(e)) => debug!("Could not check ready state: {}", e),
            Err(_) => warn!("Timeout waiting for page ready state at {}", url),
        }

        tokio::time::sleep(self.settle).await;

        let final_url = self
            .page
            .url()
            .await
            .ok()
            .flatten()
            .and_then(|u| Url::parse(&u.to_string()).ok())
            .unwrap_or_else(|| url.clone());

        let html = self
            .page
            .content()
            .await
            .map_err(|e| navigation_failed(&e))?;

        Ok(PageSnapshot {
            url: final_url,
            html,
        })
    }

    async fn close(&mut self) {
        if let Err(e) = self.page.clone().close().await {
            debug!("Tab close failed: {}", e);
        }
    }
}
