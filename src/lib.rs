//! Elmafdein Library: a polite metadata scraper for Orthodox literature
//!
//! This crate crawls public Orthodox book-library websites with a headless
//! browser, extracts book metadata (title, author, details page, PDF link,
//! cover, language, page count, file size, year), merges and de-duplicates
//! the records, caches the results, and serves them over a small HTTP API.
//! PDFs are never downloaded or stored; only their URLs are recorded.

pub mod book;
pub mod browser;
pub mod cache;
pub mod config;
pub mod crawler;
pub mod robots;
pub mod server;
pub mod sites;
pub mod text;
pub mod url;

use thiserror::Error;

/// Main error type for library operations
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Navigation failed for {url}: {message}")]
    Navigation { url: String, message: String },

    #[error("Navigation timeout for {url}")]
    Timeout { url: String },

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LibraryError {
    /// Returns true if a navigation that failed with this error is worth retrying
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Navigation { .. } | Self::Timeout { .. } | Self::Http { .. }
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for library operations
pub type Result<T> = std::result::Result<T, LibraryError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use book::{BookRecord, Lang, SearchRequest, SiteScope, Source};
pub use config::Config;
pub use crawler::{Coordinator, SearchOutcome};
pub use url::{extract_domain, normalize_url};
