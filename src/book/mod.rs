//! Book records and search requests
//!
//! [`BookRecord`] is the single shape every site strategy produces. Records are
//! created per listing entry, optionally enriched from a details page, then
//! merged, de-duplicated and sanitized before they are cached or returned.

mod dedup;

pub use dedup::{dedup, dedup_key, sanitize};
pub use crate::text::Lang;

use crate::text::{collapse_whitespace, detect_language};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Site a record was scraped from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    /// coptic-treasures.com
    #[serde(rename = "coptic")]
    Coptic,
    /// christianlib.com
    #[serde(rename = "christianlib")]
    ChristianLib,
}

impl Source {
    /// Every supported site, in the order searches visit them
    pub const ALL: [Source; 2] = [Source::Coptic, Source::ChristianLib];

    /// Returns the stable site id used in records, scopes and the tried-list
    pub fn id(&self) -> &'static str {
        match self {
            Self::Coptic => "coptic",
            Self::ChristianLib => "christianlib",
        }
    }

    /// Resolves a site id or one of its accepted aliases
    pub fn from_alias(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "coptic" | "coptic-treasures" | "coptic_treasures" => Some(Self::Coptic),
            "christianlib" | "christian_lib" | "christian-lib" => Some(Self::ChristianLib),
            _ => None,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Which sites a search covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SiteScope {
    #[default]
    All,
    Only(Source),
}

impl SiteScope {
    /// Returns true if the scope covers the given site
    pub fn includes(&self, source: Source) -> bool {
        match self {
            Self::All => true,
            Self::Only(only) => *only == source,
        }
    }

    /// Returns the scope tag used in cache fingerprints
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Only(source) => source.id(),
        }
    }
}

impl FromStr for SiteScope {
    type Err = RequestError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        Source::from_alias(trimmed)
            .map(Self::Only)
            .ok_or_else(|| RequestError::UnknownSite(trimmed.to_string()))
    }
}

impl fmt::Display for SiteScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The canonical extracted book entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub title: String,
    pub author: Option<String>,
    pub source: Source,
    pub details_url: String,
    pub download_url: Option<String>,
    pub cover_image: Option<String>,
    pub lang: Lang,
    pub pages: Option<u32>,
    pub size_mb: Option<f64>,
    pub year: Option<u16>,
}

impl BookRecord {
    /// Creates a record with the language derived from the title
    pub fn new(title: impl Into<String>, source: Source, details_url: impl Into<String>) -> Self {
        let title = title.into();
        let lang = detect_language(&title);
        Self {
            title,
            author: None,
            source,
            details_url: details_url.into(),
            download_url: None,
            cover_image: None,
            lang,
            pages: None,
            size_mb: None,
            year: None,
        }
    }

    /// Case-insensitive substring match of a query against title and author
    ///
    /// An empty query matches everything.
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&needle)
            || self
                .author
                .as_deref()
                .is_some_and(|a| a.to_lowercase().contains(&needle))
    }
}

/// Invalid search parameters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("unknown site '{0}'")]
    UnknownSite(String),

    #[error("max_pages must be between {min} and {max}, got {got}")]
    MaxPages { got: u32, min: u32, max: u32 },

    #[error("max_follow must be between {min} and {max}, got {got}")]
    MaxFollow { got: u32, min: u32, max: u32 },
}

/// An ephemeral search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Free-text query; `None` lists everything
    pub query: Option<String>,
    pub scope: SiteScope,
    /// Listing pages to walk per site
    pub max_pages: u32,
    /// Detail pages the secondary hop may visit
    pub max_follow: u32,
}

impl SearchRequest {
    pub const DEFAULT_MAX_PAGES: u32 = 2;
    pub const MIN_MAX_PAGES: u32 = 1;
    pub const MAX_MAX_PAGES: u32 = 5;
    pub const DEFAULT_MAX_FOLLOW: u32 = 6;
    pub const MAX_MAX_FOLLOW: u32 = 10;

    /// Builds a validated request
    ///
    /// Blank queries become `None`; the query keeps its original case for
    /// building search URLs.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] if `max_pages` is outside 1..=5 or
    /// `max_follow` is outside 0..=10.
    pub fn new(
        query: Option<&str>,
        scope: SiteScope,
        max_pages: u32,
        max_follow: u32,
    ) -> Result<Self, RequestError> {
        if !(Self::MIN_MAX_PAGES..=Self::MAX_MAX_PAGES).contains(&max_pages) {
            return Err(RequestError::MaxPages {
                got: max_pages,
                min: Self::MIN_MAX_PAGES,
                max: Self::MAX_MAX_PAGES,
            });
        }
        if max_follow > Self::MAX_MAX_FOLLOW {
            return Err(RequestError::MaxFollow {
                got: max_follow,
                min: 0,
                max: Self::MAX_MAX_FOLLOW,
            });
        }

        let query = query
            .map(collapse_whitespace)
            .filter(|q| !q.is_empty());

        Ok(Self {
            query,
            scope,
            max_pages,
            max_follow,
        })
    }

    /// Lowercased, whitespace-collapsed query, empty when absent
    pub fn normalized_query(&self) -> String {
        self.query
            .as_deref()
            .map(|q| collapse_whitespace(q).to_lowercase())
            .unwrap_or_default()
    }
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            query: None,
            scope: SiteScope::All,
            max_pages: Self::DEFAULT_MAX_PAGES,
            max_follow: Self::DEFAULT_MAX_FOLLOW,
        }
    }
}
