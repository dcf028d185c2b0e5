//! Request and response bodies for the HTTP API

use crate::book::{BookRecord, SearchRequest, SiteScope};
use crate::crawler::SearchOutcome;
use serde::{Deserialize, Serialize};

/// Query parameters of `GET /api/library` and `POST /api/library/refresh`
///
/// Numbers arrive as strings so malformed values get the same JSON 400 body
/// as out-of-range ones.
#[derive(Debug, Default, Deserialize)]
pub struct LibraryParams {
    pub q: Option<String>,
    pub site: Option<String>,
    pub max_pages: Option<String>,
    pub max_follow: Option<String>,
}

fn parse_bound(name: &str, value: Option<&str>, default: u32) -> Result<u32, String> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(v) => v
            .parse()
            .map_err(|_| format!("{} must be a whole number, got '{}'", name, v)),
    }
}

impl LibraryParams {
    /// Validates the parameters into a search request
    pub fn to_request(&self) -> Result<SearchRequest, String> {
        let scope: SiteScope = self
            .site
            .as_deref()
            .unwrap_or("all")
            .parse()
            .map_err(|e| format!("{}", e))?;
        let max_pages = parse_bound(
            "max_pages",
            self.max_pages.as_deref(),
            SearchRequest::DEFAULT_MAX_PAGES,
        )?;
        let max_follow = parse_bound(
            "max_follow",
            self.max_follow.as_deref(),
            SearchRequest::DEFAULT_MAX_FOLLOW,
        )?;

        SearchRequest::new(self.q.as_deref(), scope, max_pages, max_follow)
            .map_err(|e| e.to_string())
    }
}

/// Body of every `/api/library` response, success or not
///
/// An empty result carries `hint = "no matches; tried=[...]"`. Trail entries
/// are `listing:<site>`, `search:<site>` and `error:<site>` per site, plus
/// `secondary_hop`, `error:secondary` and `cache`. The last three are
/// markers, not site names.
#[derive(Debug, Serialize, Deserialize)]
pub struct LibraryResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub items: Vec<BookRecord>,
    pub count: usize,
    pub took_ms: u64,
    pub cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl LibraryResponse {
    pub fn from_outcome(outcome: SearchOutcome, took_ms: u64) -> Self {
        let hint = if outcome.items.is_empty() {
            Some(format!("no matches; tried={:?}", outcome.tried))
        } else {
            None
        };
        Self {
            error: None,
            count: outcome.items.len(),
            items: outcome.items,
            took_ms,
            cached: outcome.cached,
            hint,
        }
    }

    /// Empty-result body carrying an error code and a diagnostic hint
    pub fn error(code: &str, hint: impl Into<String>, took_ms: u64) -> Self {
        Self {
            error: Some(code.to_string()),
            items: Vec::new(),
            count: 0,
            took_ms,
            cached: false,
            hint: Some(hint.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: String,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub ok: bool,
    pub stored: bool,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub cache_entries: usize,
    pub reports: usize,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub status: &'static str,
}
