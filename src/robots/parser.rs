//! Robots.txt parser implementation
//!
//! Allow/Disallow matching (including `*` and `$` path patterns) is done by
//! the robotstxt crate against the stored body. `Crawl-delay` is not part of
//! that matcher, so the wildcard group's value is read out separately.

use robotstxt::DefaultMatcher;

/// Agent the rules are evaluated for: only wildcard groups apply
const WILDCARD_AGENT: &str = "*";

/// Parsed robots.txt rules for one origin
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedRobots {
    /// Raw robots.txt body (empty means allow all)
    content: String,
    /// Crawl-delay from a wildcard group (seconds)
    crawl_delay: Option<f64>,
}

impl ParsedRobots {
    /// Keeps the raw robots.txt content and reads its wildcard Crawl-delay
    ///
    /// # Arguments
    ///
    /// * `content` - The raw robots.txt file content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            crawl_delay: wildcard_crawl_delay(content),
        }
    }

    /// Creates a permissive ParsedRobots that allows everything
    ///
    /// This is used when robots.txt is missing or cannot be fetched.
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Checks if a URL is allowed for the wildcard agent
    ///
    /// # Arguments
    ///
    /// * `url` - A full URL or a path plus optional query (e.g., "/books/page/2/?s=x")
    pub fn is_allowed(&self, url: &str) -> bool {
        if self.content.trim().is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, WILDCARD_AGENT, url)
    }

    /// Gets the wildcard crawl delay in seconds, if one was declared
    pub fn crawl_delay(&self) -> Option<f64> {
        self.crawl_delay
    }
}

/// Reads `Crawl-delay` from the `User-agent: *` groups
///
/// Consecutive `User-agent` lines form one group. The last wildcard value
/// wins; unparsable values are ignored.
fn wildcard_crawl_delay(content: &str) -> Option<f64> {
    let mut delay = None;
    let mut group_is_wildcard = false;
    let mut last_was_agent = false;

    for line in content.lines() {
        let line = line.split('#').next().unwrap_or_default().trim();
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();

        match key.trim().to_lowercase().as_str() {
            "user-agent" => {
                if !last_was_agent {
                    group_is_wildcard = false;
                }
                group_is_wildcard |= value == WILDCARD_AGENT;
                last_was_agent = true;
            }
            "crawl-delay" => {
                last_was_agent = false;
                if group_is_wildcard {
                    if let Ok(secs) = value.parse::<f64>() {
                        delay = Some(secs);
                    }
                }
            }
            _ => last_was_agent = false,
        }
    }

    delay
}
