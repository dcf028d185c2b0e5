//! Per-origin robots.txt cache entries

use crate::robots::ParsedRobots;
use chrono::{DateTime, Duration, Utc};

/// Lifetime of rules read from a robots.txt
const FETCHED_TTL_HOURS: i64 = 24;

/// Lifetime of the allow-all verdict recorded when robots.txt could not be fetched
const UNREACHABLE_TTL_MINUTES: i64 = 30;

/// Rules for one origin and how long they may be used
#[derive(Debug, Clone)]
pub struct CachedRobots {
    pub content: ParsedRobots,
    pub fetched_at: DateTime<Utc>,
    ttl: Duration,
}

impl CachedRobots {
    /// Rules read from the origin's robots.txt (or its absence)
    pub fn fetched(content: ParsedRobots) -> Self {
        Self {
            content,
            fetched_at: Utc::now(),
            ttl: Duration::hours(FETCHED_TTL_HOURS),
        }
    }

    /// Allow-all placeholder after a failed fetch, retried sooner
    pub fn unreachable() -> Self {
        Self {
            content: ParsedRobots::allow_all(),
            fetched_at: Utc::now(),
            ttl: Duration::minutes(UNREACHABLE_TTL_MINUTES),
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.fetched_at + self.ttl
    }

    pub fn is_stale_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at()
    }

    pub fn is_stale(&self) -> bool {
        self.is_stale_at(Utc::now())
    }
}
