//! Politeness delays between navigations
//!
//! Every navigation is preceded by a randomized pause. When an origin's
//! robots.txt declares a crawl delay, the pause is at least that long, up to
//! a configured ceiling.

use crate::config::ScraperConfig;
use rand::Rng;
use std::time::Duration;

/// Randomized pre-navigation delay
#[derive(Debug, Clone, Copy)]
pub struct Politeness {
    min: Duration,
    max: Duration,
    max_crawl_delay: Duration,
}

impl Politeness {
    pub fn new(min: Duration, max: Duration, max_crawl_delay: Duration) -> Self {
        Self {
            min,
            max: max.max(min),
            max_crawl_delay,
        }
    }

    pub fn from_config(config: &ScraperConfig) -> Self {
        Self::new(
            Duration::from_millis(config.delay_min_ms),
            Duration::from_millis(config.delay_max_ms),
            Duration::from_secs(config.max_crawl_delay_secs),
        )
    }

    /// No waiting at all
    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO, Duration::ZERO)
    }

    /// A random delay within the configured range
    pub fn jitter(&self) -> Duration {
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        if max <= min {
            return self.min;
        }
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }

    /// Calculates the effective delay before the next navigation
    ///
    /// This takes the maximum of:
    /// - A random jitter within `delay-min-ms..=delay-max-ms`
    /// - The robots.txt crawl delay, capped at `max-crawl-delay-secs`
    pub fn delay_for(&self, crawl_delay: Option<Duration>) -> Duration {
        let robots_delay = crawl_delay
            .map(|d| d.min(self.max_crawl_delay))
            .unwrap_or(Duration::ZERO);

        std::cmp::max(self.jitter(), robots_delay)
    }
}
