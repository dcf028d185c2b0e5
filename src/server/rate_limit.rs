//! Fixed-window request limiting per client

use crate::config::RateLimitConfig;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::warn;

/// Client windows kept before expired ones are swept
const SWEEP_THRESHOLD: usize = 1024;

/// Outcome of a rate-limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Limited { retry_after: Duration },
}

impl RateDecision {
    /// Seconds for a `Retry-After` header, rounded up and at least 1
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::Allowed => None,
            Self::Limited { retry_after } => {
                let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
                Some(secs.max(1))
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    start: Instant,
    count: u32,
}

/// Counts requests per client in fixed windows
///
/// The first request from a client opens its window; once the window is
/// older than the configured length the count starts over. A
/// `max_requests` of zero disables limiting.
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    clients: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            clients: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, Duration::from_secs(config.window_secs))
    }

    pub fn is_enabled(&self) -> bool {
        self.max_requests > 0
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Counts a request from `client` now
    pub fn check(&self, client: &str) -> RateDecision {
        self.check_at(client, Instant::now())
    }

    /// Counts a request from `client` at `now`
    ///
    /// The check and the increment happen under one lock.
    pub fn check_at(&self, client: &str, now: Instant) -> RateDecision {
        if !self.is_enabled() {
            return RateDecision::Allowed;
        }

        let mut clients = match self.clients.lock() {
            Ok(clients) => clients,
            Err(_) => {
                warn!("Rate limiter lock poisoned; letting request through");
                return RateDecision::Allowed;
            }
        };

        if clients.len() >= SWEEP_THRESHOLD {
            let window = self.window;
            clients.retain(|_, w| now.saturating_duration_since(w.start) <= window);
        }

        let entry = clients.entry(client.to_string()).or_insert(Window {
            start: now,
            count: 0,
        });
        if now.saturating_duration_since(entry.start) > self.window {
            *entry = Window {
                start: now,
                count: 0,
            };
        }

        if entry.count >= self.max_requests {
            let retry_after = (entry.start + self.window).saturating_duration_since(now);
            return RateDecision::Limited { retry_after };
        }

        entry.count += 1;
        RateDecision::Allowed
    }
}
