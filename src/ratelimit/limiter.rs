//! Core rate limiter implementation.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, trace};

use super::clock::{Clock, SystemClock};
use super::info::{RateLimitInfo, RateLimitStatus};
use super::window::SlidingWindow;
use crate::config::RateLimitingConfig;

/// Default number of requests admitted per window.
pub const DEFAULT_MAX_REQUESTS: u64 = 5;
/// Default window length in seconds.
pub const DEFAULT_WINDOW_SECONDS: u64 = 60;

/// A per-key sliding-window rate limiter.
///
/// Each key keeps the instants of its recent requests. A request is
/// admitted while fewer than `max_requests` instants fall inside the
/// trailing `window_seconds`. Expired instants are pruned whenever a key
/// is touched.
///
/// Any string is a valid key, including the empty string; unknown keys
/// start with a fresh quota.
///
/// This struct is thread-safe and can be shared across multiple tasks.
pub struct RateLimiter {
    /// Request instants indexed by client key
    windows: DashMap<String, SlidingWindow>,
    max_requests: u64,
    window_seconds: u64,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Create a new rate limiter with default limits and the system clock.
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW_SECONDS)
    }

    /// Create a rate limiter with explicit limits and the system clock.
    pub fn with_limits(max_requests: u64, window_seconds: u64) -> Self {
        Self::with_clock(max_requests, window_seconds, Arc::new(SystemClock))
    }

    /// Create a rate limiter reading time from `clock`.
    pub fn with_clock(max_requests: u64, window_seconds: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            windows: DashMap::new(),
            max_requests,
            window_seconds,
            clock,
        }
    }

    /// Create a rate limiter from the `rate_limiting` config section.
    pub fn from_config(config: &RateLimitingConfig) -> Self {
        Self::with_limits(config.max_requests, config.window_seconds)
    }

    /// Requests admitted per key within one window.
    pub fn max_requests(&self) -> u64 {
        self.max_requests
    }

    /// Window length in seconds.
    pub fn window_seconds(&self) -> u64 {
        self.window_seconds
    }

    /// Check whether a request for `key` is admitted, consuming a slot if so.
    pub fn evaluate(&self, key: &str) -> (bool, RateLimitInfo) {
        self.decide(key, || self.clock.now())
    }

    /// Like [`evaluate`](Self::evaluate), at an explicit instant.
    pub fn evaluate_at(&self, key: &str, now: f64) -> (bool, RateLimitInfo) {
        self.decide(key, || now)
    }

    fn decide(&self, key: &str, clock: impl FnOnce() -> f64) -> (bool, RateLimitInfo) {
        let window = self.window_seconds as f64;

        // The shard guard is held across reading the clock, prune, check and
        // append so two callers can never both take the last slot, and
        // instants for one key are recorded in the order they were read.
        let mut entry = self.windows.entry(key.to_owned()).or_default();
        let now = clock();
        let pruned = entry.prune(now - window);
        let made = entry.len() as u64;

        trace!(
            key = %key,
            requests_made = made,
            pruned = pruned,
            "Evaluating rate limit"
        );

        if made < self.max_requests {
            entry.record(now);
            let info = RateLimitInfo {
                allowed: true,
                requests_made: made + 1,
                requests_remaining: self.max_requests - (made + 1),
                reset_time: (now + window).floor() as i64,
                retry_after: None,
            };
            return (true, info);
        }

        let oldest = entry.oldest().unwrap_or(now);
        drop(entry);

        let reset_at = oldest + window;
        let retry_after = ((reset_at - now).trunc() as i64).max(1) as u64;

        debug!(
            key = %key,
            requests_made = made,
            retry_after = retry_after,
            "Rate limit exceeded"
        );

        let info = RateLimitInfo {
            allowed: false,
            requests_made: made,
            requests_remaining: 0,
            reset_time: reset_at.floor() as i64,
            retry_after: Some(retry_after),
        };
        (false, info)
    }

    /// Report the quota for `key` without consuming a slot.
    pub fn peek(&self, key: &str) -> RateLimitStatus {
        self.peek_at(key, self.clock.now())
    }

    /// Like [`peek`](Self::peek), at an explicit instant.
    ///
    /// Unknown keys are not inserted. Known keys have their expired
    /// instants pruned in place.
    pub fn peek_at(&self, key: &str, now: f64) -> RateLimitStatus {
        let window = self.window_seconds as f64;

        let (made, oldest) = match self.windows.get_mut(key) {
            Some(mut entry) => {
                entry.prune(now - window);
                (entry.len() as u64, entry.oldest())
            }
            None => (0, None),
        };

        let reset_time = (oldest.unwrap_or(now) + window).floor() as i64;

        RateLimitStatus {
            max_requests: self.max_requests,
            time_window: self.window_seconds,
            requests_made: made,
            requests_remaining: self.max_requests.saturating_sub(made),
            reset_time,
            window_resets_in: (reset_time - now.floor() as i64).max(0),
        }
    }

    /// Drop keys with no requests left in the window.
    ///
    /// Returns the number of keys removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(self.clock.now())
    }

    /// Like [`sweep`](Self::sweep), at an explicit instant.
    pub fn sweep_at(&self, now: f64) -> usize {
        let cutoff = now - self.window_seconds as f64;
        let mut removed = 0;

        self.windows.retain(|_, window| {
            window.prune(cutoff);
            let keep = !window.is_empty();
            if !keep {
                removed += 1;
            }
            keep
        });

        if removed > 0 {
            debug!(
                removed = removed,
                remaining = self.windows.len(),
                "Swept idle rate limit keys"
            );
        }
        removed
    }

    /// Get the number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }

    /// Forget every key.
    pub fn clear(&self) {
        self.windows.clear();
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
