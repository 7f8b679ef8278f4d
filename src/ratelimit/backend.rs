//! Rate limiter trait for abstracting the limiter behind the HTTP layer.

use super::info::{RateLimitInfo, RateLimitStatus};
use super::limiter::RateLimiter;

/// Trait for rate limiter implementations.
///
/// The HTTP server is generic over this trait so the serving layer never
/// depends on how the limiter stores its state.
pub trait RateLimiterBackend: Send + Sync {
    /// Check and record a request for `key`.
    fn evaluate(&self, key: &str) -> (bool, RateLimitInfo);

    /// Report the quota for `key` without recording a request.
    fn peek(&self, key: &str) -> RateLimitStatus;

    /// Requests admitted per window.
    fn max_requests(&self) -> u64;

    /// Window length in seconds.
    fn window_seconds(&self) -> u64;
}

impl RateLimiterBackend for RateLimiter {
    fn evaluate(&self, key: &str) -> (bool, RateLimitInfo) {
        RateLimiter::evaluate(self, key)
    }

    fn peek(&self, key: &str) -> RateLimitStatus {
        RateLimiter::peek(self, key)
    }

    fn max_requests(&self) -> u64 {
        RateLimiter::max_requests(self)
    }

    fn window_seconds(&self) -> u64 {
        RateLimiter::window_seconds(self)
    }
}
