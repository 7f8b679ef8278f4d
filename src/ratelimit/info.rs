//! Metadata reported alongside rate limit decisions.

use serde::Serialize;

/// The outcome of an `evaluate` call.
///
/// Carries enough for a caller to tell clients when to come back, whether
/// or not the request was admitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimitInfo {
    /// Whether the request was admitted
    pub allowed: bool,
    /// Requests counted in the current window, including this one if admitted
    pub requests_made: u64,
    /// Requests left before the key is denied
    pub requests_remaining: u64,
    /// Epoch second at which the window frees up a slot
    pub reset_time: i64,
    /// Seconds to wait before retrying; only set on denial, never below 1
    pub retry_after: Option<u64>,
}

/// A read-only snapshot of a key's quota, as returned by `peek`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimitStatus {
    pub max_requests: u64,
    pub time_window: u64,
    pub requests_made: u64,
    pub requests_remaining: u64,
    pub reset_time: i64,
    /// Whole seconds until `reset_time`, floored at zero
    pub window_resets_in: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_info_serializes_null_retry_after() {
        let info = RateLimitInfo {
            allowed: true,
            requests_made: 1,
            requests_remaining: 4,
            reset_time: 60,
            retry_after: None,
        };

        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["allowed"], true);
        assert_eq!(value["requests_remaining"], 4);
        assert!(value["retry_after"].is_null());
    }
}
