use std::sync::Arc;

use gatekeeper::ratelimit::{ManualClock, RateLimiter, RateLimiterBackend};

fn limiter() -> (Arc<RateLimiter>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(0.0));
    let limiter = Arc::new(RateLimiter::with_clock(5, 60, clock.clone()));
    (limiter, clock)
}

#[test]
fn burst_of_five_then_denied_until_window_slides() {
    let (limiter, clock) = limiter();

    let remaining: Vec<u64> = (0..5)
        .map(|_| {
            let (allowed, info) = limiter.evaluate("1.2.3.4");
            assert!(allowed);
            info.requests_remaining
        })
        .collect();
    assert_eq!(remaining, vec![4, 3, 2, 1, 0]);

    let (allowed, info) = limiter.evaluate("1.2.3.4");
    assert!(!allowed);
    assert_eq!(info.retry_after, Some(60));

    clock.set(61.0);
    let (allowed, info) = limiter.evaluate("1.2.3.4");
    assert!(allowed);
    assert_eq!(info.requests_made, 1);
}

#[test]
fn exhausting_one_key_leaves_another_untouched() {
    let (limiter, _clock) = limiter();

    for key in ["A", "B"] {
        for _ in 0..5 {
            assert!(limiter.evaluate(key).0);
        }
    }
    assert!(!limiter.evaluate("A").0);
    assert!(!limiter.evaluate("B").0);

    let (allowed, _) = limiter.evaluate("C");
    assert!(allowed);
}

#[test]
fn remaining_drops_by_one_per_admitted_request() {
    let (limiter, clock) = limiter();
    let mut previous = None;

    for _ in 0..8 {
        clock.advance(0.5);
        let (allowed, info) = limiter.evaluate("k");
        if allowed {
            if let Some(previous) = previous {
                assert_eq!(info.requests_remaining, previous - 1);
            }
            previous = Some(info.requests_remaining);
        } else {
            assert_eq!(info.requests_remaining, 0);
            assert!(info.retry_after.unwrap() >= 1);
        }
    }
}

#[test]
fn status_queries_through_backend_trait() {
    let (limiter, _clock) = limiter();
    let backend: Arc<dyn RateLimiterBackend> = limiter;

    let status = backend.peek("9.9.9.9");
    assert_eq!(status.requests_made, 0);
    assert_eq!(status.requests_remaining, backend.max_requests());
    assert_eq!(status.reset_time, backend.window_seconds() as i64);

    backend.evaluate("9.9.9.9");
    assert_eq!(backend.peek("9.9.9.9").requests_made, 1);
}
