//! Route handlers.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, State},
    http::{header::RETRY_AFTER, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::debug;

use crate::ratelimit::{RateLimitInfo, RateLimiterBackend};

const X_RATELIMIT_LIMIT: &str = "x-ratelimit-limit";
const X_RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";
const X_RATELIMIT_RESET: &str = "x-ratelimit-reset";

/// Build the router with all routes wired to `limiter`.
pub fn router<R: RateLimiterBackend + 'static>(limiter: Arc<R>) -> Router {
    Router::new()
        .route("/", get(root::<R>))
        .route("/protected", get(protected::<R>))
        .route("/status", get(status::<R>))
        .with_state(limiter)
}

/// Unlimited landing route.
pub async fn root<R: RateLimiterBackend>(State(limiter): State<Arc<R>>) -> Json<Value> {
    let quota = format!(
        "Rate limited endpoint ({} requests/{}s)",
        limiter.max_requests(),
        limiter.window_seconds()
    );

    Json(json!({
        "message": "Gatekeeper rate limiting service is running",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/protected": quota,
            "/status": "Check your current rate limit status",
        }
    }))
}

/// A rate limited resource. Every call consumes a slot if one is free.
pub async fn protected<R: RateLimiterBackend>(
    State(limiter): State<Arc<R>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Response {
    let client_ip = addr.ip().to_string();
    let (allowed, info) = limiter.evaluate(&client_ip);
    let headers = rate_limit_headers(limiter.max_requests(), &info);

    debug!(
        client_ip = %client_ip,
        allowed = allowed,
        requests_remaining = info.requests_remaining,
        "Rate limit decision made"
    );

    if !allowed {
        let retry_after = info.retry_after.unwrap_or(1);
        let body = json!({
            "error": "Rate limit exceeded",
            "message": format!("Too many requests. Try again in {} seconds.", retry_after),
            "rate_limit_info": info,
        });
        return (StatusCode::TOO_MANY_REQUESTS, headers, Json(body)).into_response();
    }

    let now = Utc::now();
    let body = json!({
        "message": "Success! You accessed the protected endpoint.",
        "client_ip": client_ip,
        "timestamp": epoch_seconds(now),
        "rate_limit_info": info,
        "data": {
            "secret_message": "This endpoint is protected by rate limiting!",
            "request_id": format!("req_{}", now.timestamp_millis()),
        }
    });
    (headers, Json(body)).into_response()
}

/// Report the caller's quota without consuming it.
pub async fn status<R: RateLimiterBackend>(
    State(limiter): State<Arc<R>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Json<Value> {
    let client_ip = addr.ip().to_string();
    let status = limiter.peek(&client_ip);

    debug!(
        client_ip = %client_ip,
        requests_made = status.requests_made,
        "Rate limit status requested"
    );

    Json(json!({
        "client_ip": client_ip,
        "rate_limit": status,
        "timestamp": epoch_seconds(Utc::now()),
    }))
}

fn rate_limit_headers(limit: u64, info: &RateLimitInfo) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(info.requests_remaining));
    headers.insert(X_RATELIMIT_RESET, HeaderValue::from(info.reset_time));
    if let Some(retry_after) = info.retry_after {
        headers.insert(RETRY_AFTER, HeaderValue::from(retry_after));
    }
    headers
}

fn epoch_seconds(now: chrono::DateTime<Utc>) -> f64 {
    now.timestamp_micros() as f64 / 1_000_000.0
}
