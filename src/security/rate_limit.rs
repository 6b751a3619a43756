//! Per-client fixed-window rate limiting.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::config::RateLimitConfig;
use crate::observability::metrics;

/// Tracked clients before stale windows are pruned.
const PRUNE_THRESHOLD: usize = 4096;

/// Request count within the current window of one client.
struct Window {
    started: Instant,
    count: u32,
}

/// State for the rate limiter.
pub struct RateLimiterState {
    windows: Mutex<HashMap<IpAddr, Window>>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiterState {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            max_requests: config.max_requests,
            window: Duration::from_secs(config.window_secs),
        }
    }

    /// Count one request from `client`. On rejection returns the time left
    /// until its window resets.
    pub fn check(&self, client: IpAddr) -> Result<(), Duration> {
        let now = Instant::now();
        let mut windows = self.windows.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if windows.len() >= PRUNE_THRESHOLD {
            windows.retain(|_, w| now.duration_since(w.started) < self.window);
        }

        let window = windows.entry(client).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(window.started) >= self.window {
            window.started = now;
            window.count = 0;
        }

        if window.count < self.max_requests {
            window.count += 1;
            Ok(())
        } else {
            Err(self.window.saturating_sub(now.duration_since(window.started)))
        }
    }
}

/// Middleware rejecting clients over their request budget with 429.
pub async fn rate_limit_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<Arc<RateLimiterState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match state.check(addr.ip()) {
        Ok(()) => next.run(request).await,
        Err(retry_after) => {
            let route = match request.uri().path() {
                "/audit" => "audit",
                "/report" => "report",
                _ => "other",
            };
            tracing::warn!(client = %addr.ip(), route, "Rate limit exceeded");
            metrics::record_rate_limited(route);

            let mut response = (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({ "error": "Too many requests, please try again later." })),
            )
                .into_response();
            let secs = retry_after.as_secs().max(1);
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    fn limiter(max_requests: u32, window_secs: u64) -> RateLimiterState {
        RateLimiterState::new(&RateLimitConfig {
            enabled: true,
            max_requests,
            window_secs,
        })
    }

    #[test]
    fn test_allows_budget_then_rejects() {
        let state = limiter(6, 60);
        let client: IpAddr = "10.0.0.1".parse().unwrap();

        for _ in 0..6 {
            assert!(state.check(client).is_ok());
        }
        let retry_after = state.check(client).unwrap_err();
        assert!(retry_after <= Duration::from_secs(60));
        assert!(retry_after > Duration::from_secs(50));
    }

    #[test]
    fn test_clients_are_independent() {
        let state = limiter(1, 60);
        let a: IpAddr = "10.0.0.1".parse().unwrap();
        let b: IpAddr = "10.0.0.2".parse().unwrap();

        assert!(state.check(a).is_ok());
        assert!(state.check(a).is_err());
        assert!(state.check(b).is_ok());
    }

    #[test]
    fn test_window_resets() {
        let state = RateLimiterState {
            windows: Mutex::new(HashMap::new()),
            max_requests: 1,
            window: Duration::from_millis(30),
        };
        let client: IpAddr = "::1".parse().unwrap();

        assert!(state.check(client).is_ok());
        assert!(state.check(client).is_err());
        sleep(Duration::from_millis(50));
        assert!(state.check(client).is_ok());
    }
}
