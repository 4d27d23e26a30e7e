use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;

use crate::state::AppState;
use crate::utils::response::error as error_response;

/// Fixed-window request counter, one window per client IP.
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    buckets: Mutex<HashMap<IpAddr, Window>>,
}

struct Window {
    started_at: Instant,
    count: u32,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Records a request for `ip` and reports whether it is still within
    /// the window's budget.
    pub fn check(&self, ip: IpAddr) -> bool {
        let mut buckets = self.buckets.lock().unwrap();
        let now = Instant::now();

        let window = buckets.entry(ip).or_insert(Window {
            started_at: now,
            count: 0,
        });

        if now.duration_since(window.started_at) >= self.window {
            window.started_at = now;
            window.count = 0;
        }

        if window.count >= self.max_requests {
            return false;
        }

        window.count += 1;
        true
    }
}

pub async fn rate_limit(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    if state.rate_limiter.check(addr.ip()) {
        next.run(request).await
    } else {
        tracing::warn!(ip = %addr.ip(), "Rate limit exceeded");
        error_response(
            "RATE_LIMIT_EXCEEDED",
            "Too many requests from this IP, please try again later.",
            None,
            StatusCode::TOO_MANY_REQUESTS,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(last: u8) -> IpAddr {
        IpAddr::from([127, 0, 0, last])
    }

    #[test]
    fn allows_up_to_max_requests_per_window() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 3);
        assert!(limiter.check(ip(1)));
        assert!(limiter.check(ip(1)));
        assert!(limiter.check(ip(1)));
        assert!(!limiter.check(ip(1)));
    }

    #[test]
    fn limits_are_per_client() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 1);
        assert!(limiter.check(ip(1)));
        assert!(!limiter.check(ip(1)));
        assert!(limiter.check(ip(2)));
    }

    #[test]
    fn a_fresh_window_resets_the_count() {
        // A zero-length window expires immediately, so every request
        // starts a new window.
        let limiter = RateLimiter::new(Duration::ZERO, 1);
        assert!(limiter.check(ip(1)));
        assert!(limiter.check(ip(1)));
        assert!(limiter.check(ip(1)));
    }
}
