//! Per-endpoint request budget.
//!
//! Each endpoint gets a counter. The counter resets once more than the window
//! has elapsed since the last request to that endpoint, so a steady trickle of
//! requests keeps the window open.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

use crate::error::FetchError;

pub const DEFAULT_MAX_REQUESTS_PER_MINUTE: u32 = 30;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy)]
struct EndpointState {
    count: u32,
    last_request: Instant,
}

#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    endpoints: Mutex<HashMap<String, EndpointState>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUESTS_PER_MINUTE, DEFAULT_WINDOW)
    }
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            endpoints: Mutex::new(HashMap::new()),
        }
    }

    /// Record a request to `endpoint`, or fail if its budget is spent.
    ///
    /// A rejected request does not count against the budget.
    pub fn check(&self, endpoint: &str) -> Result<(), FetchError> {
        let now = Instant::now();
        let mut endpoints = self.endpoints.lock();
        let state = endpoints
            .entry(endpoint.to_string())
            .or_insert(EndpointState {
                count: 0,
                last_request: now,
            });

        if now.duration_since(state.last_request) > self.window {
            state.count = 0;
            state.last_request = now;
        }

        if state.count >= self.max_requests {
            tracing::warn!(endpoint, limit = self.max_requests, "Rate limit exceeded");
            return Err(FetchError::RateLimited {
                endpoint: endpoint.to_string(),
            });
        }

        state.count += 1;
        state.last_request = now;
        Ok(())
    }

    /// Requests counted against `endpoint` in the current window.
    pub fn count(&self, endpoint: &str) -> u32 {
        self.endpoints
            .lock()
            .get(endpoint)
            .map(|s| s.count)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_thirty_first_request_is_rejected() {
        let limiter = RateLimiter::default();
        for _ in 0..30 {
            limiter.check("weather").unwrap();
        }
        let err = limiter.check("weather").unwrap_err();
        assert!(matches!(err, FetchError::RateLimited { ref endpoint } if endpoint == "weather"));
        assert_eq!(limiter.count("weather"), 30);
    }

    #[tokio::test(start_paused = true)]
    async fn test_endpoints_are_independent() {
        let limiter = RateLimiter::new(1, DEFAULT_WINDOW);
        limiter.check("weather").unwrap();
        limiter.check("forecast").unwrap();
        assert!(limiter.check("weather").is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_counter_resets_after_idle_window() {
        let limiter = RateLimiter::new(2, DEFAULT_WINDOW);
        limiter.check("weather").unwrap();
        limiter.check("weather").unwrap();
        assert!(limiter.check("weather").is_err());

        tokio::time::advance(Duration::from_secs(60)).await;
        assert!(limiter.check("weather").is_err());

        tokio::time::advance(Duration::from_millis(1)).await;
        limiter.check("weather").unwrap();
        assert_eq!(limiter.count("weather"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_steady_traffic_keeps_window_open() {
        let limiter = RateLimiter::new(3, DEFAULT_WINDOW);
        for _ in 0..3 {
            limiter.check("weather").unwrap();
            tokio::time::advance(Duration::from_secs(50)).await;
        }
        assert!(limiter.check("weather").is_err());
    }
}
