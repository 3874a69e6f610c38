//! Retry utilities for provider requests with a fixed backoff.
//!
//! Retried:
//! - Transport failures (timeouts, connection resets)
//! - 5xx server errors, 408 and 429
//!
//! Not retried:
//! - Decoding errors and other 4xx responses
//! - Local rate limiting

use std::future::Future;
use std::time::Duration;

use crate::error::FetchError;

/// Default retry configuration
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_DELAY_MS: u64 = 2000;

/// Retry configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included. `1` disables retrying.
    pub max_attempts: u32,
    /// Pause between attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay: Duration::from_millis(delay_ms),
        }
    }

    /// A policy that runs the operation exactly once.
    pub fn none() -> Self {
        Self::new(1, 0)
    }
}

/// Run `operation` until it succeeds, fails permanently, or attempts run out.
///
/// # Example
/// ```ignore
/// let body = with_retry(RetryPolicy::default(), || provider.current(lat, lon)).await?;
/// ```
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, operation: F) -> Result<T, FetchError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!("Request succeeded after {} attempts", attempt);
                }
                return Ok(value);
            }
            Err(e) if !e.is_retryable() => {
                tracing::debug!("Non-retryable error: {}", e);
                return Err(e);
            }
            Err(e) if attempt >= max_attempts => {
                tracing::error!("All {} attempts exhausted: {}", max_attempts, e);
                return Err(e);
            }
            Err(e) => {
                tracing::warn!(
                    "Attempt {} of {} failed: {}; retrying in {:?}",
                    attempt,
                    max_attempts,
                    e,
                    policy.delay
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
        }
    }
}
