//! Shared building blocks for WinDO: configuration, errors, the airport
//! catalog, and the HTTP/cache plumbing used by the weather and flight crates.

pub mod airport;
pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod rate_limit;
pub mod retry;

pub use airport::{Airport, AirportClass};
pub use cache::{CacheEntry, TtlCache};
pub use config::{Config, FlightsConfig, ValidationResult, WeatherConfig};
pub use error::{AppError, ConfigError, FetchError};
pub use http::HttpClient;
pub use rate_limit::RateLimiter;
pub use retry::{with_retry, RetryPolicy};

use anyhow::Result;

/// Initialize logging
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::info!("WinDO core initialized");
    Ok(())
}
