//! Centralized error types for WinDO.
//!
//! This module provides a typed error hierarchy that:
//! - Classifies every provider failure the same way, weather or flights
//! - Provides user-friendly messages suitable for display
//! - Preserves full error context for debugging/logging

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a display-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Fetch(e) => e.user_message(),
            AppError::Config(e) => e.user_message().to_string(),
            AppError::Io(_) => "A file operation failed. Please try again.".to_string(),
            AppError::Other(_) => "An unexpected error occurred. Please try again.".to_string(),
        }
    }
}

/// Errors raised while talking to the weather or flight providers.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The response was not usable HTTP or had an unexpected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The provider answered with an empty body.
    #[error("No data returned")]
    NoData,

    /// The payload did not match the expected schema.
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// Transport-level failure.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-200 status from the provider.
    #[error("Server returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The local request budget for an endpoint is exhausted.
    #[error("Rate limit exceeded for {endpoint}")]
    RateLimited { endpoint: String },
}

impl FetchError {
    pub fn user_message(&self) -> String {
        match self {
            FetchError::InvalidUrl(_) => "Invalid airport code".to_string(),
            FetchError::InvalidResponse(_) => "Server error".to_string(),
            FetchError::NoData => "No weather data available".to_string(),
            FetchError::Decoding(_) => "Error processing weather data".to_string(),
            FetchError::Network(_) => "Network connection error".to_string(),
            FetchError::Api { status, body } => format!("Server returned {}: {}", status, body),
            FetchError::RateLimited { .. } => {
                "Rate limit exceeded. Please try again later.".to_string()
            }
        }
    }

    /// Whether a retry has a chance of succeeding.
    ///
    /// Transport failures, 5xx, 408 and 429 are retryable. Everything else
    /// (bad payloads, other 4xx, local rate limiting) is permanent.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Network(e) => !e.is_builder() && !e.is_decode(),
            FetchError::Api { status, .. } => {
                *status >= 500 || *status == 408 || *status == 429
            }
            _ => false,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => "Configuration not found. Using defaults.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::MissingSetting(_) => "A required setting is missing. Check your settings.",
        }
    }
}
