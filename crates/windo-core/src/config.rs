use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::airport;
use crate::rate_limit::DEFAULT_MAX_REQUESTS_PER_MINUTE;
use crate::retry::{RetryPolicy, DEFAULT_DELAY_MS, DEFAULT_MAX_ATTEMPTS};

/// Environment variable that overrides `weather.api_key`.
pub const API_KEY_ENV: &str = "WINDO_OWM_API_KEY";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// ICAO code of the airport selected at startup
    #[serde(default = "default_airport")]
    pub default_airport: String,

    /// OpenWeatherMap settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Flight feed settings
    #[serde(default)]
    pub flights: FlightsConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Outbound request budget
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Retry behaviour for provider requests
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_airport() -> String {
    "MDPC".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key (can also be set via `WINDO_OWM_API_KEY`)
    pub api_key: String,

    /// Current-conditions endpoint
    pub weather_url: String,

    /// Forecast endpoint
    pub forecast_url: String,

    /// How long a wind reading stays fresh, in seconds
    pub cache_ttl_secs: u64,

    /// Auto-refresh interval for the selected airport, in seconds
    pub refresh_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            weather_url: "https://api.openweathermap.org/data/2.5/weather".to_string(),
            forecast_url: "https://api.openweathermap.org/data/2.5/forecast".to_string(),
            cache_ttl_secs: 300,
            refresh_secs: 300,
        }
    }
}

impl WeatherConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightsConfig {
    /// Live feed endpoint
    pub feed_url: String,

    /// Search radius around each airport, in kilometers
    pub radius_km: f64,

    /// Polling interval, in seconds
    pub poll_secs: u64,

    /// How long a feed query result stays fresh, in seconds
    pub cache_ttl_secs: u64,
}

impl Default for FlightsConfig {
    fn default() -> Self {
        Self {
            feed_url: "https://data-live.flightradar24.com/zones/fcgi/feed.js".to_string(),
            radius_km: 150.0,
            poll_secs: 10,
            cache_ttl_secs: 10,
        }
    }
}

impl FlightsConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout, in seconds
    pub timeout_secs: u64,

    /// User agent sent to the weather provider
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: crate::http::DEFAULT_TIMEOUT_SECS,
            user_agent: crate::http::DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Requests allowed per endpoint per minute
    pub max_requests_per_minute: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests_per_minute: DEFAULT_MAX_REQUESTS_PER_MINUTE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per request (1 disables retrying)
    pub max_attempts: u32,

    /// Fixed pause between attempts, in milliseconds
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay_ms: DEFAULT_DELAY_MS,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, self.delay_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_airport: default_airport(),
            weather: WeatherConfig::default(),
            flights: FlightsConfig::default(),
            http: HttpConfig::default(),
            rate_limit: RateLimitConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the user config directory, creating a default
    /// file if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, creating a default file there
    /// if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str::<Config>(&contents).context("Failed to parse config file")?
        } else {
            let config = Self::default();
            config.save_to(path)?;
            tracing::info!("Wrote default configuration to {}", path.display());
            config
        };

        // Applied after any save so the key never lands on disk
        config.apply_env_overrides();

        Ok(config)
    }

    /// Apply environment overrides on top of the loaded settings
    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.is_empty() {
                self.weather.api_key = key;
            }
        }
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.weather.weather_url, "weather.weather_url", &mut result);
        self.validate_url(&self.weather.forecast_url, "weather.forecast_url", &mut result);
        self.validate_url(&self.flights.feed_url, "flights.feed_url", &mut result);

        if self.weather.api_key.is_empty() {
            result.add_warning(
                "weather.api_key",
                format!("No API key configured - set it here or via {}", API_KEY_ENV),
            );
        }

        if airport::find(&self.default_airport).is_none() {
            result.add_error(
                "default_airport",
                format!("Unknown airport: {}", self.default_airport),
            );
        }

        if self.weather.cache_ttl_secs == 0 {
            result.add_warning("weather.cache_ttl_secs", "Wind cache disabled (0 seconds)");
        }

        if self.weather.refresh_secs == 0 {
            result.add_error("weather.refresh_secs", "Refresh interval must be greater than 0");
        } else if self.weather.refresh_secs > 86_400 {
            result.add_warning(
                "weather.refresh_secs",
                "Weather refresh interval is more than 24 hours",
            );
        }

        if self.flights.poll_secs == 0 {
            result.add_error("flights.poll_secs", "Poll interval must be greater than 0");
        }

        if !(self.flights.radius_km.is_finite() && self.flights.radius_km > 0.0) {
            result.add_error("flights.radius_km", "Radius must be a positive number");
        } else if self.flights.radius_km > 1000.0 {
            result.add_warning("flights.radius_km", "Radius is unusually large (>1000 km)");
        }

        if self.http.timeout_secs == 0 {
            result.add_error("http.timeout_secs", "Timeout must be greater than 0");
        }

        if self.rate_limit.max_requests_per_minute == 0 {
            result.add_error(
                "rate_limit.max_requests_per_minute",
                "Rate limit of 0 would block every request",
            );
        }

        if self.retry.max_attempts == 0 {
            result.add_warning("retry.max_attempts", "0 attempts treated as 1");
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to the user config directory
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("windo");

        Ok(config_dir.join("config.toml"))
    }
}
