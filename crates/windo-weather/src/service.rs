//! Wind and weather fetch service.
//!
//! Wraps the provider with the wind-reading cache, the per-endpoint request
//! budget and the retry policy. Cloning is cheap; clones share the cache and
//! the limiter.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use windo_core::rate_limit::DEFAULT_WINDOW;
use windo_core::{with_retry, Airport, Config, FetchError, HttpClient, RateLimiter, RetryPolicy, TtlCache};

use crate::history::synthesize_history;
use crate::provider::{
    ForecastEntry, OpenWeatherResponse, WeatherProvider, FORECAST_ENDPOINT, WEATHER_ENDPOINT,
};
use crate::types::{AirportReport, WeatherSnapshot, WindHistoryPoint, WindReading};

/// Forecast entries kept per request
pub const FORECAST_POINTS: usize = 6;

#[derive(Debug, Clone)]
pub struct WeatherService {
    provider: WeatherProvider,
    cache: Arc<TtlCache<String, WindReading>>,
    limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
}

impl WeatherService {
    pub fn new(
        provider: WeatherProvider,
        cache_ttl: Duration,
        limiter: RateLimiter,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            provider,
            cache: Arc::new(TtlCache::new(cache_ttl)),
            limiter: Arc::new(limiter),
            retry,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let http = HttpClient::new(config.http.timeout(), &config.http.user_agent)?;
        Ok(Self::new(
            WeatherProvider::new(http, &config.weather),
            config.weather.cache_ttl(),
            RateLimiter::new(config.rate_limit.max_requests_per_minute, DEFAULT_WINDOW),
            config.retry.policy(),
        ))
    }

    /// Current wind at `airport`, served from the cache while fresh.
    #[instrument(skip(self, airport), fields(airport = airport.id))]
    pub async fn fetch_wind_data(&self, airport: &Airport) -> Result<WindReading, FetchError> {
        self.cache
            .get_or_try_insert_with(airport.id.to_string(), || async {
                let response = self.current(airport.latitude, airport.longitude).await?;
                let reading = response.wind_reading(Utc::now());
                debug!(
                    direction = reading.direction,
                    speed = reading.speed,
                    "Fetched wind reading"
                );
                Ok::<_, FetchError>(reading)
            })
            .await
    }

    /// Current conditions at a coordinate. Never cached.
    #[instrument(skip(self))]
    pub async fn fetch_weather_info(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherSnapshot, FetchError> {
        let response = self.current(latitude, longitude).await?;
        Ok(response.snapshot())
    }

    /// Synthetic past six hours and the next six forecast entries.
    ///
    /// Both halves run concurrently; if either fails the whole call fails.
    #[instrument(skip(self, airport), fields(airport = airport.id))]
    pub async fn fetch_wind_history_and_forecast(
        &self,
        airport: &Airport,
    ) -> Result<(Vec<WindHistoryPoint>, Vec<WindHistoryPoint>), FetchError> {
        tokio::try_join!(self.history(airport), self.forecast(airport))
    }

    /// Wind, weather, history and forecast for one airport.
    #[instrument(skip(self, airport), fields(airport = airport.id))]
    pub async fn fetch_airport_report(&self, airport: &Airport) -> Result<AirportReport, FetchError> {
        let (wind, weather, (history, forecast)) = tokio::try_join!(
            self.fetch_wind_data(airport),
            self.fetch_weather_info(airport.latitude, airport.longitude),
            self.fetch_wind_history_and_forecast(airport),
        )?;

        Ok(AirportReport {
            airport: *airport,
            wind,
            weather,
            history,
            forecast,
            updated_at: Utc::now(),
        })
    }

    /// Wind for several airports, one after another.
    ///
    /// Failures are collected per airport instead of aborting the batch.
    pub async fn fetch_all_wind_data(
        &self,
        airports: &[Airport],
    ) -> (HashMap<String, WindReading>, Vec<(String, FetchError)>) {
        let mut readings = HashMap::with_capacity(airports.len());
        let mut failures = Vec::new();

        for airport in airports {
            match self.fetch_wind_data(airport).await {
                Ok(reading) => {
                    readings.insert(airport.id.to_string(), reading);
                }
                Err(e) => {
                    warn!(airport = airport.id, error = %e, "Wind fetch failed");
                    failures.push((airport.id.to_string(), e));
                }
            }
        }

        info!(
            fetched = readings.len(),
            failed = failures.len(),
            "Fetched wind data for {} airports",
            airports.len()
        );
        (readings, failures)
    }

    /// Drop every cached wind reading.
    pub fn clear_cache(&self) {
        self.cache.clear();
        info!("Wind cache cleared");
    }

    async fn current(&self, latitude: f64, longitude: f64) -> Result<OpenWeatherResponse, FetchError> {
        with_retry(self.retry, || async {
            self.limiter.check(WEATHER_ENDPOINT)?;
            self.provider.current(latitude, longitude).await
        })
        .await
    }

    async fn history(&self, airport: &Airport) -> Result<Vec<WindHistoryPoint>, FetchError> {
        let current = self.fetch_wind_data(airport).await?;
        Ok(synthesize_history(&current, Utc::now(), &mut rand::rng()))
    }

    async fn forecast(&self, airport: &Airport) -> Result<Vec<WindHistoryPoint>, FetchError> {
        let response = with_retry(self.retry, || async {
            self.limiter.check(FORECAST_ENDPOINT)?;
            self.provider
                .forecast(airport.latitude, airport.longitude)
                .await
        })
        .await?;

        response
            .list
            .iter()
            .take(FORECAST_POINTS)
            .map(ForecastEntry::to_point)
            .collect()
    }
}
