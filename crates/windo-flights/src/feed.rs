//! Live flight feed client.
//!
//! The feed answers with a JSON object keyed by flight id. Each flight is a
//! positional array; a few metadata keys sit alongside them.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, instrument};
use windo_core::{Airport, Config, FetchError, HttpClient, TtlCache};

use crate::bounds::BoundingBox;
use crate::types::FlightPosition;

/// Non-flight keys in the feed response
pub const METADATA_KEYS: [&str; 3] = ["full_count", "version", "stats"];

/// Default search radius around an airport
pub const DEFAULT_RADIUS_KM: f64 = 150.0;

/// Fixed feed filters sent with every query
const FEED_FLAGS: [(&str, &str); 12] = [
    ("faa", "1"),
    ("satellite", "1"),
    ("mlat", "1"),
    ("flarm", "1"),
    ("adsb", "1"),
    ("gnd", "1"),
    ("air", "1"),
    ("vehicles", "1"),
    ("estimated", "1"),
    ("maxage", "14400"),
    ("gliders", "1"),
    ("stats", "1"),
];

/// The feed rejects requests that don't look like they come from its web app
const FEED_HEADERS: [(&str, &str); 5] = [
    (
        "User-Agent",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    ),
    ("Accept", "application/json"),
    ("Origin", "https://www.flightradar24.com"),
    ("Referer", "https://www.flightradar24.com/"),
    ("Accept-Language", "en-US,en;q=0.9"),
];

/// Extract flights from a feed response.
///
/// Metadata keys and non-array values are skipped, as are arrays that are
/// too short or carry fields of the wrong type.
pub fn parse_feed(body: &Value) -> Result<Vec<FlightPosition>, FetchError> {
    let entries = body
        .as_object()
        .ok_or_else(|| FetchError::Decoding("feed response is not a JSON object".to_string()))?;

    let flights: Vec<FlightPosition> = entries
        .iter()
        .filter(|(key, _)| !METADATA_KEYS.contains(&key.as_str()))
        .filter_map(|(key, value)| {
            let fields = value.as_array()?;
            let flight = FlightPosition::from_feed_entry(key, fields);
            if flight.is_none() {
                debug!(id = %key, "Skipping malformed feed entry");
            }
            flight
        })
        .collect();

    Ok(flights)
}

#[derive(Debug, Clone)]
pub struct FlightFeedClient {
    http: HttpClient,
    feed_url: String,
    cache: Arc<TtlCache<String, Vec<FlightPosition>>>,
}

impl FlightFeedClient {
    pub fn new(http: HttpClient, feed_url: impl Into<String>, cache_ttl: Duration) -> Self {
        Self {
            http,
            feed_url: feed_url.into(),
            cache: Arc::new(TtlCache::new(cache_ttl)),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let http = HttpClient::new(config.http.timeout(), &config.http.user_agent)?;
        Ok(Self::new(
            http,
            config.flights.feed_url.clone(),
            config.flights.cache_ttl(),
        ))
    }

    /// Flights inside a `radius_km` box around `near`.
    ///
    /// Results are cached per airport and radius.
    #[instrument(skip(self, near), fields(airport = near.id))]
    pub async fn fetch_flights(
        &self,
        near: &Airport,
        radius_km: f64,
    ) -> Result<Vec<FlightPosition>, FetchError> {
        let key = format!("{}:{}", near.id, radius_km);
        self.cache
            .get_or_try_insert_with(key, || async {
                let bounds = BoundingBox::around(near.latitude, near.longitude, radius_km);
                let mut query = vec![("bounds", bounds.to_query())];
                query.extend(FEED_FLAGS.iter().map(|(k, v)| (*k, v.to_string())));

                let body: Value = self.http.get_json(&self.feed_url, &query, &FEED_HEADERS).await?;
                let flights = parse_feed(&body)?;
                info!("Found {} flights near {}", flights.len(), near.name);
                Ok::<_, FetchError>(flights)
            })
            .await
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}
