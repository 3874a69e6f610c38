//! OpenWeatherMap client and response parsing.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::instrument;
use windo_core::{FetchError, HttpClient, WeatherConfig};

use crate::types::{ms_to_knots, WeatherCondition, WeatherSnapshot, WindHistoryPoint, WindReading};

/// Rate-limiter endpoint name for current conditions
pub const WEATHER_ENDPOINT: &str = "weather";
/// Rate-limiter endpoint name for forecasts
pub const FORECAST_ENDPOINT: &str = "forecast";

const ACCEPT_JSON: [(&str, &str); 1] = [("Accept", "application/json")];

/// `GET /data/2.5/weather` response
#[derive(Debug, Clone, Deserialize)]
pub struct OpenWeatherResponse {
    pub main: MainWeather,
    #[serde(default)]
    pub weather: Vec<WeatherDescription>,
    pub wind: WindInfo,
    pub visibility: f64,
    pub clouds: Clouds,
    #[serde(default)]
    pub sys: Sys,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MainWeather {
    pub temp: f64,
    pub pressure: f64,
    pub humidity: u8,
    pub feels_like: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherDescription {
    pub main: String,
}

/// Wind block shared by the current and forecast responses, in m/s
#[derive(Debug, Clone, Deserialize)]
pub struct WindInfo {
    pub speed: f64,
    pub deg: f64,
    pub gust: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Clouds {
    pub all: u8,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Sys {
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
}

/// `GET /data/2.5/forecast` response
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastResponse {
    pub list: Vec<ForecastEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastEntry {
    /// Epoch seconds
    pub dt: i64,
    pub wind: WindInfo,
}

fn from_epoch(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

impl OpenWeatherResponse {
    /// Wind converted to knots, stamped with `now`.
    pub fn wind_reading(&self, now: DateTime<Utc>) -> WindReading {
        WindReading {
            direction: self.wind.deg,
            speed: ms_to_knots(self.wind.speed),
            gust: self.wind.gust.map(ms_to_knots),
            timestamp: now,
        }
    }

    pub fn snapshot(&self) -> WeatherSnapshot {
        let condition = self
            .weather
            .first()
            .map(|w| WeatherCondition::from_provider_code(&w.main))
            .unwrap_or_default();

        WeatherSnapshot {
            temperature: self.main.temp,
            condition,
            pressure: self.main.pressure,
            humidity: self.main.humidity,
            visibility: self.visibility,
            feels_like: self.main.feels_like,
            cloud_cover: self.clouds.all,
            sunrise: self.sys.sunrise.and_then(from_epoch),
            sunset: self.sys.sunset.and_then(from_epoch),
        }
    }
}

impl ForecastEntry {
    pub fn to_point(&self) -> Result<WindHistoryPoint, FetchError> {
        let time = from_epoch(self.dt)
            .ok_or_else(|| FetchError::Decoding(format!("forecast dt out of range: {}", self.dt)))?;
        Ok(WindHistoryPoint {
            time,
            direction: self.wind.deg,
            speed: ms_to_knots(self.wind.speed),
            gust: self.wind.gust.map(ms_to_knots),
        })
    }
}

/// OpenWeatherMap endpoints plus credentials.
#[derive(Debug, Clone)]
pub struct WeatherProvider {
    http: HttpClient,
    api_key: String,
    weather_url: String,
    forecast_url: String,
}

impl WeatherProvider {
    pub fn new(http: HttpClient, config: &WeatherConfig) -> Self {
        Self {
            http,
            api_key: config.api_key.clone(),
            weather_url: config.weather_url.clone(),
            forecast_url: config.forecast_url.clone(),
        }
    }

    /// Point both endpoints at `{base_url}/weather` and `{base_url}/forecast`.
    pub fn with_base_url(http: HttpClient, api_key: &str, base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/');
        Self {
            http,
            api_key: api_key.to_string(),
            weather_url: format!("{}/weather", base_url),
            forecast_url: format!("{}/forecast", base_url),
        }
    }

    fn query(&self, latitude: f64, longitude: f64) -> [(&'static str, String); 4] {
        [
            ("lat", latitude.to_string()),
            ("lon", longitude.to_string()),
            ("units", "metric".to_string()),
            ("appid", self.api_key.clone()),
        ]
    }

    /// Current conditions at a coordinate.
    #[instrument(skip(self), level = "debug")]
    pub async fn current(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<OpenWeatherResponse, FetchError> {
        self.http
            .get_json(&self.weather_url, &self.query(latitude, longitude), &ACCEPT_JSON)
            .await
    }

    /// Forecast series at a coordinate (3-hour cadence).
    #[instrument(skip(self), level = "debug")]
    pub async fn forecast(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<ForecastResponse, FetchError> {
        self.http
            .get_json(&self.forecast_url, &self.query(latitude, longitude), &ACCEPT_JSON)
            .await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn current_json() -> serde_json::Value {
        serde_json::json!({
            "main": {"temp": 29.5, "pressure": 1014, "humidity": 74, "feels_like": 33.1, "temp_min": 28.0},
            "weather": [{"id": 211, "main": "Thunderstorm", "description": "thunderstorm"}],
            "wind": {"speed": 10.0, "deg": 90},
            "visibility": 10000,
            "clouds": {"all": 75},
            "sys": {"sunrise": 1700000000, "sunset": 1700043200}
        })
    }

    #[test]
    fn test_parse_current_response() {
        let response: OpenWeatherResponse = serde_json::from_value(current_json()).unwrap();
        let now = Utc::now();

        let wind = response.wind_reading(now);
        assert_eq!(wind.direction, 90.0);
        assert!((wind.speed - 19.4384).abs() < 1e-9);
        assert_eq!(wind.gust, None);
        assert_eq!(wind.timestamp, now);

        let snapshot = response.snapshot();
        assert_eq!(snapshot.condition, WeatherCondition::Storm);
        assert_eq!(snapshot.humidity, 74);
        assert_eq!(snapshot.cloud_cover, 75);
        assert_eq!(snapshot.pressure, 1014.0);
        assert_eq!(snapshot.sunrise.unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_gust_converted_when_present() {
        let mut json = current_json();
        json["wind"]["gust"] = serde_json::json!(5.0);
        let response: OpenWeatherResponse = serde_json::from_value(json).unwrap();
        let wind = response.wind_reading(Utc::now());
        assert!((wind.gust.unwrap() - 9.7192).abs() < 1e-9);
    }

    #[test]
    fn test_gust_below_speed_passes_through() {
        let mut json = current_json();
        json["wind"]["gust"] = serde_json::json!(2.0);
        let response: OpenWeatherResponse = serde_json::from_value(json).unwrap();
        let wind = response.wind_reading(Utc::now());
        assert!(wind.gust.unwrap() < wind.speed);
    }

    #[test]
    fn test_missing_weather_entry_defaults_to_clear() {
        let mut json = current_json();
        json["weather"] = serde_json::json!([]);
        json.as_object_mut().unwrap().remove("sys");
        let response: OpenWeatherResponse = serde_json::from_value(json).unwrap();
        let snapshot = response.snapshot();
        assert_eq!(snapshot.condition, WeatherCondition::Clear);
        assert!(snapshot.sunrise.is_none());
    }

    #[test]
    fn test_forecast_entry_to_point() {
        let entry: ForecastEntry = serde_json::from_value(serde_json::json!({
            "dt": 1700010800,
            "wind": {"speed": 4.0, "deg": 120, "gust": 6.5}
        }))
        .unwrap();
        let point = entry.to_point().unwrap();
        assert_eq!(point.time.timestamp(), 1_700_010_800);
        assert_eq!(point.direction, 120.0);
        assert!((point.speed - 4.0 * 1.94384).abs() < 1e-9);
        assert!((point.gust.unwrap() - 6.5 * 1.94384).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_current_sends_metric_query() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("lat", "18.5674"))
            .and(query_param("lon", "-68.3634"))
            .and(query_param("units", "metric"))
            .and(query_param("appid", "test_key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_json()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = WeatherProvider::with_base_url(
            HttpClient::with_defaults().unwrap(),
            "test_key",
            &mock_server.uri(),
        );
        let response = provider.current(18.5674, -68.3634).await.unwrap();
        assert_eq!(response.wind.deg, 90.0);
    }

    #[tokio::test]
    async fn test_forecast_endpoint() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "list": [{"dt": 1700010800, "wind": {"speed": 3.0, "deg": 100}}]
            })))
            .mount(&mock_server)
            .await;

        let provider = WeatherProvider::with_base_url(
            HttpClient::with_defaults().unwrap(),
            "k",
            &mock_server.uri(),
        );
        let response = provider.forecast(18.0, -69.0).await.unwrap();
        assert_eq!(response.list.len(), 1);
    }
}
