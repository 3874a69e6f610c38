use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use windo_core::Airport;

/// Knots per meter/second
pub const MS_TO_KNOTS: f64 = 1.94384;

/// Meters per nautical mile
pub const METERS_PER_NM: f64 = 1852.0;

/// inHg per hPa
pub const HPA_TO_INHG: f64 = 0.02953;

/// Convert a provider speed in m/s to knots.
pub fn ms_to_knots(speed: f64) -> f64 {
    speed * MS_TO_KNOTS
}

/// Weather condition categories mapped from provider condition names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCondition {
    #[default]
    Clear,
    Cloudy,
    Rain,
    Storm,
    Snow,
    Mist,
    Haze,
}

impl WeatherCondition {
    /// Map an OpenWeatherMap `weather[].main` value (any case).
    /// See: https://openweathermap.org/weather-conditions
    pub fn from_provider_code(code: &str) -> Self {
        match code.trim().to_lowercase().as_str() {
            "clear" => Self::Clear,
            "clouds" => Self::Cloudy,
            "rain" | "drizzle" => Self::Rain,
            "thunderstorm" => Self::Storm,
            "snow" => Self::Snow,
            "mist" | "fog" => Self::Mist,
            "haze" | "smoke" | "dust" | "sand" | "ash" => Self::Haze,
            _ => Self::Clear, // Unknown codes default to clear
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear Skies",
            Self::Cloudy => "Cloudy",
            Self::Rain => "Rain",
            Self::Storm => "Thunderstorm",
            Self::Snow => "Snow",
            Self::Mist => "Mist",
            Self::Haze => "Haze",
        }
    }

    /// Get icon name
    pub fn icon_name(&self) -> &'static str {
        match self {
            Self::Clear => "sun",
            Self::Cloudy => "cloud",
            Self::Rain => "cloud_rain",
            Self::Storm => "cloud_lightning",
            Self::Snow => "cloud_snow",
            Self::Mist | Self::Haze => "cloud_fog",
        }
    }
}

/// Current wind at an airport, in knots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindReading {
    /// Degrees the wind blows from
    pub direction: f64,
    pub speed: f64,
    /// Peak over the sampling window; not checked against `speed`
    pub gust: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

/// Current weather conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// °C
    pub temperature: f64,
    pub condition: WeatherCondition,
    /// hPa
    pub pressure: f64,
    /// %
    pub humidity: u8,
    /// meters
    pub visibility: f64,
    /// °C
    pub feels_like: f64,
    /// %
    pub cloud_cover: u8,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
}

impl WeatherSnapshot {
    /// Visibility in nautical miles
    pub fn visibility_nm(&self) -> f64 {
        self.visibility / METERS_PER_NM
    }

    /// Altimeter setting in inches of mercury
    pub fn altimeter_inhg(&self) -> f64 {
        self.pressure * HPA_TO_INHG
    }
}

/// One point of a wind history or forecast series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindHistoryPoint {
    pub time: DateTime<Utc>,
    pub direction: f64,
    pub speed: f64,
    pub gust: Option<f64>,
}

/// Everything shown for one airport after a refresh
#[derive(Debug, Clone, Serialize)]
pub struct AirportReport {
    pub airport: Airport,
    pub wind: WindReading,
    pub weather: WeatherSnapshot,
    pub history: Vec<WindHistoryPoint>,
    pub forecast: Vec<WindHistoryPoint>,
    pub updated_at: DateTime<Utc>,
}
