//! Wind and weather data for WinDO airports.
//!
//! Current conditions and forecasts come from OpenWeatherMap. Readings are
//! converted to knots, cached per airport, and bundled into an
//! [`AirportReport`] for the display layer.

pub mod history;
pub mod monitor;
pub mod provider;
pub mod service;
pub mod types;

pub use monitor::WindMonitor;
pub use provider::WeatherProvider;
pub use service::WeatherService;
pub use types::{AirportReport, WeatherCondition, WeatherSnapshot, WindHistoryPoint, WindReading};
