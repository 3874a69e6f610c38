use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::hash::{Hash, Hasher};

/// Feed entries shorter than this are skipped
pub const MIN_FEED_FIELDS: usize = 8;

/// Aircraft type used when the feed omits it
pub const UNKNOWN_AIRCRAFT: &str = "Unknown";

/// A tracked aircraft as last reported by the feed.
///
/// Identity is the provider-assigned `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightPosition {
    pub id: String,
    pub callsign: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Degrees true
    pub heading: f64,
    /// Feet
    pub altitude: i64,
    /// Ground speed, knots
    pub speed: i64,
    pub aircraft: String,
}

impl PartialEq for FlightPosition {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FlightPosition {}

impl Hash for FlightPosition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

fn as_whole(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64))
}

impl FlightPosition {
    /// Build a position from one positional feed array.
    ///
    /// Layout: `[1]` lat, `[2]` lon, `[3]` heading, `[4]` altitude,
    /// `[5]` speed, `[7]` callsign, `[8]` aircraft type (optional).
    /// Returns `None` when the array is too short or a field has the wrong type.
    pub fn from_feed_entry(id: &str, fields: &[Value]) -> Option<Self> {
        if fields.len() < MIN_FEED_FIELDS {
            return None;
        }

        Some(Self {
            id: id.to_string(),
            latitude: fields[1].as_f64()?,
            longitude: fields[2].as_f64()?,
            heading: fields[3].as_f64()?,
            altitude: as_whole(&fields[4])?,
            speed: as_whole(&fields[5])?,
            callsign: fields[7].as_str()?.to_string(),
            aircraft: fields
                .get(8)
                .and_then(Value::as_str)
                .unwrap_or(UNKNOWN_AIRCRAFT)
                .to_string(),
        })
    }
}
