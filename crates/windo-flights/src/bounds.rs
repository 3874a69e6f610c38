//! Geographic query box for the flight feed.

use serde::Serialize;

/// Kilometers per degree of latitude (flat approximation)
pub const KM_PER_DEGREE: f64 = 111.0;

/// Latitude/longitude rectangle centered on a point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Box reaching `radius_km` from the center along each axis.
    ///
    /// Longitude degrees shrink with latitude, so the longitude half-width is
    /// `radius / (111 * cos(lat))`.
    pub fn around(latitude: f64, longitude: f64, radius_km: f64) -> Self {
        let lat_delta = radius_km / KM_PER_DEGREE;
        let lon_delta = radius_km / (KM_PER_DEGREE * latitude.to_radians().cos());

        Self {
            min_lat: latitude - lat_delta,
            max_lat: latitude + lat_delta,
            min_lon: longitude - lon_delta,
            max_lon: longitude + lon_delta,
        }
    }

    /// `lat1,lat2,lon1,lon2` as the feed expects it.
    pub fn to_query(&self) -> String {
        format!(
            "{},{},{},{}",
            self.min_lat, self.max_lat, self.min_lon, self.max_lon
        )
    }

    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&latitude)
            && (self.min_lon..=self.max_lon).contains(&longitude)
    }
}
