//! Static airport catalog.

use haversine::{distance, Location as HaversineLocation, Units};
use serde::Serialize;
use std::hash::{Hash, Hasher};

/// Airport classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AirportClass {
    International,
    Domestic,
    Private,
}

/// An airport in the catalog. Identity is the ICAO code.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Airport {
    pub id: &'static str,
    pub name: &'static str,
    pub city: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    pub class: AirportClass,
}

impl PartialEq for Airport {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Airport {}

impl Hash for Airport {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Airport {
    pub const fn new(
        id: &'static str,
        name: &'static str,
        city: &'static str,
        latitude: f64,
        longitude: f64,
        class: AirportClass,
    ) -> Self {
        Self {
            id,
            name,
            city,
            latitude,
            longitude,
            class,
        }
    }

    pub fn is_international(&self) -> bool {
        self.class == AirportClass::International
    }

    /// Great-circle distance in kilometers from this airport to a point.
    pub fn distance_km(&self, latitude: f64, longitude: f64) -> f64 {
        distance_km(self.latitude, self.longitude, latitude, longitude)
    }
}

/// Great-circle distance in kilometers between two coordinates.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    distance(
        HaversineLocation {
            latitude: lat1,
            longitude: lon1,
        },
        HaversineLocation {
            latitude: lat2,
            longitude: lon2,
        },
        Units::Kilometers,
    )
}

const AIRPORTS: [Airport; 10] = [
    // International
    Airport::new("MDPC", "Punta Cana International Airport", "Punta Cana", 18.5674, -68.3634, AirportClass::International),
    Airport::new("MDSD", "Las Américas International Airport", "Santo Domingo", 18.4297, -69.6689, AirportClass::International),
    Airport::new("MDST", "Cibao International Airport", "Santiago", 19.4069, -70.6044, AirportClass::International),
    Airport::new("MDPP", "Gregorio Luperón International Airport", "Puerto Plata", 19.7579, -70.5699, AirportClass::International),
    Airport::new("MDLR", "La Romana International Airport", "La Romana", 18.4507, -68.9118, AirportClass::International),
    Airport::new("MDJB", "La Isabela International Airport", "Santo Domingo North", 18.5725, -69.9856, AirportClass::International),
    Airport::new("MDCY", "Samaná El Catey International Airport", "Samaná", 19.2670, -69.7420, AirportClass::International),
    // Domestic
    Airport::new("MDAB", "Arroyo Barril Airport", "Samaná", 19.1989, -69.4299, AirportClass::Domestic),
    Airport::new("MDBE", "Cabo Rojo Airport", "Pedernales", 17.9289, -71.6446, AirportClass::Domestic),
    Airport::new("MDCR", "Constanza Airport", "Constanza", 18.9075, -70.7219, AirportClass::Domestic),
];

/// Every airport in the catalog, in catalog order.
pub fn catalog() -> &'static [Airport] {
    &AIRPORTS
}

/// Look up an airport by ICAO code (case-insensitive).
pub fn find(id: &str) -> Option<Airport> {
    AIRPORTS
        .iter()
        .find(|a| a.id.eq_ignore_ascii_case(id))
        .copied()
}

/// International airports in catalog order.
pub fn international() -> Vec<Airport> {
    AIRPORTS.iter().filter(|a| a.is_international()).copied().collect()
}

/// Filter airports whose city or name contains `query` (case-insensitive).
/// An empty query returns the input unchanged.
pub fn search(airports: &[Airport], query: &str) -> Vec<Airport> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return airports.to_vec();
    }
    airports
        .iter()
        .filter(|a| {
            a.city.to_lowercase().contains(&query) || a.name.to_lowercase().contains(&query)
        })
        .copied()
        .collect()
}

/// Sort airports nearest-first from the given position.
pub fn sort_by_distance(airports: &[Airport], latitude: f64, longitude: f64) -> Vec<Airport> {
    let mut with_distance: Vec<(Airport, f64)> = airports
        .iter()
        .map(|a| (*a, a.distance_km(latitude, longitude)))
        .collect();
    with_distance.sort_by(|a, b| a.1.total_cmp(&b.1));
    with_distance.into_iter().map(|(a, _)| a).collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_catalog_ids_are_unique() {
        let mut ids: Vec<_> = catalog().iter().map(|a| a.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), catalog().len());
    }

    #[test]
    fn test_international_rotation_set() {
        let intl = international();
        assert_eq!(intl.len(), 7);
        assert_eq!(intl[0].id, "MDPC");
        assert!(intl.iter().all(Airport::is_international));
    }

    #[test]
    fn test_find_is_case_insensitive() {
        assert_eq!(find("mdsd").unwrap().city, "Santo Domingo");
        assert!(find("KJFK").is_none());
    }

    #[test]
    fn test_search_matches_city_and_name() {
        let hits = search(catalog(), "samaná");
        assert_eq!(hits.len(), 2);

        let hits = search(catalog(), "cibao");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "MDST");

        assert_eq!(search(catalog(), "  ").len(), catalog().len());
    }

    #[test]
    fn test_sort_by_distance_nearest_first() {
        // Downtown Santo Domingo
        let sorted = sort_by_distance(catalog(), 18.4861, -69.9312);
        assert_eq!(sorted[0].id, "MDJB");
        assert_eq!(sorted.len(), catalog().len());
        let last = sorted.last().unwrap();
        assert!(last.distance_km(18.4861, -69.9312) > sorted[0].distance_km(18.4861, -69.9312));
    }

    #[test]
    fn test_identity_is_id() {
        let a = find("MDPC").unwrap();
        let mut b = a;
        b.name = "Renamed";
        assert_eq!(a, b);
    }

    #[test]
    fn test_distance_between_punta_cana_and_las_americas() {
        let pc = find("MDPC").unwrap();
        let sd = find("MDSD").unwrap();
        let d = pc.distance_km(sd.latitude, sd.longitude);
        assert!((d - 138.0).abs() < 5.0, "distance was {}", d);
    }
}
