//! Live flight positions around WinDO airports.

pub mod bounds;
pub mod feed;
pub mod tracker;
pub mod types;

pub use bounds::BoundingBox;
pub use feed::{parse_feed, FlightFeedClient};
pub use tracker::{merge_flights, FlightTracker, TrackerState};
pub use types::FlightPosition;
