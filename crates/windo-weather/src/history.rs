//! Synthetic recent-history series derived from the current reading.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::types::{WindHistoryPoint, WindReading};

/// Number of hourly history points
pub const HISTORY_HOURS: i64 = 6;

const SPEED_FACTOR_MIN: f64 = 0.8;
const SPEED_FACTOR_MAX: f64 = 1.2;
const DIRECTION_OFFSET_DEG: f64 = 20.0;

/// Build one point per past hour, oldest first (`now - 6h` .. `now - 1h`).
///
/// Each point scales speed and gust by a factor in `[0.8, 1.2]` and shifts the
/// direction by up to ±20°, wrapped into `[0, 360)`.
pub fn synthesize_history<R: Rng + ?Sized>(
    current: &WindReading,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<WindHistoryPoint> {
    (1..=HISTORY_HOURS)
        .rev()
        .map(|hours_ago| {
            let factor = rng.random_range(SPEED_FACTOR_MIN..=SPEED_FACTOR_MAX);
            let offset = rng.random_range(-DIRECTION_OFFSET_DEG..=DIRECTION_OFFSET_DEG);
            WindHistoryPoint {
                time: now - Duration::hours(hours_ago),
                direction: (current.direction + offset).rem_euclid(360.0),
                speed: current.speed * factor,
                gust: current.gust.map(|g| g * factor),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn reading(direction: f64, speed: f64, gust: Option<f64>) -> WindReading {
        WindReading {
            direction,
            speed,
            gust,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_six_points_oldest_first() {
        let now = Utc::now();
        let mut rng = StdRng::seed_from_u64(7);
        let history = synthesize_history(&reading(90.0, 10.0, None), now, &mut rng);

        assert_eq!(history.len(), 6);
        assert_eq!(history[0].time, now - Duration::hours(6));
        assert_eq!(history[5].time, now - Duration::hours(1));
        assert!(history.windows(2).all(|w| w[0].time < w[1].time));
    }

    #[test]
    fn test_values_stay_in_jitter_bounds() {
        let now = Utc::now();
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            for point in synthesize_history(&reading(90.0, 10.0, None), now, &mut rng) {
                assert!((8.0..=12.0).contains(&point.speed), "speed {}", point.speed);
                assert!((70.0..=110.0).contains(&point.direction), "dir {}", point.direction);
                assert!(point.gust.is_none());
            }
        }
    }

    #[test]
    fn test_direction_wraps_near_north() {
        let now = Utc::now();
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            for point in synthesize_history(&reading(355.0, 5.0, None), now, &mut rng) {
                assert!((0.0..360.0).contains(&point.direction));
                assert!(point.direction >= 335.0 || point.direction <= 15.0);
            }
        }
    }

    #[test]
    fn test_gust_scaled_with_speed() {
        let mut rng = StdRng::seed_from_u64(42);
        for point in synthesize_history(&reading(180.0, 10.0, Some(15.0)), Utc::now(), &mut rng) {
            let gust = point.gust.unwrap();
            assert!((gust / point.speed - 1.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_same_seed_same_series() {
        let now = Utc::now();
        let current = reading(45.0, 12.0, Some(18.0));
        let a = synthesize_history(&current, now, &mut StdRng::seed_from_u64(3));
        let b = synthesize_history(&current, now, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }
}
