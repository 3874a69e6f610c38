//! Background flight polling over a rotating set of airports.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use windo_core::{airport, Airport, Config, FetchError};

use crate::feed::FlightFeedClient;
use crate::types::FlightPosition;

/// Flights farther than this from the polled airport survive a merge
pub const RETENTION_KM: f64 = 100.0;

/// Default polling interval
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Idle,
    Polling,
}

/// Merge a fresh poll around `center` into the tracked set.
///
/// Tracked flights within [`RETENTION_KM`] of `center` are replaced by the
/// fresh result; farther ones are kept so other regions stay populated. When
/// an id appears in both, the fresh position wins.
pub fn merge_flights(
    existing: &[FlightPosition],
    fresh: Vec<FlightPosition>,
    center: &Airport,
) -> Vec<FlightPosition> {
    let mut seen = HashSet::with_capacity(fresh.len());
    let fresh: Vec<FlightPosition> = fresh
        .into_iter()
        .filter(|f| seen.insert(f.id.clone()))
        .collect();

    existing
        .iter()
        .filter(|f| !seen.contains(&f.id))
        .filter(|f| center.distance_km(f.latitude, f.longitude) > RETENTION_KM)
        .cloned()
        .chain(fresh)
        .collect()
}

struct TrackerShared {
    client: FlightFeedClient,
    airports: Vec<Airport>,
    radius_km: f64,
    index: Mutex<usize>,
    last_error: Mutex<Option<String>>,
    flights: watch::Sender<Vec<FlightPosition>>,
}

impl TrackerShared {
    async fn tick(&self) -> Result<usize, FetchError> {
        // Claim an airport and advance in one step so overlapping ticks poll
        // different airports
        let airport = {
            let mut index = self.index.lock();
            let Some(airport) = self.airports.get(*index).copied() else {
                return Ok(0);
            };
            *index = (*index + 1) % self.airports.len();
            airport
        };

        match self.client.fetch_flights(&airport, self.radius_km).await {
            Ok(fresh) => {
                let mut count = 0;
                self.flights.send_modify(|flights| {
                    *flights = merge_flights(flights, fresh, &airport);
                    count = flights.len();
                });
                *self.last_error.lock() = None;
                debug!(airport = airport.id, tracked = count, "Flight poll complete");
                Ok(count)
            }
            Err(e) => {
                warn!(airport = airport.id, error = %e, "Flight poll failed");
                *self.last_error.lock() = Some(e.user_message());
                Err(e)
            }
        }
    }
}

/// Polls the flight feed around each airport in turn.
///
/// Every tick queries the next airport, merges the result into the tracked
/// set and advances the rotation, whether or not the query succeeded.
pub struct FlightTracker {
    shared: Arc<TrackerShared>,
    interval: Duration,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl FlightTracker {
    pub fn new(
        client: FlightFeedClient,
        airports: Vec<Airport>,
        radius_km: f64,
        interval: Duration,
    ) -> Self {
        let (flights, _) = watch::channel(Vec::new());
        Self {
            shared: Arc::new(TrackerShared {
                client,
                airports,
                radius_km,
                index: Mutex::new(0),
                last_error: Mutex::new(None),
                flights,
            }),
            interval,
            cancel: CancellationToken::new(),
            task: None,
        }
    }

    /// Tracker over the international airports, configured from `config`.
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Ok(Self::new(
            FlightFeedClient::from_config(config)?,
            airport::international(),
            config.flights.radius_km,
            config.flights.poll_interval(),
        ))
    }

    /// Begin polling; the first tick fires immediately. No-op while polling.
    pub fn start(&mut self) {
        if self.state() == TrackerState::Polling {
            return;
        }
        if self.shared.airports.is_empty() {
            warn!("No airports to track");
            return;
        }

        self.cancel = CancellationToken::new();
        let cancel = self.cancel.clone();
        let shared = Arc::clone(&self.shared);
        let interval = self.interval;

        info!(
            airports = shared.airports.len(),
            interval_secs = interval.as_secs(),
            "Starting flight tracking"
        );

        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = shared.tick() => {}
                }
            }

            debug!("Flight tracking loop exited");
        }));
    }

    pub fn stop(&mut self) {
        self.cancel.cancel();
        if self.task.take().is_some() {
            info!("Flight tracking stopped");
        }
    }

    pub fn state(&self) -> TrackerState {
        match &self.task {
            Some(task) if !task.is_finished() => TrackerState::Polling,
            _ => TrackerState::Idle,
        }
    }

    /// Poll the current airport once and advance the rotation.
    ///
    /// Returns the number of tracked flights after the merge.
    pub async fn tick(&self) -> Result<usize, FetchError> {
        self.shared.tick().await
    }

    pub fn flights(&self) -> Vec<FlightPosition> {
        self.shared.flights.borrow().clone()
    }

    /// Receiver that sees the tracked set after every successful poll.
    pub fn subscribe(&self) -> watch::Receiver<Vec<FlightPosition>> {
        self.shared.flights.subscribe()
    }

    /// User-facing message from the last failed poll, cleared on success.
    pub fn last_error(&self) -> Option<String> {
        self.shared.last_error.lock().clone()
    }

    /// Rotation position of the airport the next tick will query.
    pub fn current_index(&self) -> usize {
        *self.shared.index.lock()
    }

    pub fn next_airport(&self) -> Option<Airport> {
        self.shared.airports.get(self.current_index()).copied()
    }

    pub fn airports(&self) -> &[Airport] {
        &self.shared.airports
    }
}

impl Drop for FlightTracker {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
