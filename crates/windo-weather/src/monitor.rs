//! Periodic refresh of the selected airport's report.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use windo_core::{Airport, FetchError};

use crate::service::WeatherService;
use crate::types::AirportReport;

struct MonitorState {
    service: WeatherService,
    selected: Mutex<Airport>,
    last_error: Mutex<Option<String>>,
    reports: watch::Sender<Option<AirportReport>>,
    refreshes: watch::Sender<u64>,
    reselected: Notify,
}

impl MonitorState {
    async fn refresh(&self) -> Result<AirportReport, FetchError> {
        let airport = *self.selected.lock();
        let result = self.service.fetch_airport_report(&airport).await;
        let result = match result {
            Ok(report) => {
                *self.last_error.lock() = None;
                self.reports.send_replace(Some(report.clone()));
                debug!(airport = airport.id, "Published airport report");
                Ok(report)
            }
            Err(e) => {
                warn!(airport = airport.id, error = %e, "Weather refresh failed");
                *self.last_error.lock() = Some(e.user_message());
                Err(e)
            }
        };
        self.refreshes.send_modify(|count| *count += 1);
        result
    }
}

/// Keeps the selected airport's [`AirportReport`] fresh.
///
/// The first refresh runs as soon as the monitor starts; selecting another
/// airport triggers an immediate refresh and restarts the interval.
pub struct WindMonitor {
    state: Arc<MonitorState>,
    interval: Duration,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl WindMonitor {
    pub fn new(service: WeatherService, airport: Airport, interval: Duration) -> Self {
        let (reports, _) = watch::channel(None);
        let (refreshes, _) = watch::channel(0);
        Self {
            state: Arc::new(MonitorState {
                service,
                selected: Mutex::new(airport),
                last_error: Mutex::new(None),
                reports,
                refreshes,
                reselected: Notify::new(),
            }),
            interval,
            cancel: CancellationToken::new(),
            task: None,
        }
    }

    /// Spawn the refresh loop. No-op if already running.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }

        self.cancel = CancellationToken::new();
        let cancel = self.cancel.clone();
        let state = Arc::clone(&self.state);
        let interval = self.interval;

        info!(
            airport = self.selected().id,
            interval_secs = interval.as_secs(),
            "Starting wind monitor"
        );

        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                    _ = state.reselected.notified() => ticker.reset(),
                }

                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = state.refresh() => {}
                }
            }

            debug!("Wind monitor loop exited");
        }));
    }

    /// Cancel the refresh loop.
    pub fn stop(&mut self) {
        self.cancel.cancel();
        if self.task.take().is_some() {
            info!("Wind monitor stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn selected(&self) -> Airport {
        *self.state.selected.lock()
    }

    /// Switch airports and refresh right away.
    pub fn select(&self, airport: Airport) {
        *self.state.selected.lock() = airport;
        self.state.reselected.notify_one();
    }

    /// Refresh once, outside the timer.
    pub async fn refresh(&self) -> Result<AirportReport, FetchError> {
        self.state.refresh().await
    }

    /// Receiver that sees every published report.
    pub fn subscribe(&self) -> watch::Receiver<Option<AirportReport>> {
        self.state.reports.subscribe()
    }

    /// Receiver that changes after every finished refresh, failed ones
    /// included. The value counts refreshes since the monitor was created.
    pub fn subscribe_refreshes(&self) -> watch::Receiver<u64> {
        self.state.refreshes.subscribe()
    }

    pub fn latest(&self) -> Option<AirportReport> {
        self.state.reports.borrow().clone()
    }

    /// User-facing message from the last failed refresh, cleared on success.
    pub fn last_error(&self) -> Option<String> {
        self.state.last_error.lock().clone()
    }
}

impl Drop for WindMonitor {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
