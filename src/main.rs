use anyhow::{Context, Result};
use windo_core::{airport, Config};
use windo_flights::FlightTracker;
use windo_weather::{WeatherService, WindMonitor};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize core
    windo_core::init()?;

    let (config, validation) = Config::load_validated()?;
    if !validation.is_valid() {
        anyhow::bail!("Invalid configuration: {}", validation.error_summary());
    }

    let home = airport::find(&config.default_airport)
        .with_context(|| format!("Unknown airport: {}", config.default_airport))?;

    let weather = WeatherService::from_config(&config).context("Failed to create weather service")?;

    println!("WinDO - Dominican Republic airport winds");
    println!("  Config file: {}", Config::config_path()?.display());
    println!("  Airport: {} ({})", home.name, home.id);

    // The monitor's first tick fetches the report shown at startup
    let mut monitor = WindMonitor::new(weather, home, config.weather.refresh_interval());
    let mut tracker = FlightTracker::from_config(&config).context("Failed to create flight tracker")?;
    let mut refreshes = monitor.subscribe_refreshes();
    monitor.start();
    tracker.start();

    let startup_wait = config.http.timeout() * config.retry.max_attempts.max(1);
    let first = tokio::time::timeout(startup_wait, refreshes.changed()).await;
    match (first, monitor.latest()) {
        (Ok(Ok(())), Some(report)) => {
            let wind = &report.wind;
            let gust = wind
                .gust
                .map(|g| format!(" gusting {:.0} kt", g))
                .unwrap_or_default();
            println!(
                "  Wind: {:03.0}° at {:.0} kt{}",
                wind.direction, wind.speed, gust
            );
            println!(
                "  Weather: {}, {:.1}°C, visibility {:.1} nm, altimeter {:.2} inHg",
                report.weather.condition.description(),
                report.weather.temperature,
                report.weather.visibility_nm(),
                report.weather.altimeter_inhg()
            );
        }
        (Ok(_), _) => {
            let message = monitor
                .last_error()
                .unwrap_or_else(|| "no report published".to_string());
            tracing::warn!("Initial weather refresh failed: {}", message);
            println!("  Weather unavailable: {}", message);
        }
        (Err(_), _) => {
            tracing::warn!("Initial weather refresh timed out");
            println!("  Weather unavailable: still waiting for the provider");
        }
    }

    tracing::info!("WinDO running, press Ctrl-C to exit");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    // Graceful shutdown
    tracker.stop();
    monitor.stop();
    println!("Tracked {} flights", tracker.flights().len());

    Ok(())
}
