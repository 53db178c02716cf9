//! weather-charts: hourly forecast charts for a fixed list of locations.
//!
//! A cycle fetches each location's forecast (cache first), renders a chart
//! for every usable forecast and rewrites the dashboard page. The binary
//! repeats the cycle on a fixed period.

pub mod cli;

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{error, info, warn};
use wxc_chart::{Chart, ChartOptions, Dashboard};
use wxc_core::{AppError, Config, ConfigError};
use wxc_weather::{KeyValueStore, Location, SqliteStore, WeatherError, WeatherProvider};

/// Outcome of one cycle, by location name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub rendered: Vec<String>,
    /// Provider answered without the required series
    pub skipped: Vec<String>,
    /// Location name and the error that stopped it
    pub failed: Vec<(String, String)>,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.rendered.len() + self.skipped.len() + self.failed.len()
    }
}

/// Drives one fetch-and-render pass over a list of locations.
pub struct Orchestrator<S = SqliteStore> {
    provider: WeatherProvider<S>,
    options: ChartOptions,
    tz: Tz,
    output_dir: PathBuf,
    refresh_secs: u64,
}

impl<S: KeyValueStore> Orchestrator<S> {
    pub fn new(
        provider: WeatherProvider<S>,
        options: ChartOptions,
        tz: Tz,
        output_dir: impl Into<PathBuf>,
        refresh_secs: u64,
    ) -> Self {
        Self {
            provider,
            options,
            tz,
            output_dir: output_dir.into(),
            refresh_secs,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub async fn run(&self, locations: &[Location]) -> Result<RunSummary, AppError> {
        self.run_at(locations, Utc::now()).await
    }

    /// Process `locations` in order and write the dashboard.
    ///
    /// A failing location is logged and recorded; the remaining locations
    /// still run. Only failing to write the page fails the cycle.
    pub async fn run_at(
        &self,
        locations: &[Location],
        now: DateTime<Utc>,
    ) -> Result<RunSummary, AppError> {
        let mut dashboard = Dashboard::new(self.refresh_secs);
        let mut summary = RunSummary::default();

        for location in locations {
            let series = match self.provider.fetch(location).await {
                Ok(Some(series)) => series,
                Ok(None) => {
                    summary.skipped.push(location.name.clone());
                    continue;
                }
                Err(WeatherError::Network(e)) if e.is_transient() => {
                    warn!(location = %location.name, "Forecast provider unavailable: {}", e);
                    summary.failed.push((location.name.clone(), e.to_string()));
                    continue;
                }
                Err(e) => {
                    error!(location = %location.name, "Failed to fetch forecast: {}", e);
                    summary.failed.push((location.name.clone(), e.to_string()));
                    continue;
                }
            };

            let rendered = Chart::render(&location.name, series, &self.options, &self.tz, now)
                .and_then(|chart| dashboard.append(&chart, &self.output_dir));

            match rendered {
                Ok(_) => summary.rendered.push(location.name.clone()),
                Err(e) => {
                    error!(location = %location.name, "Failed to render chart: {}", e);
                    summary.failed.push((location.name.clone(), e.to_string()));
                }
            }
        }

        if let Err(e) = dashboard.write_index(&self.output_dir) {
            error!(output = %self.output_dir.display(), "Failed to write dashboard: {}", e);
            return Err(e.into());
        }

        info!(
            rendered = summary.rendered.len(),
            skipped = summary.skipped.len(),
            failed = summary.failed.len(),
            "Cycle complete"
        );
        Ok(summary)
    }
}

/// Open the SQLite cache named in `config`, creating its directory.
pub fn open_store(config: &Config) -> Result<SqliteStore, AppError> {
    if let Some(parent) = config.cache.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                error!(path = %parent.display(), "Failed to create cache directory: {}", e);
                AppError::Io(e)
            })?;
        }
    }
    Ok(SqliteStore::open(&config.cache.path)?)
}

/// Build an orchestrator for `config` over an existing store.
pub fn orchestrator<S: KeyValueStore>(
    config: &Config,
    store: S,
) -> Result<Orchestrator<S>, AppError> {
    let tz = config
        .provider
        .tz()
        .map_err(|e| ConfigError::Invalid(format!("{:#}", e)))?;
    let provider = WeatherProvider::from_config(config.provider.clone(), &config.cache, store)?;

    Ok(Orchestrator::new(
        provider,
        ChartOptions::from(&config.chart),
        tz,
        config.output.dir.clone(),
        config.reload.interval_secs,
    ))
}

/// One complete cycle with freshly opened state.
pub async fn run_cycle(config: &Config, locations: &[Location]) -> Result<RunSummary, AppError> {
    let store = open_store(config)?;
    orchestrator(config, store)?.run(locations).await
}

/// Ticker for the reload loop: fires immediately, then every `period`.
///
/// A cycle that overruns the period pushes the schedule back instead of
/// triggering a burst of catch-up cycles.
pub fn reload_ticker(period: Duration) -> Interval {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

/// Run a cycle now and then every `reload.interval_secs`, until the task is
/// dropped. Cycle failures are logged and the schedule continues.
pub async fn run_forever(config: &Config, locations: &[Location]) {
    let period = Duration::from_secs(config.reload.interval_secs.max(1));
    info!(
        interval_secs = period.as_secs(),
        locations = locations.len(),
        "Starting reload loop"
    );

    let mut ticker = reload_ticker(period);
    loop {
        ticker.tick().await;

        match run_cycle(config, locations).await {
            Ok(summary) if !summary.failed.is_empty() => {
                warn!(failed = ?summary.failed, "Some locations failed this cycle");
            }
            Ok(_) => {}
            Err(e) => error!(hint = e.user_message(), "Cycle failed: {}", e),
        }
    }
}
