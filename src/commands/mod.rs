// Command handlers module
pub mod data_log;
pub mod monitor;
pub mod sensors;
pub mod snapshot;
pub mod system_info;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::core::config::{clamp_interval, Settings};
use crate::core::provider::{open_provider, SensorProvider};
use crate::core::telemetry::AggregationService;
use crate::ui::system_formatters::Units;

// Re-exports for cleaner imports
pub use data_log::execute as data_log;
pub use monitor::execute as monitor;
pub use sensors::execute as sensors;
pub use snapshot::execute as snapshot;
pub use system_info::execute as system_info;

/// The settings file named by `--config`, or the default location.
pub fn settings_path(matches: &ArgMatches) -> Result<PathBuf> {
    match matches.get_one::<String>("config") {
        Some(path) => Ok(PathBuf::from(path)),
        None => Settings::get_config_path().context("Failed to locate settings"),
    }
}

/// Load settings from [`settings_path`], returning the path they came from.
pub fn load_settings(matches: &ArgMatches) -> Result<(Settings, PathBuf)> {
    let path = settings_path(matches)?;
    let settings = Settings::load_from(&path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))?;
    Ok((settings, path))
}

/// Open the live provider, or the `--replay` fixture when one is given.
///
/// Provider failure is the one fatal startup error, so it is logged before bailing.
pub fn open_sensor_provider(matches: &ArgMatches) -> Result<Box<dyn SensorProvider>> {
    let replay = matches.get_one::<String>("replay").map(PathBuf::from);
    match open_provider(replay.as_deref()) {
        Ok(provider) => Ok(provider),
        Err(e) => {
            if e.is_fatal() {
                log::error!("{}", e);
            }
            Err(e).context("Failed to open sensor provider")
        }
    }
}

/// Build the aggregation service with the configured matching rules.
pub fn open_service(matches: &ArgMatches, settings: &Settings) -> Result<Arc<AggregationService>> {
    let provider = open_sensor_provider(matches)?;
    log::debug!("Using sensor provider '{}'", provider.name());
    Ok(Arc::new(AggregationService::with_rules(
        provider,
        settings.sensor_rules.clone(),
        settings.thread_mapping,
    )))
}

/// `--interval` when given, otherwise `fallback`, clamped to the supported range.
pub fn interval_arg(matches: &ArgMatches, fallback: u64) -> Duration {
    let ms = matches.get_one::<u64>("interval").copied().unwrap_or(fallback);
    Duration::from_millis(clamp_interval(ms))
}

pub fn units(settings: &Settings) -> Units {
    Units {
        frequency: settings.frequency_unit,
        temperature: settings.temperature_unit,
    }
}
