//! Monitor command handler.
//!
//! Runs the live CPU dashboard in the terminal.

use std::io::IsTerminal;

use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::core::config::{Settings, View};
use crate::error::CoreFreqError;
use crate::ui::monitor_tui::{run_monitor_app, MonitorAppConfig};

/// Execute the monitor command
pub fn execute(matches: &ArgMatches, settings: &Settings) -> Result<()> {
    if !std::io::stdout().is_terminal() {
        return Err(CoreFreqError::tui(
            "the monitor needs an interactive terminal, use 'corefreq snapshot --watch' instead",
        )
        .into());
    }

    let interval = super::interval_arg(matches, settings.update_interval_ms);

    let view = match matches.get_one::<String>("view") {
        Some(name) => name.parse::<View>()?,
        None => settings.default_view,
    };

    // --log wins over the settings file
    let data_log = match matches.get_one::<String>("log") {
        Some(path) => Some((path.clone(), settings.data_interval())),
        None if settings.logging.data.enabled => {
            Some((settings.logging.data.path.clone(), settings.data_interval()))
        }
        None => None,
    };
    if let Some((path, _)) = &data_log {
        log::info!("Logging sensor data to {}", path);
    }

    let service = super::open_service(matches, settings)?;
    // Seed the first frame so the dashboard does not open empty
    service.collect_once();

    let config = MonitorAppConfig {
        interval_ms: interval.as_millis() as u64,
        view,
        units: super::units(settings),
        data_log,
    };

    run_monitor_app(service, config).context("Failed to run CPU monitor")
}
