//! Raw sensor listing, for diagnosing matching rules.

use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::*;

use crate::core::config::Settings;
use crate::core::provider::{FixtureFrame, FixtureProvider};
use crate::ui::system_formatters;

pub fn execute(matches: &ArgMatches, _settings: &Settings) -> Result<()> {
    let mut provider = super::open_sensor_provider(matches)?;

    // Prime load counters, then take the reading that gets printed
    provider.refresh().context("Failed to refresh sensors")?;
    std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
    provider.refresh().context("Failed to refresh sensors")?;

    if !provider.cpu_present() {
        println!("{}", "No CPU hardware reported by the provider".yellow());
    }
    system_formatters::print_sensors(&provider.sensors());

    if let Some(path) = matches.get_one::<String>("record") {
        let frame = FixtureFrame::capture(provider.as_ref());
        FixtureProvider::save(Path::new(path), &[frame])
            .with_context(|| format!("Failed to record fixture to {}", path))?;
        println!("\n{} {}", "Recorded frame to".green().bold(), path);
    }
    Ok(())
}
