//! One-shot or streaming snapshot dump.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::core::config::Settings;
use crate::core::telemetry::{AggregationService, Snapshot};
use crate::ui::system_formatters::{self, Units};

pub fn execute(matches: &ArgMatches, settings: &Settings) -> Result<()> {
    let json = matches.get_flag("json");
    let watch = matches.get_flag("watch");
    let interval = super::interval_arg(matches, settings.update_interval_ms);
    let units = super::units(settings);

    let service = super::open_service(matches, settings)?;

    // Load is a delta between two refreshes, so prime the counters once.
    service.collect_once();
    std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);

    if !watch {
        let snapshot = service.collect_once();
        return emit(&snapshot, json, units);
    }

    let stop = Arc::new(AtomicBool::new(false));
    let stop_clone = stop.clone();
    ctrlc::set_handler(move || stop_clone.store(true, Ordering::Relaxed))
        .map_err(|e| anyhow::anyhow!("Failed to set Ctrl+C handler: {}", e))?;

    watch_loop(&service, &stop, interval, json, units)
}

fn watch_loop(
    service: &AggregationService,
    stop: &AtomicBool,
    interval: std::time::Duration,
    json: bool,
    units: Units,
) -> Result<()> {
    while !stop.load(Ordering::Relaxed) {
        let snapshot = service.collect_once();
        emit(&snapshot, json, units)?;
        std::thread::sleep(interval);
    }
    Ok(())
}

fn emit(snapshot: &Snapshot, json: bool, units: Units) -> Result<()> {
    if json {
        // One JSON document per line, for scripting
        let line = serde_json::to_string(snapshot).context("Failed to serialize snapshot")?;
        println!("{}", line);
    } else {
        system_formatters::print_snapshot(snapshot, units);
    }
    Ok(())
}
