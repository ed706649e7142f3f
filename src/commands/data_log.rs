//! Headless CSV data logger.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::*;

use crate::core::config::Settings;
use crate::core::export::resolve_path;
use crate::core::telemetry::{RuntimeOptions, TelemetryRuntime};

const WAIT_STEP: Duration = Duration::from_millis(100);

pub fn execute(matches: &ArgMatches, settings: &Settings) -> Result<()> {
    let interval = super::interval_arg(matches, settings.logging.data.interval_ms);
    let template = matches
        .get_one::<String>("output")
        .cloned()
        .unwrap_or_else(|| settings.logging.data.path.clone());
    let count = matches.get_one::<u64>("count").copied();

    let service = super::open_service(matches, settings)?;

    let stop = Arc::new(AtomicBool::new(false));
    let stop_clone = stop.clone();
    ctrlc::set_handler(move || {
        println!();
        println!("{}", "Stopping data logger...".yellow().bold());
        stop_clone.store(true, Ordering::Relaxed);
    })
    .map_err(|e| anyhow::anyhow!("Failed to set Ctrl+C handler: {}", e))?;

    let runtime = TelemetryRuntime::new(
        service,
        RuntimeOptions {
            poll_interval: interval,
            data_log: Some((template.clone(), interval)),
        },
    )
    .context("Failed to start telemetry runtime")?;

    let today = chrono::Local::now().date_naive();
    println!(
        "{} {}",
        "Logging sensor data to".cyan().bold(),
        resolve_path(&template, today).display()
    );
    println!("{}", "Press Ctrl+C to stop".dimmed());

    while !stop.load(Ordering::Relaxed) {
        if count.is_some_and(|n| runtime.logged_polls() >= n) {
            break;
        }
        std::thread::sleep(WAIT_STEP);
    }

    let written = runtime.logged_polls();
    runtime.shutdown();
    println!("{} {} poll(s) written", "Done:".green().bold(), written);
    Ok(())
}
