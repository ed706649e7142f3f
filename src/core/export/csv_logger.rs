//! Periodic CSV logging of snapshots with daily file rotation.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::core::telemetry::Snapshot;
use crate::error::{CoreFreqError, Result};

/// Placeholder in the path template replaced by `YYYYMMDD`
pub const DATE_PLACEHOLDER: &str = "{Date}";

pub const CSV_HEADER: &str = "Timestamp,CPU Model,Physical Cores,Logical Cores,\
Package Temp (°C),Package Power (W),Package Voltage (V),Total Utilization (%),\
Core ID,Core Frequency (MHz),Core Temperature (°C),Core Utilization (%),\
Core Power (W),Core Voltage (V)";

/// Expand the date placeholder of a path template.
pub fn resolve_path(template: &str, date: NaiveDate) -> PathBuf {
    PathBuf::from(template.replace(DATE_PLACEHOLDER, &date.format("%Y%m%d").to_string()))
}

fn cell(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{:.*}", precision, v))
        .unwrap_or_default()
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

/// One package row followed by one row per core, ordered by core id.
pub fn format_rows(snapshot: &Snapshot) -> Vec<String> {
    let timestamp = snapshot.timestamp.format("%Y-%m-%d %H:%M:%S%.3f").to_string();
    let model = quote(&snapshot.identity.cpu.brand);
    let prefix = format!(
        "{},{},{},{}",
        timestamp, model, snapshot.identity.physical_cores, snapshot.identity.logical_cores
    );
    let package = &snapshot.package;

    let mut rows = Vec::with_capacity(package.cores.len() + 1);
    rows.push(format!(
        "{},{},{},{},{:.2},,,,,,",
        prefix,
        cell(package.temperature_c, 2),
        cell(package.power_watts, 2),
        cell(package.voltage_volts, 3),
        package.total_utilization_percent,
    ));

    let mut cores: Vec<_> = package.cores.iter().collect();
    cores.sort_by_key(|c| c.core_id);
    for core in cores {
        rows.push(format!(
            "{},,,,,{},{},{},{},{},{}",
            prefix,
            core.core_id,
            cell(core.frequency_mhz, 2),
            cell(core.temperature_c, 2),
            cell(core.utilization_percent, 2),
            cell(core.power_watts, 2),
            cell(core.voltage_volts, 3),
        ));
    }
    rows
}

/// Appends snapshots to a dated CSV file, reopening it when the date changes.
pub struct CsvLogger {
    template: String,
    date: Option<NaiveDate>,
    path: Option<PathBuf>,
    writer: Option<BufWriter<File>>,
}

impl CsvLogger {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            date: None,
            path: None,
            writer: None,
        }
    }

    /// File currently written to, once the first snapshot has been logged
    pub fn current_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn log(&mut self, snapshot: &Snapshot) -> Result<()> {
        let date = snapshot.timestamp.date_naive();
        if self.date != Some(date) || self.writer.is_none() {
            self.rotate(date)?;
        }

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| CoreFreqError::logger("CSV output is not open"))?;
        for row in format_rows(snapshot) {
            writeln!(writer, "{}", row)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn rotate(&mut self, date: NaiveDate) -> Result<()> {
        if let Some(mut old) = self.writer.take() {
            old.flush()?;
        }

        let path = resolve_path(&self.template, date);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    CoreFreqError::logger(format!("cannot create {}: {}", parent.display(), e))
                })?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| CoreFreqError::logger(format!("cannot open {}: {}", path.display(), e)))?;
        let is_new = file.metadata().map(|m| m.len() == 0).unwrap_or(true);

        let mut writer = BufWriter::new(file);
        if is_new {
            writeln!(writer, "{}", CSV_HEADER)?;
        }

        log::info!("Logging sensor data to {}", path.display());
        self.date = Some(date);
        self.path = Some(path);
        self.writer = Some(writer);
        Ok(())
    }
}
