use chrono::{DateTime, Local};
use humansize::{format_size, BINARY};

use crate::core::config::{FrequencyUnit, TemperatureUnit};

/// Shown for every absent reading
pub const NOT_AVAILABLE: &str = "N/A";

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Format a frequency given in MHz
pub fn format_frequency(mhz: Option<f64>, unit: FrequencyUnit) -> String {
    match (mhz, unit) {
        (None, _) => NOT_AVAILABLE.to_string(),
        (Some(mhz), FrequencyUnit::GHz) => format!("{:.2} GHz", mhz / 1000.0),
        (Some(mhz), FrequencyUnit::MHz) => format!("{:.0} MHz", mhz),
    }
}

/// Format a temperature given in °C
pub fn format_temperature(celsius: Option<f64>, unit: TemperatureUnit) -> String {
    match (celsius, unit) {
        (None, _) => NOT_AVAILABLE.to_string(),
        (Some(c), TemperatureUnit::Celsius) => format!("{:.1} {}", c, unit),
        (Some(c), TemperatureUnit::Fahrenheit) => {
            format!("{:.1} {}", celsius_to_fahrenheit(c), unit)
        }
    }
}

pub fn format_voltage(volts: Option<f64>) -> String {
    volts
        .map(|v| format!("{:.3} V", v))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn format_power(watts: Option<f64>) -> String {
    watts
        .map(|w| format!("{:.2} W", w))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn format_percentage(percent: Option<f64>) -> String {
    percent
        .map(|p| format!("{:.1}%", p))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn format_multiplier(multiplier: Option<f64>) -> String {
    multiplier
        .map(|m| format!("x{:.1}", m))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Format a byte count in human-readable binary units
pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, BINARY)
}

/// Format timestamp in human-readable format (YYYY-MM-DD HH:MM:SS)
pub fn format_time(time: &DateTime<Local>) -> String {
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}
