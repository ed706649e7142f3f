use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::core::telemetry::{SensorRules, ThreadMapping};
use crate::error::{CoreFreqError, Result};

pub const DEFAULT_INTERVAL_MS: u64 = 1000;
pub const MIN_INTERVAL_MS: u64 = 100;
pub const MAX_INTERVAL_MS: u64 = 10_000;

/// Keep polling intervals within what the sensors can meaningfully deliver.
pub fn clamp_interval(ms: u64) -> u64 {
    ms.clamp(MIN_INTERVAL_MS, MAX_INTERVAL_MS)
}

/// Dashboard views
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Dashboard,
    Topology,
    Sensors,
    System,
}

impl View {
    pub const ALL: [View; 4] = [View::Dashboard, View::Topology, View::Sensors, View::System];

    pub fn title(self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Topology => "Topology",
            View::Sensors => "Sensors",
            View::System => "System",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|v| *v == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl FromStr for View {
    type Err = CoreFreqError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "dashboard" => Ok(View::Dashboard),
            "topology" => Ok(View::Topology),
            "sensors" => Ok(View::Sensors),
            "system" => Ok(View::System),
            other => Err(CoreFreqError::config(format!("unknown view '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemperatureUnit {
    #[default]
    #[serde(rename = "C")]
    Celsius,
    #[serde(rename = "F")]
    Fahrenheit,
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemperatureUnit::Celsius => write!(f, "°C"),
            TemperatureUnit::Fahrenheit => write!(f, "°F"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrequencyUnit {
    #[serde(rename = "MHz")]
    MHz,
    #[default]
    #[serde(rename = "GHz")]
    GHz,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLogging {
    pub enabled: bool,
    /// `{Date}` expands to the current date
    pub path: String,
}

impl Default for FileLogging {
    fn default() -> Self {
        Self {
            enabled: false,
            path: "logs/corefreq-{Date}.log".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataLogging {
    pub enabled: bool,
    pub path: String,
    pub interval_ms: u64,
}

impl Default for DataLogging {
    fn default() -> Self {
        Self {
            enabled: false,
            path: "data/sensors-{Date}.csv".to_string(),
            interval_ms: DEFAULT_INTERVAL_MS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub file: FileLogging,
    pub data: DataLogging,
}

/// User settings, stored as JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub update_interval_ms: u64,
    pub default_view: View,
    pub temperature_unit: TemperatureUnit,
    pub frequency_unit: FrequencyUnit,
    pub logging: LoggingSettings,
    pub sensor_rules: SensorRules,
    pub thread_mapping: ThreadMapping,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            update_interval_ms: DEFAULT_INTERVAL_MS,
            default_view: View::default(),
            temperature_unit: TemperatureUnit::default(),
            frequency_unit: FrequencyUnit::default(),
            logging: LoggingSettings::default(),
            sensor_rules: SensorRules::default(),
            thread_mapping: ThreadMapping::default(),
        }
    }
}

impl Settings {
    /// Load from the default location, falling back to defaults when absent.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Load from `path`. A missing or empty file yields defaults; a corrupt one is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Settings::default());
        }

        let data = fs::read_to_string(path).map_err(|e| {
            CoreFreqError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        if data.trim().is_empty() {
            return Ok(Settings::default());
        }

        let mut settings: Settings = serde_json::from_str(&data).map_err(|e| {
            CoreFreqError::config(format!("invalid settings in {}: {}", path.display(), e))
        })?;
        settings.update_interval_ms = clamp_interval(settings.update_interval_ms);
        settings.logging.data.interval_ms = clamp_interval(settings.logging.data.interval_ms);
        Ok(settings)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                CoreFreqError::config(format!(
                    "failed to create config directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data).map_err(|e| {
            CoreFreqError::config(format!("failed to write {}: {}", path.display(), e))
        })?;
        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CoreFreqError::config("could not determine config directory"))?;

        Ok(config_dir.join("corefreq").join("settings.json"))
    }

    /// Where settings at `path` come from, for logging once the logger is up.
    pub fn describe_source(path: &Path) -> String {
        if path.exists() {
            format!("Settings loaded from {}", path.display())
        } else {
            format!("No settings at {}, using defaults", path.display())
        }
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(clamp_interval(self.update_interval_ms))
    }

    pub fn data_interval(&self) -> Duration {
        Duration::from_millis(clamp_interval(self.logging.data.interval_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_clamp() {
        assert_eq!(clamp_interval(10), MIN_INTERVAL_MS);
        assert_eq!(clamp_interval(60_000), MAX_INTERVAL_MS);
        assert_eq!(clamp_interval(500), 500);
    }

    #[test]
    fn test_view_cycle() {
        assert_eq!(View::System.next(), View::Dashboard);
        assert_eq!(View::Dashboard.previous(), View::System);
        assert_eq!("Topology".parse::<View>().unwrap(), View::Topology);
        assert!("graphs".parse::<View>().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"temperature_unit": "F", "default_view": "sensors"}"#).unwrap();
        assert_eq!(settings.temperature_unit, TemperatureUnit::Fahrenheit);
        assert_eq!(settings.default_view, View::Sensors);
        assert_eq!(settings.update_interval_ms, DEFAULT_INTERVAL_MS);
        assert_eq!(settings.sensor_rules, SensorRules::default());
    }
}
