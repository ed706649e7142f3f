use std::fs;

use corefreq::core::config::{
    FrequencyUnit, Settings, TemperatureUnit, View, DEFAULT_INTERVAL_MS, MAX_INTERVAL_MS,
};
use corefreq::core::telemetry::{SensorRule, ThreadMapping};
use tempfile::TempDir;

#[test]
fn test_missing_file_yields_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let settings = Settings::load_from(&temp_dir.path().join("settings.json")).unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.update_interval_ms, DEFAULT_INTERVAL_MS);
    assert_eq!(settings.frequency_unit, FrequencyUnit::GHz);
    assert_eq!(settings.temperature_unit, TemperatureUnit::Celsius);
}

#[test]
fn test_save_and_reload() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("corefreq").join("settings.json");

    let mut settings = Settings::default();
    settings.default_view = View::Sensors;
    settings.temperature_unit = TemperatureUnit::Fahrenheit;
    settings.frequency_unit = FrequencyUnit::MHz;
    settings.thread_mapping = ThreadMapping::Topology;
    settings.logging.data.enabled = true;
    settings.save_to(&path).unwrap();

    let loaded = Settings::load_from(&path).unwrap();
    assert_eq!(loaded, settings);
}

#[test]
fn test_partial_file_fills_defaults_and_clamps() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");
    fs::write(
        &path,
        r#"{ "update_interval_ms": 999999, "logging": { "data": { "enabled": true } } }"#,
    )
    .unwrap();

    let settings = Settings::load_from(&path).unwrap();
    assert_eq!(settings.update_interval_ms, MAX_INTERVAL_MS);
    assert!(settings.logging.data.enabled);
    assert_eq!(settings.logging.data.path, "data/sensors-{Date}.csv");
    assert_eq!(settings.default_view, View::Dashboard);
}

#[test]
fn test_corrupt_file_is_a_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");
    fs::write(&path, "{ not json").unwrap();

    let err = Settings::load_from(&path).unwrap_err();
    assert!(err.to_string().contains("Configuration error"));
}

#[test]
fn test_custom_sensor_rules() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");
    fs::write(
        &path,
        r#"{
            "sensor_rules": {
                "package_temperature": [ { "contains_any": ["die"], "excludes": ["ccd"] } ],
                "package_power": [ { "contains_any": ["ppt"] } ],
                "core_voltage": []
            }
        }"#,
    )
    .unwrap();

    let settings = Settings::load_from(&path).unwrap();
    let rules = settings.sensor_rules;
    assert_eq!(
        rules.package_temperature,
        vec![SensorRule::contains(&["die"]).excluding(&["ccd"])]
    );
    assert_eq!(rules.package_power[0].contains_any, vec!["ppt".to_string()]);
    assert!(rules.core_voltage.is_empty());
    // die-level list keeps its default when omitted
    assert!(!rules.die_level.is_empty());
}
