use std::fs;

use corefreq::core::provider::{open_provider, FixtureFrame, FixtureProvider, SensorProvider};
use corefreq::core::telemetry::{SensorKind, SensorSample};
use corefreq::CoreFreqError;
use tempfile::TempDir;

const HAND_WRITTEN: &str = r#"[
  {
    "sensors": [
      { "name": "Core #0", "kind": "clock", "value": 3600.0, "hardware": "Test CPU", "hardware_kind": "cpu" },
      { "name": "Tctl", "kind": "temperature", "value": 48.5, "hardware": "Test CPU", "hardware_kind": "cpu" }
    ],
    "identity": { "cpu": { "vendor": "AuthenticAMD", "brand": "Test CPU" }, "physical_cores": 1, "logical_cores": 1 },
    "utilization": { "per_core": { "0": 12.5 }, "total": 12.5 }
  }
]"#;

#[test]
fn test_load_hand_written_fixture() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("frames.json");
    fs::write(&path, HAND_WRITTEN).unwrap();

    let mut provider = FixtureProvider::load(&path).unwrap();
    assert_eq!(provider.frame_count(), 1);

    provider.refresh().unwrap();
    assert!(provider.cpu_present());
    assert_eq!(provider.sensors().len(), 2);
    assert_eq!(provider.identity().cpu.brand, "Test CPU");
    assert_eq!(provider.utilization().per_core.get(&0), Some(&12.5));
}

#[test]
fn test_missing_fixture_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let result = open_provider(Some(&temp_dir.path().join("absent.json")));
    match result {
        Err(e) => {
            assert!(matches!(e, CoreFreqError::Fixture(_)));
            assert!(!e.is_fatal());
        }
        Ok(_) => panic!("missing fixture must not open"),
    }
}

#[test]
fn test_empty_fixture_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("empty.json");
    fs::write(&path, "[]").unwrap();
    assert!(FixtureProvider::load(&path).is_err());
}

#[test]
fn test_recorded_frame_replays() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("recorded.json");

    let frame = FixtureFrame {
        sensors: vec![SensorSample::cpu("CPU Package", SensorKind::Power, Some(35.0))],
        cpu_present: true,
        ..Default::default()
    };
    let mut source = FixtureProvider::new(vec![frame]).unwrap();
    source.refresh().unwrap();

    FixtureProvider::save(&path, &[FixtureFrame::capture(&source)]).unwrap();

    let mut replay = open_provider(Some(&path)).unwrap();
    assert_eq!(replay.name(), "fixture");
    replay.refresh().unwrap();
    assert_eq!(replay.sensors(), source.sensors());
}
