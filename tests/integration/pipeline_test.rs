use std::fs;
use std::sync::Arc;
use std::time::Duration;

use corefreq::core::export::format_rows;
use corefreq::core::provider::{open_provider, FixtureFrame, FixtureProvider};
use corefreq::core::telemetry::{
    AggregationService, RuntimeOptions, SensorKind, SensorRules, SensorSample, SystemIdentity,
    TelemetryRuntime, ThreadMapping, UtilizationReading,
};
use tempfile::TempDir;

/// A 2-core / 4-thread part that only exposes a die temperature.
fn smt_frame(clocks: [f64; 2], tctl: f64) -> FixtureFrame {
    let mut sensors: Vec<SensorSample> = clocks
        .iter()
        .enumerate()
        .map(|(i, mhz)| SensorSample::cpu(format!("Core #{}", i), SensorKind::Clock, Some(*mhz)))
        .collect();
    sensors.extend((0..4).map(|i| {
        SensorSample::cpu(format!("CPU Core #{}", i), SensorKind::Load, Some(10.0 * i as f64))
    }));
    sensors.push(SensorSample::cpu("Tctl", SensorKind::Temperature, Some(tctl)));
    sensors.push(SensorSample::cpu("CCD1 (Tdie)", SensorKind::Temperature, Some(tctl - 2.0)));
    sensors.push(SensorSample::cpu("Package", SensorKind::Power, Some(0.0)));
    sensors.push(SensorSample::cpu("CPU PPT", SensorKind::Power, Some(45.5)));
    sensors.push(SensorSample {
        name: "System Fan".to_string(),
        kind: SensorKind::Fan,
        value: Some(900.0),
        ..Default::default()
    });

    FixtureFrame {
        sensors,
        identity: SystemIdentity {
            physical_cores: 2,
            logical_cores: 4,
            ..Default::default()
        },
        utilization: UtilizationReading {
            per_core: (0..4).map(|i| (i, 10.0 * i as f64)).collect(),
            total: Some(15.0),
        },
        cpu_present: true,
        ..Default::default()
    }
}

fn replay_service(frames: Vec<FixtureFrame>) -> (TempDir, AggregationService) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("frames.json");
    FixtureProvider::save(&path, &frames).unwrap();
    let provider = open_provider(Some(&path)).unwrap();
    (temp_dir, AggregationService::new(provider))
}

#[test]
fn test_replayed_cycle_reconciles() {
    let (_dir, service) = replay_service(vec![smt_frame([3400.0, 3600.0], 61.0)]);
    let snapshot = service.collect_once();

    assert_eq!(snapshot.cores().len(), 4);
    // Package power skips the dead "Package" sensor
    assert_eq!(snapshot.package.power_watts, Some(45.5));
    assert_eq!(snapshot.package.temperature_c, Some(61.0));
    // Die-only part: every core inherits the package temperature
    assert!(snapshot.cores().iter().all(|c| c.temperature_c == Some(61.0)));

    let freqs: Vec<Option<f64>> = snapshot.cores().iter().map(|c| c.frequency_mhz).collect();
    assert_eq!(freqs, vec![Some(3400.0), Some(3600.0), Some(3400.0), Some(3600.0)]);
    assert_eq!(snapshot.cores()[1].multiplier, Some(36.0));
    assert_eq!(snapshot.frequency.max_mhz, Some(3600.0));

    // Idle core keeps a real 0% load
    assert_eq!(snapshot.cores()[0].utilization_percent, Some(0.0));
    assert_eq!(snapshot.package.total_utilization_percent, 15.0);

    // The raw list keeps non-CPU sensors
    assert!(snapshot.sensors.iter().any(|s| s.kind == SensorKind::Fan));
}

#[test]
fn test_statistics_span_cycles_and_reset() {
    let (_dir, service) = replay_service(vec![
        smt_frame([3400.0, 3600.0], 61.0),
        smt_frame([4400.0, 2200.0], 75.0),
    ]);
    service.collect_once();
    let second = service.collect_once();

    let core1 = &second.cores()[1];
    assert_eq!(core1.min_frequency(), Some(2200.0));
    assert_eq!(core1.max_frequency(), Some(3600.0));
    assert_eq!(second.package.temperature_range.min, Some(61.0));
    assert_eq!(second.package.temperature_range.max, Some(75.0));

    let cleared = service.clear_min_max();
    assert!(cleared.cores().iter().all(|c| c.frequency_range.is_unset()));
    // Current values survive the reset
    assert_eq!(cleared.cores()[1].frequency_mhz, Some(2200.0));
    assert!(Arc::ptr_eq(&cleared, &service.snapshot()));
}

#[test]
fn test_topology_mapping_falls_back_without_affinity() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("frames.json");
    FixtureProvider::save(&path, &[smt_frame([3000.0, 3200.0], 50.0)]).unwrap();

    let service = AggregationService::with_rules(
        open_provider(Some(&path)).unwrap(),
        SensorRules::default(),
        ThreadMapping::Topology,
    );
    assert_eq!(service.thread_mapping(), ThreadMapping::Topology);
    assert_eq!(service.rules(), &SensorRules::default());
    let snapshot = service.collect_once();
    let freqs: Vec<Option<f64>> = snapshot.cores().iter().map(|c| c.frequency_mhz).collect();
    assert_eq!(freqs, vec![Some(3000.0), Some(3200.0), Some(3000.0), Some(3200.0)]);
}

#[test]
fn test_snapshot_exports_one_row_per_core() {
    let (_dir, service) = replay_service(vec![smt_frame([3400.0, 3600.0], 61.0)]);
    let rows = format_rows(&service.collect_once());
    assert_eq!(rows.len(), 5);
    assert!(rows[0].contains(",45.50,"));
}

#[test]
fn test_runtime_logs_published_snapshots() {
    let (dir, service) = replay_service(vec![smt_frame([3400.0, 3600.0], 61.0)]);
    let template = dir.path().join("out-{Date}.csv");

    let runtime = TelemetryRuntime::new(
        Arc::new(service),
        RuntimeOptions {
            poll_interval: Duration::from_millis(20),
            data_log: Some((template.to_string_lossy().into_owned(), Duration::from_millis(20))),
        },
    )
    .unwrap();

    let mut waited = Duration::ZERO;
    while runtime.logged_polls() < 2 && waited < Duration::from_secs(5) {
        std::thread::sleep(Duration::from_millis(20));
        waited += Duration::from_millis(20);
    }
    assert!(runtime.logged_polls() >= 2);
    assert!(!runtime.service().snapshot().cores().is_empty());
    runtime.shutdown();

    let written: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with("out-"))
        .collect();
    assert_eq!(written.len(), 1);
}
