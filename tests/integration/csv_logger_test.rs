use std::fs;

use chrono::{Local, TimeZone};
use corefreq::core::export::{CsvLogger, CSV_HEADER};
use corefreq::core::telemetry::{CoreMetric, Snapshot};
use tempfile::TempDir;

fn snapshot(day: u32) -> Snapshot {
    let mut snapshot = Snapshot::empty();
    snapshot.timestamp = Local.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap();
    snapshot.identity.cpu.brand = "Test CPU, 8-Core".to_string();
    snapshot.identity.physical_cores = 2;
    snapshot.identity.logical_cores = 2;
    snapshot.package.temperature_c = Some(55.0);
    snapshot.package.total_utilization_percent = 20.0;
    snapshot.package.cores = (0..2)
        .map(|id| CoreMetric {
            core_id: id,
            frequency_mhz: Some(3000.0 + id as f64 * 100.0),
            utilization_percent: Some(20.0),
            is_active: true,
            ..Default::default()
        })
        .collect();
    snapshot
}

#[test]
fn test_header_written_once_per_file() {
    let temp_dir = TempDir::new().unwrap();
    let template = temp_dir.path().join("data").join("sensors-{Date}.csv");
    let mut logger = CsvLogger::new(template.to_string_lossy());

    logger.log(&snapshot(5)).unwrap();
    logger.log(&snapshot(5)).unwrap();

    let path = temp_dir.path().join("data").join("sensors-20240305.csv");
    assert_eq!(logger.current_path(), Some(path.as_path()));

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], CSV_HEADER);
    assert_eq!(lines.iter().filter(|l| **l == CSV_HEADER).count(), 1);
    // header + 2 polls of (package row + 2 core rows)
    assert_eq!(lines.len(), 7);
    assert!(lines[1].contains("\"Test CPU, 8-Core\""));
    assert!(lines[1].contains("55.00"));
    assert!(lines[2].contains(",0,3000.00,"));
}

#[test]
fn test_reopened_file_is_appended_without_header() {
    let temp_dir = TempDir::new().unwrap();
    let template = temp_dir.path().join("sensors-{Date}.csv");

    CsvLogger::new(template.to_string_lossy()).log(&snapshot(5)).unwrap();
    CsvLogger::new(template.to_string_lossy()).log(&snapshot(5)).unwrap();

    let content = fs::read_to_string(temp_dir.path().join("sensors-20240305.csv")).unwrap();
    assert_eq!(content.lines().filter(|l| *l == CSV_HEADER).count(), 1);
    assert_eq!(content.lines().count(), 7);
}

#[test]
fn test_rotates_on_date_change() {
    let temp_dir = TempDir::new().unwrap();
    let template = temp_dir.path().join("sensors-{Date}.csv");
    let mut logger = CsvLogger::new(template.to_string_lossy());

    logger.log(&snapshot(5)).unwrap();
    logger.log(&snapshot(6)).unwrap();

    for day in ["20240305", "20240306"] {
        let content =
            fs::read_to_string(temp_dir.path().join(format!("sensors-{}.csv", day))).unwrap();
        assert!(content.starts_with(CSV_HEADER));
        assert_eq!(content.lines().count(), 4);
    }
}
