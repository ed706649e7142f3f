use colored::*;

use crate::core::config::{FrequencyUnit, TemperatureUnit};
use crate::core::telemetry::{
    resolve_core_id, SensorKind, SensorSample, Snapshot, SystemIdentity, TopologySnapshot,
};
use crate::ui::formatters::*;

/// Units used by the plain-text printers
#[derive(Debug, Clone, Copy, Default)]
pub struct Units {
    pub frequency: FrequencyUnit,
    pub temperature: TemperatureUnit,
}

fn print_section_header(title: &str) {
    println!("\n{}", title.bold().green());
    println!("{}", "-".repeat(title.len()));
}

fn or_unknown(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("Unknown")
}

pub fn print_system_identity(identity: &SystemIdentity, topology: &TopologySnapshot) {
    println!("\n{}", "SYSTEM INFORMATION".bold().bright_cyan());
    println!("{}", "=".repeat(80));

    print_section_header("CPU");
    println!("  Model: {}", identity.cpu.brand);
    println!("  Vendor: {}", identity.cpu.vendor);
    if let (Some(family), Some(model)) = (identity.cpu.family, identity.cpu.model) {
        let stepping = identity.cpu.stepping.map(|s| s.to_string()).unwrap_or_default();
        println!("  Signature: family {} model {} stepping {}", family, model, stepping);
    }
    println!("  Architecture: {}", identity.architecture);
    println!(
        "  Cores: {} physical, {} logical",
        identity.physical_cores, identity.logical_cores
    );

    print_topology(topology);

    print_section_header("Motherboard");
    println!("  Manufacturer: {}", or_unknown(&identity.board.manufacturer));
    println!("  Product: {}", or_unknown(&identity.board.product));
    println!(
        "  BIOS: {} {} ({})",
        or_unknown(&identity.board.bios_vendor),
        or_unknown(&identity.board.bios_version),
        or_unknown(&identity.board.bios_date)
    );

    print_section_header("System");
    println!("  Memory: {}", format_bytes(identity.total_memory_bytes));
    println!("  OS: {} {}", identity.os_name, identity.os_version);
    println!();
}

fn print_topology(topology: &TopologySnapshot) {
    print_section_header("Topology");
    println!(
        "  Packages: {}  NUMA nodes: {}  SMT: {}",
        topology.packages,
        topology.numa_nodes,
        if topology.has_smt { "Yes".green() } else { "No".yellow() }
    );
    println!("  Thread affinity: {:?}", topology.affinity_source);
    for cache in &topology.caches {
        println!(
            "  L{} {:?}: {}",
            cache.level,
            cache.kind,
            format_bytes(cache.size_bytes)
        );
    }
}

/// Debug listing of every raw sensor, then clock and temperature summaries.
pub fn print_sensors(sensors: &[SensorSample]) {
    println!("\n{}", "SENSORS".bold().bright_cyan());
    println!("{}", "=".repeat(80));

    let mut hardware: Vec<&str> = Vec::new();
    for sensor in sensors {
        if !hardware.contains(&sensor.hardware.as_str()) {
            hardware.push(&sensor.hardware);
        }
    }
    for unit in hardware {
        print_section_header(if unit.is_empty() { "Unknown hardware" } else { unit });
        for sensor in sensors.iter().filter(|s| s.hardware == unit) {
            println!(
                "  {:<12} {:<36} {:>10}  min {:>10}  max {:>10}",
                sensor.kind.to_string().dimmed(),
                sensor.name,
                raw(sensor.value),
                raw(sensor.min),
                raw(sensor.max)
            );
        }
    }

    for kind in [SensorKind::Clock, SensorKind::Temperature] {
        let matching: Vec<&SensorSample> = sensors
            .iter()
            .filter(|s| s.is_cpu() && s.kind == kind)
            .collect();
        print_section_header(&format!("{} sensors ({})", kind, matching.len()));
        for sensor in matching {
            let core = resolve_core_id(&sensor.name)
                .map(|id| format!("core {}", id))
                .unwrap_or_else(|| "no core id".dimmed().to_string());
            println!("  {:<36} {:>10}  {}", sensor.name, raw(sensor.value), core);
        }
    }
    println!();
}

fn raw(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Plain-text per-core table for one snapshot.
pub fn print_snapshot(snapshot: &Snapshot, units: Units) {
    let package = &snapshot.package;
    println!(
        "{}  {}",
        format_time(&snapshot.timestamp).dimmed(),
        snapshot.identity.cpu.brand.bold()
    );
    println!(
        "  Package: {}  {}  {}  load {}",
        format_temperature(package.temperature_c, units.temperature),
        format_power(package.power_watts),
        format_voltage(package.voltage_volts),
        format_percentage(Some(package.total_utilization_percent))
    );
    println!(
        "  {:<6} {:>11} {:>11} {:>11} {:>8} {:>10} {:>8}",
        "Core".bold(),
        "Frequency",
        "Min",
        "Max",
        "Mult",
        "Temp",
        "Load"
    );
    for core in snapshot.cores() {
        let load = format_percentage(core.utilization_percent);
        let load = match core.utilization_percent {
            Some(p) if p >= 85.0 => load.red(),
            Some(p) if p >= 70.0 => load.yellow(),
            _ => load.normal(),
        };
        println!(
            "  {:<6} {:>11} {:>11} {:>11} {:>8} {:>10} {:>8}",
            core.core_id,
            format_frequency(core.frequency_mhz, units.frequency),
            format_frequency(core.min_frequency(), units.frequency),
            format_frequency(core.max_frequency(), units.frequency),
            format_multiplier(core.multiplier),
            format_temperature(core.temperature_c, units.temperature),
            load
        );
    }
}
