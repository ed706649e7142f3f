//! Pure construction of snapshots from one cycle of readings.
//!
//! Running min/max statistics are carried over from the previous snapshot and only
//! ever widened. Nothing here performs I/O or fails.

use std::collections::BTreeMap;

use chrono::{DateTime, Local};

use super::frequency::{multiplier, summarize};
use super::model::{
    CoreMetric, Extremes, PackageMetric, SensorSample, Snapshot, SystemIdentity, TopologySnapshot,
};
use super::reconciler::Reconciled;

/// Everything collected during one cycle
#[derive(Debug, Clone)]
pub struct CycleInput {
    pub timestamp: DateTime<Local>,
    pub reconciled: Reconciled,
    /// Mapped frequency per logical core
    pub frequencies: BTreeMap<usize, f64>,
    pub identity: SystemIdentity,
    pub topology: TopologySnapshot,
    pub sensors: Vec<SensorSample>,
}

/// Number of cores in the snapshot: the largest per-core reading set, or the
/// physical core count when no per-core data arrived at all.
pub fn core_count(input: &CycleInput) -> usize {
    let observed = input
        .frequencies
        .len()
        .max(input.reconciled.core_temperatures.len())
        .max(input.reconciled.core_utilization.len());

    if observed == 0 {
        input.identity.physical_cores
    } else {
        observed
    }
}

/// Build the next snapshot in the lineage.
pub fn build_snapshot(previous: Option<&Snapshot>, input: CycleInput) -> Snapshot {
    let count = core_count(&input);
    let reconciled = &input.reconciled;

    let cores = (0..count)
        .map(|core_id| {
            let frequency = input.frequencies.get(&core_id).copied();
            let temperature = reconciled.temperature_for(core_id);
            let utilization = reconciled.core_utilization.get(&core_id).copied();
            let carried = previous.and_then(|p| p.package.core(core_id));

            CoreMetric {
                core_id,
                frequency_mhz: frequency,
                multiplier: frequency.map(multiplier),
                temperature_c: temperature,
                utilization_percent: utilization,
                power_watts: reconciled.core_power.get(&core_id).copied(),
                voltage_volts: reconciled.core_voltage.get(&core_id).copied(),
                frequency_range: carried
                    .map(|c| c.frequency_range)
                    .unwrap_or_default()
                    .widened(frequency),
                temperature_range: carried
                    .map(|c| c.temperature_range)
                    .unwrap_or_default()
                    .widened(temperature),
                is_active: frequency.is_some() || utilization.is_some() || temperature.is_some(),
            }
        })
        .collect();

    let package_range = previous
        .map(|p| p.package.temperature_range)
        .unwrap_or_default()
        .widened(reconciled.package_temperature);

    Snapshot {
        timestamp: input.timestamp,
        frequency: summarize(&input.frequencies),
        package: PackageMetric {
            package_id: 0,
            temperature_c: reconciled.package_temperature,
            temperature_range: package_range,
            power_watts: reconciled.package_power,
            voltage_volts: reconciled.package_voltage,
            total_utilization_percent: reconciled.total_utilization,
            cores,
        },
        identity: input.identity,
        topology: input.topology,
        sensors: input.sensors,
    }
}

/// Copy of `current` with every core and package min/max unset.
pub fn cleared_snapshot(current: &Snapshot) -> Snapshot {
    let mut next = current.clone();
    for core in &mut next.package.cores {
        core.frequency_range = Extremes::default();
        core.temperature_range = Extremes::default();
    }
    next.package.temperature_range = Extremes::default();
    next
}
