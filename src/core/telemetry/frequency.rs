//! Per logical core clock mapping.
//!
//! Many platforms expose one clock sensor per physical core while the OS schedules
//! twice as many threads. SMT siblings inherit the clock of their physical core.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::model::{AffinitySource, FrequencySummary, SensorKind, SensorSample, TopologySnapshot};
use super::resolver::resolve_core_id;

/// Reference bus clock used for multipliers
pub const BUS_CLOCK_MHZ: f64 = 100.0;

/// How logical cores are paired with physical clock readings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadMapping {
    /// Physical cores first, then siblings in the same order
    #[default]
    Contiguous,
    /// Use thread affinity reported by the provider, contiguous otherwise
    Topology,
}

/// Clock readings keyed by physical core id.
///
/// Only CPU clock sensors with a resolvable core id and a positive finite value
/// count. When two sensors resolve to the same id the first one is kept.
pub fn physical_core_frequencies(sensors: &[SensorSample]) -> BTreeMap<usize, f64> {
    let mut physical = BTreeMap::new();
    for sensor in sensors
        .iter()
        .filter(|s| s.is_cpu() && s.kind == SensorKind::Clock)
    {
        if let (Some(id), Some(mhz)) = (resolve_core_id(&sensor.name), sensor.positive_value()) {
            physical.entry(id).or_insert(mhz);
        }
    }
    physical
}

/// Number of logical cores, counted from CPU load sensors that mention a core.
pub fn logical_core_count(sensors: &[SensorSample]) -> usize {
    sensors
        .iter()
        .filter(|s| s.is_cpu() && s.kind == SensorKind::Load)
        .filter(|s| s.name.to_lowercase().contains("core"))
        .count()
}

/// Contiguous SMT mapping: logical `i` reads physical `i` when `i < P`, else `i - P`.
pub fn map_logical_frequencies(
    physical: &BTreeMap<usize, f64>,
    logical_count: usize,
) -> BTreeMap<usize, f64> {
    let physical_count = physical.len();
    (0..logical_count)
        .filter_map(|logical| {
            let physical_id = if logical < physical_count {
                logical
            } else {
                logical - physical_count
            };
            physical.get(&physical_id).map(|&freq| (logical, freq))
        })
        .collect()
}

/// Mapping driven by reported thread affinity.
///
/// Logical cores missing from the topology fall back to the contiguous rule.
pub fn map_with_topology(
    physical: &BTreeMap<usize, f64>,
    logical_count: usize,
    topology: &TopologySnapshot,
) -> BTreeMap<usize, f64> {
    let contiguous = map_logical_frequencies(physical, logical_count);
    (0..logical_count)
        .filter_map(|logical| {
            let freq = match topology.physical_core_of(logical) {
                Some(physical_id) => physical.get(&physical_id).copied(),
                None => contiguous.get(&logical).copied(),
            };
            freq.map(|f| (logical, f))
        })
        .collect()
}

/// Maps physical clock sensors onto every logical core.
#[derive(Debug, Clone, Default)]
pub struct CoreFrequencyMapper {
    mapping: ThreadMapping,
}

impl CoreFrequencyMapper {
    pub fn new(mapping: ThreadMapping) -> Self {
        Self { mapping }
    }

    pub fn mapping(&self) -> ThreadMapping {
        self.mapping
    }

    /// Frequency per logical core for this cycle. Absent data yields absent entries.
    pub fn map(
        &self,
        sensors: &[SensorSample],
        topology: Option<&TopologySnapshot>,
    ) -> BTreeMap<usize, f64> {
        let physical = physical_core_frequencies(sensors);
        let logical_count = logical_core_count(sensors);

        match (self.mapping, topology) {
            (ThreadMapping::Topology, Some(topo))
                if topo.affinity_source == AffinitySource::Reported =>
            {
                map_with_topology(&physical, logical_count, topo)
            }
            (ThreadMapping::Topology, _) => {
                log::debug!("Thread affinity not reported, using contiguous SMT mapping");
                map_logical_frequencies(&physical, logical_count)
            }
            (ThreadMapping::Contiguous, _) => map_logical_frequencies(&physical, logical_count),
        }
    }
}

/// Multiplier against the reference bus clock
pub fn multiplier(frequency_mhz: f64) -> f64 {
    frequency_mhz / BUS_CLOCK_MHZ
}

/// Cycle-local min/max across mapped frequencies
pub fn summarize(frequencies: &BTreeMap<usize, f64>) -> FrequencySummary {
    let min_mhz = frequencies.values().copied().reduce(f64::min);
    let max_mhz = frequencies.values().copied().reduce(f64::max);
    FrequencySummary {
        base_clock_mhz: BUS_CLOCK_MHZ,
        min_mhz,
        max_mhz,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::telemetry::model::CoreTopology;

    fn clock(name: &str, mhz: f64) -> SensorSample {
        SensorSample::cpu(name, SensorKind::Clock, Some(mhz))
    }

    fn load(name: &str, pct: f64) -> SensorSample {
        SensorSample::cpu(name, SensorKind::Load, Some(pct))
    }

    fn smt_sensors() -> Vec<SensorSample> {
        vec![
            clock("Core #0", 3200.0),
            clock("Core #1", 3400.0),
            clock("Bus Speed", 100.0),
            load("CPU Total", 20.0),
            load("CPU Core #0", 10.0),
            load("CPU Core #1", 20.0),
            load("CPU Core #2", 30.0),
            load("CPU Core #3", 40.0),
        ]
    }

    #[test]
    fn test_smt_sibling_inherits_physical_clock() {
        let physical = BTreeMap::from([(0, 3200.0), (1, 3400.0)]);
        let mapped = map_logical_frequencies(&physical, 4);
        assert_eq!(
            mapped,
            BTreeMap::from([(0, 3200.0), (1, 3400.0), (2, 3200.0), (3, 3400.0)])
        );
    }

    #[test]
    fn test_missing_physical_reading_leaves_gap() {
        let physical = BTreeMap::from([(0, 3200.0), (2, 3600.0)]);
        let mapped = map_logical_frequencies(&physical, 4);
        // P = 2, so logical 1 reads physical 1 (absent) and logical 3 reads physical 1 too.
        assert_eq!(mapped.get(&0), Some(&3200.0));
        assert_eq!(mapped.get(&1), None);
        assert_eq!(mapped.get(&2), Some(&3200.0));
        assert_eq!(mapped.get(&3), None);
    }

    #[test]
    fn test_no_logical_cores_maps_nothing() {
        let physical = BTreeMap::from([(0, 3200.0)]);
        assert!(map_logical_frequencies(&physical, 0).is_empty());
    }

    #[test]
    fn test_sensor_filtering() {
        let mut sensors = smt_sensors();
        sensors.push(clock("Core #5", 0.0));
        sensors.push(clock("Core #6", f64::NAN));
        sensors.push(SensorSample::cpu("Core #7", SensorKind::Clock, None));
        let physical = physical_core_frequencies(&sensors);
        assert_eq!(physical, BTreeMap::from([(0, 3200.0), (1, 3400.0)]));
        assert_eq!(logical_core_count(&sensors), 4);
    }

    #[test]
    fn test_mapper_end_to_end() {
        let mapper = CoreFrequencyMapper::default();
        let mapped = mapper.map(&smt_sensors(), None);
        assert_eq!(mapped.len(), 4);
        assert_eq!(mapped[&3], 3400.0);
    }

    #[test]
    fn test_topology_mapping_uses_reported_affinity() {
        // Interleaved enumeration: threads 0/1 share core 0, threads 2/3 share core 1.
        let topology = TopologySnapshot {
            physical_cores: 2,
            logical_cores: 4,
            affinity_source: AffinitySource::Reported,
            cores: (0..4)
                .map(|i| CoreTopology {
                    logical_id: i,
                    physical_core_id: i / 2,
                    is_smt_sibling: i % 2 == 1,
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };
        let mapper = CoreFrequencyMapper::new(ThreadMapping::Topology);
        let mapped = mapper.map(&smt_sensors(), Some(&topology));
        assert_eq!(
            mapped,
            BTreeMap::from([(0, 3200.0), (1, 3200.0), (2, 3400.0), (3, 3400.0)])
        );
    }

    #[test]
    fn test_topology_mapping_ignores_estimated_affinity() {
        let topology = TopologySnapshot::estimated(4, 4);
        let mapper = CoreFrequencyMapper::new(ThreadMapping::Topology);
        let mapped = mapper.map(&smt_sensors(), Some(&topology));
        assert_eq!(mapped[&2], 3200.0);
    }

    #[test]
    fn test_summary() {
        let summary = summarize(&BTreeMap::from([(0, 3200.0), (1, 4100.0)]));
        assert_eq!(summary.min_mhz, Some(3200.0));
        assert_eq!(summary.max_mhz, Some(4100.0));
        assert_eq!(multiplier(3200.0), 32.0);
        assert_eq!(summarize(&BTreeMap::new()).min_mhz, None);
    }
}
