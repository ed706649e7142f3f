use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Kind of quantity a sensor reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    Temperature,
    Voltage,
    Power,
    Clock,
    Load,
    Fan,
    Flow,
    Control,
    Level,
    Factor,
    Data,
    SmallData,
    Throughput,
    TimeSpan,
    Energy,
    #[default]
    Unknown,
}

impl std::fmt::Display for SensorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SensorKind::Temperature => "Temperature",
            SensorKind::Voltage => "Voltage",
            SensorKind::Power => "Power",
            SensorKind::Clock => "Clock",
            SensorKind::Load => "Load",
            SensorKind::Fan => "Fan",
            SensorKind::Flow => "Flow",
            SensorKind::Control => "Control",
            SensorKind::Level => "Level",
            SensorKind::Factor => "Factor",
            SensorKind::Data => "Data",
            SensorKind::SmallData => "SmallData",
            SensorKind::Throughput => "Throughput",
            SensorKind::TimeSpan => "TimeSpan",
            SensorKind::Energy => "Energy",
            SensorKind::Unknown => "Unknown",
        };
        write!(f, "{}", name)
    }
}

/// Hardware unit a sensor belongs to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HardwareKind {
    Cpu,
    Motherboard,
    Memory,
    #[default]
    Other,
}

/// One provider-reported sensor fact. Produced fresh on every poll.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorSample {
    pub name: String,
    #[serde(default)]
    pub identifier: String,
    pub kind: SensorKind,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub hardware: String,
    #[serde(default)]
    pub hardware_kind: HardwareKind,
}

impl SensorSample {
    /// A CPU sensor with only a name, kind and current value.
    pub fn cpu(name: impl Into<String>, kind: SensorKind, value: Option<f64>) -> Self {
        Self {
            name: name.into(),
            kind,
            value,
            hardware_kind: HardwareKind::Cpu,
            ..Default::default()
        }
    }

    pub fn is_cpu(&self) -> bool {
        self.hardware_kind == HardwareKind::Cpu
    }

    /// Current value when it is a physically plausible reading: present, finite and > 0.
    pub fn positive_value(&self) -> Option<f64> {
        positive(self.value)
    }
}

/// Keeps a reading only if it is finite and strictly positive.
pub fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

/// Running minimum/maximum of a reading across the snapshot lineage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Extremes {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Extremes {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Widen with the current reading. Absent readings leave the range untouched.
    pub fn widened(self, current: Option<f64>) -> Self {
        let Some(value) = current else {
            return self;
        };
        Self {
            min: Some(self.min.map_or(value, |m| m.min(value))),
            max: Some(self.max.map_or(value, |m| m.max(value))),
        }
    }

    pub fn is_unset(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Per logical core metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreMetric {
    pub core_id: usize,
    pub frequency_mhz: Option<f64>,
    /// Current frequency divided by the bus clock
    pub multiplier: Option<f64>,
    pub temperature_c: Option<f64>,
    /// 0..=100
    pub utilization_percent: Option<f64>,
    pub power_watts: Option<f64>,
    pub voltage_volts: Option<f64>,
    pub frequency_range: Extremes,
    pub temperature_range: Extremes,
    pub is_active: bool,
}

impl CoreMetric {
    pub fn min_frequency(&self) -> Option<f64> {
        self.frequency_range.min
    }

    pub fn max_frequency(&self) -> Option<f64> {
        self.frequency_range.max
    }

    pub fn min_temperature(&self) -> Option<f64> {
        self.temperature_range.min
    }

    pub fn max_temperature(&self) -> Option<f64> {
        self.temperature_range.max
    }
}

/// Package level aggregate. Total utilization comes from a different provider than
/// the per-core values and is never derived from them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageMetric {
    pub package_id: usize,
    pub temperature_c: Option<f64>,
    pub temperature_range: Extremes,
    pub power_watts: Option<f64>,
    pub voltage_volts: Option<f64>,
    pub total_utilization_percent: f64,
    pub cores: Vec<CoreMetric>,
}

impl PackageMetric {
    pub fn core(&self, core_id: usize) -> Option<&CoreMetric> {
        self.cores.iter().find(|c| c.core_id == core_id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheKind {
    Data,
    Instruction,
    #[default]
    Unified,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheLevel {
    pub level: u8,
    #[serde(default)]
    pub kind: CacheKind,
    pub size_bytes: u64,
    #[serde(default)]
    pub associativity: Option<u32>,
    #[serde(default)]
    pub line_size_bytes: Option<u32>,
}

/// Topology record of one logical core
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreTopology {
    pub logical_id: usize,
    pub physical_core_id: usize,
    pub package_id: usize,
    pub numa_node_id: usize,
    /// True for the second and later threads of a physical core
    pub is_smt_sibling: bool,
}

/// Whether thread-to-core affinity was read from the platform or estimated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AffinitySource {
    Reported,
    #[default]
    Estimated,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologySnapshot {
    pub physical_cores: usize,
    pub logical_cores: usize,
    pub packages: usize,
    pub numa_nodes: usize,
    pub has_smt: bool,
    pub affinity_source: AffinitySource,
    pub cores: Vec<CoreTopology>,
    pub caches: Vec<CacheLevel>,
}

impl TopologySnapshot {
    /// Estimated layout: all physical cores first, then their SMT siblings in the same order.
    pub fn estimated(physical_cores: usize, logical_cores: usize) -> Self {
        let physical = physical_cores.max(1);
        let logical = logical_cores.max(physical);
        let cores = (0..logical)
            .map(|i| CoreTopology {
                logical_id: i,
                physical_core_id: i % physical,
                package_id: 0,
                numa_node_id: 0,
                is_smt_sibling: i >= physical,
            })
            .collect();

        Self {
            physical_cores: physical,
            logical_cores: logical,
            packages: 1,
            numa_nodes: 1,
            has_smt: logical > physical,
            affinity_source: AffinitySource::Estimated,
            cores,
            caches: Vec::new(),
        }
    }

    pub fn physical_core_of(&self, logical_id: usize) -> Option<usize> {
        self.cores
            .iter()
            .find(|c| c.logical_id == logical_id)
            .map(|c| c.physical_core_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuIdentity {
    pub vendor: String,
    pub brand: String,
    pub family: Option<u32>,
    pub model: Option<u32>,
    pub stepping: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardIdentity {
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub version: Option<String>,
    pub bios_vendor: Option<String>,
    pub bios_version: Option<String>,
    pub bios_date: Option<String>,
}

/// Machine identification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemIdentity {
    pub cpu: CpuIdentity,
    pub board: BoardIdentity,
    pub architecture: String,
    pub physical_cores: usize,
    pub logical_cores: usize,
    pub total_memory_bytes: u64,
    pub os_name: String,
    pub os_version: String,
}

/// Cycle-local frequency figures
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrequencySummary {
    pub base_clock_mhz: f64,
    pub min_mhz: Option<f64>,
    pub max_mhz: Option<f64>,
}

/// One fully reconciled point-in-time reading. Immutable once published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub timestamp: DateTime<Local>,
    pub identity: SystemIdentity,
    pub package: PackageMetric,
    pub frequency: FrequencySummary,
    pub topology: TopologySnapshot,
    pub sensors: Vec<SensorSample>,
}

impl Snapshot {
    /// Placeholder published before the first collection cycle.
    pub fn empty() -> Self {
        Self {
            timestamp: Local::now(),
            identity: SystemIdentity::default(),
            package: PackageMetric::default(),
            frequency: FrequencySummary::default(),
            topology: TopologySnapshot::default(),
            sensors: Vec::new(),
        }
    }

    pub fn cores(&self) -> &[CoreMetric] {
        &self.package.cores
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extremes_seed_from_first_reading() {
        let range = Extremes::default().widened(Some(3200.0));
        assert_eq!(range, Extremes::new(3200.0, 3200.0));
    }

    #[test]
    fn test_extremes_never_narrow() {
        let range = Extremes::new(3000.0, 4000.0)
            .widened(Some(3500.0))
            .widened(None)
            .widened(Some(2800.0));
        assert_eq!(range, Extremes::new(2800.0, 4000.0));
    }

    #[test]
    fn test_positive_filters_noise() {
        assert_eq!(positive(Some(0.0)), None);
        assert_eq!(positive(Some(-4.0)), None);
        assert_eq!(positive(Some(f64::NAN)), None);
        assert_eq!(positive(Some(f64::INFINITY)), None);
        assert_eq!(positive(Some(1.5)), Some(1.5));
        assert_eq!(positive(None), None);
    }

    #[test]
    fn test_estimated_topology_marks_siblings() {
        let topology = TopologySnapshot::estimated(2, 4);
        assert!(topology.has_smt);
        assert_eq!(topology.physical_core_of(3), Some(1));
        assert!(topology.cores[2].is_smt_sibling);
        assert!(!topology.cores[1].is_smt_sibling);
    }
}
