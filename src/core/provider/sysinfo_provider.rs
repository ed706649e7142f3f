//! Live provider built on sysinfo, with Linux sysfs for what sysinfo lacks.

use sysinfo::{Components, CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};

use super::SensorProvider;
use crate::core::telemetry::{
    AffinitySource, CacheKind, CacheLevel, CpuIdentity, HardwareKind, SensorKind, SensorSample,
    SystemIdentity, TopologySnapshot, UtilizationReading,
};
use crate::error::{CoreFreqError, Result};
use crate::platform::privileges::privilege_hint;
use crate::platform::sysfs::{read_board, read_topology, RaplCounter, SysfsPaths};

/// Component label fragments that belong to the processor
const CPU_COMPONENT_HINTS: [&str; 7] = [
    "coretemp", "k10temp", "zenpower", "cpu", "package", "tctl", "tdie",
];

/// Polls CPU load, clocks, component temperatures and RAPL package power.
pub struct SysinfoProvider {
    system: System,
    components: Components,
    rapl: Option<RaplCounter>,
    identity: SystemIdentity,
    topology: TopologySnapshot,
    sensors: Vec<SensorSample>,
    utilization: UtilizationReading,
}

impl SysinfoProvider {
    /// Open the live provider. Fails when the OS exposes no CPU at all.
    pub fn new() -> Result<Self> {
        Self::with_paths(SysfsPaths::default())
    }

    pub fn with_paths(paths: SysfsPaths) -> Result<Self> {
        let refresh_kind = RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::everything())
            .with_memory(MemoryRefreshKind::everything());
        let mut system = System::new_with_specifics(refresh_kind);
        system.refresh_cpu_all();

        if system.cpus().is_empty() {
            return Err(CoreFreqError::provider_unavailable(format!(
                "no CPU is visible to the sensor provider. {}",
                privilege_hint()
            )));
        }

        let logical = system.cpus().len();
        let topology = read_topology(&paths).unwrap_or_else(|| {
            let physical = System::physical_core_count().unwrap_or(logical);
            log::debug!(
                "CPU topology not reported, estimating {} physical / {} logical cores",
                physical,
                logical
            );
            let mut estimated = TopologySnapshot::estimated(physical, logical);
            estimated.caches = estimated_caches(estimated.physical_cores);
            estimated
        });

        let rapl = RaplCounter::open(&paths.rapl_root);
        if rapl.is_none() {
            log::debug!("RAPL energy counter not readable, package power unavailable");
        }

        let identity = build_identity(&system, &topology, &paths);

        Ok(Self {
            system,
            components: Components::new_with_refreshed_list(),
            rapl,
            identity,
            topology,
            sensors: Vec::new(),
            utilization: UtilizationReading::default(),
        })
    }

    fn collect_sensors(&mut self) -> Vec<SensorSample> {
        let brand = self.identity.cpu.brand.clone();
        let cpu_sensor = |name: String, identifier: String, kind: SensorKind, value: Option<f64>| SensorSample {
            identifier,
            hardware: brand.clone(),
            ..SensorSample::cpu(name, kind, value)
        };
        let cpus = self.system.cpus();
        let mut sensors = Vec::with_capacity(cpus.len() * 2 + 8);

        sensors.push(cpu_sensor(
            "CPU Total".to_string(),
            "/cpu/0/load/0".to_string(),
            SensorKind::Load,
            Some(self.system.global_cpu_usage() as f64),
        ));
        for (i, cpu) in cpus.iter().enumerate() {
            sensors.push(cpu_sensor(
                format!("CPU Core #{}", i),
                format!("/cpu/0/load/{}", i + 1),
                SensorKind::Load,
                Some(cpu.cpu_usage() as f64),
            ));
        }

        // One clock per physical core when affinity is known, one per thread otherwise.
        if self.topology.affinity_source == AffinitySource::Reported {
            for core in self.topology.cores.iter().filter(|c| !c.is_smt_sibling) {
                let mhz = cpus.get(core.logical_id).map(|c| c.frequency() as f64);
                sensors.push(cpu_sensor(
                    format!("Core #{}", core.physical_core_id),
                    format!("/cpu/0/clock/{}", core.physical_core_id + 1),
                    SensorKind::Clock,
                    mhz,
                ));
            }
        } else {
            for (i, cpu) in cpus.iter().enumerate() {
                sensors.push(cpu_sensor(
                    format!("Core #{}", i),
                    format!("/cpu/0/clock/{}", i + 1),
                    SensorKind::Clock,
                    Some(cpu.frequency() as f64),
                ));
            }
        }

        for (i, component) in self.components.iter().enumerate() {
            let label = component.label().to_string();
            let hardware_kind = classify_component(&label);
            sensors.push(SensorSample {
                identifier: format!("/component/{}/temperature", i),
                kind: SensorKind::Temperature,
                value: component.temperature().map(f64::from),
                min: None,
                max: component.max().map(f64::from),
                hardware: if hardware_kind == HardwareKind::Cpu {
                    brand.clone()
                } else {
                    label.split_whitespace().next().unwrap_or_default().to_string()
                },
                hardware_kind,
                name: label,
            });
        }

        if let Some(rapl) = self.rapl.as_mut() {
            sensors.push(cpu_sensor(
                "CPU Package".to_string(),
                "/cpu/0/power/0".to_string(),
                SensorKind::Power,
                rapl.sample(),
            ));
        }

        sensors
    }
}

/// Which hardware a sysinfo component label belongs to.
pub fn classify_component(label: &str) -> HardwareKind {
    let lower = label.to_lowercase();
    if CPU_COMPONENT_HINTS.iter().any(|h| lower.contains(h)) {
        HardwareKind::Cpu
    } else if lower.contains("acpitz") || lower.contains("pch") {
        HardwareKind::Motherboard
    } else if lower.contains("dimm") || lower.contains("spd") {
        HardwareKind::Memory
    } else {
        HardwareKind::Other
    }
}

/// Typical per-core cache sizes used when the platform does not report them.
fn estimated_caches(physical_cores: usize) -> Vec<CacheLevel> {
    let cores = physical_cores as u64;
    vec![
        CacheLevel {
            level: 1,
            kind: CacheKind::Data,
            size_bytes: 32 * 1024 * cores,
            ..Default::default()
        },
        CacheLevel {
            level: 2,
            kind: CacheKind::Unified,
            size_bytes: 256 * 1024 * cores,
            ..Default::default()
        },
        CacheLevel {
            level: 3,
            kind: CacheKind::Unified,
            size_bytes: 8 * 1024 * 1024,
            ..Default::default()
        },
    ]
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn cpu_signature() -> (Option<u32>, Option<u32>, Option<u32>) {
    let cpuid = raw_cpuid::CpuId::new();
    match cpuid.get_feature_info() {
        Some(info) => (
            Some(info.family_id() as u32),
            Some(info.model_id() as u32),
            Some(info.stepping_id() as u32),
        ),
        None => (None, None, None),
    }
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
fn cpu_signature() -> (Option<u32>, Option<u32>, Option<u32>) {
    (None, None, None)
}

fn build_identity(system: &System, topology: &TopologySnapshot, paths: &SysfsPaths) -> SystemIdentity {
    let (family, model, stepping) = cpu_signature();
    let first = system.cpus().first();

    SystemIdentity {
        cpu: CpuIdentity {
            vendor: first.map(|c| c.vendor_id().to_string()).unwrap_or_default(),
            brand: first
                .map(|c| c.brand().trim().to_string())
                .unwrap_or_default(),
            family,
            model,
            stepping,
        },
        board: read_board(&paths.dmi_root),
        architecture: std::env::consts::ARCH.to_string(),
        physical_cores: topology.physical_cores,
        logical_cores: system.cpus().len(),
        total_memory_bytes: system.total_memory(),
        os_name: System::name().unwrap_or_else(|| "Unknown".to_string()),
        os_version: System::os_version().unwrap_or_else(|| "Unknown".to_string()),
    }
}

impl SensorProvider for SysinfoProvider {
    fn name(&self) -> &str {
        "sysinfo"
    }

    fn refresh(&mut self) -> Result<()> {
        self.system.refresh_cpu_all();
        self.components.refresh(true);

        self.utilization = UtilizationReading {
            per_core: self
                .system
                .cpus()
                .iter()
                .enumerate()
                .map(|(i, cpu)| (i, cpu.cpu_usage() as f64))
                .collect(),
            total: Some(self.system.global_cpu_usage() as f64),
        };
        self.sensors = self.collect_sensors();
        Ok(())
    }

    fn cpu_present(&self) -> bool {
        !self.system.cpus().is_empty()
    }

    fn sensors(&self) -> Vec<SensorSample> {
        self.sensors.clone()
    }

    fn identity(&self) -> SystemIdentity {
        self.identity.clone()
    }

    fn topology(&self) -> TopologySnapshot {
        self.topology.clone()
    }

    fn utilization(&self) -> UtilizationReading {
        self.utilization.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_component() {
        assert_eq!(classify_component("coretemp Package id 0"), HardwareKind::Cpu);
        assert_eq!(classify_component("k10temp Tctl"), HardwareKind::Cpu);
        assert_eq!(classify_component("acpitz temp1"), HardwareKind::Motherboard);
        assert_eq!(classify_component("nvme Composite"), HardwareKind::Other);
    }

    #[test]
    fn test_estimated_caches_scale_with_cores() {
        let caches = estimated_caches(8);
        assert_eq!(caches[0].size_bytes, 256 * 1024);
        assert_eq!(caches[1].size_bytes, 2 * 1024 * 1024);
        assert_eq!(caches[2].size_bytes, 8 * 1024 * 1024);
    }
}
