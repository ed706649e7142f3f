//! Reduces the raw sensor list to one canonical value per semantic field.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::model::{positive, SensorKind, SensorSample};
use super::resolver::resolve_core_id;
use super::rules::{SensorRole, SensorRules};

/// Utilization read from the OS scheduler, independent of the sensor list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UtilizationReading {
    /// Keyed by logical core index
    #[serde(default)]
    pub per_core: BTreeMap<usize, f64>,
    #[serde(default)]
    pub total: Option<f64>,
}

/// Clamp a utilization percentage into `[0, 100]`. NaN has no meaning and is dropped.
pub fn clamp_utilization(value: f64) -> Option<f64> {
    if value.is_nan() {
        None
    } else {
        Some(value.clamp(0.0, 100.0))
    }
}

/// Reconciled readings for one cycle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciled {
    pub package_temperature: Option<f64>,
    pub package_power: Option<f64>,
    pub package_voltage: Option<f64>,
    pub core_temperatures: BTreeMap<usize, f64>,
    pub core_power: BTreeMap<usize, f64>,
    pub core_voltage: BTreeMap<usize, f64>,
    pub core_utilization: BTreeMap<usize, f64>,
    /// 0 when the provider had nothing
    pub total_utilization: f64,
}

impl Reconciled {
    /// True when the hardware only exposes a die-level temperature this cycle.
    pub fn uses_package_fallback(&self) -> bool {
        self.core_temperatures.is_empty() && self.package_temperature.is_some()
    }

    /// Core temperature, or the package temperature when no per-core sensor exists.
    pub fn temperature_for(&self, core_id: usize) -> Option<f64> {
        if self.uses_package_fallback() {
            self.package_temperature
        } else {
            self.core_temperatures.get(&core_id).copied()
        }
    }
}

/// Applies the matching rules and validity filters to a sensor list.
#[derive(Debug, Clone, Default)]
pub struct SensorReconciler {
    rules: SensorRules,
}

impl SensorReconciler {
    pub fn new(rules: SensorRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &SensorRules {
        &self.rules
    }

    pub fn reconcile(
        &self,
        sensors: &[SensorSample],
        utilization: &UtilizationReading,
    ) -> Reconciled {
        let cpu_sensors: Vec<SensorSample> =
            sensors.iter().filter(|s| s.is_cpu()).cloned().collect();

        let package_value = |role: SensorRole| {
            self.rules
                .select(role, &cpu_sensors)
                .and_then(|s| s.positive_value())
        };

        Reconciled {
            package_temperature: package_value(SensorRole::PackageTemperature),
            package_power: package_value(SensorRole::PackagePower),
            package_voltage: package_value(SensorRole::CoreVoltage),
            core_temperatures: self.per_core(&cpu_sensors, SensorKind::Temperature),
            core_power: self.per_core(&cpu_sensors, SensorKind::Power),
            core_voltage: self.per_core(&cpu_sensors, SensorKind::Voltage),
            core_utilization: utilization
                .per_core
                .iter()
                .filter_map(|(&id, &v)| clamp_utilization(v).map(|v| (id, v)))
                .collect(),
            total_utilization: utilization
                .total
                .and_then(clamp_utilization)
                .unwrap_or(0.0),
        }
    }

    /// Per-core readings of one kind. Die-level sensors are skipped even when the
    /// label carries digits; the first valid sensor per core id wins.
    fn per_core(&self, sensors: &[SensorSample], kind: SensorKind) -> BTreeMap<usize, f64> {
        let mut readings = BTreeMap::new();
        for sensor in sensors
            .iter()
            .filter(|s| s.kind == kind && !self.rules.is_die_level(s))
        {
            let Some(core_id) = resolve_core_id(&sensor.name) else {
                continue;
            };
            if let Some(value) = positive(sensor.value) {
                readings.entry(core_id).or_insert(value);
            }
        }
        readings
    }
}
