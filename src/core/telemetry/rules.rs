//! Label matching rules used to pick package-level sensors.
//!
//! Each semantic role owns a list of rules. Sensors are tried in provider order and
//! the first one matched by any rule of the role wins. Vendors with unusual sensor
//! names are handled by extending the lists in the settings file.

use serde::{Deserialize, Serialize};

use super::model::{SensorKind, SensorSample};

/// A single case-insensitive label rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorRule {
    /// Label must contain at least one of these
    pub contains_any: Vec<String>,
    /// Label must contain none of these
    #[serde(default)]
    pub excludes: Vec<String>,
}

impl SensorRule {
    pub fn contains(needles: &[&str]) -> Self {
        Self {
            contains_any: needles.iter().map(|s| s.to_string()).collect(),
            excludes: Vec::new(),
        }
    }

    pub fn excluding(mut self, needles: &[&str]) -> Self {
        self.excludes = needles.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn matches(&self, label: &str) -> bool {
        let label = label.to_lowercase();
        let hit = self
            .contains_any
            .iter()
            .any(|needle| label.contains(&needle.to_lowercase()));
        hit && !self
            .excludes
            .iter()
            .any(|needle| label.contains(&needle.to_lowercase()))
    }
}

/// Semantic roles resolved from the sensor list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorRole {
    PackageTemperature,
    PackagePower,
    CoreVoltage,
}

impl SensorRole {
    pub fn kind(self) -> SensorKind {
        match self {
            SensorRole::PackageTemperature => SensorKind::Temperature,
            SensorRole::PackagePower => SensorKind::Power,
            SensorRole::CoreVoltage => SensorKind::Voltage,
        }
    }
}

/// Ordered rule lists per role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorRules {
    pub package_temperature: Vec<SensorRule>,
    pub package_power: Vec<SensorRule>,
    pub core_voltage: Vec<SensorRule>,
    /// Labels that describe a die or package sensor even when they carry digits
    /// (`CCD1 (Tdie)`, `Package id 0`), so they never become per-core readings.
    #[serde(default = "default_die_level")]
    pub die_level: Vec<SensorRule>,
}

fn default_die_level() -> Vec<SensorRule> {
    vec![SensorRule::contains(&[
        "package", "tctl", "tdie", "ccd", "svi2", "soc", "uncore",
    ])]
}

impl Default for SensorRules {
    fn default() -> Self {
        Self {
            package_temperature: vec![
                SensorRule::contains(&["package"]),
                SensorRule::contains(&["tctl"]),
                SensorRule::contains(&["tdie"]),
                SensorRule::contains(&["cpu"]).excluding(&["core"]),
            ],
            package_power: vec![
                SensorRule::contains(&["package"]),
                SensorRule::contains(&["cpu"]),
            ],
            core_voltage: vec![
                SensorRule::contains(&["vcore"]),
                SensorRule::contains(&["core (svi2"]),
                SensorRule::contains(&["cpu core"]),
            ],
            die_level: default_die_level(),
        }
    }
}

impl SensorRules {
    pub fn rules_for(&self, role: SensorRole) -> &[SensorRule] {
        match role {
            SensorRole::PackageTemperature => &self.package_temperature,
            SensorRole::PackagePower => &self.package_power,
            SensorRole::CoreVoltage => &self.core_voltage,
        }
    }

    /// First sensor, in provider order, of the role's kind matched by any of its rules.
    ///
    /// Only sensors carrying a usable reading are candidates, so a dead
    /// "Package" sensor does not shadow a working "Tctl" one.
    pub fn select<'a>(&self, role: SensorRole, sensors: &'a [SensorSample]) -> Option<&'a SensorSample> {
        let kind = role.kind();
        let rules = self.rules_for(role);
        sensors
            .iter()
            .filter(|s| s.kind == kind && s.positive_value().is_some())
            .find(|s| rules.iter().any(|rule| rule.matches(&s.name)))
    }

    /// True when the label names a die-level sensor.
    pub fn is_die_level(&self, sensor: &SensorSample) -> bool {
        self.die_level.iter().any(|r| r.matches(&sensor.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp(name: &str, value: f64) -> SensorSample {
        SensorSample::cpu(name, SensorKind::Temperature, Some(value))
    }

    #[test]
    fn test_rule_is_case_insensitive() {
        let rule = SensorRule::contains(&["tctl"]);
        assert!(rule.matches("Core (Tctl/Tdie)"));
        assert!(!rule.matches("Core #1"));
    }

    #[test]
    fn test_cpu_without_core() {
        let rules = SensorRules::default();
        let sensors = vec![temp("CPU Core #1", 50.0), temp("CPU", 61.0)];
        let selected = rules.select(SensorRole::PackageTemperature, &sensors);
        assert_eq!(selected.map(|s| s.name.as_str()), Some("CPU"));
    }

    #[test]
    fn test_first_matching_sensor_wins() {
        let rules = SensorRules::default();
        let sensors = vec![temp("Tdie", 55.0), temp("CPU Package", 60.0)];
        let selected = rules.select(SensorRole::PackageTemperature, &sensors);
        assert_eq!(selected.and_then(|s| s.value), Some(55.0));
    }

    #[test]
    fn test_dead_sensor_is_skipped() {
        let rules = SensorRules::default();
        let sensors = vec![temp("CPU Package", 0.0), temp("Core (Tctl/Tdie)", 64.0)];
        let selected = rules.select(SensorRole::PackageTemperature, &sensors);
        assert_eq!(selected.and_then(|s| s.value), Some(64.0));
    }

    #[test]
    fn test_kind_must_match() {
        let rules = SensorRules::default();
        let sensors = vec![SensorSample::cpu("CPU Package", SensorKind::Power, Some(45.0))];
        assert!(rules.select(SensorRole::PackageTemperature, &sensors).is_none());
        assert!(rules.select(SensorRole::PackagePower, &sensors).is_some());
    }

    #[test]
    fn test_extended_rule_set() {
        let sensors = vec![temp("Die Average", 58.0), temp("CPU Package", 60.0)];
        let mut rules = SensorRules::default();
        let selected = rules.select(SensorRole::PackageTemperature, &sensors);
        assert_eq!(selected.map(|s| s.name.as_str()), Some("CPU Package"));

        rules
            .package_temperature
            .push(SensorRule::contains(&["die average"]));
        let selected = rules.select(SensorRole::PackageTemperature, &sensors);
        assert_eq!(selected.map(|s| s.name.as_str()), Some("Die Average"));
    }

    #[test]
    fn test_die_level_labels() {
        let rules = SensorRules::default();
        let svi2 = SensorSample::cpu("Core (SVI2 TFN)", SensorKind::Voltage, Some(1.2));
        let ccd = temp("CCD1 (Tdie)", 58.0);
        let coretemp = temp("coretemp Package id 0", 52.0);
        let vid = SensorSample::cpu("CPU Core #2", SensorKind::Voltage, Some(1.1));
        assert!(rules.is_die_level(&svi2));
        assert!(rules.is_die_level(&ccd));
        assert!(rules.is_die_level(&coretemp));
        assert!(!rules.is_die_level(&vid));
    }
}
