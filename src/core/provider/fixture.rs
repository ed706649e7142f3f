use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::SensorProvider;
use crate::core::telemetry::{SensorSample, SystemIdentity, TopologySnapshot, UtilizationReading};
use crate::error::{CoreFreqError, Result};

fn default_cpu_present() -> bool {
    true
}

/// One recorded poll
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixtureFrame {
    #[serde(default)]
    pub sensors: Vec<SensorSample>,
    #[serde(default)]
    pub identity: SystemIdentity,
    #[serde(default)]
    pub topology: TopologySnapshot,
    #[serde(default)]
    pub utilization: UtilizationReading,
    #[serde(default = "default_cpu_present")]
    pub cpu_present: bool,
    /// Makes `refresh` fail for this frame, as a flaky driver would
    #[serde(default)]
    pub fail: bool,
}

impl FixtureFrame {
    /// Record what a provider saw on its last refresh.
    pub fn capture(provider: &dyn SensorProvider) -> Self {
        Self {
            sensors: provider.sensors(),
            identity: provider.identity(),
            topology: provider.topology(),
            utilization: provider.utilization(),
            cpu_present: provider.cpu_present(),
            fail: false,
        }
    }
}

/// Replays recorded frames in order, wrapping around at the end.
#[derive(Debug, Clone)]
pub struct FixtureProvider {
    frames: Vec<FixtureFrame>,
    next: usize,
    current: usize,
}

impl FixtureProvider {
    pub fn new(frames: Vec<FixtureFrame>) -> Result<Self> {
        if frames.is_empty() {
            return Err(CoreFreqError::fixture("fixture contains no frames"));
        }
        Ok(Self {
            frames,
            next: 0,
            current: 0,
        })
    }

    /// Load a JSON array of frames.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CoreFreqError::fixture(format!("cannot read {}: {}", path.display(), e))
        })?;
        let frames: Vec<FixtureFrame> = serde_json::from_str(&content).map_err(|e| {
            CoreFreqError::fixture(format!("invalid fixture {}: {}", path.display(), e))
        })?;
        Self::new(frames)
    }

    /// Write frames in the format `load` reads.
    pub fn save(path: &Path, frames: &[FixtureFrame]) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(frames)?)?;
        Ok(())
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn frame(&self) -> &FixtureFrame {
        &self.frames[self.current]
    }
}

impl SensorProvider for FixtureProvider {
    fn name(&self) -> &str {
        "fixture"
    }

    fn refresh(&mut self) -> Result<()> {
        self.current = self.next;
        self.next = (self.next + 1) % self.frames.len();
        if self.frame().fail {
            return Err(CoreFreqError::fixture(format!(
                "frame {} simulates a refresh failure",
                self.current
            )));
        }
        Ok(())
    }

    fn cpu_present(&self) -> bool {
        self.frame().cpu_present
    }

    fn sensors(&self) -> Vec<SensorSample> {
        self.frame().sensors.clone()
    }

    fn identity(&self) -> SystemIdentity {
        self.frame().identity.clone()
    }

    fn topology(&self) -> TopologySnapshot {
        self.frame().topology.clone()
    }

    fn utilization(&self) -> UtilizationReading {
        self.frame().utilization.clone()
    }
}
