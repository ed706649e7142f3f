//! Sensor provider abstraction.
//!
//! The aggregation service only talks to hardware through this trait. The live
//! implementation sits on sysinfo and sysfs, the fixture implementation replays
//! recorded frames.

mod fixture;
mod sysinfo_provider;

pub use fixture::{FixtureFrame, FixtureProvider};
pub use sysinfo_provider::SysinfoProvider;

use crate::core::telemetry::{SensorSample, SystemIdentity, TopologySnapshot, UtilizationReading};
use crate::error::Result;

/// Trait for sensor providers
///
/// `refresh` performs the blocking I/O of one poll. The accessors only read what the
/// last refresh produced.
pub trait SensorProvider: Send {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Poll the hardware
    fn refresh(&mut self) -> Result<()>;

    /// Whether CPU hardware is visible to the provider
    fn cpu_present(&self) -> bool;

    /// Every sensor seen in the last refresh, CPU or not
    fn sensors(&self) -> Vec<SensorSample>;

    fn identity(&self) -> SystemIdentity;

    fn topology(&self) -> TopologySnapshot;

    /// Scheduler utilization, read independently of the sensor list
    fn utilization(&self) -> UtilizationReading;
}

/// Open the provider selected on the command line: a replay file when given, the
/// live hardware otherwise.
pub fn open_provider(replay: Option<&std::path::Path>) -> Result<Box<dyn SensorProvider>> {
    match replay {
        Some(path) => {
            log::info!("Replaying sensor frames from {}", path.display());
            Ok(Box::new(FixtureProvider::load(path)?))
        }
        None => Ok(Box::new(SysinfoProvider::new()?)),
    }
}
