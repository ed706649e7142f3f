// Core business logic module

pub mod config;
pub mod export;
pub mod provider;
pub mod telemetry;

// Re-export commonly used items
pub use config::Settings;
pub use export::CsvLogger;
pub use provider::{open_provider, FixtureProvider, SensorProvider, SysinfoProvider};
pub use telemetry::{AggregationService, Snapshot, TelemetryRuntime};
