//! CPU telemetry aggregation.
//!
//! Raw provider sensors are reconciled into one canonical value per field, clocks
//! are mapped onto logical cores, and each cycle is published as an immutable
//! [`Snapshot`] carrying running min/max statistics.

mod builder;
mod frequency;
mod model;
mod reconciler;
mod resolver;
mod rules;
mod runtime;
mod service;

pub use builder::{build_snapshot, cleared_snapshot, core_count, CycleInput};
pub use frequency::{
    logical_core_count, map_logical_frequencies, map_with_topology, multiplier,
    physical_core_frequencies, summarize, CoreFrequencyMapper, ThreadMapping, BUS_CLOCK_MHZ,
};
pub use model::{
    positive, AffinitySource, BoardIdentity, CacheKind, CacheLevel, CoreMetric, CoreTopology,
    CpuIdentity, Extremes, FrequencySummary, HardwareKind, PackageMetric, SensorKind,
    SensorSample, Snapshot, SystemIdentity, TopologySnapshot,
};
pub use reconciler::{clamp_utilization, Reconciled, SensorReconciler, UtilizationReading};
pub use resolver::resolve_core_id;
pub use rules::{SensorRole, SensorRule, SensorRules};
pub use runtime::{RuntimeOptions, TelemetryRuntime};
pub use service::AggregationService;
