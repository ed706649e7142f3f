//! The aggregation service: poll, reconcile, build, publish.
//!
//! Snapshots are published copy-on-write. The current snapshot lives behind a mutex
//! that is held only long enough to clone an `Arc` or to swap in a new one, so
//! readers never wait on provider I/O and never see a half-built snapshot.

use std::sync::Arc;

use chrono::Local;
use parking_lot::Mutex;

use super::builder::{build_snapshot, cleared_snapshot, CycleInput};
use super::frequency::{CoreFrequencyMapper, ThreadMapping};
use super::model::{SensorSample, Snapshot};
use super::reconciler::{SensorReconciler, UtilizationReading};
use super::rules::SensorRules;
use crate::core::provider::SensorProvider;

/// What the provider produced for one cycle, before reconciliation
struct Readings {
    sensors: Vec<SensorSample>,
    utilization: UtilizationReading,
    /// False when the provider reports no CPU; the raw list is then kept for display only
    cpu_present: bool,
}

pub struct AggregationService {
    /// Held for the whole collect-and-publish sequence, serializing writers
    provider: Mutex<Box<dyn SensorProvider>>,
    reconciler: SensorReconciler,
    mapper: CoreFrequencyMapper,
    current: Mutex<Arc<Snapshot>>,
}

impl AggregationService {
    pub fn new(provider: Box<dyn SensorProvider>) -> Self {
        Self::with_rules(provider, SensorRules::default(), ThreadMapping::default())
    }

    pub fn with_rules(
        provider: Box<dyn SensorProvider>,
        rules: SensorRules,
        mapping: ThreadMapping,
    ) -> Self {
        Self {
            provider: Mutex::new(provider),
            reconciler: SensorReconciler::new(rules),
            mapper: CoreFrequencyMapper::new(mapping),
            current: Mutex::new(Arc::new(Snapshot::empty())),
        }
    }

    /// Run one full cycle and return the snapshot it published.
    ///
    /// A provider failure degrades the cycle to "no readings"; the cycle still
    /// publishes so readers see the absence instead of stale values.
    pub fn collect_once(&self) -> Arc<Snapshot> {
        let mut provider = self.provider.lock();

        let readings = match provider.refresh() {
            Ok(()) if provider.cpu_present() => Readings {
                sensors: provider.sensors(),
                utilization: provider.utilization(),
                cpu_present: true,
            },
            Ok(()) => {
                log::debug!("Provider '{}' reports no CPU hardware", provider.name());
                Readings {
                    sensors: provider.sensors(),
                    utilization: UtilizationReading::default(),
                    cpu_present: false,
                }
            }
            Err(e) => {
                log::warn!("Sensor refresh failed on '{}': {}", provider.name(), e);
                Readings {
                    sensors: Vec::new(),
                    utilization: UtilizationReading::default(),
                    cpu_present: false,
                }
            }
        };

        let topology = provider.topology();
        let cpu_sensors: &[SensorSample] = if readings.cpu_present {
            &readings.sensors
        } else {
            &[]
        };
        let reconciled = self.reconciler.reconcile(cpu_sensors, &readings.utilization);
        let frequencies = self.mapper.map(cpu_sensors, Some(&topology));
        let input = CycleInput {
            timestamp: Local::now(),
            reconciled,
            frequencies,
            identity: provider.identity(),
            topology,
            sensors: readings.sensors,
        };

        // Build under the publish lock so a concurrent reset cannot be lost.
        let mut current = self.current.lock();
        let next = Arc::new(build_snapshot(Some(current.as_ref()), input));
        *current = Arc::clone(&next);
        log::trace!("Published snapshot with {} cores", next.cores().len());
        next
    }

    /// The most recently published snapshot
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current.lock())
    }

    /// Publish a copy of the current snapshot with every min/max unset.
    pub fn clear_min_max(&self) -> Arc<Snapshot> {
        let mut current = self.current.lock();
        let next = Arc::new(cleared_snapshot(current.as_ref()));
        *current = Arc::clone(&next);
        log::debug!("Min/max statistics cleared");
        next
    }

    pub fn rules(&self) -> &SensorRules {
        self.reconciler.rules()
    }

    pub fn thread_mapping(&self) -> ThreadMapping {
        self.mapper.mapping()
    }
}
