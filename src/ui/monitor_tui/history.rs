use std::collections::VecDeque;

use crate::core::telemetry::Snapshot;

const DEFAULT_HISTORY_SIZE: usize = 120;

/// Circular buffer of package level readings (for sparklines)
#[derive(Debug, Clone)]
pub struct SnapshotHistory {
    capacity: usize,
    /// Mean frequency of the cores that reported one, MHz
    pub average_frequency: VecDeque<u64>,
    /// Package temperature, tenths of °C
    pub package_temperature: VecDeque<u64>,
    pub total_utilization: VecDeque<u64>,
}

impl SnapshotHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            average_frequency: VecDeque::with_capacity(capacity),
            package_temperature: VecDeque::with_capacity(capacity),
            total_utilization: VecDeque::with_capacity(capacity),
        }
    }

    /// Record one snapshot. Absent readings are recorded as 0 so the timeline stays aligned.
    pub fn push(&mut self, snapshot: &Snapshot) {
        let capacity = self.capacity;
        let frequencies: Vec<f64> = snapshot
            .cores()
            .iter()
            .filter_map(|c| c.frequency_mhz)
            .collect();
        let average = if frequencies.is_empty() {
            0
        } else {
            (frequencies.iter().sum::<f64>() / frequencies.len() as f64) as u64
        };

        Self::push_value(&mut self.average_frequency, average, capacity);
        Self::push_value(
            &mut self.package_temperature,
            snapshot
                .package
                .temperature_c
                .map(|t| (t * 10.0) as u64)
                .unwrap_or(0),
            capacity,
        );
        Self::push_value(
            &mut self.total_utilization,
            snapshot.package.total_utilization_percent as u64,
            capacity,
        );
    }

    pub fn len(&self) -> usize {
        self.average_frequency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.average_frequency.is_empty()
    }

    fn push_value<T>(queue: &mut VecDeque<T>, value: T, capacity: usize) {
        if queue.len() >= capacity {
            queue.pop_front();
        }
        queue.push_back(value);
    }
}

impl Default for SnapshotHistory {
    fn default() -> Self {
        Self::new()
    }
}
