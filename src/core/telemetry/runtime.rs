//! Tokio runtime that drives collection and the CSV data logger.
//!
//! Readers do not go through the runtime: they call [`AggregationService::snapshot`]
//! directly whenever they need data.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::time::{interval, MissedTickBehavior};

use super::service::AggregationService;
use crate::core::export::CsvLogger;

/// Scheduling options
#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    pub poll_interval: Duration,
    /// Path template and interval of the CSV logger, when enabled
    pub data_log: Option<(String, Duration)>,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(crate::core::config::DEFAULT_INTERVAL_MS),
            data_log: None,
        }
    }
}

/// Wrapper around the Tokio runtime for background collection.
pub struct TelemetryRuntime {
    service: Arc<AggregationService>,
    paused: Arc<AtomicBool>,
    logged_polls: Arc<AtomicU64>,

    /// Shutdown signal sender
    shutdown_tx: broadcast::Sender<()>,

    /// Handle to the runtime (for shutdown)
    _runtime_handle: tokio::runtime::Runtime,
}

impl TelemetryRuntime {
    /// Create the runtime with the poll task (and logger task, if configured) spawned.
    pub fn new(service: Arc<AggregationService>, options: RuntimeOptions) -> anyhow::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_time()
            .thread_name("telemetry-worker")
            .build()?;

        let (shutdown_tx, _) = broadcast::channel::<()>(1);
        let paused = Arc::new(AtomicBool::new(false));
        let logged_polls = Arc::new(AtomicU64::new(0));

        runtime.spawn(poll_task(
            Arc::clone(&service),
            options.poll_interval,
            Arc::clone(&paused),
            shutdown_tx.subscribe(),
        ));

        if let Some((template, every)) = options.data_log {
            runtime.spawn(data_log_task(
                Arc::clone(&service),
                Arc::new(Mutex::new(CsvLogger::new(template))),
                every,
                Arc::clone(&logged_polls),
                shutdown_tx.subscribe(),
            ));
        }

        log::debug!(
            "Telemetry runtime started, polling every {} ms",
            options.poll_interval.as_millis()
        );

        Ok(Self {
            service,
            paused,
            logged_polls,
            shutdown_tx,
            _runtime_handle: runtime,
        })
    }

    pub fn service(&self) -> &Arc<AggregationService> {
        &self.service
    }

    /// Stop or resume polling. Readers keep seeing the last published snapshot.
    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Relaxed);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    /// Number of polls written by the CSV logger so far
    pub fn logged_polls(&self) -> u64 {
        self.logged_polls.load(Ordering::Relaxed)
    }

    /// Shutdown the runtime gracefully.
    pub fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        // Runtime will shutdown when dropped
    }
}

async fn poll_task(
    service: Arc<AggregationService>,
    every: Duration,
    paused: Arc<AtomicBool>,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if paused.load(Ordering::Relaxed) {
                    continue;
                }
                // Provider calls block, keep them off the async workers.
                let service = Arc::clone(&service);
                if let Err(e) = tokio::task::spawn_blocking(move || service.collect_once()).await {
                    log::error!("Collection cycle panicked: {}", e);
                }
            }
            _ = shutdown.recv() => {
                log::debug!("Poll task shutting down");
                break;
            }
        }
    }
}

async fn data_log_task(
    service: Arc<AggregationService>,
    logger: Arc<Mutex<CsvLogger>>,
    every: Duration,
    logged_polls: Arc<AtomicU64>,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick fires immediately, before any cycle has been published.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let snapshot = service.snapshot();
                if snapshot.cores().is_empty() && snapshot.sensors.is_empty() {
                    continue;
                }
                // File writes block too.
                let logger = Arc::clone(&logger);
                match tokio::task::spawn_blocking(move || logger.lock().log(&snapshot)).await {
                    Ok(Ok(())) => {
                        logged_polls.fetch_add(1, Ordering::Relaxed);
                    }
                    Ok(Err(e)) => log::warn!("Failed to write sensor data: {}", e),
                    Err(e) => log::error!("Sensor data write panicked: {}", e),
                }
            }
            _ = shutdown.recv() => {
                log::debug!("Data logger task shutting down");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::provider::{FixtureFrame, FixtureProvider};
    use crate::core::telemetry::{SensorKind, SensorSample};
    use tempfile::TempDir;

    fn service() -> Arc<AggregationService> {
        let frame = FixtureFrame {
            sensors: vec![
                SensorSample::cpu("Core #0", SensorKind::Clock, Some(3000.0)),
                SensorSample::cpu("CPU Core #0", SensorKind::Load, Some(20.0)),
            ],
            cpu_present: true,
            ..Default::default()
        };
        let provider = FixtureProvider::new(vec![frame]).unwrap();
        Arc::new(AggregationService::new(Box::new(provider)))
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_data_log_task_writes_on_blocking_pool() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.csv");
        let service = service();
        service.collect_once();

        let logger = Arc::new(Mutex::new(CsvLogger::new(path.to_string_lossy().into_owned())));
        let logged = Arc::new(AtomicU64::new(0));
        let (shutdown_tx, _) = broadcast::channel::<()>(1);
        let task = tokio::spawn(data_log_task(
            Arc::clone(&service),
            Arc::clone(&logger),
            Duration::from_millis(10),
            Arc::clone(&logged),
            shutdown_tx.subscribe(),
        ));

        // The single async thread stays free to run this loop while writes happen.
        let mut waited = Duration::ZERO;
        while logged.load(Ordering::Relaxed) < 2 && waited < Duration::from_secs(5) {
            tokio::time::sleep(Duration::from_millis(10)).await;
            waited += Duration::from_millis(10);
        }
        shutdown_tx.send(()).unwrap();
        task.await.unwrap();

        assert!(logged.load(Ordering::Relaxed) >= 2);
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.lines().count() >= 3);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_data_log_task_skips_before_first_cycle() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.csv");
        let logged = Arc::new(AtomicU64::new(0));
        let (shutdown_tx, _) = broadcast::channel::<()>(1);
        let task = tokio::spawn(data_log_task(
            service(),
            Arc::new(Mutex::new(CsvLogger::new(path.to_string_lossy().into_owned()))),
            Duration::from_millis(10),
            Arc::clone(&logged),
            shutdown_tx.subscribe(),
        ));

        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown_tx.send(()).unwrap();
        task.await.unwrap();

        assert_eq!(logged.load(Ordering::Relaxed), 0);
        assert!(!path.exists());
    }
}
