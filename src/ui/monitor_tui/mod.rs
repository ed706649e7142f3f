//! Terminal dashboard for live CPU telemetry.
//!
//! Renders published snapshots with ratatui while a background runtime polls.

mod app;
mod event_handler;
mod history;
mod render;
mod widgets;

pub use app::{run_monitor_app, MonitorApp, MonitorAppConfig};
pub use event_handler::MonitorEvent;
pub use history::SnapshotHistory;
