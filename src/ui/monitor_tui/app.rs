use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::core::config::View;
use crate::core::telemetry::{AggregationService, RuntimeOptions, Snapshot, TelemetryRuntime};
use crate::ui::system_formatters::Units;

use super::event_handler::MonitorEvent;
use super::history::SnapshotHistory;
use super::render::render_ui;

/// Redraw cadence, independent of the polling interval
const FRAME_INTERVAL: Duration = Duration::from_millis(200);

/// Monitor application state
pub struct MonitorApp {
    pub runtime: TelemetryRuntime,
    pub snapshot: Arc<Snapshot>,
    pub history: SnapshotHistory,
    pub view: View,
    pub units: Units,
    pub interval_ms: u64,
    pub should_quit: bool,
    pub show_help: bool,
    pub scroll: usize,
    last_seen: Option<DateTime<Local>>,
}

impl MonitorApp {
    pub fn new(runtime: TelemetryRuntime, config: &MonitorAppConfig) -> Self {
        let snapshot = runtime.service().snapshot();
        Self {
            runtime,
            snapshot,
            history: SnapshotHistory::new(),
            view: config.view,
            units: config.units,
            interval_ms: config.interval_ms,
            should_quit: false,
            show_help: false,
            scroll: 0,
            last_seen: None,
        }
    }

    /// Pick up the latest published snapshot
    pub fn refresh(&mut self) {
        let snapshot = self.runtime.service().snapshot();
        if self.last_seen != Some(snapshot.timestamp) && !snapshot.cores().is_empty() {
            self.history.push(&snapshot);
            self.last_seen = Some(snapshot.timestamp);
        }
        self.snapshot = snapshot;
    }

    pub fn is_paused(&self) -> bool {
        self.runtime.is_paused()
    }

    /// Handle keyboard events
    pub fn handle_event(&mut self, event: MonitorEvent) {
        match event {
            MonitorEvent::Quit => self.should_quit = true,
            MonitorEvent::ToggleHelp => self.show_help = !self.show_help,
            MonitorEvent::NextView => {
                self.view = self.view.next();
                self.scroll = 0;
            }
            MonitorEvent::PrevView => {
                self.view = self.view.previous();
                self.scroll = 0;
            }
            MonitorEvent::ClearMinMax => {
                self.snapshot = self.runtime.service().clear_min_max();
            }
            MonitorEvent::TogglePause => self.runtime.set_paused(!self.is_paused()),
            MonitorEvent::ScrollUp => self.scroll = self.scroll.saturating_sub(1),
            MonitorEvent::ScrollDown => self.scroll = self.scroll.saturating_add(1),
            MonitorEvent::None => {}
        }
    }
}

/// Configuration for the monitor app
#[derive(Debug, Clone)]
pub struct MonitorAppConfig {
    pub interval_ms: u64,
    pub view: View,
    pub units: Units,
    /// CSV path template and interval, when data logging runs alongside the UI
    pub data_log: Option<(String, Duration)>,
}

impl Default for MonitorAppConfig {
    fn default() -> Self {
        Self {
            interval_ms: crate::core::config::DEFAULT_INTERVAL_MS,
            view: View::Dashboard,
            units: Units::default(),
            data_log: None,
        }
    }
}

/// Run the monitor TUI application
pub fn run_monitor_app(service: Arc<AggregationService>, config: MonitorAppConfig) -> Result<()> {
    let runtime = TelemetryRuntime::new(
        service,
        RuntimeOptions {
            poll_interval: Duration::from_millis(config.interval_ms),
            data_log: config.data_log.clone(),
        },
    )
    .context("Failed to start telemetry runtime")?;
    let mut app = MonitorApp::new(runtime, &config);

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let result = event_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    app.runtime.shutdown();
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut MonitorApp,
) -> Result<()> {
    loop {
        app.refresh();
        terminal.draw(|frame| render_ui(frame, app))?;

        if event::poll(FRAME_INTERVAL).context("Event poll failed")? {
            if let Event::Key(key) = event::read().context("Event read failed")? {
                if key.kind == KeyEventKind::Press {
                    let monitor_event = if app.show_help {
                        // Any key closes the help overlay
                        match MonitorEvent::from_key(key.code) {
                            MonitorEvent::Quit => MonitorEvent::Quit,
                            _ => MonitorEvent::ToggleHelp,
                        }
                    } else {
                        MonitorEvent::from_key(key.code)
                    };
                    app.handle_event(monitor_event);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
