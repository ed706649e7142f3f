use crossterm::event::KeyCode;

/// Events that can occur in the monitor TUI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorEvent {
    /// Quit the application
    Quit,
    /// Toggle help overlay
    ToggleHelp,
    /// Switch to next view
    NextView,
    /// Switch to previous view
    PrevView,
    /// Reset every min/max statistic
    ClearMinMax,
    /// Stop or resume polling
    TogglePause,
    ScrollUp,
    ScrollDown,
    /// No action
    None,
}

impl MonitorEvent {
    pub fn from_key(code: KeyCode) -> Self {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => MonitorEvent::Quit,
            KeyCode::Char('?') | KeyCode::Char('h') => MonitorEvent::ToggleHelp,
            KeyCode::Tab => MonitorEvent::NextView,
            KeyCode::BackTab => MonitorEvent::PrevView,
            KeyCode::Char('c') => MonitorEvent::ClearMinMax,
            KeyCode::Char(' ') => MonitorEvent::TogglePause,
            KeyCode::Up | KeyCode::Char('k') => MonitorEvent::ScrollUp,
            KeyCode::Down | KeyCode::Char('j') => MonitorEvent::ScrollDown,
            _ => MonitorEvent::None,
        }
    }
}
