use ratatui::{prelude::*, widgets::Gauge};

/// Create a gauge with color based on value thresholds
pub fn colored_gauge<'a>(value: f64, label: String) -> Gauge<'a> {
    Gauge::default()
        .gauge_style(Style::default().fg(load_color(value)).bg(Color::Black))
        .ratio((value / 100.0).clamp(0.0, 1.0))
        .label(label)
}

pub fn load_color(percent: f64) -> Color {
    match percent {
        v if v < 50.0 => Color::Cyan,
        v if v < 75.0 => Color::LightYellow,
        v if v < 90.0 => Color::LightRed,
        _ => Color::Red,
    }
}

/// Get color for temperature value in °C. Absent readings are greyed out.
pub fn temp_color(celsius: Option<f64>) -> Color {
    match celsius {
        None => Color::DarkGray,
        Some(t) if t < 50.0 => Color::Cyan,
        Some(t) if t < 70.0 => Color::LightYellow,
        Some(t) if t < 85.0 => Color::LightRed,
        Some(_) => Color::Red,
    }
}
