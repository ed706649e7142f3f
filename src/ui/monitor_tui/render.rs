use std::collections::VecDeque;

use ratatui::{
    prelude::*,
    widgets::{BarChart, Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs},
};

use super::app::MonitorApp;
use super::widgets::{colored_gauge, load_color, temp_color};
use crate::core::config::View;
use crate::ui::formatters::*;

/// Main render function
pub fn render_ui(frame: &mut Frame, app: &MonitorApp) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Min(5),    // Active view
            Constraint::Length(1), // Footer
        ])
        .split(area);

    render_tabs(frame, chunks[0], app);
    match app.view {
        View::Dashboard => render_dashboard(frame, chunks[1], app),
        View::Topology => render_topology(frame, chunks[1], app),
        View::Sensors => render_sensors(frame, chunks[1], app),
        View::System => render_system(frame, chunks[1], app),
    }
    render_footer(frame, chunks[2], app);

    if app.show_help {
        render_help_overlay(frame, area);
    }
}

fn render_tabs(frame: &mut Frame, area: Rect, app: &MonitorApp) {
    let brand = &app.snapshot.identity.cpu.brand;
    let title = if app.is_paused() {
        format!(" {} │ PAUSED ", brand)
    } else {
        format!(" {} │ {} ms ", brand, app.interval_ms)
    };

    let tabs = Tabs::new(View::ALL.iter().map(|v| v.title()).collect::<Vec<_>>())
        .block(Block::default().title(title).borders(Borders::ALL))
        .select(app.view.index())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

fn render_dashboard(frame: &mut Frame, area: Rect, app: &MonitorApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(3)])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[0]);

    render_package(frame, top[0], app);
    render_history(frame, top[1], app);
    render_core_table(frame, chunks[1], app);
}

fn render_package(frame: &mut Frame, area: Rect, app: &MonitorApp) {
    let package = &app.snapshot.package;
    let frequency = &app.snapshot.frequency;
    let units = app.units;

    let block = Block::default().title(" Package ").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1); 3])
        .split(inner);

    let temperature = Line::from(vec![
        Span::raw("Temp "),
        Span::styled(
            format_temperature(package.temperature_c, units.temperature),
            Style::default().fg(temp_color(package.temperature_c)),
        ),
        Span::raw(format!(
            " (min {} / max {})  Power {}  Vcore {}",
            format_temperature(package.temperature_range.min, units.temperature),
            format_temperature(package.temperature_range.max, units.temperature),
            format_power(package.power_watts),
            format_voltage(package.voltage_volts),
        )),
    ]);
    frame.render_widget(Paragraph::new(temperature), rows[0]);

    let clocks = format!(
        "Clocks {} .. {}  Bus {}",
        format_frequency(frequency.min_mhz, units.frequency),
        format_frequency(frequency.max_mhz, units.frequency),
        format_frequency(Some(frequency.base_clock_mhz), units.frequency),
    );
    frame.render_widget(Paragraph::new(clocks), rows[1]);

    let total = package.total_utilization_percent;
    frame.render_widget(
        colored_gauge(total, format!("Total load {:.1}%", total)),
        rows[2],
    );
}

fn render_history(frame: &mut Frame, area: Rect, app: &MonitorApp) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(area);

    let history = &app.history;
    render_bars(frame, columns[0], " Avg clock ", &history.average_frequency, Color::Cyan);
    render_bars(frame, columns[1], " Pkg temp ", &history.package_temperature, Color::LightRed);
    render_bars(frame, columns[2], " Load ", &history.total_utilization, Color::Green);
}

fn render_bars(frame: &mut Frame, area: Rect, title: &str, history: &VecDeque<u64>, color: Color) {
    let block = Block::default().title(title).borders(Borders::ALL);

    let inner_width = area.width.saturating_sub(2) as usize;
    let bar_width: u16 = 1;
    let bar_gap: u16 = 0;
    let max_bars = (inner_width / (bar_width + bar_gap) as usize).min(history.len());
    let start = history.len().saturating_sub(max_bars);
    let data: Vec<(&str, u64)> = history.iter().skip(start).map(|&v| ("", v)).collect();

    if data.is_empty() {
        let waiting = Paragraph::new("Waiting for data...")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(waiting, area);
        return;
    }

    let peak = history.iter().copied().max().unwrap_or(0).max(1);
    let chart = BarChart::default()
        .block(block)
        .direction(Direction::Vertical)
        .bar_width(bar_width)
        .bar_gap(bar_gap)
        .bar_style(Style::default().fg(color))
        .value_style(Style::default().fg(Color::Black).bg(color))
        .data(&data)
        .max(peak);
    frame.render_widget(chart, area);
}

fn bold_cell(text: &str) -> Cell<'_> {
    Cell::from(text).style(Style::default().add_modifier(Modifier::BOLD))
}

fn render_core_table(frame: &mut Frame, area: Rect, app: &MonitorApp) {
    let units = app.units;
    let header = Row::new(
        [
            "Core", "Clock", "Min", "Max", "Mult", "Temp", "Min", "Max", "Power", "Vcore", "Load",
        ]
        .into_iter()
        .map(bold_cell)
        .collect::<Vec<_>>(),
    );

    let rows: Vec<Row> = app
        .snapshot
        .cores()
        .iter()
        .skip(app.scroll)
        .map(|core| {
            let load = core.utilization_percent;
            let dim = if core.is_active {
                Style::default()
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Row::new(vec![
                Cell::from(format!("#{}", core.core_id)),
                Cell::from(format_frequency(core.frequency_mhz, units.frequency)),
                Cell::from(format_frequency(core.min_frequency(), units.frequency)),
                Cell::from(format_frequency(core.max_frequency(), units.frequency)),
                Cell::from(format_multiplier(core.multiplier)),
                Cell::from(format_temperature(core.temperature_c, units.temperature))
                    .style(Style::default().fg(temp_color(core.temperature_c))),
                Cell::from(format_temperature(core.min_temperature(), units.temperature)),
                Cell::from(format_temperature(core.max_temperature(), units.temperature)),
                Cell::from(format_power(core.power_watts)),
                Cell::from(format_voltage(core.voltage_volts)),
                Cell::from(format_percentage(load))
                    .style(Style::default().fg(load.map(load_color).unwrap_or(Color::DarkGray))),
            ])
            .style(dim)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(6),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(8),
            Constraint::Length(7),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .title(format!(" Cores ({}) ", app.snapshot.cores().len()))
            .borders(Borders::ALL),
    );
    frame.render_widget(table, area);
}

fn render_topology(frame: &mut Frame, area: Rect, app: &MonitorApp) {
    let topology = &app.snapshot.topology;
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let header = Row::new(
        ["Thread", "Core", "Package", "NUMA", "SMT"]
            .into_iter()
            .map(bold_cell)
            .collect::<Vec<_>>(),
    );
    let rows: Vec<Row> = topology
        .cores
        .iter()
        .skip(app.scroll)
        .map(|c| {
            Row::new(vec![
                Cell::from(c.logical_id.to_string()),
                Cell::from(c.physical_core_id.to_string()),
                Cell::from(c.package_id.to_string()),
                Cell::from(c.numa_node_id.to_string()),
                Cell::from(if c.is_smt_sibling { "sibling" } else { "" }),
            ])
        })
        .collect();
    let table = Table::new(rows, [Constraint::Length(8); 5])
        .header(header)
        .block(
            Block::default()
                .title(format!(" Threads ({:?} affinity) ", topology.affinity_source))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, chunks[0]);

    let mut lines = vec![
        Line::from(format!(
            "{} physical / {} logical cores",
            topology.physical_cores, topology.logical_cores
        )),
        Line::from(format!(
            "{} package(s), {} NUMA node(s), SMT {}",
            topology.packages,
            topology.numa_nodes,
            if topology.has_smt { "on" } else { "off" }
        )),
        Line::from(""),
    ];
    lines.extend(topology.caches.iter().map(|cache| {
        let mut text = format!(
            "L{} {:?}: {}",
            cache.level,
            cache.kind,
            format_bytes(cache.size_bytes)
        );
        if let Some(ways) = cache.associativity {
            text.push_str(&format!(", {}-way", ways));
        }
        if let Some(line) = cache.line_size_bytes {
            text.push_str(&format!(", {} B line", line));
        }
        Line::from(text)
    }));
    let summary =
        Paragraph::new(lines).block(Block::default().title(" Layout ").borders(Borders::ALL));
    frame.render_widget(summary, chunks[1]);
}

fn render_sensors(frame: &mut Frame, area: Rect, app: &MonitorApp) {
    let header = Row::new(
        ["Hardware", "Kind", "Name", "Value", "Min", "Max"]
            .into_iter()
            .map(bold_cell)
            .collect::<Vec<_>>(),
    );
    let raw = |v: Option<f64>| v.map(|v| format!("{:.2}", v)).unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let rows: Vec<Row> = app
        .snapshot
        .sensors
        .iter()
        .skip(app.scroll)
        .map(|s| {
            Row::new(vec![
                Cell::from(s.hardware.clone()),
                Cell::from(s.kind.to_string()),
                Cell::from(s.name.clone()),
                Cell::from(raw(s.value)),
                Cell::from(raw(s.min)),
                Cell::from(raw(s.max)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(22),
            Constraint::Length(12),
            Constraint::Percentage(34),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .title(format!(" Sensors ({}) ", app.snapshot.sensors.len()))
            .borders(Borders::ALL),
    );
    frame.render_widget(table, area);
}

fn render_system(frame: &mut Frame, area: Rect, app: &MonitorApp) {
    let identity = &app.snapshot.identity;
    let board = &identity.board;
    let unknown = |v: &Option<String>| v.clone().unwrap_or_else(|| "Unknown".to_string());

    let mut lines = vec![
        Line::from(Span::styled("CPU", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))),
        Line::from(format!("  Model: {}", identity.cpu.brand)),
        Line::from(format!("  Vendor: {}", identity.cpu.vendor)),
        Line::from(format!("  Architecture: {}", identity.architecture)),
        Line::from(format!(
            "  Cores: {} physical, {} logical",
            identity.physical_cores, identity.logical_cores
        )),
    ];
    if let (Some(family), Some(model)) = (identity.cpu.family, identity.cpu.model) {
        lines.push(Line::from(format!(
            "  Family {} Model {} Stepping {}",
            family,
            model,
            identity.cpu.stepping.map(|s| s.to_string()).unwrap_or_default()
        )));
    }
    lines.extend([
        Line::from(""),
        Line::from(Span::styled("Motherboard", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))),
        Line::from(format!("  {} {}", unknown(&board.manufacturer), unknown(&board.product))),
        Line::from(format!(
            "  BIOS {} {} ({})",
            unknown(&board.bios_vendor),
            unknown(&board.bios_version),
            unknown(&board.bios_date)
        )),
        Line::from(""),
        Line::from(Span::styled("System", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))),
        Line::from(format!("  Memory: {}", format_bytes(identity.total_memory_bytes))),
        Line::from(format!("  OS: {} {}", identity.os_name, identity.os_version)),
        Line::from(format!("  Snapshot: {}", format_time(&app.snapshot.timestamp))),
    ]);

    let paragraph =
        Paragraph::new(lines).block(Block::default().title(" System ").borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn render_footer(frame: &mut Frame, area: Rect, app: &MonitorApp) {
    let pause = if app.is_paused() { "Resume" } else { "Pause" };
    let help = format!(
        " q: Quit │ ?: Help │ Tab: Switch view │ c: Clear min/max │ Space: {} ",
        pause
    );
    let para = Paragraph::new(help).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(para, area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let help_text = r#"
    CoreFreq Monitor - Help

    Keyboard Shortcuts:
    ─────────────────────────────────────
    q / Esc       Quit the application
    ? / h         Toggle this help screen
    Tab           Next view
    Shift+Tab     Previous view
    c             Clear min/max statistics
    Space         Pause / resume polling
    Up / Down     Scroll tables

    Press any key to close this help
    "#;

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::DarkGray));

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .alignment(Alignment::Left);

    // Center the help popup
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);
    frame.render_widget(paragraph, popup_area);
}

/// Helper function to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
