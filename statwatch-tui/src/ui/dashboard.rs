//! Main dashboard: usage gauges, runtime and database panels, and a
//! scrolling chart of the history window.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, Gauge, GraphType, Paragraph},
    Frame,
};
use statwatch_feed::{series_bounds, series_points, DatabaseHealth, FeedSnapshot, SystemStats};

use crate::app::App;

/// Series charted when the source reports full stats records.
pub const STATS_CHART_SERIES: [&str; 2] = ["cpu_percent", "memory_percent"];

/// Render the dashboard for the current snapshot.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    if app.snapshot.history.is_empty() {
        let text = if app.paused {
            "Paused. Press p to resume."
        } else {
            "Waiting for the first sample..."
        };
        let paragraph = Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(Style::default().add_modifier(Modifier::DIM));
        let centered = Rect::new(area.x, area.y + area.height / 2, area.width, 1);
        frame.render_widget(paragraph, centered);
        return;
    }

    match app.snapshot.latest_stats() {
        Some(stats) => render_stats(frame, app, stats, area),
        None => render_series(frame, app, area),
    }
}

fn render_stats(frame: &mut Frame, app: &App, stats: &SystemStats, area: Rect) {
    let rows = Layout::vertical([
        Constraint::Length(3), // Gauges
        Constraint::Length(5), // Runtime + database
        Constraint::Min(6),    // Chart
    ])
    .split(area);

    let gauges =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(rows[0]);
    let backend = &stats.backend;
    render_gauge(
        frame,
        app,
        " CPU ",
        backend.cpu_percent,
        format!("{:.1}%", backend.cpu_percent),
        gauges[0],
    );
    render_gauge(
        frame,
        app,
        " Memory ",
        backend.memory_percent,
        format!(
            "{:.1}% ({} / {} MB)",
            backend.memory_percent, backend.memory_used_mb, backend.memory_total_mb
        ),
        gauges[1],
    );

    let panels =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(rows[1]);
    render_runtime(frame, app, stats, panels[0]);
    render_database(frame, app, &stats.database, panels[1]);

    render_chart(frame, app, &chart_series(&app.snapshot), rows[2]);
}

fn render_series(frame: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::vertical([Constraint::Length(3), Constraint::Min(6)]).split(area);

    let mut spans = Vec::new();
    for (i, (name, value)) in app.snapshot.series.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  │  "));
        }
        spans.push(Span::styled(
            format!("{}: ", name),
            Style::default().fg(app.theme.series_color(i)),
        ));
        spans.push(Span::styled(
            format!("{:.1}", value),
            Style::default().add_modifier(Modifier::BOLD),
        ));
    }
    let latest = Paragraph::new(Line::from(spans)).block(panel(app, " Latest "));
    frame.render_widget(latest, rows[0]);

    render_chart(frame, app, &chart_series(&app.snapshot), rows[1]);
}

fn render_gauge(frame: &mut Frame, app: &App, title: &str, percent: f64, label: String, area: Rect) {
    let gauge = Gauge::default()
        .block(panel(app, title))
        .gauge_style(app.theme.level_style(percent))
        .ratio((percent / 100.0).clamp(0.0, 1.0))
        .label(label);
    frame.render_widget(gauge, area);
}

fn render_runtime(frame: &mut Frame, app: &App, stats: &SystemStats, area: Rect) {
    let label = Style::default().add_modifier(Modifier::DIM);
    let lines = vec![
        Line::from(vec![
            Span::styled("Goroutines  ", label),
            Span::raw(stats.backend.goroutines.to_string()),
        ]),
        Line::from(vec![
            Span::styled("Heap        ", label),
            Span::raw(format!("{} MB", stats.backend.alloc_mb)),
        ]),
        Line::from(vec![
            Span::styled("Updated     ", label),
            Span::raw(stats.timestamp.clone()),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines).block(panel(app, " Runtime ")), area);
}

fn render_database(frame: &mut Frame, app: &App, database: &DatabaseHealth, area: Rect) {
    let lines = match database {
        DatabaseHealth::Connected {
            open_connections,
            in_use,
            idle,
            version,
        } => {
            let mut lines = vec![
                Line::from(Span::styled(
                    "● connected",
                    Style::default().fg(app.theme.healthy),
                )),
                Line::from(format!(
                    "Open {}  In use {}  Idle {}",
                    open_connections, in_use, idle
                )),
            ];
            if let Some(version) = version {
                lines.push(Line::from(Span::styled(
                    version.clone(),
                    Style::default().add_modifier(Modifier::DIM),
                )));
            }
            lines
        }
        DatabaseHealth::Disconnected { error } => vec![
            Line::from(Span::styled(
                "● disconnected",
                Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD),
            )),
            Line::from(error.clone().unwrap_or_else(|| "no details".to_string())),
        ],
    };
    frame.render_widget(Paragraph::new(lines).block(panel(app, " Database ")), area);
}

fn render_chart(frame: &mut Frame, app: &App, series: &[String], area: Rect) {
    let history = &app.snapshot.history;
    let points: Vec<Vec<(f64, f64)>> = series
        .iter()
        .map(|name| series_points(history, name))
        .collect();

    let datasets: Vec<Dataset> = series
        .iter()
        .zip(&points)
        .enumerate()
        .map(|(i, (name, data))| {
            Dataset::default()
                .name(name.as_str())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(app.theme.series_color(i)))
                .data(data)
        })
        .collect();

    let [x_min, x_max] = x_bounds(&app.snapshot, app.history_len);
    let [y_min, y_max] = y_bounds(&app.snapshot, series);
    let axis_style = Style::default().fg(app.theme.border);

    let chart = Chart::new(datasets)
        .block(panel(app, " History "))
        .x_axis(
            Axis::default()
                .style(axis_style)
                .bounds([x_min, x_max])
                .labels([format!("#{}", x_min), format!("#{}", x_max)]),
        )
        .y_axis(
            Axis::default()
                .style(axis_style)
                .bounds([y_min, y_max])
                .labels([
                    format!("{:.0}", y_min),
                    format!("{:.0}", (y_min + y_max) / 2.0),
                    format!("{:.0}", y_max),
                ]),
        );
    frame.render_widget(chart, area);
}

fn panel<'a>(app: &App, title: &'a str) -> Block<'a> {
    Block::default()
        .title(Span::styled(title, app.theme.header))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
}

/// Names of the series to chart.
///
/// Stats records chart CPU and memory percentages; scalar sources chart
/// every series they report.
pub fn chart_series(snapshot: &FeedSnapshot) -> Vec<String> {
    if snapshot.latest_stats().is_some() {
        STATS_CHART_SERIES
            .iter()
            .filter(|name| snapshot.series.contains_key(**name))
            .map(|name| name.to_string())
            .collect()
    } else {
        snapshot.series.keys().cloned().collect()
    }
}

/// X range covering a full window, so the chart scrolls once it fills.
pub fn x_bounds(snapshot: &FeedSnapshot, history_len: usize) -> [f64; 2] {
    let first = snapshot.history.first().map_or(0, |s| s.seq) as f64;
    let span = history_len.saturating_sub(1).max(1) as f64;
    [first, first + span]
}

/// Y range from zero to a round ceiling of at least 100.
pub fn y_bounds(snapshot: &FeedSnapshot, series: &[String]) -> [f64; 2] {
    let max = series
        .iter()
        .filter_map(|name| series_bounds(&snapshot.history, name))
        .map(|(_, hi)| hi)
        .fold(0.0_f64, f64::max);
    let ceiling = ((max / 10.0).ceil() * 10.0).max(100.0);
    [0.0, ceiling]
}
