//! Common UI components: header, error banner, status bar, help overlay
//! and the session-expired screen.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use statwatch_feed::FeedStatus;

use crate::app::App;
use crate::duration::format_duration;

/// Render the header bar: status dot, source and feed state.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let status = app.status();
    let state = if app.paused {
        "paused".to_string()
    } else {
        status.label().to_string()
    };

    let line = Line::from(vec![
        Span::styled(" ● ", app.theme.status_style(status)),
        Span::styled("STATWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::raw(app.source_description.clone()),
        Span::raw(" │ "),
        Span::styled(state, app.theme.status_style(status)),
        Span::raw(" │ "),
        Span::raw(format!(
            "{} / {} samples",
            app.snapshot.history.len(),
            app.history_len
        )),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Height of the error banner for the current state.
pub fn banner_height(app: &App) -> u16 {
    match app.status() {
        FeedStatus::Error(_) => 1,
        _ => 0,
    }
}

/// Render the error banner shown while the last tick failed.
pub fn render_error_banner(frame: &mut Frame, app: &App, area: Rect) {
    let Some(message) = app.status().error_message() else {
        return;
    };

    let text = if app.snapshot.history.is_empty() {
        format!(" {} | retrying every {}", message, format_duration(app.interval))
    } else {
        format!(
            " {} | showing last known values, retrying every {}",
            message,
            format_duration(app.interval)
        )
    };
    let paragraph = Paragraph::new(text).style(
        Style::default()
            .fg(app.theme.warning)
            .add_modifier(Modifier::BOLD),
    );
    frame.render_widget(paragraph, area);
}

/// Render the status bar at the bottom.
///
/// Shows time since last update, the poll interval and available controls,
/// or a temporary status message.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let updated = match app.last_update {
        Some(at) => format!("Updated {:.1}s ago", at.elapsed().as_secs_f64()),
        None => "No data yet".to_string(),
    };
    let pause = if app.paused { "p:resume" } else { "p:pause" };
    let status = format!(
        " {} | every {} | {} o:sign out ?:help q:quit",
        updated,
        format_duration(app.interval),
        pause,
    );

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from("  p         Pause / resume polling"),
        Line::from("  o         Sign out"),
        Line::from("  ?         Toggle this help"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Session expired",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  l         Sign in again"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let help_area = centered(area, 40, 15);
    frame.render_widget(Clear, help_area);
    frame.render_widget(Paragraph::new(help_text).block(block), help_area);
}

/// Render the screen shown after the backend rejected the session.
pub fn render_session_expired(frame: &mut Frame, app: &App, area: Rect) {
    let text = vec![
        Line::from(Span::styled(
            "Session expired",
            Style::default()
                .fg(app.theme.critical)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("The backend rejected this session."),
        Line::from("Polling has stopped."),
        Line::from(Span::styled(
            app.source_description.clone(),
            Style::default().add_modifier(Modifier::DIM),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("l", app.theme.header),
            Span::raw(" sign in again   "),
            Span::styled("q", app.theme.header),
            Span::raw(" quit"),
        ]),
    ];

    let block = Block::default()
        .title(" Signed out ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.critical));

    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(paragraph, centered(area, 60, 9));
}

/// A rectangle of at most `width` x `height` centered in `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}
