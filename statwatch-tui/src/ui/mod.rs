//! UI rendering for the TUI.
//!
//! - [`dashboard`]: gauges, database panel and the history chart
//! - [`common`]: header, error banner, status bar, help and session-expired
//! - [`theme`]: color themes with light/dark detection

pub mod common;
pub mod dashboard;
pub mod theme;

pub use theme::Theme;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::Style,
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, Screen};

/// Minimum terminal size for usable display
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 16;

/// Draw one frame.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = format!(
            "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
            area.width, area.height, MIN_WIDTH, MIN_HEIGHT
        );
        let paragraph = Paragraph::new(msg)
            .alignment(Alignment::Center)
            .style(Style::default().fg(app.theme.warning));
        let centered = Rect::new(0, (area.height / 2).saturating_sub(2), area.width, 5);
        frame.render_widget(paragraph, centered.intersection(area));
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1),                          // Header bar
        Constraint::Length(common::banner_height(app)), // Error banner
        Constraint::Min(8),                             // Content
        Constraint::Length(1),                          // Status bar
    ])
    .split(area);

    common::render_header(frame, app, chunks[0]);

    match app.screen {
        Screen::Dashboard => {
            common::render_error_banner(frame, app, chunks[1]);
            dashboard::render(frame, app, chunks[2]);
        }
        Screen::SessionExpired => common::render_session_expired(frame, app, chunks[2]),
    }

    common::render_status_bar(frame, app, chunks[3]);

    if app.show_help {
        common::render_help(frame, app, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::FeedEvent;
    use ratatui::{backend::TestBackend, Terminal};
    use statwatch_feed::{FeedSnapshot, FeedStatus, Sample, SampleData};
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn draw(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn app_with_sample(status: FeedStatus) -> App {
        let mut app = App::new("synthetic: A, B", Duration::from_secs(2), 20, Theme::dark());
        let values = BTreeMap::from([("A".to_string(), 42.0), ("B".to_string(), 7.5)]);
        app.apply(FeedEvent::Snapshot(FeedSnapshot {
            series: values.clone(),
            history: vec![Sample {
                seq: 0,
                captured_at: tokio::time::Instant::now(),
                timestamp_ms: 1_700_000_000_000,
                data: SampleData::Scalars(values),
            }],
            status,
        }));
        app
    }

    #[test]
    fn renders_latest_values() {
        let screen = draw(&app_with_sample(FeedStatus::Running), 100, 30);
        assert!(screen.contains("STATWATCH"));
        assert!(screen.contains("A: 42.0"));
        assert!(screen.contains("B: 7.5"));
        assert!(!screen.contains("retrying"));
    }

    #[test]
    fn renders_error_banner_with_values() {
        let app = app_with_sample(FeedStatus::Error("Backend error: boom".into()));
        let screen = draw(&app, 100, 30);
        assert!(screen.contains("Backend error: boom"));
        assert!(screen.contains("A: 42.0"));
    }

    #[test]
    fn renders_session_expired() {
        let mut app = app_with_sample(FeedStatus::Running);
        app.apply(FeedEvent::Unauthenticated);
        let screen = draw(&app, 100, 30);
        assert!(screen.contains("Session expired"));
        assert!(!screen.contains("A: 42.0"));
    }

    #[test]
    fn too_small_terminal_shows_notice() {
        let app = app_with_sample(FeedStatus::Running);
        let screen = draw(&app, 40, 10);
        assert!(screen.contains("Terminal too small"));
    }
}
