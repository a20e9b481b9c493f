//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;
use statwatch_feed::FeedStatus;

/// Gauge level at which usage is drawn as a warning.
pub const WARN_PERCENT: f64 = 70.0;

/// Gauge level at which usage is drawn as critical.
pub const CRIT_PERCENT: f64 = 90.0;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for titles and status messages.
    pub highlight: Color,
    /// Color for elevated usage and soft errors.
    pub warning: Color,
    /// Color for critical usage and lost sessions.
    pub critical: Color,
    /// Color for normal usage and a running feed.
    pub healthy: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for panel titles.
    pub header: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
    /// Line colors for chart series, cycled in order.
    pub series: [Color; 6],
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
            series: [
                Color::Cyan,
                Color::Magenta,
                Color::Yellow,
                Color::Green,
                Color::LightBlue,
                Color::LightRed,
            ],
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
            series: [
                Color::Blue,
                Color::Magenta,
                Color::Red,
                Color::Green,
                Color::DarkGray,
                Color::Cyan,
            ],
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Style for a usage percentage.
    pub fn level_style(&self, percent: f64) -> Style {
        if percent >= CRIT_PERCENT {
            Style::default().fg(self.critical).add_modifier(Modifier::BOLD)
        } else if percent >= WARN_PERCENT {
            Style::default().fg(self.warning)
        } else {
            Style::default().fg(self.healthy)
        }
    }

    /// Style for a feed status.
    pub fn status_style(&self, status: &FeedStatus) -> Style {
        match status {
            FeedStatus::Idle => Style::default().add_modifier(Modifier::DIM),
            FeedStatus::Running => Style::default().fg(self.healthy),
            FeedStatus::Error(_) => Style::default().fg(self.warning),
            FeedStatus::Unauthenticated => {
                Style::default().fg(self.critical).add_modifier(Modifier::BOLD)
            }
        }
    }

    /// Line color for the `index`-th chart series.
    pub fn series_color(&self, index: usize) -> Color {
        self.series[index % self.series.len()]
    }
}
