//! Application state.

use std::time::{Duration, Instant};

use statwatch_feed::{FeedSnapshot, FeedStatus};

use crate::ui::Theme;

/// How long a status message stays in the status bar.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// Which full-screen view is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Gauges, database panel and chart.
    Dashboard,
    /// The backend rejected the session; waiting for sign-in or quit.
    SessionExpired,
}

/// Something the feed reported, forwarded from its observers.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    Snapshot(FeedSnapshot),
    Unauthenticated,
}

/// A key press that needs the feed host to act.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop polling, or start again.
    TogglePause,
    /// Log out and show the session-expired screen.
    SignOut,
    /// Log in again and mount a fresh feed.
    SignIn,
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub screen: Screen,
    pub show_help: bool,
    pub paused: bool,

    // Feed
    pub snapshot: FeedSnapshot,
    pub source_description: String,
    pub interval: Duration,
    pub history_len: usize,
    pub last_update: Option<Instant>,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    pub fn new(
        source_description: impl Into<String>,
        interval: Duration,
        history_len: usize,
        theme: Theme,
    ) -> Self {
        Self {
            running: true,
            screen: Screen::Dashboard,
            show_help: false,
            paused: false,
            snapshot: FeedSnapshot::default(),
            source_description: source_description.into(),
            interval,
            history_len: history_len.max(1),
            last_update: None,
            theme,
            status_message: None,
        }
    }

    /// Current feed status as last reported.
    pub fn status(&self) -> &FeedStatus {
        &self.snapshot.status
    }

    /// Fold a feed event into the state.
    pub fn apply(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::Snapshot(snapshot) => {
                // Queued before a pause or expiry; the feed has moved on
                if self.paused || self.screen == Screen::SessionExpired {
                    return;
                }
                self.snapshot = snapshot;
                self.last_update = Some(Instant::now());
            }
            FeedEvent::Unauthenticated => {
                self.snapshot.status = FeedStatus::Unauthenticated;
                self.expire_session();
            }
        }
    }

    /// Switch to the session-expired screen.
    pub fn expire_session(&mut self) {
        self.screen = Screen::SessionExpired;
        self.paused = false;
        self.show_help = false;
    }

    /// Return to a clean dashboard after a fresh feed was mounted.
    pub fn reset(&mut self, source_description: impl Into<String>) {
        self.screen = Screen::Dashboard;
        self.paused = false;
        self.snapshot = FeedSnapshot {
            status: FeedStatus::Running,
            ..FeedSnapshot::default()
        };
        self.source_description = source_description.into();
        self.last_update = None;
    }

    /// Record that polling was stopped or resumed by the user.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
        self.snapshot.status = if paused {
            FeedStatus::Idle
        } else {
            FeedStatus::Running
        };
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, time)) if time.elapsed() < STATUS_MESSAGE_TTL => Some(msg),
            _ => None,
        }
    }
}
