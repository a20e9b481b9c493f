//! Owns the session and the mounted feed, and turns user actions into
//! feed lifecycle calls.
//!
//! The UI loop runs on the main thread; the feed ticks on a tokio runtime.
//! Observers forward snapshots over a channel that the loop drains between
//! frames.

use anyhow::{Context, Result};
use statwatch_feed::{FeedStatus, Session, SyntheticSource, TelemetryFeed};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::app::{Action, App, FeedEvent};
use crate::config::Settings;

/// The running side of the dashboard.
pub struct FeedHost {
    settings: Settings,
    runtime: Handle,
    session: Option<Session>,
    feed: Option<TelemetryFeed>,
    events_tx: mpsc::UnboundedSender<FeedEvent>,
    events_rx: mpsc::UnboundedReceiver<FeedEvent>,
}

impl FeedHost {
    /// Create a host. Nothing is fetched until [`connect`](Self::connect).
    pub fn new(settings: Settings, runtime: Handle) -> Result<Self> {
        let session = if settings.is_synthetic() {
            None
        } else {
            let session = Session::new(settings.base_url.clone(), settings.timeout())
                .context("failed to set up HTTP client")?;
            Some(session)
        };

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Ok(Self {
            settings,
            runtime,
            session,
            feed: None,
            events_tx,
            events_rx,
        })
    }

    /// Whether the dashboard runs on generated series.
    pub fn is_synthetic(&self) -> bool {
        self.session.is_none()
    }

    /// Description of the mounted source, or of the configured backend.
    pub fn description(&self) -> String {
        match (&self.feed, &self.session) {
            (Some(feed), _) => feed.source_description().to_string(),
            (None, Some(session)) => session.base_url().to_string(),
            (None, None) => "offline".to_string(),
        }
    }

    /// Status of the mounted feed.
    pub fn status(&self) -> Option<FeedStatus> {
        self.feed.as_ref().map(TelemetryFeed::status)
    }

    /// Sign in when credentials are configured, then mount a fresh feed.
    pub fn connect(&mut self) -> Result<()> {
        self.unmount();

        if let (Some(session), Some((username, password))) =
            (&self.session, self.settings.credentials())
        {
            self.runtime
                .block_on(session.login(username, password))
                .context("sign-in failed")?;
        }

        self.mount()
    }

    /// Stop the mounted feed, log out, and keep nothing running.
    pub fn sign_out(&mut self) {
        self.unmount();
        if let Some(session) = &self.session {
            if let Err(e) = self.runtime.block_on(session.logout()) {
                warn!("continuing after failed logout: {}", e);
            }
        }
    }

    /// Stop or restart polling on the mounted feed.
    pub fn set_paused(&self, paused: bool) -> Result<()> {
        let Some(feed) = &self.feed else {
            return Ok(());
        };

        if paused {
            feed.stop();
        } else {
            let _guard = self.runtime.enter();
            feed.start()?;
        }
        Ok(())
    }

    /// Next pending feed event, if any.
    pub fn next_event(&mut self) -> Option<FeedEvent> {
        self.events_rx.try_recv().ok()
    }

    /// Carry out a user action and update the app to match.
    pub fn perform(&mut self, app: &mut App, action: Action) {
        match action {
            Action::TogglePause => {
                let paused = !app.paused;
                match self.set_paused(paused) {
                    Ok(()) => {
                        app.set_paused(paused);
                        app.set_status_message(if paused { "Paused" } else { "Resumed" });
                    }
                    Err(e) => app.set_status_message(format!("Resume failed: {:#}", e)),
                }
            }
            Action::SignOut => {
                if self.is_synthetic() {
                    app.set_status_message("Offline mode has no session");
                    return;
                }
                self.sign_out();
                app.expire_session();
                app.set_status_message("Signed out");
            }
            Action::SignIn => match self.connect() {
                Ok(()) => {
                    app.reset(self.description());
                    app.set_status_message("Signed in");
                }
                Err(e) => app.set_status_message(format!("{:#}", e)),
            },
        }
    }

    fn mount(&mut self) -> Result<()> {
        let builder = match &self.session {
            Some(session) => TelemetryFeed::builder(session.stats_source()),
            None => TelemetryFeed::builder(SyntheticSource::new(
                self.settings.synthetic_series.iter().cloned(),
            )),
        };
        let feed = builder
            .interval(self.settings.interval())
            .history_len(self.settings.history_len)
            .build();

        let tx = self.events_tx.clone();
        feed.on_snapshot(move |snapshot| {
            let _ = tx.send(FeedEvent::Snapshot(snapshot.clone()));
        });
        let tx = self.events_tx.clone();
        feed.on_unauthenticated(move || {
            let _ = tx.send(FeedEvent::Unauthenticated);
        });

        {
            let _guard = self.runtime.enter();
            feed.start()?;
        }
        info!("mounted feed for {}", feed.source_description());
        self.feed = Some(feed);
        Ok(())
    }

    fn unmount(&mut self) {
        if let Some(feed) = self.feed.take() {
            feed.stop();
        }
        // Anything still queued belongs to the old feed
        while self.events_rx.try_recv().is_ok() {}
    }
}

impl Drop for FeedHost {
    fn drop(&mut self) {
        self.unmount();
    }
}
