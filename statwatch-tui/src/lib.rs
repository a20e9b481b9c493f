//! # statwatch-tui
//!
//! A terminal dashboard for backend and database health, built on
//! [`statwatch_feed`].
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │  main thread                     tokio runtime            │
//! │  ┌────────┐  keys   ┌──────────┐  start/stop  ┌─────────┐ │
//! │  │ events │───────▶│ FeedHost │────────────▶│  feed   │ │
//! │  └────────┘ Action  └────┬─────┘              └────┬────┘ │
//! │                          │ FeedEvent (channel)     │      │
//! │  ┌────────┐  render ┌────▼─────┐◀──────────────────┘      │
//! │  │   ui   │◀────────│   app    │   observers              │
//! │  └────────┘         └──────────┘                          │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: application state, screens and user actions
//! - **[`host`]**: session and feed lifecycle (sign in, pause, sign out)
//! - **[`config`]** / **[`cli`]**: layered settings and command-line flags
//! - **[`ui`]**: ratatui rendering and themes
//!
//! ## Usage
//!
//! ```bash
//! # Poll a backend, signing in first
//! statwatch --url http://localhost:8080/api -u ops --password secret
//!
//! # Run offline on generated series
//! statwatch --synthetic cpu,latency,queue --interval 500ms
//!
//! # Keep a debug log while the UI owns the terminal
//! STATWATCH_LOG=statwatch_feed=debug statwatch --log-file statwatch.log
//! ```

pub mod app;
pub mod cli;
pub mod config;
pub mod duration;
pub mod events;
pub mod host;
pub mod logging;
pub mod ui;

pub use app::{Action, App, FeedEvent, Screen};
pub use cli::Args;
pub use config::Settings;
pub use host::FeedHost;
pub use ui::Theme;
