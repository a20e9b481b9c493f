//! # statwatch-feed
//!
//! A bounded real-time telemetry feed. A [`TelemetryFeed`] pulls one sample
//! per tick from a [`SampleSource`], keeps the most recent samples in a
//! fixed-size window and tells observers about every change.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use statwatch_feed::{FeedStatus, RemoteSource, TelemetryFeed};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = RemoteSource::builder()
//!         .base_url("http://localhost:8080/api")
//!         .build()?;
//!
//!     let feed = TelemetryFeed::builder(source)
//!         .interval(Duration::from_secs(2))
//!         .history_len(20)
//!         .build();
//!
//!     feed.on_snapshot(|snapshot| {
//!         if let FeedStatus::Error(msg) = &snapshot.status {
//!             eprintln!("{}", msg);
//!         }
//!     });
//!     feed.on_unauthenticated(|| eprintln!("please log in again"));
//!
//!     feed.start()?;
//!     tokio::time::sleep(Duration::from_secs(10)).await;
//!     feed.stop();
//!     Ok(())
//! }
//! ```
//!
//! ## Failure handling
//!
//! - **Soft failures** (unreachable backend, 5xx, malformed payload) set the
//!   status to `Error` and are retried on the next tick. The window keeps the
//!   last good samples.
//! - **Hard failures** (401/403) set the status to `Unauthenticated`, notify
//!   the unauthenticated observers once and stop polling.
//!
//! ## Features
//!
//! - `remote` (default): [`RemoteSource`] and [`Session`] over HTTP

mod error;
mod feed;
mod history;
#[cfg(feature = "remote")]
mod session;
mod source;

pub use error::{FeedError, SourceError};
#[cfg(feature = "remote")]
pub use error::SessionError;
pub use feed::{FeedSnapshot, RunGuard, TelemetryFeed, TelemetryFeedBuilder, DEFAULT_INTERVAL};
pub use history::{series_bounds, series_points, HistoryBuffer, Sample, DEFAULT_HISTORY_LEN};
#[cfg(feature = "remote")]
pub use session::Session;
#[cfg(feature = "remote")]
pub use source::{RemoteSource, RemoteSourceBuilder, STATS_PATH};
pub use source::{SampleSource, SyntheticSource, BASE_RANGE, SPIKE_PROBABILITY, SPIKE_RANGE};

// Re-export types for convenience
pub use statwatch_types::{BackendStats, DatabaseHealth, FeedStatus, SampleData, SystemStats};
