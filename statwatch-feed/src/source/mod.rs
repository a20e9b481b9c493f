//! Sample source abstraction.
//!
//! A source answers one question per tick: "what is the value now?". The
//! feed does not care whether that comes from the stats endpoint or from a
//! random generator, which keeps scheduling, buffering and error
//! classification independent of the data's origin.

#[cfg(feature = "remote")]
mod remote;
mod synthetic;

#[cfg(feature = "remote")]
pub use remote::{RemoteSource, RemoteSourceBuilder, STATS_PATH};
pub use synthetic::{SyntheticSource, BASE_RANGE, SPIKE_PROBABILITY, SPIKE_RANGE};

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use statwatch_types::SampleData;

use crate::SourceError;

/// Something the feed can pull one sample from per tick.
///
/// Sources are created once and reused for every tick, so implementations
/// should hold long-lived resources (HTTP clients, generators) themselves.
///
/// # Example
///
/// ```
/// use statwatch_feed::{SampleSource, SyntheticSource};
///
/// # tokio_test::block_on(async {
/// let source = SyntheticSource::new(["latency"]);
/// let data = source.fetch_sample().await.unwrap();
/// assert!(data.value("latency").is_some());
/// # });
/// ```
#[async_trait]
pub trait SampleSource: Send + Sync + Debug {
    /// Fetch one sample.
    async fn fetch_sample(&self) -> Result<SampleData, SourceError>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the dashboard status bar.
    fn description(&self) -> &str;
}

#[async_trait]
impl<S: SampleSource + ?Sized> SampleSource for Arc<S> {
    async fn fetch_sample(&self) -> Result<SampleData, SourceError> {
        (**self).fetch_sample().await
    }

    fn description(&self) -> &str {
        (**self).description()
    }
}
