//! Synthetic data source.
//!
//! Generates latency-like values locally, one per tracked series. Useful for
//! running the dashboard without a backend and for exercising the feed in
//! tests.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use statwatch_types::SampleData;

use super::SampleSource;
use crate::SourceError;

/// Range the baseline value is drawn from.
pub const BASE_RANGE: Range<f64> = 20.0..80.0;

/// Range an outlier spike is drawn from.
pub const SPIKE_RANGE: Range<f64> = 0.0..100.0;

/// Chance that a draw carries a spike on top of its baseline.
pub const SPIKE_PROBABILITY: f64 = 0.1;

/// A source that produces `base + spike` per series on every fetch.
///
/// The generator is injectable so tests can replay a fixed sequence:
///
/// ```
/// use rand::{rngs::StdRng, SeedableRng};
/// use statwatch_feed::SyntheticSource;
///
/// let source = SyntheticSource::with_rng(["A", "B"], StdRng::seed_from_u64(7));
/// assert_eq!(source.series(), ["A", "B"]);
/// ```
pub struct SyntheticSource<R = StdRng> {
    series: Vec<String>,
    rng: Mutex<R>,
    description: String,
}

impl SyntheticSource<StdRng> {
    /// Create a source for the given series, seeded from the OS.
    pub fn new<I, S>(series: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_rng(series, StdRng::from_os_rng())
    }
}

impl<R: Rng + Send> SyntheticSource<R> {
    /// Create a source that draws from the given generator.
    ///
    /// Series names are unique within a source; repeats are dropped.
    pub fn with_rng<I, S>(series: I, rng: R) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = Vec::new();
        for name in series {
            let name = name.into();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        let description = format!("synthetic: {}", names.join(", "));
        Self {
            series: names,
            rng: Mutex::new(rng),
            description,
        }
    }

    /// Names of the tracked series, in construction order.
    pub fn series(&self) -> &[String] {
        &self.series
    }

    /// Draw one value for every tracked series.
    pub fn generate(&self) -> BTreeMap<String, f64> {
        let mut rng = self.rng.lock();
        self.series
            .iter()
            .map(|name| (name.clone(), draw(&mut *rng)))
            .collect()
    }
}

/// One value: a uniform baseline plus an occasional outlier.
fn draw<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let base = rng.random_range(BASE_RANGE);
    let spike = if rng.random_bool(SPIKE_PROBABILITY) {
        rng.random_range(SPIKE_RANGE)
    } else {
        0.0
    };
    base + spike
}

#[async_trait]
impl<R: Rng + Send + 'static> SampleSource for SyntheticSource<R> {
    async fn fetch_sample(&self) -> Result<SampleData, SourceError> {
        Ok(SampleData::Scalars(self.generate()))
    }

    fn description(&self) -> &str {
        &self.description
    }
}

impl<R> fmt::Debug for SyntheticSource<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntheticSource")
            .field("series", &self.series)
            .finish()
    }
}
