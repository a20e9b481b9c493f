//! Bounded history of samples for the scrolling chart.

use std::collections::VecDeque;

use statwatch_types::{SampleData, SystemStats};
use tokio::time::Instant;

/// Default number of samples kept in the window.
pub const DEFAULT_HISTORY_LEN: usize = 20;

/// One timestamped observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Position within the current run, starting at 0.
    pub seq: u64,
    /// Monotonic capture time.
    pub captured_at: Instant,
    /// Wall-clock capture time in milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
    /// The observed values.
    pub data: SampleData,
}

impl Sample {
    /// Value of one series in this sample.
    pub fn value(&self, series: &str) -> Option<f64> {
        self.data.value(series)
    }

    /// The structured stats record, for samples from the remote source.
    pub fn stats(&self) -> Option<&SystemStats> {
        self.data.stats()
    }
}

/// Fixed-capacity FIFO window of samples.
///
/// Samples are kept in insertion order; once the window is full every push
/// evicts the oldest sample.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LEN)
    }
}

impl HistoryBuffer {
    /// Create an empty window holding at most `capacity` samples (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, returning the evicted one if the window was full.
    pub fn push(&mut self, sample: Sample) -> Option<Sample> {
        let evicted = if self.samples.len() == self.capacity {
            self.samples.pop_front()
        } else {
            None
        };
        self.samples.push_back(sample);
        evicted
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent sample.
    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    /// Oldest sample still in the window.
    pub fn oldest(&self) -> Option<&Sample> {
        self.samples.front()
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Copy the window out, oldest first.
    pub fn to_vec(&self) -> Vec<Sample> {
        self.samples.iter().cloned().collect()
    }
}

/// Chart points `(seq, value)` for one series across a run of samples.
///
/// Samples that lack the series are skipped.
pub fn series_points(samples: &[Sample], series: &str) -> Vec<(f64, f64)> {
    samples
        .iter()
        .filter_map(|s| s.value(series).map(|v| (s.seq as f64, v)))
        .collect()
}

/// Smallest and largest value of one series, if it appears at all.
pub fn series_bounds(samples: &[Sample], series: &str) -> Option<(f64, f64)> {
    samples
        .iter()
        .filter_map(|s| s.value(series))
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
