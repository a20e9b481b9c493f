//! Sample payloads produced by a sample source.

use std::collections::BTreeMap;

use crate::SystemStats;

/// The value part of one observation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SampleData {
    /// One scalar per tracked series, keyed by series name.
    Scalars(BTreeMap<String, f64>),
    /// A structured record from the remote stats endpoint.
    Stats(SystemStats),
}

impl SampleData {
    /// Named scalar values carried by this payload.
    ///
    /// For structured records the series are implicit, one per reported metric.
    pub fn series(&self) -> BTreeMap<String, f64> {
        match self {
            SampleData::Scalars(values) => values.clone(),
            SampleData::Stats(stats) => stats.series(),
        }
    }

    /// Value of a single series, if present.
    pub fn value(&self, series: &str) -> Option<f64> {
        match self {
            SampleData::Scalars(values) => values.get(series).copied(),
            SampleData::Stats(stats) => stats.series().get(series).copied(),
        }
    }

    /// The structured record, if this payload came from the stats endpoint.
    pub fn stats(&self) -> Option<&SystemStats> {
        match self {
            SampleData::Stats(stats) => Some(stats),
            SampleData::Scalars(_) => None,
        }
    }
}
