//! # statwatch-types
//!
//! Core types shared by the statwatch feed and dashboard. This crate defines
//! what a single observation looks like, independent of where it came from.
//!
//! ## Design Goals
//!
//! - **Zero required dependencies**: Core types work without any serialization framework
//! - **Optional serialization**: Enable the `serde` feature to decode the
//!   `/system-stats` payload directly
//! - **Strict decoding**: A payload that claims a connected database but omits
//!   its pool counters is rejected instead of being filled with defaults
//!
//! ## Features
//!
//! - `serde`: JSON (de)serialization via serde
//!
//! ## Example
//!
//! ```rust
//! use statwatch_types::{BackendStats, DatabaseHealth, SampleData, SystemStats};
//!
//! let stats = SystemStats {
//!     backend: BackendStats {
//!         cpu_percent: 12.5,
//!         memory_total_mb: 16000,
//!         memory_used_mb: 8000,
//!         memory_percent: 50.0,
//!         goroutines: 9,
//!         alloc_mb: 3,
//!     },
//!     database: DatabaseHealth::Connected {
//!         open_connections: 2,
//!         in_use: 1,
//!         idle: 1,
//!         version: None,
//!     },
//!     timestamp: "2024-05-01T10:00:00Z".to_string(),
//! };
//!
//! let data = SampleData::Stats(stats);
//! assert_eq!(data.series().get("cpu_percent"), Some(&12.5));
//! ```

mod sample;
mod stats;
mod status;

pub use sample::*;
pub use stats::*;
pub use status::*;
