//! The aggregate system stats record served by `GET /system-stats`.

use std::collections::BTreeMap;
use std::fmt;

/// One reading of backend and database health.
///
/// Field names follow the wire format, so with the `serde` feature this
/// type decodes the endpoint body directly.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SystemStats {
    /// Process and host resource usage.
    pub backend: BackendStats,
    /// Connection pool state of the backend's database.
    pub database: DatabaseHealth,
    /// Server-side RFC 3339 capture time.
    pub timestamp: String,
}

/// Resource usage of the backend host and runtime.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BackendStats {
    /// Host CPU utilisation, 0-100.
    pub cpu_percent: f64,
    /// Total host memory in MB.
    pub memory_total_mb: u64,
    /// Used host memory in MB.
    pub memory_used_mb: u64,
    /// Used host memory, 0-100.
    pub memory_percent: f64,
    /// Live goroutines (or threads) in the backend runtime.
    pub goroutines: u64,
    /// Heap currently allocated by the backend runtime, in MB.
    #[cfg_attr(feature = "serde", serde(rename = "go_alloc_mb"))]
    pub alloc_mb: u64,
}

/// Database health as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "wire::DatabaseWire", into = "wire::DatabaseWire")
)]
pub enum DatabaseHealth {
    /// The pool is up; counters are always present.
    Connected {
        open_connections: u32,
        in_use: u32,
        idle: u32,
        /// Server version string, when the backend could query it.
        version: Option<String>,
    },
    /// The backend could not reach its database.
    Disconnected {
        /// Driver error text, if the backend sent one.
        error: Option<String>,
    },
}

impl DatabaseHealth {
    pub fn is_connected(&self) -> bool {
        matches!(self, DatabaseHealth::Connected { .. })
    }
}

impl SystemStats {
    /// Flatten the record into named scalar series for charting.
    ///
    /// Pool counters are only present while the database is connected.
    pub fn series(&self) -> BTreeMap<String, f64> {
        let mut series = BTreeMap::new();
        series.insert("cpu_percent".to_string(), self.backend.cpu_percent);
        series.insert("memory_percent".to_string(), self.backend.memory_percent);
        series.insert(
            "memory_used_mb".to_string(),
            self.backend.memory_used_mb as f64,
        );
        series.insert("goroutines".to_string(), self.backend.goroutines as f64);
        series.insert("alloc_mb".to_string(), self.backend.alloc_mb as f64);

        if let DatabaseHealth::Connected {
            open_connections,
            in_use,
            idle,
            ..
        } = &self.database
        {
            series.insert("db_open_connections".to_string(), *open_connections as f64);
            series.insert("db_in_use".to_string(), *in_use as f64);
            series.insert("db_idle".to_string(), *idle as f64);
        }

        series
    }
}

/// A payload that parsed as JSON but does not describe a valid record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedPayload(pub String);

impl fmt::Display for MalformedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed payload: {}", self.0)
    }
}

impl std::error::Error for MalformedPayload {}

#[cfg(feature = "serde")]
mod wire {
    use super::{DatabaseHealth, MalformedPayload};

    /// Flat database record as it appears on the wire.
    #[derive(serde::Serialize, serde::Deserialize)]
    pub struct DatabaseWire {
        status: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        open_connections: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        in_use: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        idle: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        version: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    }

    impl TryFrom<DatabaseWire> for DatabaseHealth {
        type Error = MalformedPayload;

        fn try_from(wire: DatabaseWire) -> Result<Self, Self::Error> {
            match wire.status.as_str() {
                "connected" => {
                    let missing = |field: &str| {
                        MalformedPayload(format!("connected database without `{}`", field))
                    };
                    Ok(DatabaseHealth::Connected {
                        open_connections: wire
                            .open_connections
                            .ok_or_else(|| missing("open_connections"))?,
                        in_use: wire.in_use.ok_or_else(|| missing("in_use"))?,
                        idle: wire.idle.ok_or_else(|| missing("idle"))?,
                        version: wire.version,
                    })
                }
                "disconnected" => Ok(DatabaseHealth::Disconnected { error: wire.error }),
                other => Err(MalformedPayload(format!(
                    "unknown database status `{}`",
                    other
                ))),
            }
        }
    }

    impl From<DatabaseHealth> for DatabaseWire {
        fn from(health: DatabaseHealth) -> Self {
            match health {
                DatabaseHealth::Connected {
                    open_connections,
                    in_use,
                    idle,
                    version,
                } => DatabaseWire {
                    status: "connected".to_string(),
                    open_connections: Some(open_connections),
                    in_use: Some(in_use),
                    idle: Some(idle),
                    version,
                    error: None,
                },
                DatabaseHealth::Disconnected { error } => DatabaseWire {
                    status: "disconnected".to_string(),
                    open_connections: None,
                    in_use: None,
                    idle: None,
                    version: None,
                    error,
                },
            }
        }
    }
}
