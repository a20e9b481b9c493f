//! Layered settings: defaults, an optional TOML file, then `STATWATCH_*`
//! environment variables. Command-line flags are applied on top by
//! [`Args::apply`](crate::cli::Args::apply).
//!
//! ```toml
//! base_url = "https://monitor.example.com/api"
//! username = "ops"
//! password = "hunter2"
//! interval_ms = 2000
//! history_len = 20
//! timeout_ms = 10000
//! # Leave empty to poll the backend; set to run offline.
//! synthetic_series = []
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

/// Prefix of the environment variables read by [`Settings::load`].
pub const ENV_PREFIX: &str = "STATWATCH";

/// Default backend API root.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Resolved dashboard settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub base_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub interval_ms: u64,
    pub history_len: usize,
    pub timeout_ms: u64,
    /// Series names for offline mode. Empty means poll the backend.
    pub synthetic_series: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            username: None,
            password: None,
            interval_ms: 2_000,
            history_len: statwatch_feed::DEFAULT_HISTORY_LEN,
            timeout_ms: 10_000,
            synthetic_series: Vec::new(),
        }
    }
}

impl Settings {
    /// Load settings from an optional config file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, environment())
    }

    fn load_with(path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder
            .add_source(env)
            .build()
            .with_context(|| match path {
                Some(path) => format!("failed to read config from {}", path.display()),
                None => "failed to read config from environment".to_string(),
            })?;

        config
            .try_deserialize()
            .context("invalid statwatch settings")
    }

    /// Tick interval of the feed.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Per-request timeout for backend calls.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Whether the dashboard runs offline on generated series.
    pub fn is_synthetic(&self) -> bool {
        !self.synthetic_series.is_empty()
    }

    /// Username and password, when both are configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("synthetic_series")
}
