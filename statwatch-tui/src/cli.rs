//! Command-line arguments.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use crate::config::Settings;
use crate::duration::parse_duration;

#[derive(Parser, Debug, Default)]
#[command(name = "statwatch")]
#[command(about = "Live terminal dashboard for backend and database health")]
pub struct Args {
    /// Backend API base URL (e.g. http://localhost:8080/api)
    #[arg(long)]
    pub url: Option<String>,

    /// Username to sign in with
    #[arg(short, long)]
    pub username: Option<String>,

    /// Password to sign in with
    #[arg(long)]
    pub password: Option<String>,

    /// Poll interval (e.g. "2s", "500ms")
    #[arg(short, long)]
    pub interval: Option<String>,

    /// Number of samples kept in the chart window
    #[arg(long)]
    pub history: Option<usize>,

    /// Run offline on generated series instead of polling a backend
    #[arg(short, long, value_delimiter = ',', num_args = 1..)]
    pub synthetic: Option<Vec<String>>,

    /// Path to a TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write logs to this file (filter with STATWATCH_LOG)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Request timeout for backend calls (e.g. "10s")
    #[arg(long)]
    pub timeout: Option<String>,
}

impl Args {
    /// Apply flags on top of file and environment settings.
    pub fn apply(&self, settings: &mut Settings) -> Result<()> {
        if let Some(url) = &self.url {
            settings.base_url = url.clone();
        }
        if let Some(username) = &self.username {
            settings.username = Some(username.clone());
        }
        if let Some(password) = &self.password {
            settings.password = Some(password.clone());
        }
        if let Some(interval) = &self.interval {
            let interval = parse_duration(interval).context("invalid --interval")?;
            settings.interval_ms = interval.as_millis() as u64;
        }
        if let Some(history) = self.history {
            settings.history_len = history;
        }
        if let Some(series) = &self.synthetic {
            settings.synthetic_series = series
                .iter()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect();
        }
        if let Some(timeout) = &self.timeout {
            let timeout = parse_duration(timeout).context("invalid --timeout")?;
            settings.timeout_ms = timeout.as_millis() as u64;
        }

        if settings.interval_ms == 0 {
            bail!("poll interval must be at least 1ms");
        }
        Ok(())
    }
}
