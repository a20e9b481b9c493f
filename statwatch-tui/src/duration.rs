//! Parsing and formatting of the short duration strings used on the
//! command line and in config files ("2s", "500ms", "1m").

use std::time::Duration;

use anyhow::{bail, Result};

/// Suffix to milliseconds multiplier (longer suffixes first)
const UNITS: &[(&str, f64)] = &[("ms", 1.0), ("s", 1_000.0), ("m", 60_000.0)];

/// Parse durations like "2s", "500ms", "1.5s" or "1m".
///
/// A bare number is read as milliseconds, matching the `*_ms` config keys.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    if s.is_empty() {
        bail!("empty duration");
    }

    let (number, multiplier) = UNITS
        .iter()
        .find_map(|(suffix, multiplier)| s.strip_suffix(suffix).map(|n| (n, *multiplier)))
        .unwrap_or((s, 1.0));

    let value: f64 = match number.trim().parse() {
        Ok(value) => value,
        Err(_) => bail!("Unknown duration format: {}", s),
    };
    if !value.is_finite() || value < 0.0 {
        bail!("Duration must be a non-negative number: {}", s);
    }

    Ok(Duration::from_secs_f64(value * multiplier / 1_000.0))
}

/// Format an interval compactly ("2s", "1.5s", "250ms").
pub fn format_duration(d: Duration) -> String {
    let millis = d.as_millis();
    if millis == 0 {
        "0ms".to_string()
    } else if millis < 1_000 {
        format!("{}ms", millis)
    } else if millis % 1_000 == 0 {
        format!("{}s", millis / 1_000)
    } else {
        format!("{:.1}s", d.as_secs_f64())
    }
}
