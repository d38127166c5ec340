use std::time::Duration;

use crate::error::ConfigurationError;

/// Suffix to milliseconds multiplier (longer suffixes first)
const UNITS: &[(&str, f64)] = &[("ms", 1.0), ("s", 1_000.0), ("m", 60_000.0)];

/// Parse interval strings like "5s", "500ms", "1.5s", "2m".
///
/// A bare number is taken as milliseconds.
pub fn parse_duration(s: &str) -> Result<Duration, ConfigurationError> {
    let s = s.trim();
    let invalid = || ConfigurationError::Settings(format!("invalid duration: {s:?}"));

    let (number, multiplier) = UNITS
        .iter()
        .find_map(|(suffix, m)| s.strip_suffix(suffix).map(|n| (n, *m)))
        .unwrap_or((s, 1.0));

    let value: f64 = number.trim().parse().map_err(|_| invalid())?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid());
    }

    Ok(Duration::from_millis((value * multiplier).round() as u64))
}

/// Format a duration for display
pub fn format_duration(d: Duration) -> String {
    let millis = d.as_millis();
    if millis < 1_000 {
        format!("{}ms", millis)
    } else if millis < 60_000 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m{:02}s", millis / 60_000, (millis / 1_000) % 60)
    }
}
