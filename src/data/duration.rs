use std::time::Duration;

use anyhow::{bail, Result};

/// Suffix to milliseconds multiplier (order matters: longer suffixes first)
const UNITS: &[(&str, f64)] = &[("ms", 1.0), ("s", 1_000.0), ("m", 60_000.0)];

/// Parse interval strings like "15s", "500ms", "1.5m"; a bare number is milliseconds.
pub fn parse_interval(s: &str) -> Result<Duration> {
    let s = s.trim();

    for (suffix, multiplier) in UNITS {
        if let Some(val_str) = s.strip_suffix(suffix) {
            let val: f64 = val_str.trim().parse()?;
            return to_duration(val * multiplier, s);
        }
    }

    match s.parse::<f64>() {
        Ok(ms) => to_duration(ms, s),
        Err(_) => bail!("Unknown interval format: {}", s),
    }
}

fn to_duration(ms: f64, original: &str) -> Result<Duration> {
    if !ms.is_finite() || ms <= 0.0 {
        bail!("Interval must be positive: {}", original);
    }
    Ok(Duration::from_millis(ms.round() as u64))
}

/// Format the age of a timestamp for the status bar ("4s", "2m 05s", "1h 03m")
pub fn format_age(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {:02}s", secs / 60, secs % 60)
    } else {
        format!("{}h {:02}m", secs / 3600, (secs % 3600) / 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seconds() {
        assert_eq!(parse_interval("15s").unwrap(), Duration::from_secs(15));
    }

    #[test]
    fn test_parse_milliseconds() {
        assert_eq!(parse_interval("8000ms").unwrap(), Duration::from_millis(8000));
        assert_eq!(parse_interval("250").unwrap(), Duration::from_millis(250));
    }

    #[test]
    fn test_parse_minutes() {
        assert_eq!(parse_interval("1.5m").unwrap(), Duration::from_secs(90));
    }

    #[test]
    fn test_parse_rejects_zero_and_garbage() {
        assert!(parse_interval("0s").is_err());
        assert!(parse_interval("-5").is_err());
        assert!(parse_interval("soon").is_err());
    }

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(Duration::from_secs(4)), "4s");
        assert_eq!(format_age(Duration::from_secs(125)), "2m 05s");
        assert_eq!(format_age(Duration::from_secs(3780)), "1h 03m");
    }
}
