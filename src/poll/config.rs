//! Poll and scroll intervals, resolved from the backend's `/api/config`.

use std::time::Duration;

use tracing::warn;

use super::PollMode;
use crate::source::{Backend, RemoteConfig};

/// Interval used for polling when the backend config cannot be fetched.
pub const FALLBACK_INTERVAL: Duration = Duration::from_millis(15_000);
/// Health poll interval of the split (inventory + health) flow when the backend does not set one.
pub const LEGACY_HEALTH_INTERVAL: Duration = Duration::from_millis(30_000);
/// Full dashboard refresh interval when the backend does not set one.
pub const DEFAULT_FULL_INTERVAL: Duration = Duration::from_millis(60_000);
pub const DEFAULT_SCROLL_INTERVAL: Duration = Duration::from_millis(8_000);
pub const DEFAULT_SCROLL_FRACTION: f64 = 0.8;

/// Timing for polling and monitor-mode scrolling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollConfig {
    /// Period of the health-only poll.
    pub health_interval: Duration,
    /// Period of the combined inventory + health poll.
    pub full_interval: Duration,
    /// Period of the monitor-mode auto-scroll.
    pub scroll_interval: Duration,
    /// Share of the viewport height advanced per scroll step, in `(0, 1]`.
    pub scroll_fraction: f64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::fallback()
    }
}

impl PollConfig {
    /// Hardcoded timing used when `/api/config` is unavailable.
    pub fn fallback() -> Self {
        Self {
            health_interval: FALLBACK_INTERVAL,
            full_interval: FALLBACK_INTERVAL,
            scroll_interval: DEFAULT_SCROLL_INTERVAL,
            scroll_fraction: DEFAULT_SCROLL_FRACTION,
        }
    }

    /// Resolve timing from the backend config.
    ///
    /// Missing fields take the defaults for `mode`; invalid ones (zero
    /// intervals, a scroll share outside `(0, 1]`) are replaced by defaults
    /// with a warning.
    pub fn from_remote(remote: &RemoteConfig, mode: PollMode) -> Self {
        let health_default = match mode {
            PollMode::Combined => FALLBACK_INTERVAL,
            PollMode::Split => LEGACY_HEALTH_INTERVAL,
        };

        Self {
            health_interval: interval_or(
                remote.health_check_interval_ms,
                health_default,
                "healthCheckIntervalMs",
            ),
            full_interval: interval_or(
                remote.dashboard_refresh_interval_ms,
                DEFAULT_FULL_INTERVAL,
                "dashboardRefreshIntervalMs",
            ),
            scroll_interval: interval_or(
                remote.monitor_scroll_interval_ms,
                DEFAULT_SCROLL_INTERVAL,
                "monitorScrollIntervalMs",
            ),
            scroll_fraction: remote
                .monitor_scroll_percentage
                .map(scroll_fraction)
                .unwrap_or(DEFAULT_SCROLL_FRACTION),
        }
    }

    /// Fetch `/api/config` once.
    ///
    /// Never fails: on error the fallback timing is returned together with a
    /// message suitable for the status bar.
    pub async fn load(backend: &dyn Backend, mode: PollMode) -> (Self, Option<String>) {
        match backend.config().await {
            Ok(remote) => (Self::from_remote(&remote, mode), None),
            Err(e) => {
                warn!(error = %e, "config fetch failed, using fallback intervals");
                (
                    Self::fallback(),
                    Some(format!(
                        "Config unavailable ({}), polling every {}s",
                        e,
                        FALLBACK_INTERVAL.as_secs()
                    )),
                )
            }
        }
    }
}

fn interval_or(ms: Option<u64>, default: Duration, field: &str) -> Duration {
    match ms {
        Some(0) => {
            warn!(field, "zero interval in backend config, using default");
            default
        }
        Some(ms) => Duration::from_millis(ms),
        None => default,
    }
}

/// Values above 1 are percentages; values in `(0, 1]` are already fractions.
fn scroll_fraction(value: f64) -> f64 {
    let fraction = if value > 1.0 { value / 100.0 } else { value };
    if fraction.is_finite() && fraction > 0.0 && fraction <= 1.0 {
        fraction
    } else {
        warn!(value, "monitorScrollPercentage out of range, using default");
        DEFAULT_SCROLL_FRACTION
    }
}
