//! Local client settings.
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file, then `VISION_*` environment variables (`__` separates nested keys,
//! e.g. `VISION_MONITOR__BOTTOM_THRESHOLD`). Command-line flags are applied
//! on top by the binary.
//!
//! ```toml
//! base_url = "http://vision.internal:5000"
//! poll_mode = "combined"
//! request_timeout_ms = 10000
//! log_file = "vision.log"
//! log_level = "info"
//!
//! [monitor]
//! bottom_threshold = 2
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use reqwest::Url;
use serde::Deserialize;

use crate::poll::PollMode;
use crate::source::DEFAULT_BASE_URL;

/// Settings file read when `--config` is not given, if it exists.
pub const DEFAULT_CONFIG_FILE: &str = "vision.toml";

const ENV_PREFIX: &str = "VISION";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub base_url: String,
    pub poll_mode: PollMode,
    pub request_timeout_ms: u64,
    pub log_file: Option<PathBuf>,
    pub log_level: String,
    pub monitor: MonitorSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    /// Rows from the bottom of the board at which auto-scroll wraps to the top.
    pub bottom_threshold: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_mode: PollMode::Combined,
            request_timeout_ms: 10_000,
            log_file: None,
            log_level: "info".to_string(),
            monitor: MonitorSettings::default(),
        }
    }
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            bottom_threshold: 2,
        }
    }
}

impl Settings {
    /// Load settings from `path` (which must exist) or from
    /// [`DEFAULT_CONFIG_FILE`] if present, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Like [`Settings::load`], reading environment variables from `env`
    /// instead of the process environment when given.
    pub fn load_with_env(path: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false),
        };

        let config = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .with_context(|| match path {
                Some(path) => format!("Failed to load settings from {}", path.display()),
                None => "Failed to load settings".to_string(),
            })?;

        config.try_deserialize().context("Invalid settings")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Whether the base URL asks to launch in monitor mode (`?mode=monitor`).
    pub fn monitor_requested(&self) -> bool {
        Url::parse(&self.base_url)
            .map(|url| url.query_pairs().any(|(k, v)| k == "mode" && v == "monitor"))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn no_env() -> Option<HashMap<String, String>> {
        Some(HashMap::new())
    }

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");

        // An explicit path must exist.
        assert!(Settings::load_with_env(Some(&missing), no_env()).is_err());

        let settings = Settings::default();
        assert_eq!(settings.base_url, "http://localhost:5000");
        assert_eq!(settings.poll_mode, PollMode::Combined);
        assert_eq!(settings.request_timeout(), Duration::from_secs(10));
        assert_eq!(settings.monitor.bottom_threshold, 2);
    }

    #[test]
    fn test_load_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
base_url = "http://vision.internal:8080"
poll_mode = "split"
log_file = "/tmp/vision.log"

[monitor]
bottom_threshold = 5
"#
        )
        .unwrap();

        let settings = Settings::load_with_env(Some(file.path()), no_env()).unwrap();
        assert_eq!(settings.base_url, "http://vision.internal:8080");
        assert_eq!(settings.poll_mode, PollMode::Split);
        assert_eq!(settings.log_file, Some(PathBuf::from("/tmp/vision.log")));
        assert_eq!(settings.monitor.bottom_threshold, 5);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "request_timeout_ms = 2000").unwrap();

        let env = HashMap::from([
            ("VISION_REQUEST_TIMEOUT_MS".to_string(), "500".to_string()),
            ("VISION_MONITOR__BOTTOM_THRESHOLD".to_string(), "7".to_string()),
        ]);

        let settings = Settings::load_with_env(Some(file.path()), Some(env)).unwrap();
        assert_eq!(settings.request_timeout_ms, 500);
        assert_eq!(settings.monitor.bottom_threshold, 7);
    }

    #[test]
    fn test_invalid_poll_mode() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "poll_mode = \"sometimes\"").unwrap();

        assert!(Settings::load_with_env(Some(file.path()), no_env()).is_err());
    }

    #[test]
    fn test_monitor_requested_from_query() {
        let mut settings = Settings::default();
        assert!(!settings.monitor_requested());

        settings.base_url = "http://vision.internal:5000/?mode=monitor".to_string();
        assert!(settings.monitor_requested());

        settings.base_url = "http://vision.internal:5000/?theme=dark&mode=normal".to_string();
        assert!(!settings.monitor_requested());

        settings.base_url = "not a url".to_string();
        assert!(!settings.monitor_requested());
    }
}
