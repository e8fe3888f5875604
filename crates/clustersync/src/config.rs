//! Settings for the sync coordinator
//!
//! Loaded from (in order of priority):
//! 1. Runtime environment variable `CLUSTERWATCH_BASE_URL` (base URL only)
//! 2. JSON file (~/.config/clusterwatch/settings.json)
//! 3. Built-in defaults

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Settings filename in the clusterwatch config directory
const SETTINGS_FILE: &str = "settings.json";

/// Environment variable overriding the dashboard URL
const BASE_URL_ENV: &str = "CLUSTERWATCH_BASE_URL";

/// Longest interval or delay accepted for any timing setting
pub const MAX_DELAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Timing and endpoint settings for the coordinator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Root URL of the dashboard backend
    pub base_url: String,
    /// Idle stats refresh period
    pub background_interval_secs: u64,
    /// Stats refresh period while clusters are syncing
    pub fast_interval_secs: u64,
    /// Assumed worst-case duration of a sync job
    pub completion_delay_secs: u64,
    /// Pause between "Sync completed!" and the page reload
    pub reload_delay_secs: u64,
    /// How long a toast stays on screen before leaving
    pub toast_duration_ms: u64,
    /// Upper bound for a single HTTP request
    pub request_timeout_secs: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            background_interval_secs: 30,
            fast_interval_secs: 2,
            completion_delay_secs: 5,
            reload_delay_secs: 1,
            toast_duration_ms: 4000,
            request_timeout_secs: 10,
        }
    }
}

impl SyncSettings {
    /// Load settings from the config directory, then apply the environment
    /// override. A missing file means defaults; a malformed file is an error.
    pub fn load() -> Result<Self> {
        let settings: Self = config::load_json_or_default(SETTINGS_FILE)?;
        settings.with_env_override().validated()
    }

    /// Load settings from a specific JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let settings: Self = config::load_json_file(path)?;
        settings.validated()
    }

    /// Parse settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self =
            serde_json::from_str(json).context("Failed to parse settings JSON")?;
        settings.validated()
    }

    /// Get the default settings file path (~/.config/clusterwatch/settings.json)
    pub fn default_settings_path() -> Option<PathBuf> {
        config::config_path(SETTINGS_FILE)
    }

    fn with_env_override(mut self) -> Self {
        if let Ok(url) = std::env::var(BASE_URL_ENV)
            && !url.trim().is_empty()
        {
            self.base_url = url.trim().to_string();
        }
        self
    }

    /// Reject settings the coordinator cannot run with
    fn validated(self) -> Result<Self> {
        Url::parse(&self.base_url)
            .with_context(|| format!("Invalid base_url in settings: {}", self.base_url))?;

        if self.background_interval_secs == 0 || self.fast_interval_secs == 0 {
            anyhow::bail!("Poll intervals must be at least one second");
        }

        let timings = [
            ("background_interval_secs", self.background_interval_secs.checked_mul(1000)),
            ("fast_interval_secs", self.fast_interval_secs.checked_mul(1000)),
            ("completion_delay_secs", self.completion_delay_secs.checked_mul(1000)),
            ("reload_delay_secs", self.reload_delay_secs.checked_mul(1000)),
            ("toast_duration_ms", Some(self.toast_duration_ms)),
            ("request_timeout_secs", self.request_timeout_secs.checked_mul(1000)),
        ];
        for (name, millis) in timings {
            if millis.is_none_or(|ms| ms > MAX_DELAY.as_millis() as u64) {
                anyhow::bail!("{} is out of range (at most {}s)", name, MAX_DELAY.as_secs());
            }
        }

        Ok(self)
    }

    // Durations are capped at MAX_DELAY

    pub fn background_interval(&self) -> Duration {
        Duration::from_secs(self.background_interval_secs).min(MAX_DELAY)
    }

    pub fn fast_interval(&self) -> Duration {
        Duration::from_secs(self.fast_interval_secs).min(MAX_DELAY)
    }

    pub fn completion_delay(&self) -> Duration {
        Duration::from_secs(self.completion_delay_secs).min(MAX_DELAY)
    }

    pub fn reload_delay(&self) -> Duration {
        Duration::from_secs(self.reload_delay_secs).min(MAX_DELAY)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms).min(MAX_DELAY)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs).min(MAX_DELAY)
    }
}
