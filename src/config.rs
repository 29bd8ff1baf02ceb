//! Engine configuration.
//!
//! Loaded once at construction: built-in defaults, optionally overlaid by a
//! YAML file, then by environment variables.
//!
//! ## Environment Variables
//! - `TASKBOARD_CONFIG_PATH` - Explicit config file
//! - `TASKBOARD_PAGE_SIZE` - Items per page
//! - `TASKBOARD_SEARCH_DEBOUNCE_MS` - Remote search debounce delay
//! - `TASKBOARD_RECENT_WINDOW_HOURS` - "Recently assigned" badge window
//! - `TASKBOARD_NOTIFY_DISMISS_MS` - Transient notification lifetime

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Tunables for the task board engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Fixed page size for the task list (default: 12).
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Delay before a search keystroke triggers a remote re-fetch
    /// (default: 500ms). Local filtering is never debounced.
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    /// Window within which a task counts as recently assigned
    /// (default: 24h).
    #[serde(default = "default_recent_window_hours")]
    pub recent_window_hours: i64,

    /// Lifetime of transient success/error notifications (default: 3000ms).
    #[serde(default = "default_notify_dismiss_ms")]
    pub notify_dismiss_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            search_debounce_ms: default_search_debounce_ms(),
            recent_window_hours: default_recent_window_hours(),
            notify_dismiss_ms: default_notify_dismiss_ms(),
        }
    }
}

fn default_page_size() -> usize {
    12
}

fn default_search_debounce_ms() -> u64 {
    500
}

fn default_recent_window_hours() -> i64 {
    24
}

fn default_notify_dismiss_ms() -> u64 {
    3_000
}

impl EngineConfig {
    /// Load configuration: defaults, then the YAML file (explicit argument,
    /// else `TASKBOARD_CONFIG_PATH`, else none), then environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("TASKBOARD_CONFIG_PATH").ok().map(Into::into))
        {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env();
        config.validate();
        Ok(config)
    }

    /// Parse a YAML config file. Missing fields fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_yaml::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    fn apply_env(&mut self) {
        fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
            let raw = std::env::var(key).ok()?;
            match raw.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(key, value = raw, "ignoring unparseable env override");
                    None
                }
            }
        }

        if let Some(v) = env_parse("TASKBOARD_PAGE_SIZE") {
            self.page_size = v;
        }
        if let Some(v) = env_parse("TASKBOARD_SEARCH_DEBOUNCE_MS") {
            self.search_debounce_ms = v;
        }
        if let Some(v) = env_parse("TASKBOARD_RECENT_WINDOW_HOURS") {
            self.recent_window_hours = v;
        }
        if let Some(v) = env_parse("TASKBOARD_NOTIFY_DISMISS_MS") {
            self.notify_dismiss_ms = v;
        }
    }

    fn validate(&mut self) {
        if self.page_size == 0 {
            warn!("page_size of 0 is invalid, using 1");
            self.page_size = 1;
        }
        if self.recent_window_hours < 0 {
            warn!("negative recent_window_hours, using 0");
            self.recent_window_hours = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_documented_values() {
        let config = EngineConfig::default();
        assert_eq!(config.page_size, 12);
        assert_eq!(config.search_debounce_ms, 500);
        assert_eq!(config.recent_window_hours, 24);
        assert_eq!(config.notify_dismiss_ms, 3000);
    }

    #[test]
    fn partial_yaml_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "page_size: 20").unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.page_size, 20);
        assert_eq!(config.search_debounce_ms, 500);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(EngineConfig::from_file(Path::new("/nonexistent/config.yaml")).is_err());
    }
}
