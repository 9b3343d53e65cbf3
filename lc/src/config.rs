//! listctl configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Controller defaults shared by every list the process drives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    /// Rows per page
    pub limit: usize,

    /// Initial page index
    pub page: usize,

    /// Quiet period before a burst of changes is fetched
    #[serde(rename = "fetch-debounce-ms")]
    pub fetch_debounce_ms: u64,

    /// Send the search string to handlers without stripping symbols
    #[serde(rename = "raw-search")]
    pub raw_search: bool,

    /// Sorting by one field replaces the other sort items
    #[serde(rename = "single-sort")]
    pub single_sort: bool,

    /// Start with the filter panel collapsed
    #[serde(rename = "toggled-filters")]
    pub toggled_filters: bool,

    /// Command channel capacity of the controller actor
    #[serde(rename = "command-buffer")]
    pub command_buffer: usize,

    /// Event bus capacity
    #[serde(rename = "event-capacity")]
    pub event_capacity: usize,

    /// Log level for the `lc` binary (overridden by `--log-level`)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            limit: 25,
            page: 0,
            fetch_debounce_ms: 50,
            raw_search: false,
            single_sort: false,
            toggled_filters: false,
            command_buffer: 256,
            event_capacity: 1024,
            log_level: None,
        }
    }
}

impl ListConfig {
    pub fn fetch_debounce(&self) -> Duration {
        Duration::from_millis(self.fetch_debounce_ms)
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .listctl.yml
        let local_config = PathBuf::from(".listctl.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/listctl/listctl.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("listctl").join("listctl.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = ListConfig::default();
        assert_eq!(config.limit, 25);
        assert_eq!(config.page, 0);
        assert_eq!(config.fetch_debounce(), Duration::from_millis(50));
        assert_eq!(config.command_buffer, 256);
        assert_eq!(config.event_capacity, 1024);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: ListConfig = serde_yaml::from_str("limit: 10\nsingle-sort: true\nfetch-debounce-ms: 5\n").unwrap();
        assert_eq!(config.limit, 10);
        assert!(config.single_sort);
        assert_eq!(config.fetch_debounce_ms, 5);
        assert_eq!(config.event_capacity, 1024);
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "raw-search: true\nlog-level: debug").unwrap();

        let config = ListConfig::load(Some(&file.path().to_path_buf())).unwrap();
        assert!(config.raw_search);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_load_explicit_path_missing() {
        let path = PathBuf::from("/nonexistent/listctl.yml");
        assert!(ListConfig::load(Some(&path)).is_err());
    }
}
