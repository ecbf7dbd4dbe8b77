//! Host configuration
//!
//! Read from a camelCase JSON file; every field is optional.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use stackview_core::{NavigationConfig, NavigationMode};

const CONFIG_DIR: &str = "stackview";
const CONFIG_FILE_NAME: &str = "config.json";
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024; // 1MB

/// Settings the host page passes to the navigation runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HostConfig {
    /// Language used when a screen does not specify one
    pub language: String,
    /// Base URL of the object store
    pub base_url: String,
    /// URL of the frame hosting the stack; history entries are tagged with it
    pub frame_url: String,
    pub navigation_mode: NavigationMode,
    pub breadcrumb_debounce_ms: u64,
    pub breadcrumb_separator: String,
    /// Width available to the breadcrumb, in terminal cells
    pub viewport_width: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            base_url: String::new(),
            frame_url: String::new(),
            navigation_mode: NavigationMode::Stacked,
            breadcrumb_debounce_ms: 150,
            breadcrumb_separator: " / ".to_string(),
            viewport_width: 80,
        }
    }
}

impl HostConfig {
    /// Parse a configuration document
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("Invalid host configuration")
    }

    /// Load the configuration at `path`, falling back to defaults when the file
    /// does not exist.
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            log::debug!("Config file does not exist: {}", path.display());
            return Ok(Self::default());
        }

        let metadata = tokio::fs::metadata(path)
            .await
            .with_context(|| format!("Failed to read metadata of {}", path.display()))?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            anyhow::bail!(
                "Config file too large: {} bytes (max: {MAX_CONFIG_FILE_SIZE} bytes)",
                metadata.len()
            );
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::from_json_str(&content)?;
        log::info!("Loaded host configuration from {}", path.display());
        Ok(config)
    }

    /// Platform config location:
    /// - Linux: `~/.config/stackview/config.json`
    /// - macOS: `~/Library/Application Support/stackview/config.json`
    /// - Windows: `%APPDATA%/stackview/config.json`
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE_NAME))
    }

    /// Navigation settings derived from this configuration
    #[must_use]
    pub fn to_navigation_config(&self) -> NavigationConfig {
        NavigationConfig {
            frame_url: self.frame_url.clone(),
            mode: self.navigation_mode,
            default_lang: self.language.clone(),
            breadcrumb_separator: self.breadcrumb_separator.clone(),
            resize_debounce: Duration::from_millis(self.breadcrumb_debounce_ms),
            viewport_width: self.viewport_width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_take_defaults() {
        let config =
            HostConfig::from_json_str(r#"{"frameUrl": "https://admin.test/app", "language": "fr"}"#)
                .unwrap();
        assert_eq!(config.frame_url, "https://admin.test/app");
        assert_eq!(config.language, "fr");
        assert_eq!(config.breadcrumb_debounce_ms, 150);
        assert_eq!(config.breadcrumb_separator, " / ");
        assert_eq!(config.navigation_mode, NavigationMode::Stacked);
    }

    #[test]
    fn navigation_mode_is_lowercase() {
        let config = HostConfig::from_json_str(r#"{"navigationMode": "single"}"#).unwrap();
        assert_eq!(config.navigation_mode, NavigationMode::Single);
        assert!(HostConfig::from_json_str(r#"{"navigationMode": "tabs"}"#).is_err());
    }

    #[test]
    fn navigation_config_follows_host_config() {
        let config = HostConfig {
            language: "de".to_string(),
            breadcrumb_debounce_ms: 40,
            viewport_width: 120,
            ..HostConfig::default()
        };
        let nav = config.to_navigation_config();
        assert_eq!(nav.default_lang, "de");
        assert_eq!(nav.resize_debounce, Duration::from_millis(40));
        assert_eq!(nav.viewport_width, 120);
    }

    #[test]
    fn default_path_ends_with_file_name() {
        if let Some(path) = HostConfig::default_path() {
            assert!(path.ends_with("stackview/config.json"));
        }
    }
}
