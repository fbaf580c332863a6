//! Configuration management for Toolbelt.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::error::{Result, ToolbeltError};

/// Main configuration for the Toolbelt helpers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolbeltConfig {
    /// Timer configuration
    #[serde(default)]
    pub timing: TimingConfig,

    /// Storage fallback configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Formatting configuration
    #[serde(default)]
    pub format: FormatConfig,
}

/// Timer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Interval of the animation-frame shim
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval_ms(),
        }
    }
}

impl TimingConfig {
    /// The frame interval as a `Duration`.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

fn default_frame_interval_ms() -> u64 {
    17
}

/// Longest cookie lifetime accepted from configuration, about 2700 years.
pub const MAX_COOKIE_TTL_DAYS: u32 = 1_000_000;

/// Storage fallback configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// How long a fallback cookie lives
    #[serde(default = "default_cookie_ttl_days")]
    pub cookie_ttl_days: u32,

    /// Cookie path attribute
    #[serde(default = "default_cookie_path")]
    pub cookie_path: String,

    /// Backing file of the file store used by the CLI
    #[serde(default)]
    pub store_path: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            cookie_ttl_days: default_cookie_ttl_days(),
            cookie_path: default_cookie_path(),
            store_path: None,
        }
    }
}

fn default_cookie_ttl_days() -> u32 {
    300
}

fn default_cookie_path() -> String {
    "/".to_string()
}

/// Formatting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatConfig {
    /// Pattern used by `format_date` when none is given
    #[serde(default = "default_date_pattern")]
    pub date_pattern: String,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            date_pattern: default_date_pattern(),
        }
    }
}

fn default_date_pattern() -> String {
    crate::format::DEFAULT_DATE_PATTERN.to_string()
}

impl ToolbeltConfig {
    /// Load configuration from a file path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading toolbelt configuration");

        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| ToolbeltError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that parse but cannot be used.
    pub fn validate(&self) -> Result<()> {
        if self.storage.cookie_ttl_days > MAX_COOKIE_TTL_DAYS {
            return Err(ToolbeltError::Config(format!(
                "storage.cookie_ttl_days must be at most {}, got {}",
                MAX_COOKIE_TTL_DAYS, self.storage.cookie_ttl_days
            )));
        }
        Ok(())
    }
}
