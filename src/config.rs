//! TOML configuration for the daemon.
//!
//! A missing config file is not an error: the engine runs fine on
//! defaults, which match a 128x32 panel.

use crate::error::{Result, VisorError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration for the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Display geometry and backend selection.
    pub display: DisplayConfig,
    /// Directory containing `manifest.json` and expression assets.
    pub expressions_dir: String,
    /// Expression selected after the boot splash.
    pub default_expression: String,
    /// Lower bound of the random idle-blink delay, in seconds.
    pub blink_interval_min: f32,
    /// Upper bound of the random idle-blink delay, in seconds.
    pub blink_interval_max: f32,
    /// Cross-fade length when switching expressions. Zero disables fades.
    pub transition_duration_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            display: DisplayConfig::default(),
            expressions_dir: "expressions".to_string(),
            default_expression: "happy".to_string(),
            blink_interval_min: 3.0,
            blink_interval_max: 8.0,
            transition_duration_ms: 150,
        }
    }
}

/// Display geometry and backend selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Panel width in pixels.
    pub width: u32,
    /// Panel height in pixels.
    pub height: u32,
    /// Initial brightness (0-100).
    pub brightness: u8,
    /// Output backend: `"terminal"` or `"mock"`.
    pub backend: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 128,
            height: 32,
            brightness: 80,
            backend: "terminal".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Returns defaults when the file does not exist; a present but
    /// malformed file is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| VisorError::config(e.to_string()))
    }
}
