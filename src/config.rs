//! Configuration module for RoadViz-RS
//!
//! One [`AppConfig`] value is constructed in `main` and passed into the
//! components that need it; no component reads the environment or global
//! state on its own.
//!
//! # Config Location
//!
//! The config file is stored in the platform-appropriate location:
//! - **Linux**: `~/.local/share/dev.roadviz.roadviz-rs/roadviz.toml`
//! - **macOS**: `~/Library/Application Support/dev.roadviz.roadviz-rs/roadviz.toml`
//! - **Windows**: `%APPDATA%\dev.roadviz.roadviz-rs\roadviz.toml`

use crate::error::{Result, RoadVizError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for data directories
pub const APP_ID: &str = "dev.roadviz.roadviz-rs";

/// Config filename
pub const CONFIG_FILE: &str = "roadviz.toml";

/// Default capacity of the bounded event channel between producer and consumer
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Default size of one stdin read, in bytes
pub const DEFAULT_READ_CHUNK_BYTES: usize = 1024;

/// Fixed horizontal column for graph nodes
pub const DEFAULT_COLUMN_X: f64 = 100.0;

/// Vertical distance between consecutive graph nodes
pub const DEFAULT_ROW_STEP: f64 = 180.0;

/// Margin kept above the newest node when scrolling to it
pub const DEFAULT_SCROLL_MARGIN: f64 = 100.0;

/// Quiet period before a pending viewport refit fires, in milliseconds
pub const DEFAULT_REFIT_DEBOUNCE_MS: u64 = 100;

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Get the path to the config file in the app data directory
pub fn default_config_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(CONFIG_FILE))
}

/// Stream pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamConfig {
    /// Capacity of the bounded event channel (producer blocks when full,
    /// preserving record order on the wire)
    pub channel_capacity: usize,
    /// Bytes requested per upstream read
    pub read_chunk_bytes: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            read_chunk_bytes: DEFAULT_READ_CHUNK_BYTES,
        }
    }
}

/// Graph layout and viewport settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GraphConfig {
    /// Fixed x position for every node (single-column chain)
    pub column_x: f64,
    /// Vertical step between consecutive nodes
    pub row_step: f64,
    /// Margin above the newest node kept in view on refit
    pub scroll_margin: f64,
    /// Viewport zoom level
    pub zoom: f64,
    /// Quiet period before a pending refit fires (milliseconds)
    pub refit_debounce_ms: u64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            column_x: DEFAULT_COLUMN_X,
            row_step: DEFAULT_ROW_STEP,
            scroll_margin: DEFAULT_SCROLL_MARGIN,
            zoom: 1.0,
            refit_debounce_ms: DEFAULT_REFIT_DEBOUNCE_MS,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Stream pipeline settings
    pub stream: StreamConfig,
    /// Graph layout settings
    pub graph: GraphConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| RoadVizError::Config(format!("Failed to read {}: {}", path.display(), e)))?;

        toml::from_str(&content)
            .map_err(|e| RoadVizError::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Load from the default location, returning defaults when the file is
    /// missing and warning (but still defaulting) when it is unreadable.
    pub fn load_or_default() -> Self {
        let Some(path) = default_config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save configuration as TOML
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| {
                RoadVizError::Config(format!("Failed to create {}: {}", dir.display(), e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| RoadVizError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| RoadVizError::Config(format!("Failed to write {}: {}", path.display(), e)))
    }
}
