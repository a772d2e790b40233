//! Configuration file support for asciiscribe.
//!
//! Settings live in `~/.config/asciiscribe/config.toml` and cover canvas
//! defaults and limits, drawing tool defaults, undo depth, and document
//! persistence. If no config file exists, defaults are used.

pub mod enums;
pub mod types;

pub use enums::{DocumentCompression, FillConnectivity};
pub use types::{CanvasConfig, DrawingConfig, HistoryConfig, PersistenceConfig};

use crate::draw::{Canvas, CanvasError};
use crate::history::EditHistory;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Largest accepted line stamp radius.
const MAX_THICKNESS: i32 = 16;

/// Main configuration structure containing all user settings.
///
/// # Example TOML
/// ```toml
/// [canvas]
/// default_width = 80
/// default_height = 25
/// max_cells = 4000000
/// filler = " "
///
/// [drawing]
/// default_character = "#"
/// default_thickness = 0
/// fill_connectivity = "four-way"
///
/// [history]
/// max_time_points = 0
///
/// [persistence]
/// compress = "auto"
/// backup_retention = 1
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, JsonSchema)]
pub struct Config {
    /// Document size defaults and resource limits
    #[serde(default)]
    pub canvas: CanvasConfig,

    /// Drawing tool defaults
    #[serde(default)]
    pub drawing: DrawingConfig,

    /// Undo/redo depth
    #[serde(default)]
    pub history: HistoryConfig,

    /// Structured document file settings
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl Config {
    /// Validates and clamps configuration values to acceptable ranges,
    /// logging a warning for every adjusted value.
    ///
    /// Validated ranges:
    /// - `default_width` / `default_height`: non-negative, area within `max_cells`
    /// - `max_cells`: at least 1
    /// - `default_thickness`: 0 - 16
    /// - `filler` / `default_character`: not a control character
    pub fn validate_and_clamp(&mut self) {
        if self.canvas.max_cells == 0 {
            warn!("Invalid max_cells 0, using 1");
            self.canvas.max_cells = 1;
        }

        if self.canvas.default_width < 0 || self.canvas.default_height < 0 {
            warn!(
                "Invalid default size {}x{}, clamping negatives to 0",
                self.canvas.default_width, self.canvas.default_height
            );
            self.canvas.default_width = self.canvas.default_width.max(0);
            self.canvas.default_height = self.canvas.default_height.max(0);
        }

        let area = self.canvas.default_width as usize * self.canvas.default_height as usize;
        if area > self.canvas.max_cells {
            warn!(
                "Default size {}x{} exceeds max_cells {}, falling back to 80x25",
                self.canvas.default_width, self.canvas.default_height, self.canvas.max_cells
            );
            self.canvas.default_width = 80;
            self.canvas.default_height = 25;
            if 80 * 25 > self.canvas.max_cells {
                self.canvas.default_width = 0;
                self.canvas.default_height = 0;
            }
        }

        if self.canvas.filler.is_control() {
            warn!(
                "Invalid filler {:?}, falling back to space",
                self.canvas.filler
            );
            self.canvas.filler = ' ';
        }

        if self.drawing.default_character.is_control() {
            warn!(
                "Invalid default_character {:?}, falling back to '#'",
                self.drawing.default_character
            );
            self.drawing.default_character = '#';
        }

        if !(0..=MAX_THICKNESS).contains(&self.drawing.default_thickness) {
            warn!(
                "Invalid default_thickness {}, clamping to 0-{} range",
                self.drawing.default_thickness, MAX_THICKNESS
            );
            self.drawing.default_thickness =
                self.drawing.default_thickness.clamp(0, MAX_THICKNESS);
        }

        if self.persistence.max_file_size_mb == 0 {
            warn!("Invalid max_file_size_mb 0, using 1");
            self.persistence.max_file_size_mb = 1;
        }
    }

    /// Returns the path to the configuration file.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("asciiscribe");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from the default location, or returns defaults if
    /// the file does not exist.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Loads and validates configuration from `config_path`.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

        config.validate_and_clamp();

        info!("Loaded config from {}", config_path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Serializes the config to TOML at `config_path`, creating parent directories.
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let config_str = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(config_path, config_str)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        info!("Saved config to {}", config_path.display());
        Ok(())
    }

    /// JSON schema describing the config file.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }

    /// Creates an empty canvas with the configured default size, limit, and filler.
    pub fn new_canvas(&self) -> Result<Canvas, CanvasError> {
        let mut canvas = Canvas::with_max_cells(
            self.canvas.default_width,
            self.canvas.default_height,
            self.canvas.max_cells,
        )?;
        canvas.set_filler(self.canvas.filler);
        Ok(canvas)
    }

    /// Starts an undo history for `canvas` capped at `[history] max_time_points`.
    pub fn new_history(&self, canvas: &Canvas) -> EditHistory {
        EditHistory::with_limit(canvas, self.history.max_time_points)
    }
}
