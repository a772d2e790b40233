//! Configuration type definitions.

use super::enums::{DocumentCompression, FillConnectivity};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Canvas defaults and resource limits.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CanvasConfig {
    /// Width of a new document in cells
    #[serde(default = "default_width")]
    pub default_width: i32,

    /// Height of a new document in cells
    #[serde(default = "default_height")]
    pub default_height: i32,

    /// Maximum canvas area, and separately maximum summed layer area, in cells
    #[serde(default = "default_max_cells")]
    pub max_cells: usize,

    /// Character that stands for "no character" in plain-text dumps
    #[serde(default = "default_filler")]
    pub filler: char,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            default_width: default_width(),
            default_height: default_height(),
            max_cells: default_max_cells(),
            filler: default_filler(),
        }
    }
}

/// Drawing tool defaults.
///
/// The `asciiscribe` binary only converts and inspects documents, so it never
/// reads this section. Interactive front ends built on the library pass these
/// values to [`DrawEngine`](crate::draw::DrawEngine) calls.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DrawingConfig {
    /// Character stamped by the pen tools
    #[serde(default = "default_character")]
    pub default_character: char,

    /// Line stamp radius in cells (valid range: 0 - 16)
    #[serde(default = "default_thickness")]
    pub default_thickness: i32,

    /// Flood fill neighbourhood (four-way or eight-way)
    #[serde(default = "default_fill_connectivity")]
    pub fill_connectivity: FillConnectivity,
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            default_character: default_character(),
            default_thickness: default_thickness(),
            fill_connectivity: default_fill_connectivity(),
        }
    }
}

/// Undo/redo settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HistoryConfig {
    /// Undo steps to keep; 0 keeps every step
    #[serde(default = "default_max_time_points")]
    pub max_time_points: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_time_points: default_max_time_points(),
        }
    }
}

/// Structured document persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PersistenceConfig {
    /// Gzip the JSON payload: auto, on, or off
    #[serde(default = "default_compress")]
    pub compress: DocumentCompression,

    /// Payload size in KiB at which auto compression kicks in
    #[serde(default = "default_auto_compress_threshold_kb")]
    pub auto_compress_threshold_kb: u64,

    /// Documents larger than this are neither written nor read (MiB)
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,

    /// Keep the previous file as `<name>.bak` when overwriting (0 disables)
    #[serde(default = "default_backup_retention")]
    pub backup_retention: usize,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            compress: default_compress(),
            auto_compress_threshold_kb: default_auto_compress_threshold_kb(),
            max_file_size_mb: default_max_file_size_mb(),
            backup_retention: default_backup_retention(),
        }
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_width() -> i32 {
    80
}

fn default_height() -> i32 {
    25
}

fn default_max_cells() -> usize {
    crate::draw::DEFAULT_MAX_CELLS
}

fn default_filler() -> char {
    crate::draw::DEFAULT_FILLER
}

fn default_character() -> char {
    '#'
}

fn default_thickness() -> i32 {
    0
}

fn default_fill_connectivity() -> FillConnectivity {
    FillConnectivity::FourWay
}

fn default_max_time_points() -> usize {
    0
}

fn default_compress() -> DocumentCompression {
    DocumentCompression::Auto
}

fn default_auto_compress_threshold_kb() -> u64 {
    100
}

fn default_max_file_size_mb() -> u64 {
    64
}

fn default_backup_retention() -> usize {
    1
}
