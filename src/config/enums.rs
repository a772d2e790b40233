//! Configuration enum types.

use crate::document::CompressionMode;
use crate::draw::Connectivity;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Flood fill neighbourhood.
///
/// # Examples
/// ```toml
/// [drawing]
/// fill_connectivity = "eight-way"
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum FillConnectivity {
    /// Up, down, left, right
    FourWay,
    /// Also spreads across diagonals
    EightWay,
}

impl FillConnectivity {
    pub fn to_connectivity(self) -> Connectivity {
        match self {
            FillConnectivity::FourWay => Connectivity::FourWay,
            FillConnectivity::EightWay => Connectivity::EightWay,
        }
    }
}

/// Compression preference for structured document files.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentCompression {
    /// Compress once the JSON payload passes `auto_compress_threshold_kb`
    Auto,
    /// Always gzip
    On,
    /// Always plain JSON
    Off,
}

impl DocumentCompression {
    pub fn to_mode(self) -> CompressionMode {
        match self {
            DocumentCompression::Auto => CompressionMode::Auto,
            DocumentCompression::On => CompressionMode::On,
            DocumentCompression::Off => CompressionMode::Off,
        }
    }
}
