use crate::config::Config;
use crate::draw::{DEFAULT_FILLER, DEFAULT_MAX_CELLS};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub const DEFAULT_AUTO_COMPRESS_THRESHOLD_BYTES: u64 = 100 * 1024; // 100 KiB

/// Compression preference for document files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMode {
    /// Always write plain JSON.
    Off,
    /// Always write gzip-compressed JSON.
    On,
    /// Write gzip when payload exceeds the configured threshold.
    Auto,
}

impl CompressionMode {
    pub(crate) fn should_compress(self, payload_len: u64, threshold: u64) -> bool {
        match self {
            CompressionMode::Off => false,
            CompressionMode::On => true,
            CompressionMode::Auto => payload_len >= threshold,
        }
    }
}

/// Runtime options for reading and writing documents.
#[derive(Debug, Clone)]
pub struct PersistOptions {
    pub compression: CompressionMode,
    pub auto_compress_threshold_bytes: u64,
    /// Applies to the file on disk and to the decompressed payload.
    pub max_file_size_bytes: u64,
    pub backup_retention: usize,
    /// Limit for the canvas area and, separately, the summed layer area.
    pub max_cells: usize,
    /// Character used for empty cells in text import and export.
    pub filler: char,
}

impl Default for PersistOptions {
    fn default() -> Self {
        Self {
            compression: CompressionMode::Auto,
            auto_compress_threshold_bytes: DEFAULT_AUTO_COMPRESS_THRESHOLD_BYTES,
            max_file_size_bytes: 64 * 1024 * 1024,
            backup_retention: 1,
            max_cells: DEFAULT_MAX_CELLS,
            filler: DEFAULT_FILLER,
        }
    }
}

/// Build runtime persistence options from configuration values.
pub fn options_from_config(config: &Config) -> PersistOptions {
    PersistOptions {
        compression: config.persistence.compress.to_mode(),
        auto_compress_threshold_bytes: config
            .persistence
            .auto_compress_threshold_kb
            .saturating_mul(1024),
        max_file_size_bytes: config.persistence.max_file_size_mb.saturating_mul(1024 * 1024),
        backup_retention: config.persistence.backup_retention,
        max_cells: config.canvas.max_cells,
        filler: config.canvas.filler,
    }
}

/// `<path>.bak`, where the previous version is kept on overwrite.
pub fn backup_file_path(path: &Path) -> PathBuf {
    with_suffix(path, ".bak")
}

/// `<path>.lock`, the sibling file guarding concurrent access.
pub fn lock_file_path(path: &Path) -> PathBuf {
    with_suffix(path, ".lock")
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
