//! Document persistence.
//!
//! Saves and loads canvases as versioned JSON (optionally gzip-compressed),
//! with locking, atomic replacement, and backup rotation. Plain-text import
//! and export cover the single-picture case.

mod options;
mod storage;
mod structured;
mod text;

pub use options::{
    CompressionMode, DEFAULT_AUTO_COMPRESS_THRESHOLD_BYTES, PersistOptions, backup_file_path,
    lock_file_path, options_from_config,
};
pub use storage::{DocumentInspection, DocumentSummary, inspect_document};
pub use structured::{LoadedDocument, load_canvas, load_document, save_canvas};
pub use text::{IMPORTED_LAYER_NAME, export_text, export_text_file, import_text, import_text_file};

#[cfg(test)]
mod tests;
