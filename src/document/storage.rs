use super::options::{PersistOptions, backup_file_path};
use super::structured;
use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Summary information about a document file and its backup.
#[derive(Debug, Clone)]
pub struct DocumentInspection {
    pub path: PathBuf,
    pub exists: bool,
    pub size_bytes: Option<u64>,
    pub modified: Option<SystemTime>,
    pub backup_path: PathBuf,
    pub backup_exists: bool,
    pub backup_size_bytes: Option<u64>,
    pub compressed: bool,
    pub contents: Option<DocumentSummary>,
}

/// Dimensions and layer totals of a readable document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentSummary {
    pub width: usize,
    pub height: usize,
    pub layer_count: usize,
    pub total_layer_area: usize,
}

/// Inspect a document for CLI reporting. A missing file is not an error;
/// an unreadable or invalid one is.
pub fn inspect_document(path: &Path, options: &PersistOptions) -> Result<DocumentInspection> {
    let metadata = fs::metadata(path).ok();
    let exists = metadata.is_some();
    let size_bytes = metadata.as_ref().map(|m| m.len());
    let modified = metadata.as_ref().and_then(|m| m.modified().ok());

    let backup_path = backup_file_path(path);
    let backup_size_bytes = fs::metadata(&backup_path).ok().map(|m| m.len());

    let mut compressed = false;
    let mut contents = None;
    if exists {
        let loaded = structured::load_document(path, options)?;
        compressed = loaded.compressed;
        contents = Some(DocumentSummary {
            width: loaded.canvas.width(),
            height: loaded.canvas.height(),
            layer_count: loaded.canvas.layer_count(),
            total_layer_area: loaded.canvas.total_area(),
        });
    }

    Ok(DocumentInspection {
        path: path.to_path_buf(),
        exists,
        size_bytes,
        modified,
        backup_path,
        backup_exists: backup_size_bytes.is_some(),
        backup_size_bytes,
        compressed,
        contents,
    })
}
