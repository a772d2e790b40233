use super::options::{PersistOptions, backup_file_path, lock_file_path};
use crate::draw::{Canvas, CanvasError, Layer};
use crate::util::Point;
use anyhow::{Context, Result, bail};
use chrono::Utc;
use flate2::{Compression, bufread::GzDecoder, write::GzEncoder};
use fs2::FileExt;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

const CURRENT_VERSION: u32 = 1;

/// On-disk form of a canvas. Layers are stored top first.
#[derive(Debug, Serialize, Deserialize)]
struct DocumentFile {
    version: u32,
    #[serde(default)]
    last_modified: String,
    width: i64,
    height: i64,
    #[serde(default)]
    layers: Vec<LayerRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct LayerRecord {
    #[serde(default)]
    name: String,
    #[serde(default)]
    x: i32,
    #[serde(default)]
    y: i32,
    width: i64,
    height: i64,
    #[serde(default = "default_visible")]
    visible: bool,
    cells: Vec<Option<char>>,
}

fn default_visible() -> bool {
    true
}

impl LayerRecord {
    fn from_layer(layer: &Layer) -> Self {
        Self {
            name: layer.name().to_string(),
            x: layer.offset().x,
            y: layer.offset().y,
            width: layer.width() as i64,
            height: layer.height() as i64,
            visible: layer.is_visible(),
            cells: layer.cells().to_vec(),
        }
    }
}

/// A canvas read back from disk, with how it was stored.
#[derive(Debug)]
pub struct LoadedDocument {
    pub canvas: Canvas,
    pub compressed: bool,
}

/// Write `canvas` to `path` as a structured document.
///
/// The write goes to a temporary file first and is renamed into place while an
/// exclusive lock on `<path>.lock` is held, so readers never see a torn file.
pub fn save_canvas(canvas: &Canvas, path: &Path, options: &PersistOptions) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let lock_path = lock_file_path(path);
    let lock_file = open_lock_file(&lock_path)?;
    lock_file
        .lock_exclusive()
        .with_context(|| format!("failed to lock document {}", lock_path.display()))?;

    let result = save_canvas_inner(canvas, path, options);

    lock_file.unlock().unwrap_or_else(|err| {
        warn!(
            "failed to unlock document {}: {}",
            lock_path.display(),
            err
        )
    });

    result
}

fn save_canvas_inner(canvas: &Canvas, path: &Path, options: &PersistOptions) -> Result<()> {
    let file_payload = DocumentFile {
        version: CURRENT_VERSION,
        last_modified: Utc::now().to_rfc3339(),
        width: canvas.width() as i64,
        height: canvas.height() as i64,
        layers: canvas.layers().iter().map(LayerRecord::from_layer).collect(),
    };

    let mut bytes =
        serde_json::to_vec_pretty(&file_payload).context("failed to serialise document")?;

    if bytes.len() as u64 > options.max_file_size_bytes {
        bail!(
            "document is {} bytes which exceeds the configured limit of {} bytes",
            bytes.len(),
            options.max_file_size_bytes
        );
    }

    let compressed = options
        .compression
        .should_compress(bytes.len() as u64, options.auto_compress_threshold_bytes);
    if compressed {
        bytes = compress_bytes(&bytes)?;
    }

    let tmp_path = temp_path(path);
    {
        let mut tmp_file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)
            .with_context(|| format!("failed to open temporary file {}", tmp_path.display()))?;
        tmp_file
            .write_all(&bytes)
            .context("failed to write document payload")?;
        tmp_file
            .sync_all()
            .context("failed to sync temporary file")?;
    }

    if path.exists() {
        if options.backup_retention > 0 {
            let backup_path = backup_file_path(path);
            if backup_path.exists() {
                fs::remove_file(&backup_path).ok();
            }
            fs::rename(path, &backup_path).with_context(|| {
                format!(
                    "failed to rotate previous document {} -> {}",
                    path.display(),
                    backup_path.display()
                )
            })?;
        } else {
            fs::remove_file(path).ok();
        }
    }

    fs::rename(&tmp_path, path).with_context(|| {
        format!(
            "failed to move temporary file {} -> {}",
            tmp_path.display(),
            path.display()
        )
    })?;

    info!(
        "Document saved to {} ({} bytes, compression={})",
        path.display(),
        bytes.len(),
        compressed
    );

    Ok(())
}

/// Read a structured document from `path`.
///
/// Everything is validated before the canvas is built; a rejected file leaves
/// no partial state behind.
pub fn load_canvas(path: &Path, options: &PersistOptions) -> Result<Canvas> {
    Ok(load_document(path, options)?.canvas)
}

/// Like [`load_canvas`], but also reports whether the file was gzip-compressed.
pub fn load_document(path: &Path, options: &PersistOptions) -> Result<LoadedDocument> {
    let metadata = fs::metadata(path)
        .with_context(|| format!("failed to stat document {}", path.display()))?;
    if metadata.len() > options.max_file_size_bytes {
        warn!(
            "Document {} is {} bytes which exceeds the configured limit ({} bytes); refusing to load",
            path.display(),
            metadata.len(),
            options.max_file_size_bytes
        );
        bail!(
            "document {} is {} bytes which exceeds the configured limit of {} bytes",
            path.display(),
            metadata.len(),
            options.max_file_size_bytes
        );
    }

    let lock_path = lock_file_path(path);
    let lock_file = open_lock_file(&lock_path)?;
    lock_file
        .lock_shared()
        .with_context(|| format!("failed to acquire shared lock {}", lock_path.display()))?;

    let result = load_document_inner(path, options);

    lock_file.unlock().unwrap_or_else(|err| {
        warn!(
            "failed to unlock document {}: {}",
            lock_path.display(),
            err
        )
    });

    let loaded = result?;
    info!(
        "Loaded document {} ({}x{}, {} layers)",
        path.display(),
        loaded.canvas.width(),
        loaded.canvas.height(),
        loaded.canvas.layer_count()
    );
    Ok(loaded)
}

fn load_document_inner(path: &Path, options: &PersistOptions) -> Result<LoadedDocument> {
    let mut file_bytes = Vec::new();
    File::open(path)
        .with_context(|| format!("failed to open document {}", path.display()))?
        .read_to_end(&mut file_bytes)
        .context("failed to read document")?;

    let compressed = is_gzip(&file_bytes);
    let payload = if compressed {
        let mut out = Vec::new();
        GzDecoder::new(&file_bytes[..])
            .take(options.max_file_size_bytes.saturating_add(1))
            .read_to_end(&mut out)
            .context("failed to decompress document")?;
        if out.len() as u64 > options.max_file_size_bytes {
            bail!(
                "decompressed document exceeds the configured limit of {} bytes",
                options.max_file_size_bytes
            );
        }
        out
    } else {
        file_bytes
    };

    let document: DocumentFile =
        serde_json::from_slice(&payload).context("failed to parse document json")?;

    let canvas = build_canvas(document, options)?;
    Ok(LoadedDocument { canvas, compressed })
}

/// Checks every size, count, and limit, then builds the canvas.
fn build_canvas(document: DocumentFile, options: &PersistOptions) -> Result<Canvas> {
    if document.version == 0 || document.version > CURRENT_VERSION {
        bail!(
            "unsupported document version {} (expected {})",
            document.version,
            CURRENT_VERSION
        );
    }

    let (width, height) = checked_size(document.width, document.height)?;
    check_area("canvas", width, height, options.max_cells)?;

    let mut total_area = 0usize;
    for (index, record) in document.layers.iter().enumerate() {
        let (w, h) = checked_size(record.width, record.height)
            .with_context(|| format!("layer {} ('{}')", index, record.name))?;
        let area = w as usize * h as usize;
        if record.cells.len() != area {
            bail!(
                "layer {} ('{}') has {} cells but its size {}x{} needs {}",
                index,
                record.name,
                record.cells.len(),
                w,
                h,
                area
            );
        }
        total_area = total_area.saturating_add(area);
    }
    if total_area > options.max_cells {
        return Err(CanvasError::TooLarge {
            what: "layers",
            cells: total_area,
            max: options.max_cells,
        }
        .into());
    }

    let mut canvas = Canvas::with_max_cells(width, height, options.max_cells)?;
    canvas.set_filler(options.filler);
    for record in document.layers {
        let layer = Layer::from_cells(
            record.name,
            Point::new(record.x, record.y),
            record.width as usize,
            record.height as usize,
            record.visible,
            record.cells,
        )
        .context("layer cells do not match its size")?;
        canvas.push_layer(layer)?;
    }
    debug!(
        "Built canvas {}x{} with {} layers",
        canvas.width(),
        canvas.height(),
        canvas.layer_count()
    );
    Ok(canvas)
}

fn checked_size(width: i64, height: i64) -> Result<(i32, i32)> {
    let to_i32 = |value: i64| i32::try_from(value).unwrap_or(if value < 0 { -1 } else { i32::MAX });
    let (w, h) = (to_i32(width), to_i32(height));
    if w < 0 || h < 0 {
        return Err(CanvasError::NegativeSize {
            width: w,
            height: h,
        }
        .into());
    }
    Ok((w, h))
}

fn check_area(what: &'static str, width: i32, height: i32, max: usize) -> Result<()> {
    let cells = (width as usize).saturating_mul(height as usize);
    if cells > max {
        return Err(CanvasError::TooLarge { what, cells, max }.into());
    }
    Ok(())
}

fn open_lock_file(lock_path: &Path) -> Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)
        .with_context(|| format!("failed to open document lock file {}", lock_path.display()))
}

fn compress_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .context("failed to compress document payload")?;
    encoder
        .finish()
        .context("failed to finalise compressed document payload")
}

pub(crate) fn is_gzip(bytes: &[u8]) -> bool {
    bytes.len() > 2 && bytes[0] == 0x1f && bytes[1] == 0x8b
}

fn temp_path(target: &Path) -> PathBuf {
    let base = target.as_os_str().to_owned();
    let mut counter = 0u32;
    loop {
        let mut name = base.clone();
        if counter == 0 {
            name.push(".tmp");
        } else {
            name.push(format!(".tmp{}", counter));
        }
        let candidate = PathBuf::from(name);
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}
