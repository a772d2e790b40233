//! Plain-text import and export.
//!
//! A text file is one row per line. On import the filler character stands for
//! an empty cell and the result is a canvas with a single layer.

use super::options::PersistOptions;
use crate::draw::{Canvas, CanvasError, Layer};
use crate::util::Point;
use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::Path;

/// Name given to the layer created by [`import_text`].
pub const IMPORTED_LAYER_NAME: &str = "text";

/// The composited picture, rows joined by `\n`, empty cells as the filler.
pub fn export_text(canvas: &Canvas) -> String {
    canvas.art_string()
}

/// Builds a one-layer canvas from `text`, sized to the longest line by the
/// number of lines. A trailing `\r` on each line is dropped.
pub fn import_text(text: &str, filler: char, max_cells: usize) -> Result<Canvas, CanvasError> {
    let rows: Vec<&str> = text
        .lines()
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();
    let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0);
    let height = rows.len();

    let cells = width.saturating_mul(height);
    let too_large = CanvasError::TooLarge {
        what: "canvas",
        cells,
        max: max_cells,
    };
    if cells > max_cells {
        return Err(too_large);
    }
    let (Ok(w), Ok(h)) = (i32::try_from(width), i32::try_from(height)) else {
        return Err(too_large);
    };

    let mut canvas = Canvas::with_max_cells(w, h, max_cells)?;
    canvas.set_filler(filler);
    canvas.push_layer(Layer::from_rows(
        IMPORTED_LAYER_NAME,
        Point::ORIGIN,
        rows.as_slice(),
        filler,
    ))?;
    Ok(canvas)
}

/// Writes [`export_text`] output to `path` with a trailing newline.
pub fn export_text_file(canvas: &Canvas, path: &Path) -> Result<()> {
    let mut text = export_text(canvas);
    text.push('\n');
    fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    info!("Exported text to {}", path.display());
    Ok(())
}

/// Reads `path` and imports it with the filler and limit from `options`.
pub fn import_text_file(path: &Path, options: &PersistOptions) -> Result<Canvas> {
    let size = fs::metadata(path)
        .with_context(|| format!("failed to stat {}", path.display()))?
        .len();
    if size > options.max_file_size_bytes {
        anyhow::bail!(
            "{} is {} bytes which exceeds the configured limit of {} bytes",
            path.display(),
            size,
            options.max_file_size_bytes
        );
    }
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let canvas = import_text(&text, options.filler, options.max_cells)
        .with_context(|| format!("failed to import {}", path.display()))?;
    info!(
        "Imported {} as {}x{} canvas",
        path.display(),
        canvas.width(),
        canvas.height()
    );
    Ok(canvas)
}
