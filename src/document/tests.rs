use super::*;
use crate::draw::{Canvas, CanvasError, DrawEngine, Layer};
use crate::util::{Point, Rect};
use std::fs;
use std::path::Path;

fn sample_canvas() -> Canvas {
    let mut canvas = Canvas::new(12, 6).unwrap();
    canvas
        .push_layer(Layer::from_rows("sign", Point::new(1, 1), &["HELLO"], ' '))
        .unwrap();
    canvas
        .push_layer(Layer::new("back", Point::ORIGIN, 12, 6))
        .unwrap();
    DrawEngine::new(&mut canvas, 1).rect_outline(Rect::new(0, 0, 12, 6).unwrap(), Some('+'));
    canvas
        .push_layer(Layer::from_rows("ghost", Point::new(-2, 3), &["boo"], ' '))
        .unwrap();
    canvas.set_layer_visible(2, false).unwrap();
    canvas
}

fn uncompressed() -> PersistOptions {
    PersistOptions {
        compression: CompressionMode::Off,
        ..PersistOptions::default()
    }
}

fn write_json(path: &Path, json: &str) {
    fs::write(path, json).unwrap();
}

#[test]
fn save_then_load_preserves_layers() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("art.json");
    let canvas = sample_canvas();

    save_canvas(&canvas, &path, &uncompressed()).unwrap();
    let loaded = load_canvas(&path, &uncompressed()).unwrap();

    assert_eq!(loaded.snapshot(), canvas.snapshot());
    assert_eq!(loaded.art_string(), canvas.art_string());
    assert_eq!(loaded.layer(0).unwrap().name(), "sign");
    assert!(!loaded.layer(2).unwrap().is_visible());
    assert_eq!(loaded.layer(2).unwrap().offset(), Point::new(-2, 3));
}

#[test]
fn structured_file_has_documented_fields() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("art.json");
    save_canvas(&sample_canvas(), &path, &uncompressed()).unwrap();

    let value: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(value["version"], 1);
    assert_eq!(value["width"], 12);
    assert!(value["last_modified"].is_string());
    let sign = &value["layers"][0];
    assert_eq!(sign["name"], "sign");
    assert_eq!(sign["x"], 1);
    assert_eq!(sign["cells"][0], "H");
    let back = &value["layers"][1];
    assert!(back["cells"][13].is_null());
}

#[test]
fn compression_on_writes_gzip_and_loads_back() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("art.json.gz");
    let options = PersistOptions {
        compression: CompressionMode::On,
        ..PersistOptions::default()
    };

    save_canvas(&sample_canvas(), &path, &options).unwrap();
    let bytes = fs::read(&path).unwrap();
    assert_eq!(&bytes[..2], &[0x1f, 0x8b]);

    // Gzip is detected from the content, not the options.
    let loaded = load_document(&path, &uncompressed()).unwrap();
    assert!(loaded.compressed);
    assert_eq!(loaded.canvas.art_string(), sample_canvas().art_string());
}

#[test]
fn auto_compression_follows_threshold() {
    let temp = tempfile::tempdir().unwrap();
    let small = temp.path().join("small.json");
    let large = temp.path().join("large.json");

    let mut options = PersistOptions::default();
    options.auto_compress_threshold_bytes = u64::MAX;
    save_canvas(&sample_canvas(), &small, &options).unwrap();
    assert_eq!(fs::read(&small).unwrap()[0], b'{');

    options.auto_compress_threshold_bytes = 1;
    save_canvas(&sample_canvas(), &large, &options).unwrap();
    assert!(load_document(&large, &options).unwrap().compressed);
}

#[test]
fn overwrite_rotates_backup() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("art.json");
    let options = uncompressed();

    let mut canvas = sample_canvas();
    save_canvas(&canvas, &path, &options).unwrap();
    canvas.set_character(1, 5, 3, Some('@')).unwrap();
    save_canvas(&canvas, &path, &options).unwrap();

    let backup = load_canvas(&backup_file_path(&path), &options).unwrap();
    assert_eq!(backup.get_character(5, 3), None);
    assert_eq!(load_canvas(&path, &options).unwrap().get_character(5, 3), Some('@'));
}

#[test]
fn no_backup_when_retention_is_zero() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("art.json");
    let options = PersistOptions {
        backup_retention: 0,
        ..uncompressed()
    };

    save_canvas(&sample_canvas(), &path, &options).unwrap();
    save_canvas(&sample_canvas(), &path, &options).unwrap();
    assert!(!backup_file_path(&path).exists());
}

#[test]
fn save_refuses_payload_over_size_limit() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("art.json");
    let options = PersistOptions {
        max_file_size_bytes: 16,
        ..uncompressed()
    };

    assert!(save_canvas(&sample_canvas(), &path, &options).is_err());
    assert!(!path.exists());
}

#[test]
fn load_rejects_unsupported_version() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("art.json");
    write_json(&path, r#"{"version": 99, "width": 1, "height": 1, "layers": []}"#);

    let err = load_canvas(&path, &uncompressed()).unwrap_err();
    assert!(err.to_string().contains("unsupported document version"));
}

#[test]
fn load_rejects_cell_count_mismatch() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("art.json");
    write_json(
        &path,
        r#"{"version": 1, "width": 2, "height": 2, "layers": [
            {"name": "a", "x": 0, "y": 0, "width": 2, "height": 2, "cells": ["x", null, "y"]}
        ]}"#,
    );

    let err = load_canvas(&path, &uncompressed()).unwrap_err();
    assert!(err.to_string().contains("has 3 cells"));
}

#[test]
fn load_rejects_negative_sizes() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("art.json");
    write_json(&path, r#"{"version": 1, "width": -3, "height": 2, "layers": []}"#);

    let err = load_canvas(&path, &uncompressed()).unwrap_err();
    assert_eq!(
        err.downcast_ref::<CanvasError>(),
        Some(&CanvasError::NegativeSize {
            width: -3,
            height: 2
        })
    );
}

#[test]
fn load_rejects_canvas_and_layer_area_over_limit() {
    let temp = tempfile::tempdir().unwrap();
    let options = PersistOptions {
        max_cells: 4,
        ..uncompressed()
    };

    let wide = temp.path().join("wide.json");
    write_json(&wide, r#"{"version": 1, "width": 5, "height": 1, "layers": []}"#);
    let err = load_canvas(&wide, &options).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CanvasError>(),
        Some(CanvasError::TooLarge { what: "canvas", .. })
    ));

    let stacked = temp.path().join("stacked.json");
    write_json(
        &stacked,
        r#"{"version": 1, "width": 2, "height": 1, "layers": [
            {"name": "a", "width": 2, "height": 1, "cells": [null, null]},
            {"name": "b", "width": 3, "height": 1, "cells": [null, null, null]}
        ]}"#,
    );
    let err = load_canvas(&stacked, &options).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CanvasError>(),
        Some(CanvasError::TooLarge { what: "layers", cells: 5, max: 4 })
    ));
}

#[test]
fn load_rejects_file_over_size_limit() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("art.json");
    save_canvas(&sample_canvas(), &path, &uncompressed()).unwrap();

    let options = PersistOptions {
        max_file_size_bytes: 8,
        ..uncompressed()
    };
    assert!(load_canvas(&path, &options).is_err());
}

#[test]
fn missing_fields_take_defaults() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("art.json");
    write_json(
        &path,
        r#"{"version": 1, "width": 1, "height": 1, "layers": [
            {"width": 1, "height": 1, "cells": ["z"]}
        ]}"#,
    );

    let canvas = load_canvas(&path, &uncompressed()).unwrap();
    assert!(canvas.layer(0).unwrap().is_visible());
    assert_eq!(canvas.get_character(0, 0), Some('z'));
}

#[test]
fn inspect_reports_missing_document() {
    let temp = tempfile::tempdir().unwrap();
    let inspection =
        inspect_document(&temp.path().join("none.json"), &uncompressed()).unwrap();

    assert!(!inspection.exists);
    assert!(inspection.contents.is_none());
    assert!(!inspection.backup_exists);
}

#[test]
fn inspect_reports_dimensions_and_layers() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("art.json");
    let options = PersistOptions {
        compression: CompressionMode::On,
        ..PersistOptions::default()
    };
    save_canvas(&sample_canvas(), &path, &options).unwrap();
    save_canvas(&sample_canvas(), &path, &options).unwrap();

    let inspection = inspect_document(&path, &options).unwrap();
    assert!(inspection.exists);
    assert!(inspection.compressed);
    assert!(inspection.backup_exists);
    assert_eq!(
        inspection.contents,
        Some(DocumentSummary {
            width: 12,
            height: 6,
            layer_count: 3,
            total_layer_area: 5 + 72 + 3,
        })
    );
}

#[test]
fn layer_at_extreme_offset_loads_and_renders() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("art.json");
    write_json(
        &path,
        r#"{"version": 1, "width": 3, "height": 1, "layers": [
            {"name": "far", "x": -2147483648, "y": 0, "width": 1, "height": 1, "cells": ["f"]},
            {"name": "near", "x": 0, "y": 0, "width": 3, "height": 1, "cells": ["a", null, "c"]}
        ]}"#,
    );

    let canvas = load_canvas(&path, &uncompressed()).unwrap();
    assert_eq!(canvas.layer(0).unwrap().offset(), Point::new(i32::MIN, 0));
    assert_eq!(canvas.art_string(), "a c");
    assert_eq!(canvas.get_character(i32::MIN, 0), Some('f'));
}
