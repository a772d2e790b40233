use anyhow::{Context, Result};
use asciiscribe::document::{self, DocumentInspection, PersistOptions};
use asciiscribe::draw::Canvas;
use asciiscribe::util::Point;
use asciiscribe::Config;
use clap::{ArgAction, ArgGroup, Parser};
use log::{info, warn};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "asciiscribe")]
#[command(version, about = "Layered ASCII art canvas: create, convert, and inspect documents")]
#[command(group(ArgGroup::new("source").args(["document", "new", "import_text"])))]
struct Cli {
    /// Structured document (JSON, optionally gzip-compressed) to open
    #[arg(value_name = "DOCUMENT")]
    document: Option<PathBuf>,

    /// Start from a blank canvas with one empty layer
    #[arg(long, action = ArgAction::SetTrue)]
    new: bool,

    /// Width of the new canvas (defaults to [canvas] default_width)
    #[arg(long, requires = "new", allow_negative_numbers = true)]
    width: Option<i32>,

    /// Height of the new canvas (defaults to [canvas] default_height)
    #[arg(long, requires = "new", allow_negative_numbers = true)]
    height: Option<i32>,

    /// Start from a plain-text picture
    #[arg(long, value_name = "FILE")]
    import_text: Option<PathBuf>,

    /// Write the composited picture as plain text
    #[arg(long, value_name = "FILE")]
    export_text: Option<PathBuf>,

    /// Print the composited picture to stdout
    #[arg(long, action = ArgAction::SetTrue)]
    show: bool,

    /// Report size, compression, and layer totals of DOCUMENT
    #[arg(long, action = ArgAction::SetTrue, requires = "document")]
    inspect: bool,

    /// Save the canvas as a structured document
    #[arg(long, short = 'o', value_name = "FILE")]
    output: Option<PathBuf>,
}

/// Name of the layer created by `--new`.
const NEW_LAYER_NAME: &str = "layer 1";

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let config = Config::load().unwrap_or_else(|err| {
        warn!("Failed to load config, using defaults: {:#}", err);
        Config::default()
    });
    let options = document::options_from_config(&config);

    if cli.inspect {
        if let Some(path) = cli.document.as_deref() {
            let inspection = document::inspect_document(path, &options)?;
            print_inspection(&inspection);
        }
        if !cli.show && cli.export_text.is_none() && cli.output.is_none() {
            return Ok(());
        }
    }

    let Some(canvas) = open_canvas(&cli, &config, &options)? else {
        println!("asciiscribe: Layered ASCII art canvas");
        println!();
        println!("Usage:");
        println!("  asciiscribe --new --width 40 --height 10 -o art.json");
        println!("  asciiscribe --import-text art.txt -o art.json");
        println!("  asciiscribe art.json --show");
        println!("  asciiscribe art.json --export-text art.txt");
        println!("  asciiscribe art.json --inspect");
        println!("  asciiscribe --help");
        return Ok(());
    };

    if cli.show {
        println!("{}", document::export_text(&canvas));
    }

    if let Some(path) = cli.export_text.as_deref() {
        document::export_text_file(&canvas, path)?;
    }

    if let Some(path) = cli.output.as_deref() {
        document::save_canvas(&canvas, path, &options)?;
    }

    Ok(())
}

fn open_canvas(cli: &Cli, config: &Config, options: &PersistOptions) -> Result<Option<Canvas>> {
    if cli.new {
        let width = cli.width.unwrap_or(config.canvas.default_width);
        let height = cli.height.unwrap_or(config.canvas.default_height);
        let mut canvas = Canvas::with_max_cells(width, height, options.max_cells)
            .context("failed to create canvas")?;
        canvas.set_filler(options.filler);
        let (layer_width, layer_height) = (canvas.width(), canvas.height());
        canvas
            .new_layer(0, NEW_LAYER_NAME, Point::ORIGIN, layer_width, layer_height)
            .context("failed to add initial layer")?;
        info!("Created {}x{} canvas", canvas.width(), canvas.height());
        return Ok(Some(canvas));
    }

    if let Some(path) = cli.import_text.as_deref() {
        return document::import_text_file(path, options).map(Some);
    }

    match cli.document.as_deref() {
        Some(path) => open_document(path, options).map(Some),
        None => Ok(None),
    }
}

fn open_document(path: &Path, options: &PersistOptions) -> Result<Canvas> {
    document::load_canvas(path, options)
        .with_context(|| format!("failed to open document {}", path.display()))
}

fn print_inspection(inspection: &DocumentInspection) {
    println!("Document: {}", inspection.path.display());
    if !inspection.exists {
        println!("  exists: no");
        return;
    }
    println!("  exists: yes");
    if let Some(size) = inspection.size_bytes {
        println!("  size: {} bytes", size);
    }
    if let Some(modified) = inspection.modified {
        let modified: chrono::DateTime<chrono::Local> = modified.into();
        println!("  modified: {}", modified.to_rfc3339());
    }
    println!(
        "  compressed: {}",
        if inspection.compressed { "yes" } else { "no" }
    );
    if let Some(contents) = inspection.contents {
        println!("  dimensions: {}x{}", contents.width, contents.height);
        println!(
            "  layers: {} ({} cells)",
            contents.layer_count, contents.total_layer_area
        );
    }
    match inspection.backup_size_bytes {
        Some(size) => println!("  backup: {} ({} bytes)", inspection.backup_path.display(), size),
        None => println!("  backup: none"),
    }
}
