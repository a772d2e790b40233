//! Library exports for asciiscribe.
//!
//! The layered canvas model, drawing primitives, and undo history live here
//! together with configuration and document persistence, so the binary and
//! other front ends share one implementation.

pub mod config;
pub mod document;
pub mod draw;
pub mod history;
pub mod util;

pub use config::Config;
pub use draw::{Canvas, CanvasError, Connectivity, DrawEngine, Layer};
pub use history::EditHistory;
