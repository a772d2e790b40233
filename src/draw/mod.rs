//! Layered character canvas and drawing primitives.
//!
//! This module defines the core document model:
//! - [`Layer`]: sparse grid of optional characters with an offset and visibility
//! - [`Canvas`]: ordered layer stack that composites the visible picture
//! - [`DrawEngine`]: line, circle, rectangle, fill, and text primitives
//! - Change notifications and dirty-region tracking for renderers

pub mod canvas;
pub mod dirty;
pub mod engine;
pub mod error;
pub mod events;
pub mod layer;

// Re-export commonly used types at module level
pub use canvas::{Canvas, CanvasSnapshot, DEFAULT_FILLER, DEFAULT_MAX_CELLS};
pub use dirty::DirtyTracker;
pub use engine::{Connectivity, DrawEngine};
pub use error::CanvasError;
pub use events::{CanvasEvent, LayerEvent, LayerId, Listeners, SubscriptionId};
pub use layer::Layer;
