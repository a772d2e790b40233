//! Structural errors raised by canvas mutators.

use thiserror::Error;

/// Precondition and resource-limit violations.
///
/// Denied draws (outside bounds, hidden layer, outside the selection) are not
/// errors and never show up here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CanvasError {
    #[error("layer index {index} is out of range (canvas has {count} layers)")]
    LayerIndexOutOfRange { index: usize, count: usize },

    #[error("canvas size must not be negative (got {width}x{height})")]
    NegativeSize { width: i32, height: i32 },

    #[error("{what} needs {cells} cells which exceeds the limit of {max}")]
    TooLarge {
        what: &'static str,
        cells: usize,
        max: usize,
    },

    #[error("cannot move layer {from} to position {to} (canvas has {count} layers)")]
    InvalidMove { from: usize, to: usize, count: usize },

    #[error("layer {index} would be moved outside the addressable coordinate range")]
    OffsetOverflow { index: usize },
}
