//! Dirty region tracking for incremental rendering.
//!
//! Renderers subscribe a tracker to the canvas and collect the canvas-space
//! rectangles that need repainting between frames.

use super::events::CanvasEvent;
use crate::util::Rect;

/// Tracks dirty rectangles accumulated between renders.
#[derive(Debug, Default)]
pub struct DirtyTracker {
    regions: Vec<Rect>,
    force_full: bool,
}

impl DirtyTracker {
    /// Creates a new, empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the entire surface as dirty. Clears any accumulated rectangles.
    pub fn mark_full(&mut self) {
        self.force_full = true;
        self.regions.clear();
    }

    /// Adds a dirty rectangle if the tracker is not already full.
    pub fn mark_rect(&mut self, rect: Rect) {
        if !rect.is_valid() || self.force_full {
            return;
        }
        self.regions.push(rect);
    }

    /// Records the area affected by a canvas notification.
    pub fn observe(&mut self, event: &CanvasEvent) {
        match event {
            CanvasEvent::CellChanged { point, .. } => {
                if let Some(rect) = Rect::new(point.x, point.y, 1, 1) {
                    self.mark_rect(rect);
                }
            }
            CanvasEvent::LayerAdded { bounds, .. } | CanvasEvent::LayerRemoved { bounds, .. } => {
                self.mark_rect(*bounds)
            }
            CanvasEvent::LayerMoved { .. }
            | CanvasEvent::LayerVisibilityChanged { .. }
            | CanvasEvent::SizeChanged { .. }
            | CanvasEvent::Cropped { .. }
            | CanvasEvent::ArtUpdated => self.mark_full(),
        }
    }

    pub fn is_clean(&self) -> bool {
        !self.force_full && self.regions.is_empty()
    }

    /// Drains the dirty regions gathered so far.
    ///
    /// When the full surface is marked, returns a single rectangle covering the
    /// entire surface; otherwise returns accumulated rectangles.
    pub fn take_regions(&mut self, width: i32, height: i32) -> Vec<Rect> {
        if self.force_full {
            self.force_full = false;
            self.regions.clear();
            if let Some(full) = Rect::new(0, 0, width, height) {
                return vec![full];
            }
            Vec::new()
        } else {
            self.regions.drain(..).collect()
        }
    }
}
