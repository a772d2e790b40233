//! Layer stack and compositing.

use super::error::CanvasError;
use super::events::{CanvasEvent, LayerId, Listeners, SubscriptionId};
use super::layer::Layer;
use crate::util::{Point, Rect};
use log::debug;

/// Default cap on both canvas area and summed layer area.
pub const DEFAULT_MAX_CELLS: usize = 4_000_000;

/// Character written in text dumps where no layer defines a character.
pub const DEFAULT_FILLER: char = ' ';

/// The composited document: an ordered stack of layers plus overall size.
///
/// Index 0 is the topmost layer. The canvas owns its layers outright; layers
/// hold no reference back to it.
#[derive(Debug)]
pub struct Canvas {
    width: usize,
    height: usize,
    layers: Vec<Layer>,
    max_cells: usize,
    filler: char,
    listeners: Listeners<CanvasEvent>,
}

/// Detached copy of a canvas's object graph, used by the edit history.
///
/// Layers inside keep their ids but carry no subscribers.
#[derive(Debug)]
pub struct CanvasSnapshot {
    width: usize,
    height: usize,
    layers: Vec<Layer>,
}

impl CanvasSnapshot {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Total cells held, used to reason about history memory.
    pub fn cell_count(&self) -> usize {
        self.layers.iter().map(Layer::area).sum()
    }
}

impl PartialEq for CanvasSnapshot {
    /// Content equality; layer ids are not compared.
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.layers.len() == other.layers.len()
            && self
                .layers
                .iter()
                .zip(&other.layers)
                .all(|(a, b)| a.same_content(b))
    }
}

fn validate_size(width: i32, height: i32) -> Result<(usize, usize), CanvasError> {
    if width < 0 || height < 0 {
        return Err(CanvasError::NegativeSize { width, height });
    }
    Ok((width as usize, height as usize))
}

impl Canvas {
    /// Creates an empty canvas limited to [`DEFAULT_MAX_CELLS`].
    pub fn new(width: i32, height: i32) -> Result<Self, CanvasError> {
        Self::with_max_cells(width, height, DEFAULT_MAX_CELLS)
    }

    pub fn with_max_cells(width: i32, height: i32, max_cells: usize) -> Result<Self, CanvasError> {
        let (width, height) = validate_size(width, height)?;
        check_limit("canvas", width.saturating_mul(height), max_cells)?;
        Ok(Self {
            width,
            height,
            layers: Vec::new(),
            max_cells,
            filler: DEFAULT_FILLER,
            listeners: Listeners::new(),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn max_cells(&self) -> usize {
        self.max_cells
    }

    pub fn filler(&self) -> char {
        self.filler
    }

    /// Changes the character used for empty cells in text dumps.
    pub fn set_filler(&mut self, filler: char) {
        self.filler = filler;
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    fn check_index(&self, index: usize) -> Result<(), CanvasError> {
        if index < self.layers.len() {
            Ok(())
        } else {
            Err(CanvasError::LayerIndexOutOfRange {
                index,
                count: self.layers.len(),
            })
        }
    }

    pub fn layer(&self, index: usize) -> Result<&Layer, CanvasError> {
        self.check_index(index)?;
        Ok(&self.layers[index])
    }

    /// Direct access to a layer. Mutations made this way raise layer events
    /// only; the canvas does not see them.
    pub fn layer_mut(&mut self, index: usize) -> Result<&mut Layer, CanvasError> {
        self.check_index(index)?;
        Ok(&mut self.layers[index])
    }

    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|layer| layer.id() == id)
    }

    /// Sum of every layer's own area. Independent of the visible canvas bounds.
    pub fn total_area(&self) -> usize {
        self.layers.iter().map(Layer::area).sum()
    }

    // ------------------------------------------------------------------
    // Compositing
    // ------------------------------------------------------------------

    /// Visible character at a canvas-space point, scanning layers top-down.
    pub fn get_character(&self, x: i32, y: i32) -> Option<char> {
        self.layers
            .iter()
            .filter(|layer| layer.is_visible())
            .find_map(|layer| {
                let local = Point::new(x, y).checked_sub(layer.offset())?;
                layer.get_character(local.x, local.y)
            })
    }

    /// Index of the topmost visible layer defining a character at `point`.
    pub fn layer_at(&self, point: Point) -> Option<usize> {
        self.layers.iter().position(|layer| {
            layer.is_visible()
                && point
                    .checked_sub(layer.offset())
                    .and_then(|local| layer.get_character(local.x, local.y))
                    .is_some()
        })
    }

    /// Composited row `y`, with the filler standing in for empty cells.
    pub fn line_string(&self, y: i32) -> String {
        (0..self.width as i32)
            .map(|x| self.get_character(x, y).unwrap_or(self.filler))
            .collect()
    }

    /// Every composited row joined by `\n`.
    pub fn art_string(&self) -> String {
        (0..self.height as i32)
            .map(|y| self.line_string(y))
            .collect::<Vec<_>>()
            .join("\n")
    }

    // ------------------------------------------------------------------
    // Cell mutation
    // ------------------------------------------------------------------

    /// Writes a cell of one layer, addressed in canvas space.
    ///
    /// Returns whether the cell changed. Points outside the layer are a
    /// silent no-op; a bad layer index is an error.
    pub fn set_character(
        &mut self,
        layer_index: usize,
        x: i32,
        y: i32,
        ch: Option<char>,
    ) -> Result<bool, CanvasError> {
        self.check_index(layer_index)?;
        let layer = &mut self.layers[layer_index];
        let Some(local) = Point::new(x, y).checked_sub(layer.offset()) else {
            return Ok(false);
        };
        let changed = layer.set_character(local.x, local.y, ch);
        if changed {
            self.emit(CanvasEvent::CellChanged {
                layer_index,
                point: Point::new(x, y),
            });
        }
        Ok(changed)
    }

    // ------------------------------------------------------------------
    // Document geometry
    // ------------------------------------------------------------------

    pub fn set_size(&mut self, width: i32, height: i32) -> Result<(), CanvasError> {
        let (width, height) = validate_size(width, height)?;
        check_limit("canvas", width.saturating_mul(height), self.max_cells)?;
        self.apply_size(width, height);
        Ok(())
    }

    fn apply_size(&mut self, width: usize, height: usize) {
        let old = (self.width, self.height);
        if old == (width, height) {
            return;
        }
        self.width = width;
        self.height = height;
        debug!("Canvas resized from {}x{} to {}x{}", old.0, old.1, width, height);
        self.emit(CanvasEvent::SizeChanged {
            old,
            new: (width, height),
        });
    }

    /// Crops the document to `rect`, shifting every layer so content inside
    /// `rect` keeps its position relative to the new origin.
    ///
    /// Nothing changes if a shifted offset would leave the `i32` range.
    pub fn crop(&mut self, rect: Rect) -> Result<(), CanvasError> {
        let (width, height) = validate_size(rect.width, rect.height)?;
        check_limit("canvas", width.saturating_mul(height), self.max_cells)?;
        let offsets = self
            .layers
            .iter()
            .enumerate()
            .map(|(index, layer)| {
                layer
                    .offset()
                    .checked_sub(rect.origin())
                    .ok_or(CanvasError::OffsetOverflow { index })
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.apply_size(width, height);
        for (layer, offset) in self.layers.iter_mut().zip(offsets) {
            layer.set_offset(offset);
        }
        debug!("Canvas cropped to {:?}", rect);
        self.emit(CanvasEvent::Cropped { rect });
        self.emit(CanvasEvent::ArtUpdated);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Layer stack
    // ------------------------------------------------------------------

    /// Inserts a layer at `index` (0 = top). `index == layer_count()` appends
    /// at the bottom.
    pub fn add_layer(&mut self, index: usize, layer: Layer) -> Result<(), CanvasError> {
        if index > self.layers.len() {
            return Err(CanvasError::LayerIndexOutOfRange {
                index,
                count: self.layers.len(),
            });
        }
        check_limit(
            "layers",
            self.total_area().saturating_add(layer.area()),
            self.max_cells,
        )?;

        let event = CanvasEvent::LayerAdded {
            index,
            layer: layer.id(),
            bounds: layer.bounds(),
        };
        debug!("Adding layer '{}' at index {}", layer.name(), index);
        self.layers.insert(index, layer);
        self.emit(event);
        Ok(())
    }

    /// Allocates an empty `width x height` layer and inserts it at `index`.
    ///
    /// Unlike building a [`Layer`] and calling [`add_layer`](Self::add_layer),
    /// the cell limit is checked before the grid is allocated.
    pub fn new_layer(
        &mut self,
        index: usize,
        name: impl Into<String>,
        offset: Point,
        width: usize,
        height: usize,
    ) -> Result<LayerId, CanvasError> {
        if index > self.layers.len() {
            return Err(CanvasError::LayerIndexOutOfRange {
                index,
                count: self.layers.len(),
            });
        }
        let area = width.checked_mul(height).ok_or(CanvasError::TooLarge {
            what: "layer",
            cells: usize::MAX,
            max: self.max_cells,
        })?;
        check_limit(
            "layers",
            self.total_area().saturating_add(area),
            self.max_cells,
        )?;

        let layer = Layer::new(name, offset, width, height);
        let id = layer.id();
        self.add_layer(index, layer)?;
        Ok(id)
    }

    /// Appends a layer below every existing layer, returning its index.
    pub fn push_layer(&mut self, layer: Layer) -> Result<usize, CanvasError> {
        let index = self.layers.len();
        self.add_layer(index, layer)?;
        Ok(index)
    }

    pub fn remove_layer(&mut self, index: usize) -> Result<Layer, CanvasError> {
        self.check_index(index)?;
        let layer = self.layers.remove(index);
        debug!("Removed layer '{}' from index {}", layer.name(), index);
        self.emit(CanvasEvent::LayerRemoved {
            index,
            layer: layer.id(),
            bounds: layer.bounds(),
        });
        Ok(layer)
    }

    /// Moves the layer at `from` so it ends up at index `to`.
    pub fn move_layer(&mut self, from: usize, to: usize) -> Result<(), CanvasError> {
        self.check_index(from)?;
        if to >= self.layers.len() {
            return Err(CanvasError::InvalidMove {
                from,
                to,
                count: self.layers.len(),
            });
        }
        if from == to {
            return Ok(());
        }
        let layer = self.layers.remove(from);
        let id = layer.id();
        self.layers.insert(to, layer);
        self.emit(CanvasEvent::LayerMoved {
            from,
            to,
            layer: id,
        });
        Ok(())
    }

    pub fn set_layer_visible(&mut self, index: usize, visible: bool) -> Result<(), CanvasError> {
        self.check_index(index)?;
        let layer = &mut self.layers[index];
        if layer.is_visible() != visible {
            layer.set_visible(visible);
            self.emit(CanvasEvent::LayerVisibilityChanged { index, visible });
        }
        Ok(())
    }

    pub fn set_layer_offset(&mut self, index: usize, offset: Point) -> Result<(), CanvasError> {
        self.check_index(index)?;
        let layer = &mut self.layers[index];
        if layer.offset() != offset {
            layer.set_offset(offset);
            self.emit(CanvasEvent::ArtUpdated);
        }
        Ok(())
    }

    pub fn rename_layer(&mut self, index: usize, name: impl Into<String>) -> Result<(), CanvasError> {
        self.check_index(index)?;
        self.layers[index].set_name(name);
        Ok(())
    }

    /// Resizes one layer (see [`Layer::resize`]) after checking the summed
    /// layer area against the limit.
    pub fn resize_layer(
        &mut self,
        index: usize,
        origin: Point,
        width: usize,
        height: usize,
    ) -> Result<(), CanvasError> {
        self.check_index(index)?;
        let new_area = width
            .checked_mul(height)
            .ok_or(CanvasError::TooLarge {
                what: "layer",
                cells: usize::MAX,
                max: self.max_cells,
            })?;
        let others = self.total_area() - self.layers[index].area();
        check_limit("layers", others.saturating_add(new_area), self.max_cells)?;

        if !self.layers[index].resize(origin, width, height) {
            return Err(CanvasError::OffsetOverflow { index });
        }
        self.emit(CanvasEvent::ArtUpdated);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------

    pub fn snapshot(&self) -> CanvasSnapshot {
        CanvasSnapshot {
            width: self.width,
            height: self.height,
            layers: self.layers.iter().map(Layer::detached_copy).collect(),
        }
    }

    /// Makes this canvas match `snapshot` without replacing surviving objects.
    ///
    /// Layers are matched by id: matches are overwritten in place (their
    /// subscribers stay attached), layers absent from the snapshot are
    /// dropped, and snapshot layers with no live counterpart are recreated.
    pub fn restore(&mut self, snapshot: &CanvasSnapshot) {
        let mut index = self.layers.len();
        while index > 0 {
            index -= 1;
            let id = self.layers[index].id();
            if !snapshot.layers.iter().any(|layer| layer.id() == id) {
                let removed = self.layers.remove(index);
                self.emit(CanvasEvent::LayerRemoved {
                    index,
                    layer: id,
                    bounds: removed.bounds(),
                });
            }
        }

        let mut live: Vec<Option<Layer>> = std::mem::take(&mut self.layers)
            .into_iter()
            .map(Some)
            .collect();
        let mut added = Vec::new();
        for (index, stored) in snapshot.layers.iter().enumerate() {
            let existing = live
                .iter_mut()
                .find(|slot| slot.as_ref().is_some_and(|layer| layer.id() == stored.id()))
                .and_then(Option::take);
            let layer = match existing {
                Some(mut layer) => {
                    if !layer.same_content(stored) {
                        layer.copy_properties_of(stored);
                    }
                    layer
                }
                None => {
                    added.push(index);
                    stored.detached_copy()
                }
            };
            self.layers.push(layer);
        }

        for index in added {
            let layer = &self.layers[index];
            let event = CanvasEvent::LayerAdded {
                index,
                layer: layer.id(),
                bounds: layer.bounds(),
            };
            self.emit(event);
        }
        self.apply_size(snapshot.width, snapshot.height);
        self.emit(CanvasEvent::ArtUpdated);
    }

    // ------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&CanvasEvent) + Send + 'static,
    {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    fn emit(&mut self, event: CanvasEvent) {
        self.listeners.emit(&event);
    }
}

fn check_limit(what: &'static str, cells: usize, max: usize) -> Result<(), CanvasError> {
    if cells > max {
        Err(CanvasError::TooLarge { what, cells, max })
    } else {
        Ok(())
    }
}
