//! A single sparse character layer.

use super::events::{LayerEvent, LayerId, Listeners, SubscriptionId};
use crate::util::{Point, Rect};

/// A rectangular grid of optional characters placed at an offset in canvas space.
///
/// Cells are addressed in layer-local coordinates. Anything outside
/// `[0, width) x [0, height)` reads as `None` and silently ignores writes.
#[derive(Debug)]
pub struct Layer {
    id: LayerId,
    name: String,
    offset: Point,
    width: usize,
    height: usize,
    visible: bool,
    /// Row-major, always `width * height` long.
    cells: Vec<Option<char>>,
    listeners: Listeners<LayerEvent>,
}

impl Layer {
    /// Creates a visible, empty layer.
    ///
    /// # Panics
    /// Panics if `width * height` cells cannot be allocated. Use
    /// [`Canvas::new_layer`](super::Canvas::new_layer) to check the size
    /// against the canvas limit first.
    pub fn new(name: impl Into<String>, offset: Point, width: usize, height: usize) -> Self {
        // An overflowing product becomes a capacity overflow panic instead of
        // wrapping to a grid shorter than `width * height`.
        let area = width.checked_mul(height).unwrap_or(usize::MAX);
        Self {
            id: LayerId::next(),
            name: name.into(),
            offset,
            width,
            height,
            visible: true,
            cells: vec![None; area],
            listeners: Listeners::new(),
        }
    }

    /// Builds a layer from text rows. `filler` marks cells with no character.
    ///
    /// The layer is as wide as the longest row; short rows are padded with `None`.
    pub fn from_rows<S: AsRef<str>>(
        name: impl Into<String>,
        offset: Point,
        rows: &[S],
        filler: char,
    ) -> Self {
        let width = rows
            .iter()
            .map(|row| row.as_ref().chars().count())
            .max()
            .unwrap_or(0);
        let mut layer = Self::new(name, offset, width, rows.len());
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.as_ref().chars().enumerate() {
                if ch != filler {
                    layer.cells[y * width + x] = Some(ch);
                }
            }
        }
        layer
    }

    /// Rebuilds a layer from stored cells. Returns `None` when the cell count
    /// does not match `width * height`.
    pub fn from_cells(
        name: impl Into<String>,
        offset: Point,
        width: usize,
        height: usize,
        visible: bool,
        cells: Vec<Option<char>>,
    ) -> Option<Self> {
        if width.checked_mul(height)? != cells.len() {
            return None;
        }
        let mut layer = Self::new(name, offset, 0, 0);
        layer.width = width;
        layer.height = height;
        layer.visible = visible;
        layer.cells = cells;
        Some(layer)
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Row-major cell storage.
    pub fn cells(&self) -> &[Option<char>] {
        &self.cells
    }

    /// Number of cells this layer owns, regardless of visibility.
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Canvas-space rectangle covered by this layer (may have zero size).
    pub fn bounds(&self) -> Rect {
        Rect {
            x: self.offset.x,
            y: self.offset.y,
            width: self.width as i32,
            height: self.height as i32,
        }
    }

    /// True when no cell holds a character.
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }

    /// Whether a layer-local point lies inside the grid.
    pub fn is_point_visible(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some()
    }

    pub fn get_character(&self, x: i32, y: i32) -> Option<char> {
        self.index(x, y).and_then(|index| self.cells[index])
    }

    /// Writes a cell. Returns `true` only if the stored value changed.
    ///
    /// Out-of-range points and writes of the current value are no-ops and
    /// raise no notification.
    pub fn set_character(&mut self, x: i32, y: i32, ch: Option<char>) -> bool {
        let Some(index) = self.index(x, y) else {
            return false;
        };
        if self.cells[index] == ch {
            return false;
        }
        self.cells[index] = ch;
        self.listeners.emit(&LayerEvent::CellChanged { x, y });
        true
    }

    /// Sets every cell to `ch`, returning how many cells changed.
    pub fn fill(&mut self, ch: Option<char>) -> usize {
        let mut changed = 0;
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                if self.set_character(x, y, ch) {
                    changed += 1;
                }
            }
        }
        changed
    }

    pub fn clear(&mut self) -> usize {
        self.fill(None)
    }

    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.listeners.emit(&LayerEvent::VisibilityChanged(visible));
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.name != name {
            self.name = name;
            self.listeners.emit(&LayerEvent::Renamed);
        }
    }

    pub fn set_offset(&mut self, offset: Point) {
        if self.offset != offset {
            let old = self.offset;
            self.offset = offset;
            self.listeners.emit(&LayerEvent::Moved { old, new: offset });
        }
    }

    /// Reallocates the grid to `width x height` starting at the layer-local
    /// point `origin`.
    ///
    /// Cells overlapping the old grid keep their canvas position: the new
    /// cell `(x, y)` takes the old cell `(x + origin.x, y + origin.y)` and the
    /// offset moves by `origin`. A negative origin grows the layer up/left.
    ///
    /// Returns `false` without touching the layer when the area or the new
    /// offset overflows. [`Canvas::resize_layer`](super::Canvas::resize_layer)
    /// is the public entry point and checks the cell limit.
    pub(crate) fn resize(&mut self, origin: Point, width: usize, height: usize) -> bool {
        let (Some(area), Some(offset)) = (width.checked_mul(height), self.offset.checked_add(origin))
        else {
            return false;
        };

        let mut cells = vec![None; area];
        for y in 0..height {
            for x in 0..width {
                let source = i32::try_from(x)
                    .ok()
                    .zip(i32::try_from(y).ok())
                    .and_then(|(x, y)| Point::new(x, y).checked_add(origin));
                cells[y * width + x] =
                    source.and_then(|source| self.get_character(source.x, source.y));
            }
        }

        let old = (self.width, self.height);
        self.cells = cells;
        self.width = width;
        self.height = height;
        self.offset = offset;
        self.listeners.emit(&LayerEvent::Resized {
            old,
            new: (width, height),
        });
        true
    }

    /// Deep copy with a fresh identity and no subscribers.
    pub fn duplicate(&self) -> Layer {
        Layer {
            id: LayerId::next(),
            ..self.detached_copy()
        }
    }

    /// Deep copy that keeps the identity but drops subscribers. Used for
    /// history snapshots, which must match live layers by id on restore.
    pub(crate) fn detached_copy(&self) -> Layer {
        Layer {
            id: self.id,
            name: self.name.clone(),
            offset: self.offset,
            width: self.width,
            height: self.height,
            visible: self.visible,
            cells: self.cells.clone(),
            listeners: Listeners::new(),
        }
    }

    /// Overwrites every property of this layer from `source` in place.
    ///
    /// Identity and subscribers of `self` are kept, so listeners attached
    /// before an undo keep receiving events afterwards.
    pub fn copy_properties_of(&mut self, source: &Layer) {
        self.name.clone_from(&source.name);
        self.offset = source.offset;
        self.width = source.width;
        self.height = source.height;
        self.visible = source.visible;
        self.cells.clone_from(&source.cells);
        self.listeners.emit(&LayerEvent::Restored);
    }

    /// True when name, placement, visibility, and cells all match.
    pub fn same_content(&self, other: &Layer) -> bool {
        self.name == other.name
            && self.offset == other.offset
            && self.width == other.width
            && self.height == other.height
            && self.visible == other.visible
            && self.cells == other.cells
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&LayerEvent) + Send + 'static,
    {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn filled(ch: char, width: usize, height: usize) -> Layer {
        let mut layer = Layer::new("test", Point::ORIGIN, width, height);
        layer.fill(Some(ch));
        layer
    }

    #[test]
    fn out_of_range_reads_none_and_writes_are_ignored() {
        let mut layer = filled('A', 3, 2);
        for (x, y) in [(-1, 0), (0, -1), (3, 0), (0, 2), (i32::MAX, i32::MIN)] {
            assert_eq!(layer.get_character(x, y), None);
            assert!(!layer.set_character(x, y, Some('B')));
            assert!(!layer.is_point_visible(x, y));
        }
        assert!(layer.cells().iter().all(|cell| *cell == Some('A')));
    }

    #[test]
    fn writing_same_value_is_silent() {
        let mut layer = Layer::new("test", Point::ORIGIN, 4, 4);
        let (tx, rx) = mpsc::channel();
        layer.subscribe(move |event| {
            let _ = tx.send(event.clone());
        });

        assert!(layer.set_character(1, 1, Some('x')));
        assert!(!layer.set_character(1, 1, Some('x')));

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events, vec![LayerEvent::CellChanged { x: 1, y: 1 }]);
    }

    #[test]
    fn from_rows_pads_and_maps_filler() {
        let layer = Layer::from_rows("rows", Point::ORIGIN, &["ab", "c d", ""], ' ');
        assert_eq!((layer.width(), layer.height()), (3, 3));
        assert_eq!(layer.get_character(1, 0), Some('b'));
        assert_eq!(layer.get_character(2, 0), None);
        assert_eq!(layer.get_character(1, 1), None);
        assert_eq!(layer.get_character(2, 1), Some('d'));
    }

    #[test]
    fn from_cells_rejects_mismatched_grid() {
        assert!(Layer::from_cells("bad", Point::ORIGIN, 2, 2, true, vec![None; 3]).is_none());
        assert!(Layer::from_cells("ok", Point::ORIGIN, 2, 2, true, vec![None; 4]).is_some());
    }

    #[test]
    fn resize_keeps_content_aligned_in_canvas_space() {
        let mut layer = Layer::from_rows("crop", Point::new(10, 10), &["abc", "def", "ghi"], ' ');
        assert!(layer.resize(Point::new(1, 1), 2, 2));

        assert_eq!(layer.offset(), Point::new(11, 11));
        assert_eq!(layer.get_character(0, 0), Some('e'));
        assert_eq!(layer.get_character(1, 1), Some('i'));
        assert_eq!(layer.cells().len(), 4);
    }

    #[test]
    fn resize_can_grow_up_and_left() {
        let mut layer = Layer::from_rows("grow", Point::ORIGIN, &["x"], ' ');
        assert!(layer.resize(Point::new(-1, -1), 3, 3));

        assert_eq!(layer.offset(), Point::new(-1, -1));
        assert_eq!(layer.get_character(1, 1), Some('x'));
        assert_eq!(layer.cells().iter().filter(|c| c.is_some()).count(), 1);
    }

    #[test]
    fn resize_refuses_offset_overflow() {
        let mut layer = Layer::from_rows("edge", Point::new(i32::MAX, 0), &["x"], ' ');
        assert!(!layer.resize(Point::new(1, 0), 1, 1));
        assert_eq!(layer.offset(), Point::new(i32::MAX, 0));
        assert_eq!(layer.get_character(0, 0), Some('x'));

        assert!(!layer.resize(Point::ORIGIN, usize::MAX, 2));
        assert_eq!(layer.cells().len(), 1);
    }

    #[test]
    fn duplicate_is_deep_and_gets_new_identity() {
        let mut original = filled('A', 2, 2);
        original.set_visible(false);
        let copy = original.duplicate();

        assert_ne!(copy.id(), original.id());
        assert!(copy.same_content(&original));

        original.set_character(0, 0, Some('Z'));
        assert_eq!(copy.get_character(0, 0), Some('A'));
    }

    #[test]
    fn copy_properties_of_keeps_identity_and_subscribers() {
        let mut live = filled('A', 2, 2);
        let id = live.id();
        let (tx, rx) = mpsc::channel();
        live.subscribe(move |event| {
            let _ = tx.send(event.clone());
        });

        let source = Layer::from_rows("source", Point::new(5, 6), &["xyz"], ' ');
        live.copy_properties_of(&source);

        assert_eq!(live.id(), id);
        assert!(live.same_content(&source));
        assert_eq!(rx.try_recv().unwrap(), LayerEvent::Restored);

        live.set_character(0, 0, Some('q'));
        assert_eq!(
            rx.try_recv().unwrap(),
            LayerEvent::CellChanged { x: 0, y: 0 }
        );
    }
}
