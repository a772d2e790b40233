//! Change notifications raised by layers and the canvas.
//!
//! Renderers, history, and UI code subscribe with plain closures. Dispatch is
//! synchronous: every listener has run by the time the mutating call returns.

use crate::util::{Point, Rect};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Stable identity of a layer across undo/redo restores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u64);

impl LayerId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

/// Handle returned by [`Listeners::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<E> = Box<dyn FnMut(&E) + Send>;

/// Ordered registry of listener callbacks for one event type.
pub struct Listeners<E> {
    next_id: u64,
    entries: Vec<(SubscriptionId, Callback<E>)>,
}

impl<E> Listeners<E> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    /// Registers a callback; callbacks run in subscription order.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&E) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Box::new(listener)));
        id
    }

    /// Removes a callback. Returns `false` if the id was not registered here.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub fn emit(&mut self, event: &E) {
        for (_, listener) in &mut self.entries {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<E> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}

/// Notifications raised by a single [`Layer`](super::Layer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerEvent {
    /// A cell changed value. Coordinates are layer-local.
    CellChanged { x: i32, y: i32 },
    /// The grid was reallocated; sizes are `(width, height)`.
    Resized {
        old: (usize, usize),
        new: (usize, usize),
    },
    /// The layer offset changed.
    Moved { old: Point, new: Point },
    VisibilityChanged(bool),
    Renamed,
    /// Every field was overwritten from another layer (undo/redo restore).
    Restored,
}

/// Notifications raised by the [`Canvas`](super::Canvas).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanvasEvent {
    LayerAdded {
        index: usize,
        layer: LayerId,
        /// Canvas-space area covered by the layer.
        bounds: Rect,
    },
    LayerRemoved {
        index: usize,
        layer: LayerId,
        bounds: Rect,
    },
    LayerMoved {
        from: usize,
        to: usize,
        layer: LayerId,
    },
    LayerVisibilityChanged {
        index: usize,
        visible: bool,
    },
    /// Document size changed; sizes are `(width, height)`.
    SizeChanged {
        old: (usize, usize),
        new: (usize, usize),
    },
    Cropped {
        rect: Rect,
    },
    /// A single cell changed. `point` is in canvas space.
    CellChanged {
        layer_index: usize,
        point: Point,
    },
    /// Broad change; collaborators should refresh everything.
    ArtUpdated,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn listeners_run_in_subscription_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut listeners: Listeners<u32> = Listeners::new();

        let first = Arc::clone(&log);
        listeners.subscribe(move |value| first.lock().unwrap().push(("first", *value)));
        let second = Arc::clone(&log);
        listeners.subscribe(move |value| second.lock().unwrap().push(("second", *value)));

        listeners.emit(&7);
        assert_eq!(*log.lock().unwrap(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let count = Arc::new(Mutex::new(0));
        let mut listeners: Listeners<()> = Listeners::new();
        let counter = Arc::clone(&count);
        let id = listeners.subscribe(move |_| *counter.lock().unwrap() += 1);

        listeners.emit(&());
        assert!(listeners.unsubscribe(id));
        assert!(!listeners.unsubscribe(id));
        listeners.emit(&());

        assert_eq!(*count.lock().unwrap(), 1);
        assert!(listeners.is_empty());
    }

    #[test]
    fn layer_ids_are_unique() {
        assert_ne!(LayerId::next(), LayerId::next());
    }
}
