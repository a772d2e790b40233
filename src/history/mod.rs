//! Snapshot-based undo/redo.
//!
//! The history keeps a baseline snapshot plus one snapshot per committed
//! gesture. `cursor` counts how many committed time points are applied, so
//! undo is available while `cursor > 0` and redo while `cursor < len`.
//! Committing after an undo discards the undone branch.

use crate::draw::{Canvas, CanvasSnapshot, Listeners, SubscriptionId};
use log::debug;


/// Notifications raised by [`EditHistory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryEvent {
    Committed { cursor: usize, len: usize },
    RolledBack { cursor: usize },
    RolledForward { cursor: usize },
}

/// Linear undo/redo history for one canvas.
#[derive(Debug)]
pub struct EditHistory {
    baseline: CanvasSnapshot,
    time_points: Vec<CanvasSnapshot>,
    cursor: usize,
    /// Zero keeps every time point.
    max_time_points: usize,
    listeners: Listeners<HistoryEvent>,
}

impl EditHistory {
    /// Starts an unbounded history whose oldest state is the canvas as it is now.
    pub fn new(canvas: &Canvas) -> Self {
        Self::with_limit(canvas, 0)
    }

    /// Starts a history keeping at most `max_time_points` undo steps
    /// (0 = unbounded).
    pub fn with_limit(canvas: &Canvas, max_time_points: usize) -> Self {
        Self {
            baseline: canvas.snapshot(),
            time_points: Vec::new(),
            cursor: 0,
            max_time_points,
            listeners: Listeners::new(),
        }
    }

    pub fn has_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn has_redo(&self) -> bool {
        self.cursor < self.time_points.len()
    }

    /// Number of committed time points (the baseline is not counted).
    pub fn len(&self) -> usize {
        self.time_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_points.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn state_at(&self, cursor: usize) -> &CanvasSnapshot {
        match cursor {
            0 => &self.baseline,
            n => &self.time_points[n - 1],
        }
    }

    /// Records the canvas as a new time point after the cursor, dropping any
    /// redo branch. Call once per finished gesture.
    pub fn commit(&mut self, canvas: &Canvas) {
        if self.time_points.len() > self.cursor {
            debug!(
                "Discarding {} undone time points",
                self.time_points.len() - self.cursor
            );
            self.time_points.truncate(self.cursor);
        }
        self.time_points.push(canvas.snapshot());
        self.cursor += 1;

        if self.max_time_points > 0 && self.time_points.len() > self.max_time_points {
            self.baseline = self.time_points.remove(0);
            self.cursor -= 1;
        }

        let event = HistoryEvent::Committed {
            cursor: self.cursor,
            len: self.time_points.len(),
        };
        self.listeners.emit(&event);
    }

    /// Steps back one time point, restoring the canvas in place.
    /// Returns `false` at the oldest point.
    pub fn rollback(&mut self, canvas: &mut Canvas) -> bool {
        if !self.has_undo() {
            return false;
        }
        self.cursor -= 1;
        canvas.restore(self.state_at(self.cursor));
        debug!("Rolled back to time point {}", self.cursor);
        self.listeners.emit(&HistoryEvent::RolledBack {
            cursor: self.cursor,
        });
        true
    }

    /// Re-applies the next time point. Returns `false` at the newest point.
    pub fn rollforward(&mut self, canvas: &mut Canvas) -> bool {
        if !self.has_redo() {
            return false;
        }
        self.cursor += 1;
        canvas.restore(self.state_at(self.cursor));
        debug!("Rolled forward to time point {}", self.cursor);
        self.listeners.emit(&HistoryEvent::RolledForward {
            cursor: self.cursor,
        });
        true
    }

    /// Forgets everything and takes the canvas as the new baseline, e.g.
    /// after loading a document.
    pub fn reset(&mut self, canvas: &Canvas) {
        self.baseline = canvas.snapshot();
        self.time_points.clear();
        self.cursor = 0;
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&HistoryEvent) + Send + 'static,
    {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }
}
