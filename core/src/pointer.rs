use std::cell::Cell;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerPosition {
    pub x: f32,
    pub y: f32,
}

/// Latest pointer position in client pixels, shared by every text element.
///
/// The tracker is the only writer and is deliberately not `Clone`; whoever
/// owns it (the pointer-move handler) is the single source of updates.
/// Readers are cheap handles that observe the same cell.
pub struct PointerTracker {
    position: Rc<Cell<Option<PointerPosition>>>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self {
            position: Rc::new(Cell::new(None)),
        }
    }

    pub fn record(&self, x: f32, y: f32) {
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        self.position.set(Some(PointerPosition { x, y }));
    }

    pub fn reader(&self) -> PointerReader {
        PointerReader {
            position: Rc::clone(&self.position),
        }
    }

    pub fn reader_count(&self) -> usize {
        Rc::strong_count(&self.position) - 1
    }
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub struct PointerReader {
    position: Rc<Cell<Option<PointerPosition>>>,
}

impl PointerReader {
    /// `None` until the pointer has moved at least once.
    pub fn latest(&self) -> Option<PointerPosition> {
        self.position.get()
    }
}

impl std::fmt::Debug for PointerReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointerReader")
            .field("position", &self.position.get())
            .finish()
    }
}
