//! Per-display-frame callback scheduling.
//!
//! On the web this is `requestAnimationFrame`; [`ManualFrameLoop`] drives the
//! same contract from tests and headless tools.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::frame::{Frame, FrameClock};

pub type FrameCallback = Box<dyn FnMut(Frame)>;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoopId(pub u64);

/// A source of per-frame callbacks.
///
/// A started loop keeps firing until [`FrameLoop::cancel`] is called for it.
/// Cancelling an unknown or already cancelled loop is a no-op.
pub trait FrameLoop {
    fn start(&self, callback: FrameCallback) -> LoopId;
    fn cancel(&self, id: LoopId);
}

#[derive(Default)]
struct ManualInner {
    next_id: u64,
    clock: FrameClock,
    // `None` while the callback is being invoked.
    loops: BTreeMap<LoopId, Option<FrameCallback>>,
    invocations: u64,
}

/// Frame loop advanced explicitly with [`ManualFrameLoop::tick`].
///
/// Cloning shares the underlying loop set.
#[derive(Clone, Default)]
pub struct ManualFrameLoop {
    inner: Rc<RefCell<ManualInner>>,
}

impl ManualFrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires every active loop once. Returns how many callbacks ran.
    pub fn tick(&self, timestamp_ms: f64) -> usize {
        let (frame, ids) = {
            let mut inner = self.inner.borrow_mut();
            let frame = inner.clock.advance(timestamp_ms);
            let ids: Vec<LoopId> = inner.loops.keys().copied().collect();
            (frame, ids)
        };

        let mut ran = 0;
        for id in ids {
            let callback = self
                .inner
                .borrow_mut()
                .loops
                .get_mut(&id)
                .and_then(Option::take);
            let Some(mut callback) = callback else {
                continue;
            };

            // Callbacks may start or cancel loops, so no borrow is held here.
            callback(frame);
            ran += 1;

            let mut inner = self.inner.borrow_mut();
            inner.invocations += 1;
            if let Some(slot) = inner.loops.get_mut(&id) {
                *slot = Some(callback);
            }
        }
        ran
    }

    pub fn active_loops(&self) -> usize {
        self.inner.borrow().loops.len()
    }

    /// Total callback invocations since creation.
    pub fn invocations(&self) -> u64 {
        self.inner.borrow().invocations
    }
}

impl FrameLoop for ManualFrameLoop {
    fn start(&self, callback: FrameCallback) -> LoopId {
        let mut inner = self.inner.borrow_mut();
        let id = LoopId(inner.next_id);
        inner.next_id += 1;
        inner.loops.insert(id, Some(callback));
        id
    }

    fn cancel(&self, id: LoopId) {
        self.inner.borrow_mut().loops.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::{FrameLoop, ManualFrameLoop};
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn started_loop_fires_every_tick() {
        let frames = ManualFrameLoop::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        frames.start(Box::new(move |_| c.set(c.get() + 1)));

        frames.tick(0.0);
        frames.tick(16.0);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn cancelled_loop_never_fires_again() {
        let frames = ManualFrameLoop::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let id = frames.start(Box::new(move |_| c.set(c.get() + 1)));

        frames.tick(0.0);
        frames.cancel(id);
        frames.cancel(id);
        assert_eq!(frames.tick(16.0), 0);
        assert_eq!(count.get(), 1);
        assert_eq!(frames.active_loops(), 0);
    }

    #[test]
    fn callback_can_cancel_itself() {
        let frames = ManualFrameLoop::new();
        let handle = frames.clone();
        let own_id = Rc::new(Cell::new(None));
        let id_slot = own_id.clone();
        let id = frames.start(Box::new(move |_| {
            if let Some(id) = id_slot.get() {
                handle.cancel(id);
            }
        }));
        own_id.set(Some(id));

        assert_eq!(frames.tick(0.0), 1);
        assert_eq!(frames.tick(16.0), 0);
    }
}
