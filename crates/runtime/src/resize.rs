//! Host element size observation.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// CSS-pixel size of the element the canvas lives in.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HostSize {
    pub width: f64,
    pub height: f64,
}

impl HostSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// `self` if both sides are measurable, otherwise `fallback`.
    ///
    /// Each side falls back on its own, like `clientWidth || 420`.
    pub fn or_fallback(self, fallback: HostSize) -> HostSize {
        let pick = |v: f64, f: f64| if v.is_finite() && v > 0.0 { v } else { f };
        HostSize::new(
            pick(self.width, fallback.width),
            pick(self.height, fallback.height),
        )
    }

    pub fn aspect(self) -> f64 {
        if self.height <= 0.0 {
            1.0
        } else {
            (self.width / self.height).max(1e-6)
        }
    }
}

pub type ResizeCallback = Box<dyn FnMut(HostSize)>;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub u64);

/// Observes the host element and reports size changes.
///
/// Disconnecting an unknown or already disconnected observer is a no-op.
pub trait ResizeObserver {
    fn observe(&self, callback: ResizeCallback) -> ObserverId;
    fn disconnect(&self, id: ObserverId);
}

#[derive(Default)]
struct ManualResizeInner {
    next_id: u64,
    observers: BTreeMap<ObserverId, Option<ResizeCallback>>,
}

/// Resize observer driven with [`ManualResizeObserver::resize`].
#[derive(Clone, Default)]
pub struct ManualResizeObserver {
    inner: Rc<RefCell<ManualResizeInner>>,
}

impl ManualResizeObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifies every connected observer. Returns how many were notified.
    pub fn resize(&self, size: HostSize) -> usize {
        let ids: Vec<ObserverId> = self.inner.borrow().observers.keys().copied().collect();
        let mut notified = 0;
        for id in ids {
            let callback = self
                .inner
                .borrow_mut()
                .observers
                .get_mut(&id)
                .and_then(Option::take);
            let Some(mut callback) = callback else {
                continue;
            };
            callback(size);
            notified += 1;
            if let Some(slot) = self.inner.borrow_mut().observers.get_mut(&id) {
                *slot = Some(callback);
            }
        }
        notified
    }

    pub fn connected(&self) -> usize {
        self.inner.borrow().observers.len()
    }
}

impl ResizeObserver for ManualResizeObserver {
    fn observe(&self, callback: ResizeCallback) -> ObserverId {
        let mut inner = self.inner.borrow_mut();
        let id = ObserverId(inner.next_id);
        inner.next_id += 1;
        inner.observers.insert(id, Some(callback));
        id
    }

    fn disconnect(&self, id: ObserverId) {
        self.inner.borrow_mut().observers.remove(&id);
    }
}
