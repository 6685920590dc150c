//! Generation-based cooperative cancellation.
//!
//! Every new unit of work advances the shared [`Generation`] and receives a
//! [`CycleToken`]. Work that finishes after a newer token was issued sees
//! `is_current() == false` and must discard its result. Nothing is aborted;
//! stale work simply completes and is ignored.

use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Clone, Default)]
pub struct Generation {
    current: Rc<Cell<u64>>,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidates every outstanding token and returns a fresh one.
    pub fn advance(&self) -> CycleToken {
        let next = self.current.get().wrapping_add(1);
        self.current.set(next);
        CycleToken {
            current: self.current.clone(),
            value: next,
        }
    }

    /// Invalidates every outstanding token without issuing a new one.
    pub fn invalidate(&self) {
        self.current.set(self.current.get().wrapping_add(1));
    }

    pub fn current(&self) -> u64 {
        self.current.get()
    }
}

#[derive(Debug, Clone)]
pub struct CycleToken {
    current: Rc<Cell<u64>>,
    value: u64,
}

impl CycleToken {
    pub fn is_current(&self) -> bool {
        self.current.get() == self.value
    }

    pub fn value(&self) -> u64 {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::Generation;

    #[test]
    fn newer_token_supersedes_older() {
        let generation = Generation::new();
        let first = generation.advance();
        assert!(first.is_current());

        let second = generation.advance();
        assert!(!first.is_current());
        assert!(second.is_current());
        assert!(second.value() > first.value());
    }

    #[test]
    fn invalidate_cancels_everything() {
        let generation = Generation::new();
        let token = generation.advance();
        generation.invalidate();
        assert!(!token.is_current());
    }
}
