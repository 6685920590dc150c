use std::cell::RefCell;
use std::rc::Rc;

/// A recorded lifecycle event.
///
/// `cycle` is the generation of the work that emitted it, so events from a
/// superseded cycle can be told apart from the current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub cycle: u64,
    pub kind: &'static str,
    pub message: String,
}

/// Append-only event log shared between a component and its observers.
///
/// Cloning shares the log. Emitting also forwards to `tracing` at debug level.
#[derive(Debug, Default, Clone)]
pub struct EventBus {
    events: Rc<RefCell<Vec<Event>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, cycle: u64, kind: &'static str, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(cycle, kind, "{message}");
        self.events.borrow_mut().push(Event {
            cycle,
            kind,
            message,
        });
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    /// Event kinds in emission order.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.events.borrow().iter().map(|e| e.kind).collect()
    }

    pub fn drain(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::EventBus;

    #[test]
    fn records_events_with_cycle() {
        let bus = EventBus::new();
        bus.emit(2, "resolving", "YYZ -> LHR");
        let events = bus.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].cycle, 2);
        assert_eq!(bus.kinds(), vec!["resolving"]);
    }

    #[test]
    fn drain_clears_events() {
        let bus = EventBus::new();
        let shared = bus.clone();
        shared.emit(0, "k", "m");
        let drained = bus.drain();
        assert_eq!(drained.len(), 1);
        assert!(shared.events().is_empty());
    }
}
