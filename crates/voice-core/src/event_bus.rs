//! Simple event bus for decoupled communication between the session and a UI.
//!
//! Single-threaded; the queue lives behind an `Rc<RefCell<_>>` and the
//! JavaScript side drains it whenever it polls the agent.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use voice_types::event::SessionEvent;

/// Shared event bus, clone-cheap via Rc.
#[derive(Clone)]
pub struct EventBus {
    inner: Rc<RefCell<VecDeque<SessionEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(VecDeque::new())),
        }
    }

    /// Publish an event. Called by the session and its monitors.
    ///
    /// A round-trip reading replaces one still waiting at the back of the
    /// queue, so a slow consumer only sees the latest value.
    pub fn emit(&self, event: SessionEvent) {
        let mut queue = self.inner.borrow_mut();
        match queue.back_mut() {
            Some(last)
                if matches!(last, SessionEvent::RoundTripChanged { .. })
                    && matches!(event, SessionEvent::RoundTripChanged { .. }) =>
            {
                *last = event;
            }
            _ => queue.push_back(event),
        }
    }

    /// Drain all pending events. Called by the UI layer each frame.
    pub fn drain(&self) -> Vec<SessionEvent> {
        self.inner.borrow_mut().drain(..).collect()
    }

    /// True while events are waiting to be drained
    pub fn has_pending(&self) -> bool {
        !self.inner.borrow().is_empty()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
