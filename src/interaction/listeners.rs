//! Window-level pointer listeners.
//!
//! A view subscribes for move/up events when a gesture starts and holds the
//! returned [`Subscription`]; dropping it detaches the listener. Handlers
//! are called with a snapshot of the listener list, so a handler may drop
//! subscriptions (including its own) while being dispatched.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Move { y: f32, date: Option<NaiveDate> },
    Up,
    Cancel,
}

type Handler = Rc<dyn Fn(&PointerEvent)>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    handlers: Vec<(u64, Handler)>,
}

/// Shared dispatch point, cheap to clone.
#[derive(Clone, Default)]
pub struct PointerBus {
    inner: Rc<RefCell<Listeners>>,
}

impl PointerBus {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "the listener is removed when the subscription is dropped"]
    pub fn subscribe(&self, handler: impl Fn(&PointerEvent) + 'static) -> Subscription {
        let mut listeners = self.inner.borrow_mut();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.handlers.push((id, Rc::new(handler)));
        Subscription {
            id,
            bus: Rc::downgrade(&self.inner),
        }
    }

    pub fn dispatch(&self, event: PointerEvent) {
        let handlers: Vec<Handler> = self
            .inner
            .borrow()
            .handlers
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();
        for handler in handlers {
            handler(&event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().handlers.len()
    }
}

/// Detaches its listener on drop.
pub struct Subscription {
    id: u64,
    bus: Weak<RefCell<Listeners>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.borrow_mut().handlers.retain(|(id, _)| *id != self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
