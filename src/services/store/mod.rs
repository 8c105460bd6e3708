//! Event and template store contracts.
//!
//! The engine only talks to these traits; how events are persisted is the
//! implementor's business. Calls return nothing: a store logs its own
//! failures instead of surfacing them to the engine.

use std::collections::HashSet;

use crate::models::event::Event;
use crate::models::goal::Goal;
use crate::models::habit::Habit;

mod memory;
pub mod snapshot;

pub use memory::{MemoryEventStore, MemoryTemplateStore};

/// Mutable, ordered collection of events.
pub trait EventStore {
    /// Always-current view of the live collection.
    fn events(&self) -> &[Event];

    fn add_event(&mut self, event: Event);

    fn update_event(&mut self, event: Event);

    fn delete_event(&mut self, id: &str);

    /// Drop derived events from the live collection without a backing
    /// delete. Used for materialized instances, which are not stored
    /// independently.
    fn evict(&mut self, ids: &HashSet<String>);

    fn find(&self, id: &str) -> Option<&Event> {
        self.events().iter().find(|event| event.id == id)
    }
}

/// Access to habit and goal templates.
pub trait TemplateStore {
    fn habit(&self, id: &str) -> Option<&Habit>;

    fn update_habit(&mut self, habit: Habit);

    fn delete_habit(&mut self, id: &str);

    fn goal(&self, id: &str) -> Option<&Goal>;

    fn update_goal(&mut self, goal: Goal);
}
