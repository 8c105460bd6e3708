use std::collections::{BTreeMap, HashSet};

use super::{EventStore, TemplateStore};
use crate::models::event::Event;
use crate::models::goal::{Goal, GoalTree};
use crate::models::habit::Habit;

/// In-memory event collection preserving insertion order.
#[derive(Debug, Default, Clone)]
pub struct MemoryEventStore {
    events: Vec<Event>,
    revision: u64,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(events: Vec<Event>) -> Self {
        Self {
            events,
            revision: 0,
        }
    }

    /// Incremented on every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.events.iter().position(|event| event.id == id)
    }
}

impl EventStore for MemoryEventStore {
    fn events(&self) -> &[Event] {
        &self.events
    }

    fn add_event(&mut self, event: Event) {
        match self.position(&event.id) {
            Some(index) => {
                log::warn!("Event {} already exists, replacing it", event.id);
                self.events[index] = event;
            }
            None => self.events.push(event),
        }
        self.revision += 1;
    }

    fn update_event(&mut self, event: Event) {
        match self.position(&event.id) {
            Some(index) => {
                self.events[index] = event;
                self.revision += 1;
            }
            None => log::warn!("Cannot update missing event {}", event.id),
        }
    }

    fn delete_event(&mut self, id: &str) {
        match self.position(id) {
            Some(index) => {
                self.events.remove(index);
                self.revision += 1;
            }
            None => log::warn!("Cannot delete missing event {}", id),
        }
    }

    fn evict(&mut self, ids: &HashSet<String>) {
        if ids.is_empty() {
            return;
        }
        let before = self.events.len();
        self.events.retain(|event| !ids.contains(&event.id));
        if self.events.len() != before {
            self.revision += 1;
        }
    }
}

/// In-memory habits plus the goal tree.
#[derive(Debug, Default, Clone)]
pub struct MemoryTemplateStore {
    habits: BTreeMap<String, Habit>,
    goals: GoalTree,
}

impl MemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_templates(habits: Vec<Habit>, goals: GoalTree) -> Self {
        Self {
            habits: habits.into_iter().map(|h| (h.id.clone(), h)).collect(),
            goals,
        }
    }

    pub fn habits(&self) -> impl Iterator<Item = &Habit> {
        self.habits.values()
    }

    pub fn goals(&self) -> &GoalTree {
        &self.goals
    }

    pub fn goals_mut(&mut self) -> &mut GoalTree {
        &mut self.goals
    }
}

impl TemplateStore for MemoryTemplateStore {
    fn habit(&self, id: &str) -> Option<&Habit> {
        self.habits.get(id)
    }

    fn update_habit(&mut self, habit: Habit) {
        if let Err(err) = habit.validate() {
            log::warn!("Rejected habit {}: {}", habit.id, err);
            return;
        }
        self.habits.insert(habit.id.clone(), habit);
    }

    fn delete_habit(&mut self, id: &str) {
        if self.habits.remove(id).is_none() {
            log::warn!("Cannot delete missing habit {}", id);
        }
    }

    fn goal(&self, id: &str) -> Option<&Goal> {
        self.goals.get(id)
    }

    fn update_goal(&mut self, goal: Goal) {
        let id = goal.id.clone();
        let result = if self.goals.contains(&id) {
            self.goals.update(goal)
        } else {
            self.goals.insert(goal)
        };
        if let Err(err) = result {
            log::warn!("Rejected goal {}: {}", id, err);
        }
    }
}
