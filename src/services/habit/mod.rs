//! Habit materializer.
//!
//! Expands recurring templates (habits and habit-flagged goals) into dated
//! events for a rolling window around "today", and reconciles the live
//! event collection when a template changes. Reconciliation works purely on
//! deterministic instance ids: it adds missing ids, evicts ids the template
//! no longer wants, and never rewrites an id it leaves in place. User-owned
//! events are never touched.

use std::collections::{BTreeSet, HashSet};

use chrono::{Datelike, Local, NaiveDate};

use crate::models::event::{Event, TemplateKey};
use crate::models::goal::{Goal, HabitFrequency};
use crate::models::habit::Habit;
use crate::models::template::TimeWindow;
use crate::services::store::EventStore;
use crate::utils::date::week_days;

/// A rule that produces dated event instances.
pub trait RecurringTemplate {
    fn key(&self) -> TemplateKey;

    fn time_window(&self) -> Option<TimeWindow>;

    /// Candidate days for the window containing `today`.
    fn window(&self, today: NaiveDate) -> Vec<NaiveDate>;

    /// Whether the rule selects `date` (weekday filter, frequency, skips).
    fn runs_on(&self, date: NaiveDate) -> bool;

    /// Build the instance for `date`, copying descriptive fields.
    fn instance(&self, id: String, window: TimeWindow, date: NaiveDate) -> Option<Event>;
}

impl RecurringTemplate for Habit {
    fn key(&self) -> TemplateKey {
        Habit::key(self)
    }

    fn time_window(&self) -> Option<TimeWindow> {
        Habit::time_window(self)
    }

    fn window(&self, today: NaiveDate) -> Vec<NaiveDate> {
        week_days(today)
    }

    fn runs_on(&self, date: NaiveDate) -> bool {
        Habit::runs_on(self, date)
    }

    fn instance(&self, id: String, window: TimeWindow, date: NaiveDate) -> Option<Event> {
        let (start, end) = window.on(date)?;
        let mut event = Event::new(id, self.title.clone(), start, end).ok()?;
        event.description = self.description.clone();
        event.event_type = self.event_type;
        event.priority = self.priority;
        event.habit_id = Some(self.id.clone());
        event.prep_time = self.prep_time;
        event.travel_time = self.travel_time;
        Some(event)
    }
}

impl RecurringTemplate for Goal {
    fn key(&self) -> TemplateKey {
        Goal::key(self)
    }

    fn time_window(&self) -> Option<TimeWindow> {
        Goal::time_window(self)
    }

    fn window(&self, today: NaiveDate) -> Vec<NaiveDate> {
        match self.frequency() {
            HabitFrequency::Daily | HabitFrequency::Weekly => week_days(today),
            HabitFrequency::Monthly => today.with_day(1).into_iter().collect(),
        }
    }

    fn runs_on(&self, date: NaiveDate) -> bool {
        Goal::runs_on(self, date)
    }

    fn instance(&self, id: String, window: TimeWindow, date: NaiveDate) -> Option<Event> {
        let (start, end) = window.on(date)?;
        let mut event = Event::new(id, self.title.clone(), start, end).ok()?;
        event.description = self.description.clone();
        event.event_type = self.event_type;
        event.priority = self.priority;
        event.connected_goal_id = Some(self.id.clone());
        Some(event)
    }
}

/// Ids touched by one reconciliation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Materializes templates relative to today's date.
#[derive(Debug, Default, Clone, Copy)]
pub struct Materializer {
    fixed_today: Option<NaiveDate>,
}

impl Materializer {
    /// Uses the local date at the time of each call.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin "today" to a fixed date.
    pub fn at(today: NaiveDate) -> Self {
        Self {
            fixed_today: Some(today),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.fixed_today
            .unwrap_or_else(|| Local::now().date_naive())
    }

    /// Every instance the template should have in the current window.
    pub fn materialize<T: RecurringTemplate + ?Sized>(&self, template: &T) -> Vec<Event> {
        let Some(window) = template.time_window() else {
            return Vec::new();
        };
        let key = template.key();

        template
            .window(self.today())
            .into_iter()
            .filter(|date| template.runs_on(*date))
            .filter_map(|date| template.instance(key.instance_id(date), window, date))
            .collect()
    }

    /// Insert the full instance set for a newly created template.
    pub fn on_created<S, T>(&self, store: &mut S, template: &T) -> ReconcileReport
    where
        S: EventStore + ?Sized,
        T: RecurringTemplate + ?Sized,
    {
        let present = ids_in(store);
        let mut report = ReconcileReport::default();
        for event in self.materialize(template) {
            if present.contains(&event.id) {
                continue;
            }
            report.added.push(event.id.clone());
            store.add_event(event);
        }
        log::debug!(
            "Materialized {} instances for {}",
            report.added.len(),
            template.key()
        );
        report
    }

    /// Bring the store in line with an edited template.
    ///
    /// Instances present both before and after are left untouched. Only
    /// instances dated inside the current window are candidates for removal.
    pub fn on_updated<S, T>(&self, store: &mut S, template: &T) -> ReconcileReport
    where
        S: EventStore + ?Sized,
        T: RecurringTemplate + ?Sized,
    {
        let key = template.key();
        let window: BTreeSet<NaiveDate> = template.window(self.today()).into_iter().collect();
        let should_exist = self.materialize(template);
        let wanted: HashSet<&str> = should_exist.iter().map(|e| e.id.as_str()).collect();

        let existing: HashSet<String> = store
            .events()
            .iter()
            .filter_map(|event| event.instance().map(|instance| (event, instance)))
            .filter(|(_, instance)| instance.template == key)
            .map(|(event, _)| event.id.clone())
            .collect();

        let stale: HashSet<String> = store
            .events()
            .iter()
            .filter(|event| existing.contains(&event.id))
            .filter(|event| event.instance().is_some_and(|i| window.contains(&i.date)))
            .filter(|event| !wanted.contains(event.id.as_str()))
            .map(|event| event.id.clone())
            .collect();

        let mut report = ReconcileReport::default();
        for event in should_exist {
            if existing.contains(&event.id) {
                continue;
            }
            report.added.push(event.id.clone());
            store.add_event(event);
        }

        if !stale.is_empty() {
            let mut removed: Vec<String> = stale.iter().cloned().collect();
            removed.sort();
            store.evict(&stale);
            report.removed = removed;
        }

        log::debug!(
            "Reconciled {}: {} added, {} removed",
            key,
            report.added.len(),
            report.removed.len()
        );
        report
    }

    /// Drop every instance of a deleted template.
    pub fn on_deleted<S>(&self, store: &mut S, key: &TemplateKey) -> ReconcileReport
    where
        S: EventStore + ?Sized,
    {
        let doomed: HashSet<String> = store
            .events()
            .iter()
            .filter(|event| event.materialized_owner().as_ref() == Some(key))
            .map(|event| event.id.clone())
            .collect();

        let mut removed: Vec<String> = doomed.iter().cloned().collect();
        removed.sort();
        store.evict(&doomed);
        log::debug!("Removed {} instances of deleted {}", removed.len(), key);

        ReconcileReport {
            added: Vec::new(),
            removed,
        }
    }

    /// Rebuild every in-window instance, e.g. after the template's times
    /// changed and existing instances are stale.
    pub fn regenerate<S, T>(&self, store: &mut S, template: &T) -> ReconcileReport
    where
        S: EventStore + ?Sized,
        T: RecurringTemplate + ?Sized,
    {
        let key = template.key();
        let window: BTreeSet<NaiveDate> = template.window(self.today()).into_iter().collect();
        let in_window: HashSet<String> = store
            .events()
            .iter()
            .filter(|event| {
                event
                    .instance()
                    .is_some_and(|i| i.template == key && window.contains(&i.date))
            })
            .map(|event| event.id.clone())
            .collect();

        let mut removed: Vec<String> = in_window.iter().cloned().collect();
        removed.sort();
        store.evict(&in_window);

        let added = self.on_created(store, template).added;
        ReconcileReport { added, removed }
    }
}

/// Keeps a fixed set of templates reconciled against a window that follows
/// the calendar. Long-running callers feed it the current date on every
/// poll; it reconciles again only when the date changes.
#[derive(Debug, Clone, Default)]
pub struct WindowRoller {
    habits: Vec<Habit>,
    goals: Vec<Goal>,
    last_reconciled: Option<NaiveDate>,
}

impl WindowRoller {
    pub fn new(habits: Vec<Habit>, goals: Vec<Goal>) -> Self {
        Self {
            habits,
            goals,
            last_reconciled: None,
        }
    }

    pub fn last_reconciled(&self) -> Option<NaiveDate> {
        self.last_reconciled
    }

    /// Reconcile every template for the window containing `today`. Returns
    /// `None` when `today` was already reconciled.
    pub fn roll<S>(&mut self, store: &mut S, today: NaiveDate) -> Option<ReconcileReport>
    where
        S: EventStore + ?Sized,
    {
        if self.last_reconciled == Some(today) {
            return None;
        }

        let materializer = Materializer::at(today);
        let mut report = ReconcileReport::default();
        let templates = self
            .habits
            .iter()
            .map(|habit| habit as &dyn RecurringTemplate)
            .chain(self.goals.iter().map(|goal| goal as &dyn RecurringTemplate));
        for template in templates {
            let step = materializer.on_updated(store, template);
            report.added.extend(step.added);
            report.removed.extend(step.removed);
        }

        self.last_reconciled = Some(today);
        log::debug!(
            "Rolled habit window to {}: +{} -{}",
            today,
            report.added.len(),
            report.removed.len()
        );
        Some(report)
    }
}

fn ids_in<S: EventStore + ?Sized>(store: &S) -> HashSet<String> {
    store.events().iter().map(|event| event.id.clone()).collect()
}
