//! Applying a dragged edit to a materialized habit instance.
//!
//! The edited template is validated before either store is touched, so a
//! rejected edit leaves events and templates as they were.

use std::collections::HashSet;

use crate::models::event::{Event, TemplateKey};
use crate::models::template::TemplateError;
use crate::services::habit::{Materializer, ReconcileReport};
use crate::services::store::{EventStore, TemplateStore};
use crate::utils::date::format_hhmm;

use super::drag::HabitEditConflict;

/// Prefix for the standalone copy of an instance edited on its own.
pub const DETACHED_PREFIX: &str = "detached-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HabitEditChoice {
    /// Keep the edit on this day only.
    InstanceOnly,
    /// Move the template's time window; every instance follows.
    WholeTemplate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub report: ReconcileReport,
    /// Standalone event created for an instance-only edit.
    pub detached: Option<String>,
}

pub fn resolve_habit_edit<S, T>(
    conflict: &HabitEditConflict,
    choice: HabitEditChoice,
    events: &mut S,
    templates: &mut T,
    materializer: &Materializer,
) -> Result<Resolution, TemplateError>
where
    S: EventStore + ?Sized,
    T: TemplateStore + ?Sized,
{
    match choice {
        HabitEditChoice::InstanceOnly => detach_instance(conflict, events, templates, materializer),
        HabitEditChoice::WholeTemplate => retime_template(conflict, events, templates, materializer),
    }
}

/// Skip the instance's own date on the template and store the edit as a
/// user-owned event. The dragged instance is evicted by id even when its
/// date has already left the current window.
fn detach_instance<S, T>(
    conflict: &HabitEditConflict,
    events: &mut S,
    templates: &mut T,
    materializer: &Materializer,
) -> Result<Resolution, TemplateError>
where
    S: EventStore + ?Sized,
    T: TemplateStore + ?Sized,
{
    let date = conflict.instance.date;
    let mut report = match &conflict.instance.template {
        TemplateKey::Habit(id) => {
            let mut habit = templates
                .habit(id)
                .cloned()
                .ok_or_else(|| TemplateError::UnknownHabit(id.clone()))?;
            habit.skip(date);
            habit.validate()?;
            templates.update_habit(habit.clone());
            materializer.on_updated(events, &habit)
        }
        TemplateKey::Goal(id) => {
            let mut goal = templates
                .goal(id)
                .cloned()
                .ok_or_else(|| TemplateError::UnknownGoal(id.clone()))?;
            goal.skip(date);
            goal.validate()?;
            templates.update_goal(goal.clone());
            materializer.on_updated(events, &goal)
        }
    };

    let original = &conflict.original.id;
    if events.find(original).is_some() {
        events.evict(&HashSet::from([original.clone()]));
        report.removed.push(original.clone());
    }

    let standalone = detached_copy(&conflict.edited);
    let detached = standalone.id.clone();
    events.add_event(standalone);
    log::info!("Detached {} as {}", original, detached);

    Ok(Resolution {
        report,
        detached: Some(detached),
    })
}

/// Rewrite the template's time window from the edited interval and rebuild
/// its instances.
fn retime_template<S, T>(
    conflict: &HabitEditConflict,
    events: &mut S,
    templates: &mut T,
    materializer: &Materializer,
) -> Result<Resolution, TemplateError>
where
    S: EventStore + ?Sized,
    T: TemplateStore + ?Sized,
{
    let time = format_hhmm(conflict.edited.start.time());
    let end_time = format_hhmm(conflict.edited.end.time());

    let report = match &conflict.instance.template {
        TemplateKey::Habit(id) => {
            let mut habit = templates
                .habit(id)
                .cloned()
                .ok_or_else(|| TemplateError::UnknownHabit(id.clone()))?;
            habit.time = Some(time);
            habit.end_time = Some(end_time);
            habit.validate()?;
            templates.update_habit(habit.clone());
            materializer.regenerate(events, &habit)
        }
        TemplateKey::Goal(id) => {
            let mut goal = templates
                .goal(id)
                .cloned()
                .ok_or_else(|| TemplateError::UnknownGoal(id.clone()))?;
            goal.habit_time = Some(time);
            goal.habit_end_time = Some(end_time);
            goal.validate()?;
            templates.update_goal(goal.clone());
            materializer.regenerate(events, &goal)
        }
    };

    log::info!(
        "Retimed {} from dragged instance {}",
        conflict.instance.template,
        conflict.original.id
    );
    Ok(Resolution {
        report,
        detached: None,
    })
}

fn detached_copy(edited: &Event) -> Event {
    let mut event = edited.clone();
    event.id = format!("{}{}", DETACHED_PREFIX, edited.id);
    event
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::goal::{Goal, HabitFrequency};
    use crate::models::habit::Habit;
    use crate::services::store::{MemoryEventStore, MemoryTemplateStore};
    use chrono::{Duration, NaiveDate, Timelike};
    use pretty_assertions::assert_eq;

    fn june(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, day).unwrap()
    }

    struct Fixture {
        events: MemoryEventStore,
        templates: MemoryTemplateStore,
        materializer: Materializer,
    }

    fn fixture() -> Fixture {
        let materializer = Materializer::at(june(3));
        let habit = Habit::new("run", "Morning run")
            .with_times("07:00", "07:30")
            .with_days([1, 3, 5]);
        let mut events = MemoryEventStore::new();
        materializer.on_created(&mut events, &habit);
        let templates = MemoryTemplateStore::with_templates(vec![habit], Default::default());
        Fixture {
            events,
            templates,
            materializer,
        }
    }

    fn drag_conflict(events: &MemoryEventStore, id: &str, shift: Duration) -> HabitEditConflict {
        let original = events.find(id).unwrap().clone();
        let mut edited = original.clone();
        edited.start = edited.start + shift;
        edited.end = edited.end + shift;
        HabitEditConflict {
            instance: original.instance().unwrap(),
            original,
            edited,
        }
    }

    #[test]
    fn test_instance_only_detaches_and_skips() {
        let mut f = fixture();
        let conflict = drag_conflict(&f.events, "habit-run-2026-06-01", Duration::hours(1));

        let resolution = resolve_habit_edit(
            &conflict,
            HabitEditChoice::InstanceOnly,
            &mut f.events,
            &mut f.templates,
            &f.materializer,
        )
        .unwrap();

        assert_eq!(resolution.detached.as_deref(), Some("detached-habit-run-2026-06-01"));
        assert_eq!(resolution.report.removed, vec!["habit-run-2026-06-01".to_string()]);
        assert!(f.templates.habit("run").unwrap().is_skipped(june(1)));

        let detached = f.events.find("detached-habit-run-2026-06-01").unwrap();
        assert_eq!(detached.start.hour(), 8);
        assert_eq!(detached.habit_id.as_deref(), Some("run"));
        assert!(!detached.is_materialized());
        assert!(f.events.find("habit-run-2026-06-03").is_some());
        assert_eq!(f.events.len(), 3);
    }

    #[test]
    fn test_instance_only_skips_instance_date() {
        // The dragged instance is Friday even though "today" is Wednesday
        let mut f = fixture();
        let conflict = drag_conflict(&f.events, "habit-run-2026-06-05", Duration::minutes(30));

        resolve_habit_edit(
            &conflict,
            HabitEditChoice::InstanceOnly,
            &mut f.events,
            &mut f.templates,
            &f.materializer,
        )
        .unwrap();

        let habit = f.templates.habit("run").unwrap();
        assert!(habit.is_skipped(june(5)));
        assert!(!habit.is_skipped(june(3)));
    }

    #[test]
    fn test_whole_template_retimes_all_instances() {
        let mut f = fixture();
        let conflict = drag_conflict(&f.events, "habit-run-2026-06-03", Duration::minutes(-60));

        let resolution = resolve_habit_edit(
            &conflict,
            HabitEditChoice::WholeTemplate,
            &mut f.events,
            &mut f.templates,
            &f.materializer,
        )
        .unwrap();

        assert!(resolution.detached.is_none());
        let habit = f.templates.habit("run").unwrap();
        assert_eq!(habit.time.as_deref(), Some("06:00"));
        assert_eq!(habit.end_time.as_deref(), Some("06:30"));
        assert_eq!(f.events.len(), 3);
        assert!(f.events.events().iter().all(|e| e.start.hour() == 6));
    }

    #[test]
    fn test_goal_habit_retime() {
        let materializer = Materializer::at(june(3));
        let goal = Goal::new("g1", "Review").as_habit(HabitFrequency::Weekly);
        let mut events = MemoryEventStore::new();
        materializer.on_created(&mut events, &goal);
        let mut templates = MemoryTemplateStore::new();
        templates.update_goal(goal);

        let conflict = drag_conflict(&events, "goal-habit-g1-2026-06-01", Duration::hours(2));
        resolve_habit_edit(
            &conflict,
            HabitEditChoice::WholeTemplate,
            &mut events,
            &mut templates,
            &materializer,
        )
        .unwrap();

        let goal = templates.goal("g1").unwrap();
        assert_eq!(goal.habit_time.as_deref(), Some("11:00"));
        assert_eq!(events.find("goal-habit-g1-2026-06-01").unwrap().start.hour(), 11);
    }

    #[test]
    fn test_missing_template_is_an_error() {
        let mut f = fixture();
        let conflict = drag_conflict(&f.events, "habit-run-2026-06-01", Duration::hours(1));
        f.templates.delete_habit("run");

        let result = resolve_habit_edit(
            &conflict,
            HabitEditChoice::InstanceOnly,
            &mut f.events,
            &mut f.templates,
            &f.materializer,
        );
        assert_eq!(result, Err(TemplateError::UnknownHabit("run".into())));
    }

    #[test]
    fn test_invalid_template_leaves_stores_untouched() {
        let materializer = Materializer::at(june(3));
        let broken = Habit::new("run", "Morning run")
            .with_times("07:00", "07:30")
            .with_days([1, 9]);
        let valid = Habit::new("run", "Morning run")
            .with_times("07:00", "07:30")
            .with_days([1]);
        let mut events = MemoryEventStore::new();
        materializer.on_created(&mut events, &valid);
        let mut templates = MemoryTemplateStore::with_templates(vec![broken], Default::default());
        let before = events.events().to_vec();

        let conflict = drag_conflict(&events, "habit-run-2026-06-01", Duration::hours(1));
        let result = resolve_habit_edit(
            &conflict,
            HabitEditChoice::InstanceOnly,
            &mut events,
            &mut templates,
            &materializer,
        );

        assert_eq!(result, Err(TemplateError::InvalidWeekday(9)));
        assert_eq!(events.events(), before.as_slice());
        assert!(!templates.habit("run").unwrap().is_skipped(june(1)));
    }

    #[test]
    fn test_instance_only_evicts_instance_from_previous_week() {
        // Instance materialized last week, resolved after the window moved on
        let mut f = fixture();
        let conflict = drag_conflict(&f.events, "habit-run-2026-06-05", Duration::hours(1));
        let next_week = Materializer::at(june(10));

        let resolution = resolve_habit_edit(
            &conflict,
            HabitEditChoice::InstanceOnly,
            &mut f.events,
            &mut f.templates,
            &next_week,
        )
        .unwrap();

        assert!(f.events.find("habit-run-2026-06-05").is_none());
        assert!(f.events.find("detached-habit-run-2026-06-05").is_some());
        assert!(resolution
            .report
            .removed
            .contains(&"habit-run-2026-06-05".to_string()));
    }
}
