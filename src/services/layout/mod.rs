//! Overlap layout for a single calendar day.
//!
//! Events are sorted by start (stable), split into overlap groups at every
//! gap where no event is open, and packed greedily into the lowest free
//! column. Every member of a group shares the group's column count, so
//! simultaneous events render side by side at equal widths.
//!
//! Intervals are half-open: an event ending at 10:00 does not overlap one
//! starting at 10:00.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Local, NaiveDate};

use crate::models::event::Event;
use crate::utils::date::start_of_day;

/// Column placement of one event within its overlap group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSlot {
    pub col: usize,
    pub total_cols: usize,
}

impl ColumnSlot {
    /// Horizontal extent as fractions of the day column width.
    pub fn fraction(&self) -> (f32, f32) {
        let width = 1.0 / self.total_cols.max(1) as f32;
        (self.col as f32 * width, width)
    }
}

pub type DayLayout = HashMap<String, ColumnSlot>;

/// Events that occupy any part of `date`. Ill-formed events are left out.
pub fn events_on_day(events: &[Event], date: NaiveDate) -> Vec<&Event> {
    let Some(day_start) = start_of_day(date) else {
        return Vec::new();
    };
    let day_end = start_of_day(date + Duration::days(1))
        .unwrap_or_else(|| day_start + Duration::days(1));

    events
        .iter()
        .filter(|event| event.is_well_formed())
        .filter(|event| {
            event.starts_on(date) || (event.start < day_start && event.end > day_start)
        })
        .filter(|event| event.start < day_end)
        .collect()
}

/// Assign columns to a day's events.
pub fn layout_events(events: &[&Event]) -> DayLayout {
    let mut ordered: Vec<&Event> = events
        .iter()
        .copied()
        .filter(|event| event.is_well_formed())
        .collect();
    ordered.sort_by_key(|event| event.start);

    let mut layout = DayLayout::with_capacity(ordered.len());
    let mut group: Vec<(&Event, usize)> = Vec::new();
    let mut column_ends: Vec<DateTime<Local>> = Vec::new();
    let mut group_end: Option<DateTime<Local>> = None;

    for event in ordered {
        if group_end.is_some_and(|end| event.start >= end) {
            close_group(&mut layout, &mut group, column_ends.len());
            column_ends.clear();
            group_end = None;
        }

        let col = match column_ends.iter().position(|end| *end <= event.start) {
            Some(free) => {
                column_ends[free] = event.end;
                free
            }
            None => {
                column_ends.push(event.end);
                column_ends.len() - 1
            }
        };
        group.push((event, col));

        group_end = Some(group_end.map_or(event.end, |end| end.max(event.end)));
    }
    close_group(&mut layout, &mut group, column_ends.len());

    log::debug!("Laid out {} events", layout.len());
    layout
}

/// Filter a collection to `date` and lay it out.
pub fn layout_day(events: &[Event], date: NaiveDate) -> DayLayout {
    layout_events(&events_on_day(events, date))
}

fn close_group(layout: &mut DayLayout, group: &mut Vec<(&Event, usize)>, total_cols: usize) {
    for (event, col) in group.drain(..) {
        layout.insert(event.id.clone(), ColumnSlot { col, total_cols });
    }
}
