use chrono::{DateTime, Duration, Local, TimeZone};
use proptest::prelude::*;

use life_calendar::models::event::Event;
use life_calendar::services::layout::{layout_events, DayLayout};

fn base() -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap()
}

fn build(intervals: &[(i64, i64)]) -> Vec<Event> {
    intervals
        .iter()
        .enumerate()
        .map(|(i, (start, length))| {
            let start = base() + Duration::minutes(*start);
            Event::new(format!("e{}", i), "Event", start, start + Duration::minutes(*length)).unwrap()
        })
        .collect()
}

fn overlaps(a: &Event, b: &Event) -> bool {
    a.start < b.end && b.start < a.end
}

/// Overlap groups in start order: a new group opens once nothing is open.
fn groups(events: &[Event]) -> Vec<Vec<&Event>> {
    let mut ordered: Vec<&Event> = events.iter().collect();
    ordered.sort_by_key(|e| e.start);

    let mut groups: Vec<Vec<&Event>> = Vec::new();
    let mut open_until: Option<DateTime<Local>> = None;
    for event in ordered {
        match open_until {
            Some(end) if event.start < end => {
                open_until = Some(end.max(event.end));
                if let Some(group) = groups.last_mut() {
                    group.push(event);
                }
            }
            _ => {
                open_until = Some(event.end);
                groups.push(vec![event]);
            }
        }
    }
    groups
}

fn max_concurrency(group: &[&Event]) -> usize {
    group
        .iter()
        .map(|probe| {
            group
                .iter()
                .filter(|e| e.start <= probe.start && probe.start < e.end)
                .count()
        })
        .max()
        .unwrap_or(0)
}

fn intervals() -> impl Strategy<Value = Vec<(i64, i64)>> {
    prop::collection::vec((0i64..1380, 15i64..240), 0..40)
}

proptest! {
    /// Events sharing a column never overlap.
    #[test]
    fn prop_same_column_never_overlaps(raw in intervals()) {
        let events = build(&raw);
        let refs: Vec<&Event> = events.iter().collect();
        let layout: DayLayout = layout_events(&refs);

        prop_assert_eq!(layout.len(), events.len());
        for a in &events {
            for b in &events {
                if a.id != b.id && layout[&a.id].col == layout[&b.id].col {
                    prop_assert!(!overlaps(a, b), "{} and {} share a column", a.id, b.id);
                }
            }
        }
    }

    /// Every group uses exactly as many columns as its peak concurrency.
    #[test]
    fn prop_total_cols_is_peak_concurrency(raw in intervals()) {
        let events = build(&raw);
        let refs: Vec<&Event> = events.iter().collect();
        let layout = layout_events(&refs);

        for group in groups(&events) {
            let expected = max_concurrency(&group);
            for event in &group {
                let slot = layout[&event.id];
                prop_assert_eq!(slot.total_cols, expected);
                prop_assert!(slot.col < slot.total_cols);
            }
        }
    }
}
