use std::time::Instant;

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone};
use proptest::prelude::*;

use life_calendar::interaction::{DragMachine, DragOutcome, DragView, PointerKind, TimeGrid};
use life_calendar::models::event::Event;
use life_calendar::utils::date::is_snapped;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 10).unwrap()
}

fn snapped(slot: i64) -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 6, 10, 0, 0, 0).unwrap() + Duration::minutes(slot * 15)
}

fn event(start_slot: i64, length_slots: i64) -> Event {
    let start = snapped(start_slot);
    Event::new("evt", "Event", start, start + Duration::minutes(length_slots * 15)).unwrap()
}

/// Event starting at an arbitrary minute with an arbitrary length.
fn loose_event(start_minute: i64, length_minutes: i64) -> Event {
    let start = snapped(0) + Duration::minutes(start_minute);
    Event::new("evt", "Event", start, start + Duration::minutes(length_minutes)).unwrap()
}

fn moves() -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(-400.0f32..400.0, 1..20)
}

proptest! {
    #[test]
    fn prop_move_keeps_duration_and_grid(
        start_slot in 16i64..72,
        length_slots in 1i64..12,
        pph in 40.0f32..240.0,
        offsets in moves(),
    ) {
        let original = event(start_slot, length_slots);
        let mut machine = DragMachine::new(DragView::Day, TimeGrid::new(pph, 20.0));
        prop_assert!(machine.pointer_down_on_event(&original, 600.0, PointerKind::Mouse));

        for offset in offsets {
            machine.pointer_move(600.0 + offset, None);
            let temp = machine.temp_event().unwrap();
            prop_assert_eq!(temp.duration(), original.duration());
            prop_assert!(is_snapped(temp.start) && is_snapped(temp.end));
        }

        match machine.pointer_up(Instant::now()) {
            Some(DragOutcome::Commit(event)) => prop_assert_eq!(event.duration(), original.duration()),
            Some(DragOutcome::OpenEditor { .. }) => {}
            other => prop_assert!(false, "unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn prop_resize_never_below_floor(
        start_slot in 16i64..72,
        length_slots in 1i64..12,
        offsets in moves(),
    ) {
        let original = event(start_slot, length_slots);
        let mut machine = DragMachine::new(DragView::Day, TimeGrid::new(60.0, 20.0));
        machine.pointer_down_on_handle(&original, 600.0, PointerKind::Mouse);

        for offset in offsets {
            machine.pointer_move(600.0 + offset, None);
            let temp = machine.temp_event().unwrap();
            prop_assert!(temp.duration() >= Duration::minutes(15));
            prop_assert_eq!(temp.start, original.start);
            prop_assert!(is_snapped(temp.end));
        }
    }

    #[test]
    fn prop_create_interval_is_ordered_and_snapped(
        anchor_y in 0.0f32..1400.0,
        offsets in moves(),
    ) {
        let mut machine = DragMachine::new(DragView::Day, TimeGrid::new(60.0, 20.0));
        machine.pointer_down_on_slot(day(), anchor_y, PointerKind::Touch);

        for offset in offsets {
            machine.pointer_move(anchor_y + offset, None);
            let temp = machine.temp_event().unwrap();
            prop_assert!(temp.end > temp.start);
            prop_assert!(is_snapped(temp.start) && is_snapped(temp.end));
        }
    }

    #[test]
    fn prop_move_snaps_unaligned_start(
        start_minute in 240i64..1080,
        length_minutes in 15i64..180,
        offsets in moves(),
    ) {
        let original = loose_event(start_minute, length_minutes);
        let mut machine = DragMachine::new(DragView::Day, TimeGrid::new(60.0, 20.0));
        machine.pointer_down_on_event(&original, 600.0, PointerKind::Mouse);

        for offset in offsets {
            machine.pointer_move(600.0 + offset, None);
            let temp = machine.temp_event().unwrap();
            if temp.start != original.start {
                prop_assert!(is_snapped(temp.start));
            }
            prop_assert_eq!(temp.duration(), original.duration());
        }
    }

    #[test]
    fn prop_resize_snaps_unaligned_end(
        start_minute in 240i64..1080,
        length_minutes in 15i64..180,
        offsets in moves(),
    ) {
        let original = loose_event(start_minute, length_minutes);
        let mut machine = DragMachine::new(DragView::Day, TimeGrid::new(60.0, 20.0));
        machine.pointer_down_on_handle(&original, 600.0, PointerKind::Mouse);

        for offset in offsets {
            machine.pointer_move(600.0 + offset, None);
            let temp = machine.temp_event().unwrap();
            prop_assert_eq!(temp.start, original.start);
            prop_assert!(temp.duration() >= Duration::minutes(15));
            if temp.end != original.end {
                prop_assert!(is_snapped(temp.end));
            }
        }
    }
}
