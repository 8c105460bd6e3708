//! Day and week calendar views.
//!
//! A view owns one drag machine. While a gesture is active the view holds a
//! window-level subscription on the shared [`PointerBus`]; the handler reads
//! the machine through the view's shared cell at dispatch time, so it always
//! sees the latest gesture state. The subscription is dropped when the
//! gesture ends or the view goes away.

use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;
use std::time::Instant;

use chrono::{DateTime, Local, NaiveDate};

use super::drag::{DragMachine, DragOutcome, HabitEditConflict, MoveEffect};
use super::listeners::{PointerBus, PointerEvent, Subscription};
use super::{DragView, PointerKind};
use crate::models::event::Event;
use crate::models::settings::Settings;
use crate::services::layout::{layout_day, DayLayout};
use crate::services::store::EventStore;
use crate::utils::date::week_days;

/// What the surrounding UI should do after a gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewAction {
    OpenCreateEditor {
        start: DateTime<Local>,
        end: DateTime<Local>,
    },
    OpenEditor {
        event_id: String,
    },
    Committed {
        event_id: String,
    },
    /// Ask whether the edit applies to this instance or the whole template.
    ResolveHabitEdit(HabitEditConflict),
}

struct Shared {
    machine: RefCell<DragMachine>,
    outcomes: RefCell<Vec<DragOutcome>>,
    last_move: Cell<MoveEffect>,
}

pub struct CalendarView {
    kind: DragView,
    date: NaiveDate,
    bus: PointerBus,
    shared: Rc<Shared>,
    subscription: Option<Subscription>,
}

impl CalendarView {
    pub fn new(kind: DragView, date: NaiveDate, settings: &Settings, bus: &PointerBus) -> Self {
        Self {
            kind,
            date,
            bus: bus.clone(),
            shared: Rc::new(Shared {
                machine: RefCell::new(DragMachine::from_settings(kind, settings)),
                outcomes: RefCell::new(Vec::new()),
                last_move: Cell::new(MoveEffect::default()),
            }),
            subscription: None,
        }
    }

    pub fn kind(&self) -> DragView {
        self.kind
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        self.date = date;
    }

    /// Visible day columns, left to right.
    pub fn columns(&self) -> Vec<NaiveDate> {
        match self.kind {
            DragView::Day => vec![self.date],
            DragView::Week => week_days(self.date),
        }
    }

    /// Column under horizontal position `x` in a grid `width` pixels wide.
    pub fn column_at(&self, x: f32, width: f32) -> Option<NaiveDate> {
        let columns = self.columns();
        if width <= 0.0 || x < 0.0 || x >= width {
            return None;
        }
        let index = (x / width * columns.len() as f32) as usize;
        columns.get(index).copied()
    }

    pub fn machine(&self) -> Ref<'_, DragMachine> {
        self.shared.machine.borrow()
    }

    pub fn is_listening(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn pointer_down_on_slot(&mut self, date: NaiveDate, y: f32, pointer: PointerKind) -> bool {
        let started = self
            .shared
            .machine
            .borrow_mut()
            .pointer_down_on_slot(date, y, pointer);
        self.attach_if(started)
    }

    pub fn pointer_down_on_event(&mut self, event: &Event, y: f32, pointer: PointerKind) -> bool {
        let started = self
            .shared
            .machine
            .borrow_mut()
            .pointer_down_on_event(event, y, pointer);
        self.attach_if(started)
    }

    pub fn pointer_down_on_handle(&mut self, event: &Event, y: f32, pointer: PointerKind) -> bool {
        let started = self
            .shared
            .machine
            .borrow_mut()
            .pointer_down_on_handle(event, y, pointer);
        self.attach_if(started)
    }

    fn attach_if(&mut self, started: bool) -> bool {
        if started && self.subscription.is_none() {
            let shared = Rc::clone(&self.shared);
            self.subscription = Some(self.bus.subscribe(move |event| handle(&shared, event)));
        }
        started
    }

    /// Effect of the most recent pointer move seen by this view.
    pub fn last_move(&self) -> MoveEffect {
        self.shared.last_move.get()
    }

    /// Modifier+scroll zoom. Only the day view zooms.
    pub fn scroll(&mut self, notches: f32, modifier: bool) -> bool {
        if self.kind != DragView::Day || !modifier {
            return false;
        }
        self.shared.machine.borrow_mut().grid_mut().zoom_by(notches)
    }

    /// Abort the gesture (Escape).
    pub fn cancel(&mut self) -> bool {
        let cancelled = self.shared.machine.borrow_mut().cancel();
        self.subscription = None;
        cancelled
    }

    /// Act on finished gestures. Commits go straight to `store`; everything
    /// else is handed back to the caller.
    pub fn process<S: EventStore + ?Sized>(&mut self, store: &mut S) -> Vec<ViewAction> {
        let outcomes: Vec<DragOutcome> = self.shared.outcomes.borrow_mut().drain(..).collect();
        if !self.shared.machine.borrow().is_dragging() {
            self.subscription = None;
        }

        outcomes
            .into_iter()
            .map(|outcome| match outcome {
                DragOutcome::OpenCreateEditor { start, end } => {
                    ViewAction::OpenCreateEditor { start, end }
                }
                DragOutcome::OpenEditor { event_id } => ViewAction::OpenEditor { event_id },
                DragOutcome::Commit(event) => {
                    let event_id = event.id.clone();
                    log::info!("Committed drag of {}", event_id);
                    store.update_event(event);
                    ViewAction::Committed { event_id }
                }
                DragOutcome::NeedsHabitResolution(conflict) => {
                    ViewAction::ResolveHabitEdit(conflict)
                }
            })
            .collect()
    }

    /// A click on an event body. Ignored right after a drag.
    pub fn click_event(&self, event_id: &str, now: Instant) -> Option<ViewAction> {
        if self.shared.machine.borrow().should_suppress_click(now) {
            log::debug!("Suppressed click on {} after drag", event_id);
            return None;
        }
        Some(ViewAction::OpenEditor {
            event_id: event_id.to_string(),
        })
    }

    /// Events as they should be drawn: the temp event replaces its
    /// underlying event, or is appended for a create gesture.
    pub fn render_events(&self, events: &[Event]) -> Vec<Event> {
        let machine = self.shared.machine.borrow();
        let mut rendered = events.to_vec();
        if let Some(temp) = machine.temp_event() {
            match rendered.iter_mut().find(|event| event.id == temp.id) {
                Some(slot) => *slot = temp.clone(),
                None => rendered.push(temp.clone()),
            }
        }
        rendered
    }

    pub fn layout_for(&self, events: &[Event], date: NaiveDate) -> DayLayout {
        layout_day(&self.render_events(events), date)
    }
}

fn handle(shared: &Shared, event: &PointerEvent) {
    let mut machine = shared.machine.borrow_mut();
    match *event {
        PointerEvent::Move { y, date } => {
            shared.last_move.set(machine.pointer_move(y, date));
        }
        PointerEvent::Up => {
            if let Some(outcome) = machine.pointer_up(Instant::now()) {
                shared.outcomes.borrow_mut().push(outcome);
            }
        }
        PointerEvent::Cancel => {
            machine.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::store::MemoryEventStore;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn june(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, day).unwrap()
    }

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 6, day, hour, minute, 0).unwrap()
    }

    fn view(kind: DragView, bus: &PointerBus) -> CalendarView {
        CalendarView::new(kind, june(3), &Settings::default(), bus)
    }

    #[test]
    fn test_create_gesture_through_bus() {
        let bus = PointerBus::new();
        let mut v = view(DragView::Day, &bus);
        let mut store = MemoryEventStore::new();

        assert!(v.pointer_down_on_slot(june(3), 540.0, PointerKind::Mouse));
        assert_eq!(bus.listener_count(), 1);

        bus.dispatch(PointerEvent::Move {
            y: 615.0,
            date: None,
        });
        bus.dispatch(PointerEvent::Up);

        let actions = v.process(&mut store);
        assert_eq!(
            actions,
            vec![ViewAction::OpenCreateEditor {
                start: at(3, 9, 0),
                end: at(3, 10, 15)
            }]
        );
        assert!(store.is_empty());
        assert!(!v.is_listening());
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_move_commit_updates_store() {
        let bus = PointerBus::new();
        let mut v = view(DragView::Day, &bus);
        let event = Event::new("evt-1", "Standup", at(3, 9, 0), at(3, 9, 30)).unwrap();
        let mut store = MemoryEventStore::with_events(vec![event.clone()]);

        v.pointer_down_on_event(&event, 540.0, PointerKind::Mouse);
        bus.dispatch(PointerEvent::Move {
            y: 600.0,
            date: None,
        });

        let layout = v.layout_for(store.events(), june(3));
        assert_eq!(layout.len(), 1);
        assert_eq!(v.render_events(store.events())[0].start, at(3, 10, 0));

        bus.dispatch(PointerEvent::Up);
        let actions = v.process(&mut store);
        assert_eq!(
            actions,
            vec![ViewAction::Committed {
                event_id: "evt-1".into()
            }]
        );
        assert_eq!(store.find("evt-1").unwrap().start, at(3, 10, 0));
        assert!(v.click_event("evt-1", Instant::now()).is_none());
    }

    #[test]
    fn test_week_view_drop_on_other_column() {
        let bus = PointerBus::new();
        let mut v = view(DragView::Week, &bus);
        let event = Event::new("evt-1", "Standup", at(1, 9, 0), at(1, 10, 0)).unwrap();
        let mut store = MemoryEventStore::with_events(vec![event.clone()]);

        let column = v.column_at(450.0, 700.0).unwrap();
        assert_eq!(column, june(5));

        v.pointer_down_on_event(&event, 540.0, PointerKind::Mouse);
        bus.dispatch(PointerEvent::Move {
            y: 540.0,
            date: Some(column),
        });
        bus.dispatch(PointerEvent::Up);
        v.process(&mut store);

        let moved = store.find("evt-1").unwrap();
        assert_eq!((moved.start, moved.end), (at(5, 9, 0), at(5, 10, 0)));
    }

    #[test]
    fn test_zoom_only_in_day_view_with_modifier() {
        let bus = PointerBus::new();
        let mut day = view(DragView::Day, &bus);
        let mut week = view(DragView::Week, &bus);

        assert!(!day.scroll(1.0, false));
        assert!(day.scroll(1.0, true));
        assert_eq!(day.machine().grid().pixels_per_hour(), 80.0);
        assert!(!week.scroll(1.0, true));
    }

    #[test]
    fn test_cancel_and_teardown_detach_listeners() {
        let bus = PointerBus::new();
        let mut v = view(DragView::Day, &bus);
        v.pointer_down_on_slot(june(3), 100.0, PointerKind::Touch);
        assert!(v.cancel());
        assert_eq!(bus.listener_count(), 0);

        v.pointer_down_on_slot(june(3), 100.0, PointerKind::Touch);
        bus.dispatch(PointerEvent::Move {
            y: 130.0,
            date: None,
        });
        assert!(v.last_move().prevent_default);
        drop(v);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_columns() {
        let bus = PointerBus::new();
        assert_eq!(view(DragView::Day, &bus).columns(), vec![june(3)]);
        let week = view(DragView::Week, &bus).columns();
        assert_eq!(week.first(), Some(&june(1)));
        assert_eq!(week.last(), Some(&(june(1) + Duration::days(6))));
    }
}
