//! Pointer/touch drag state machine.
//!
//! `Idle -> Dragging(mode) -> Idle`. A gesture starts on pointer-down over
//! an empty slot (create), an event body (move) or its resize handle
//! (resize). Every pointer move recomputes the temp event from the original
//! interval and the snapped pointer travel, so intermediate positions never
//! accumulate rounding error. Moved starts and resized ends land on the
//! 15-minute grid. Pointer-up turns the gesture into a
//! [`DragOutcome`] for the view to act on.

use std::time::{Duration as StdDuration, Instant};

use chrono::{DateTime, Duration, Local, NaiveDate};

use super::grid::TimeGrid;
use super::{DragView, PointerKind};
use crate::models::event::{min_event_duration, Event, InstanceId};
use crate::models::settings::Settings;
use crate::utils::date::{local_datetime, snap_to_slot, SNAP_MINUTES};

/// Pointer travel below this many pixels is treated as noise.
pub const JITTER_PX: f32 = 2.0;

/// Id given to the placeholder event of a create gesture.
pub const NEW_EVENT_ID: &str = "new-event";
const NEW_EVENT_TITLE: &str = "New event";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragMode {
    Create,
    Move { event_id: String },
    Resize { event_id: String },
}

impl DragMode {
    pub fn event_id(&self) -> Option<&str> {
        match self {
            DragMode::Create => None,
            DragMode::Move { event_id } | DragMode::Resize { event_id } => Some(event_id),
        }
    }
}

/// The gesture in progress.
#[derive(Debug, Clone)]
pub struct DragState {
    pub mode: DragMode,
    pub pointer: PointerKind,
    pub initial_y: f32,
    pub original_start: DateTime<Local>,
    pub original_end: DateTime<Local>,
    /// Column the gesture started in.
    pub origin_date: NaiveDate,
    /// Column currently under the pointer.
    pub hovered_date: NaiveDate,
    pub has_moved: bool,
    source: Option<Event>,
}

impl DragState {
    pub fn source(&self) -> Option<&Event> {
        self.source.as_ref()
    }
}

/// A dragged edit to a materialized instance that needs a decision between
/// changing the instance alone or the whole template.
#[derive(Debug, Clone, PartialEq)]
pub struct HabitEditConflict {
    pub instance: InstanceId,
    pub original: Event,
    pub edited: Event,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    /// Open the editor for a new event over this interval.
    OpenCreateEditor {
        start: DateTime<Local>,
        end: DateTime<Local>,
    },
    /// The gesture was a click; open the editor for the existing event.
    OpenEditor { event_id: String },
    /// Store this event with `update_event`.
    Commit(Event),
    NeedsHabitResolution(HabitEditConflict),
}

/// Result of feeding one pointer move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveEffect {
    /// The temp event changed.
    pub updated: bool,
    /// Touch input: the caller must suppress page scrolling.
    pub prevent_default: bool,
}

#[derive(Debug)]
pub struct DragMachine {
    view: DragView,
    grid: TimeGrid,
    state: Option<DragState>,
    temp: Option<Event>,
    click_suppression: StdDuration,
    suppress_until: Option<Instant>,
}

impl DragMachine {
    pub fn new(view: DragView, grid: TimeGrid) -> Self {
        Self {
            view,
            grid,
            state: None,
            temp: None,
            click_suppression: StdDuration::from_millis(100),
            suppress_until: None,
        }
    }

    pub fn from_settings(view: DragView, settings: &Settings) -> Self {
        let mut machine = Self::new(view, TimeGrid::from_settings(settings));
        machine.click_suppression = StdDuration::from_millis(settings.click_suppression_ms);
        machine
    }

    pub fn view(&self) -> DragView {
        self.view
    }

    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut TimeGrid {
        &mut self.grid
    }

    pub fn state(&self) -> Option<&DragState> {
        self.state.as_ref()
    }

    /// Live preview of the gesture, drawn in place of the underlying event.
    pub fn temp_event(&self) -> Option<&Event> {
        self.temp.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.state.is_some()
    }

    /// Start a create gesture on an empty slot.
    pub fn pointer_down_on_slot(&mut self, date: NaiveDate, y: f32, pointer: PointerKind) -> bool {
        if self.is_dragging() {
            return false;
        }
        let Some(anchor) = self.grid.slot_at(date, y) else {
            log::warn!("No local time for slot at y={} on {}", y, date);
            return false;
        };
        let Ok(temp) = Event::new(NEW_EVENT_ID, NEW_EVENT_TITLE, anchor, anchor) else {
            return false;
        };

        self.begin(
            DragState {
                mode: DragMode::Create,
                pointer,
                initial_y: y,
                original_start: anchor,
                original_end: anchor,
                origin_date: date,
                hovered_date: date,
                has_moved: false,
                source: None,
            },
            temp,
        );
        true
    }

    /// Start a move gesture on an event body.
    pub fn pointer_down_on_event(&mut self, event: &Event, y: f32, pointer: PointerKind) -> bool {
        let mode = DragMode::Move {
            event_id: event.id.clone(),
        };
        self.begin_on_event(mode, event, y, pointer)
    }

    /// Start a resize gesture on an event's bottom handle.
    pub fn pointer_down_on_handle(&mut self, event: &Event, y: f32, pointer: PointerKind) -> bool {
        let mode = DragMode::Resize {
            event_id: event.id.clone(),
        };
        self.begin_on_event(mode, event, y, pointer)
    }

    fn begin_on_event(&mut self, mode: DragMode, event: &Event, y: f32, pointer: PointerKind) -> bool {
        if self.is_dragging() || !event.is_well_formed() {
            return false;
        }
        let date = event.start.date_naive();
        self.begin(
            DragState {
                mode,
                pointer,
                initial_y: y,
                original_start: event.start,
                original_end: event.end,
                origin_date: date,
                hovered_date: date,
                has_moved: false,
                source: Some(event.clone()),
            },
            event.clone(),
        );
        true
    }

    fn begin(&mut self, state: DragState, temp: Event) {
        log::debug!("Drag started: {:?} on {}", state.mode, state.origin_date);
        self.state = Some(state);
        self.temp = Some(temp);
    }

    /// Feed a pointer move. `date` is the column under the pointer, when
    /// known.
    pub fn pointer_move(&mut self, y: f32, date: Option<NaiveDate>) -> MoveEffect {
        let Some(state) = self.state.as_mut() else {
            return MoveEffect::default();
        };

        let delta_y = y - state.initial_y;
        let column = match (self.view, &state.mode) {
            (DragView::Week, DragMode::Move { .. }) => date.unwrap_or(state.hovered_date),
            _ => state.hovered_date,
        };
        let column_changed = column != state.origin_date;

        if !state.has_moved && delta_y.abs() < JITTER_PX && !column_changed {
            return MoveEffect {
                updated: false,
                prevent_default: false,
            };
        }

        let minutes = self.grid.delta_minutes(delta_y);
        if minutes.abs() >= SNAP_MINUTES || column_changed {
            state.has_moved = true;
        }
        state.hovered_date = column;

        let next = self
            .temp
            .as_ref()
            .and_then(|temp| next_temp(state, temp, Duration::minutes(minutes)));

        let updated = match next {
            Some(next) if self.temp.as_ref() != Some(&next) => {
                self.temp = Some(next);
                true
            }
            _ => false,
        };

        MoveEffect {
            updated,
            prevent_default: state.pointer == PointerKind::Touch && state.has_moved,
        }
    }

    /// End the gesture at `now`. Returns `None` when no gesture was active.
    pub fn pointer_up(&mut self, now: Instant) -> Option<DragOutcome> {
        let state = self.state.take()?;
        let temp = self.temp.take()?;

        if state.has_moved {
            self.suppress_until = Some(now + self.click_suppression);
        }

        let outcome = match state.mode {
            DragMode::Create => DragOutcome::OpenCreateEditor {
                start: temp.start,
                end: temp.end,
            },
            DragMode::Move { event_id } | DragMode::Resize { event_id } if !state.has_moved => {
                DragOutcome::OpenEditor { event_id }
            }
            DragMode::Move { .. } | DragMode::Resize { .. } => {
                match state.source.as_ref().and_then(Event::instance) {
                    Some(instance) => DragOutcome::NeedsHabitResolution(HabitEditConflict {
                        instance,
                        original: state.source.clone().unwrap_or_else(|| temp.clone()),
                        edited: temp,
                    }),
                    None => DragOutcome::Commit(temp),
                }
            }
        };

        log::debug!("Drag finished: {:?}", outcome);
        Some(outcome)
    }

    /// Abort the gesture, discarding the temp event.
    pub fn cancel(&mut self) -> bool {
        let was_dragging = self.state.take().is_some();
        self.temp = None;
        if was_dragging {
            log::debug!("Drag cancelled");
        }
        was_dragging
    }

    /// True while a click right after a drag should be ignored.
    pub fn should_suppress_click(&self, now: Instant) -> bool {
        self.suppress_until.is_some_and(|until| now < until)
    }
}

/// Temp event after `delta` of snapped travel, or `None` to keep the
/// previous one.
fn next_temp(state: &DragState, temp: &Event, delta: Duration) -> Option<Event> {
    let mut next = temp.clone();
    match &state.mode {
        DragMode::Move { .. } => {
            let duration = state.original_end - state.original_start;
            next.start = snap_to_slot(state.original_start + delta);
            next.end = next.start + duration;
            let days = (state.hovered_date - state.origin_date).num_days();
            if days != 0 {
                shift_days(&mut next, duration, days)?;
            }
        }
        DragMode::Resize { .. } => {
            let end = snap_to_slot(state.original_end + delta);
            if end - state.original_start < min_event_duration() {
                return None;
            }
            next.end = end;
        }
        DragMode::Create => {
            let anchor = state.original_start;
            let current = anchor + delta;
            next.start = anchor.min(current);
            next.end = anchor.max(current);
            if next.start == next.end {
                next.end = next.start + min_event_duration();
            }
        }
    }
    Some(next)
}

/// Move `event` by whole calendar days, keeping its wall-clock time of day
/// and duration.
fn shift_days(event: &mut Event, duration: Duration, days: i64) -> Option<()> {
    let date = event.start.date_naive() + Duration::days(days);
    let start = local_datetime(date, event.start.time())?;
    event.start = start;
    event.end = start + duration;
    Some(())
}
