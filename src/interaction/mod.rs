//! Pointer interaction for the day and week time grids.

pub mod drag;
pub mod grid;
pub mod listeners;
pub mod resolve;
pub mod view;

pub use drag::{DragMachine, DragMode, DragOutcome, DragState, HabitEditConflict, MoveEffect};
pub use grid::TimeGrid;
pub use listeners::{PointerBus, PointerEvent, Subscription};
pub use resolve::{resolve_habit_edit, HabitEditChoice, Resolution};
pub use view::{CalendarView, ViewAction};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragView {
    Day,
    Week,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
}
