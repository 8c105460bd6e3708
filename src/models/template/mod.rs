// Recurring template support
// Shared time-window parsing and errors for habits and habit-flagged goals

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime};
use thiserror::Error;

use crate::utils::date::{local_datetime, parse_hhmm};

/// Errors raised while editing recurring templates or the goal tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("Template title cannot be empty")]
    EmptyTitle,
    #[error("Invalid time '{0}', expected HH:MM")]
    InvalidTime(String),
    #[error("Invalid weekday {0}, expected 0 (Sunday) to 6 (Saturday)")]
    InvalidWeekday(u8),
    #[error("Habit '{0}' not found")]
    UnknownHabit(String),
    #[error("Goal '{0}' not found")]
    UnknownGoal(String),
    #[error("Parent goal '{0}' not found")]
    UnknownParent(String),
    #[error("Goal '{0}' already exists")]
    DuplicateGoal(String),
    #[error("Moving goal '{goal}' under '{parent}' would create a cycle")]
    Cycle { goal: String, parent: String },
}

/// Daily wall-clock window a template materializes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    /// Both bounds are required; a missing or malformed bound yields `None`,
    /// which switches materialization off for the template.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Option<Self> {
        Some(Self {
            start: parse_hhmm(start?)?,
            end: parse_hhmm(end?)?,
        })
    }

    /// An end earlier than the start runs into the next day.
    pub fn spans_midnight(&self) -> bool {
        self.end < self.start
    }

    /// Concrete interval on `date`.
    pub fn on(&self, date: NaiveDate) -> Option<(DateTime<Local>, DateTime<Local>)> {
        let end_date = if self.spans_midnight() {
            date + Duration::days(1)
        } else {
            date
        };
        Some((
            local_datetime(date, self.start)?,
            local_datetime(end_date, self.end)?,
        ))
    }
}

/// Reject times that are present but not `HH:MM`.
pub(crate) fn check_time(value: Option<&str>) -> Result<(), TemplateError> {
    match value {
        Some(raw) if parse_hhmm(raw).is_none() => Err(TemplateError::InvalidTime(raw.to_string())),
        _ => Ok(()),
    }
}

pub(crate) fn check_weekdays<'a>(days: impl IntoIterator<Item = &'a u8>) -> Result<(), TemplateError> {
    match days.into_iter().find(|day| **day > 6) {
        Some(day) => Err(TemplateError::InvalidWeekday(*day)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_requires_both_bounds() {
        assert!(TimeWindow::parse(Some("07:00"), Some("07:30")).is_some());
        assert!(TimeWindow::parse(Some("07:00"), None).is_none());
        assert!(TimeWindow::parse(None, Some("07:30")).is_none());
        assert!(TimeWindow::parse(Some("7am"), Some("07:30")).is_none());
    }

    #[test]
    fn test_window_spanning_midnight_ends_next_day() {
        let window = TimeWindow::parse(Some("23:00"), Some("01:00")).unwrap();
        assert!(window.spans_midnight());

        let date = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let (start, end) = window.on(date).unwrap();
        assert_eq!(start.date_naive(), date);
        assert_eq!(end.date_naive(), date + Duration::days(1));
        assert_eq!(end.hour(), 1);
        assert_eq!(end - start, Duration::hours(2));
    }

    #[test]
    fn test_check_time_and_weekdays() {
        assert!(check_time(None).is_ok());
        assert!(check_time(Some("09:15")).is_ok());
        assert_eq!(
            check_time(Some("9.15")),
            Err(TemplateError::InvalidTime("9.15".into()))
        );
        assert!(check_weekdays(&[0, 3, 6]).is_ok());
        assert_eq!(check_weekdays(&[1, 7]), Err(TemplateError::InvalidWeekday(7)));
    }
}
