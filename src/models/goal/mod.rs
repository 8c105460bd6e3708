//! Goal model.
//!
//! Goals nest into a tree (see [`GoalTree`]). A goal flagged with `is_habit`
//! is also a recurring template whose instances are driven by
//! `habit_frequency`.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::models::category::{EventType, Priority};
use crate::models::event::TemplateKey;
use crate::models::template::{check_time, check_weekdays, TemplateError, TimeWindow};
use crate::utils::date::{date_key, weekday_index};

mod tree;

pub use tree::GoalTree;

pub const DEFAULT_HABIT_START: &str = "09:00";
pub const DEFAULT_HABIT_END: &str = "10:00";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitFrequency {
    #[default]
    Daily,
    /// Mondays only
    Weekly,
    /// First of the month only
    Monthly,
}

impl HabitFrequency {
    pub fn matches(&self, date: NaiveDate) -> bool {
        match self {
            HabitFrequency::Daily => true,
            HabitFrequency::Weekly => date.weekday() == Weekday::Mon,
            HabitFrequency::Monthly => date.day() == 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub is_habit: bool,
    #[serde(default)]
    pub habit_frequency: Option<HabitFrequency>,
    /// Overrides the 09:00 default start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub habit_time: Option<String>,
    /// Overrides the 10:00 default end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub habit_end_time: Option<String>,
    /// Weekdays (0 = Sunday). Empty means every day.
    #[serde(default)]
    pub days: BTreeSet<u8>,
    #[serde(default)]
    pub skipped_dates: BTreeSet<String>,
    #[serde(default, rename = "type")]
    pub event_type: EventType,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub completed: bool,
}

impl Goal {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            parent_id: None,
            is_habit: false,
            habit_frequency: None,
            habit_time: None,
            habit_end_time: None,
            days: BTreeSet::new(),
            skipped_dates: BTreeSet::new(),
            event_type: EventType::default(),
            priority: Priority::default(),
            progress: 0,
            completed: false,
        }
    }

    /// Flag this goal as a habit with the given frequency.
    pub fn as_habit(mut self, frequency: HabitFrequency) -> Self {
        self.is_habit = true;
        self.habit_frequency = Some(frequency);
        self
    }

    pub fn under(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn key(&self) -> TemplateKey {
        TemplateKey::Goal(self.id.clone())
    }

    pub fn frequency(&self) -> HabitFrequency {
        self.habit_frequency.unwrap_or_default()
    }

    /// Daily window; defaults to 09:00-10:00 when no override is set.
    pub fn time_window(&self) -> Option<TimeWindow> {
        TimeWindow::parse(
            Some(self.habit_time.as_deref().unwrap_or(DEFAULT_HABIT_START)),
            Some(self.habit_end_time.as_deref().unwrap_or(DEFAULT_HABIT_END)),
        )
    }

    pub fn is_skipped(&self, date: NaiveDate) -> bool {
        self.skipped_dates.contains(&date_key(date))
    }

    pub fn skip(&mut self, date: NaiveDate) -> bool {
        self.skipped_dates.insert(date_key(date))
    }

    pub fn runs_on(&self, date: NaiveDate) -> bool {
        if !self.is_habit {
            return false;
        }
        let weekday_matches = self.days.is_empty() || self.days.contains(&weekday_index(date));
        weekday_matches && self.frequency().matches(date) && !self.is_skipped(date)
    }

    pub fn validate(&self) -> Result<(), TemplateError> {
        if self.title.trim().is_empty() {
            return Err(TemplateError::EmptyTitle);
        }
        check_time(self.habit_time.as_deref())?;
        check_time(self.habit_end_time.as_deref())?;
        check_weekdays(&self.days)
    }
}
