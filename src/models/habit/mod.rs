//! Habit model.
//!
//! A habit owns a generation rule, never concrete events. The materializer
//! turns it into dated events for the current week; the only field it ever
//! writes back is `skipped_dates`.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::category::{EventType, Priority};
use crate::models::event::TemplateKey;
use crate::models::template::{check_time, check_weekdays, TemplateError, TimeWindow};
use crate::utils::date::{date_key, weekday_index};

/// Recurring habit template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Start time as `HH:MM`; no time means no events.
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    /// Weekdays (0 = Sunday). Empty means every day.
    #[serde(default)]
    pub days: BTreeSet<u8>,
    /// `yyyy-MM-dd` dates on which no instance is generated.
    #[serde(default)]
    pub skipped_dates: BTreeSet<String>,
    #[serde(default, rename = "type")]
    pub event_type: EventType,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_time: Option<u32>,
}

impl Habit {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            time: None,
            end_time: None,
            days: BTreeSet::new(),
            skipped_dates: BTreeSet::new(),
            event_type: EventType::default(),
            priority: Priority::default(),
            prep_time: None,
            travel_time: None,
        }
    }

    pub fn with_times(mut self, time: impl Into<String>, end_time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self.end_time = Some(end_time.into());
        self
    }

    pub fn with_days(mut self, days: impl IntoIterator<Item = u8>) -> Self {
        self.days = days.into_iter().collect();
        self
    }

    pub fn key(&self) -> TemplateKey {
        TemplateKey::Habit(self.id.clone())
    }

    pub fn time_window(&self) -> Option<TimeWindow> {
        TimeWindow::parse(self.time.as_deref(), self.end_time.as_deref())
    }

    pub fn is_skipped(&self, date: NaiveDate) -> bool {
        self.skipped_dates.contains(&date_key(date))
    }

    /// Add `date` to the skip set. Returns false if it was already skipped.
    pub fn skip(&mut self, date: NaiveDate) -> bool {
        self.skipped_dates.insert(date_key(date))
    }

    /// Whether an instance should exist on `date`.
    pub fn runs_on(&self, date: NaiveDate) -> bool {
        let weekday_matches = self.days.is_empty() || self.days.contains(&weekday_index(date));
        weekday_matches && !self.is_skipped(date)
    }

    pub fn validate(&self) -> Result<(), TemplateError> {
        if self.title.trim().is_empty() {
            return Err(TemplateError::EmptyTitle);
        }
        check_time(self.time.as_deref())?;
        check_time(self.end_time.as_deref())?;
        check_weekdays(&self.days)
    }
}
