//! Deterministic ids for materialized template instances.
//!
//! A materialized event is named `habit-<habitId>-<yyyy-MM-dd>` or
//! `goal-habit-<goalId>-<yyyy-MM-dd>`. Any other id belongs to a
//! user-owned event.

use std::fmt;

use chrono::NaiveDate;

use crate::utils::date::{date_key, parse_date_key};

pub const HABIT_PREFIX: &str = "habit-";
pub const GOAL_HABIT_PREFIX: &str = "goal-habit-";

/// `-yyyy-MM-dd`
const DATE_SUFFIX_LEN: usize = 11;

/// The recurring template that owns a set of materialized events.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TemplateKey {
    Habit(String),
    Goal(String),
}

impl TemplateKey {
    pub fn template_id(&self) -> &str {
        match self {
            TemplateKey::Habit(id) | TemplateKey::Goal(id) => id,
        }
    }

    pub fn instance_id(&self, date: NaiveDate) -> String {
        InstanceId {
            template: self.clone(),
            date,
        }
        .to_string()
    }
}

impl fmt::Display for TemplateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateKey::Habit(id) => write!(f, "habit {}", id),
            TemplateKey::Goal(id) => write!(f, "goal {}", id),
        }
    }
}

/// Parsed form of a materialized event id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceId {
    pub template: TemplateKey,
    pub date: NaiveDate,
}

impl InstanceId {
    /// Parse an event id. Returns `None` for user-owned ids.
    pub fn parse(id: &str) -> Option<Self> {
        let (rest, make): (&str, fn(String) -> TemplateKey) =
            if let Some(rest) = id.strip_prefix(GOAL_HABIT_PREFIX) {
                (rest, TemplateKey::Goal)
            } else if let Some(rest) = id.strip_prefix(HABIT_PREFIX) {
                (rest, TemplateKey::Habit)
            } else {
                return None;
            };

        let split = rest.len().checked_sub(DATE_SUFFIX_LEN)?;
        let template_id = rest.get(..split)?;
        let suffix = rest.get(split..)?;
        let date = parse_date_key(suffix.strip_prefix('-')?)?;

        if template_id.is_empty() {
            return None;
        }

        Some(Self {
            template: make(template_id.to_string()),
            date,
        })
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.template {
            TemplateKey::Habit(_) => HABIT_PREFIX,
            TemplateKey::Goal(_) => GOAL_HABIT_PREFIX,
        };
        write!(
            f,
            "{}{}-{}",
            prefix,
            self.template.template_id(),
            date_key(self.date)
        )
    }
}
