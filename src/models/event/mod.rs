// Event module
// The atomic schedulable unit shared by layout, drag, materializer and alarms

use chrono::{DateTime, Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::category::{EventType, Priority};

mod instance_id;

pub use instance_id::{InstanceId, TemplateKey, GOAL_HABIT_PREFIX, HABIT_PREFIX};

/// Shortest duration an event may have, in minutes.
pub const MIN_EVENT_MINUTES: i64 = 15;

pub fn min_event_duration() -> Duration {
    Duration::minutes(MIN_EVENT_MINUTES)
}

/// Calendar event.
///
/// Events whose id follows the materialized naming scheme are owned by a
/// recurring template; all others are owned by the user. `habit_id`,
/// `connected_goal_id` and `connected_project_id` are lookups only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
    #[serde(default, rename = "type")]
    pub event_type: EventType,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub is_meeting: bool,
    #[serde(default)]
    pub is_appointment: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub habit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected_goal_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected_project_id: Option<String>,
    /// Minutes of preparation before the event, used for reminders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<u32>,
    /// Minutes of travel before the event, used for reminders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_time: Option<u32>,
}

impl Event {
    /// Create a new event with required fields
    ///
    /// A zero-length interval is widened to the 15 minute minimum.
    ///
    /// # Examples
    /// ```
    /// use life_calendar::models::event::Event;
    /// use chrono::Local;
    ///
    /// let start = Local::now();
    /// let event = Event::new("evt-1", "Standup", start, start).unwrap();
    /// assert_eq!(event.duration(), chrono::Duration::minutes(15));
    /// ```
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        start: DateTime<Local>,
        end: DateTime<Local>,
    ) -> Result<Self, String> {
        let id = id.into();
        let title = title.into();

        if id.trim().is_empty() {
            return Err("Event id cannot be empty".to_string());
        }

        if title.trim().is_empty() {
            return Err("Event title cannot be empty".to_string());
        }

        if end < start {
            return Err("Event end time cannot be before start time".to_string());
        }

        let end = if end == start {
            start + min_event_duration()
        } else {
            end
        };

        Ok(Self {
            id,
            title,
            description: None,
            start,
            end,
            event_type: EventType::default(),
            priority: Priority::default(),
            is_meeting: false,
            is_appointment: false,
            habit_id: None,
            connected_goal_id: None,
            connected_project_id: None,
            prep_time: None,
            travel_time: None,
        })
    }

    pub fn builder() -> EventBuilder {
        EventBuilder::new()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("Event id cannot be empty".to_string());
        }

        if self.title.trim().is_empty() {
            return Err("Event title cannot be empty".to_string());
        }

        if !self.is_well_formed() {
            return Err("Event end time cannot be before start time".to_string());
        }

        Ok(())
    }

    /// False for events whose interval is inverted. Such events are treated
    /// as not occurring on any day.
    pub fn is_well_formed(&self) -> bool {
        self.end >= self.start
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Parsed owner of a materialized instance, if this is one.
    pub fn instance(&self) -> Option<InstanceId> {
        InstanceId::parse(&self.id)
    }

    pub fn is_materialized(&self) -> bool {
        self.instance().is_some()
    }

    pub fn materialized_owner(&self) -> Option<TemplateKey> {
        self.instance().map(|instance| instance.template)
    }

    pub fn starts_on(&self, date: NaiveDate) -> bool {
        self.start.date_naive() == date
    }

    /// Total reminder buffer from preparation and travel, in minutes.
    pub fn buffer_minutes(&self) -> i64 {
        self.prep_time.unwrap_or(0) as i64 + self.travel_time.unwrap_or(0) as i64
    }
}

/// Builder for creating events with optional fields
#[derive(Default)]
pub struct EventBuilder {
    id: Option<String>,
    title: Option<String>,
    description: Option<String>,
    start: Option<DateTime<Local>>,
    end: Option<DateTime<Local>>,
    event_type: EventType,
    priority: Priority,
    is_meeting: bool,
    is_appointment: bool,
    habit_id: Option<String>,
    connected_goal_id: Option<String>,
    connected_project_id: Option<String>,
    prep_time: Option<u32>,
    travel_time: Option<u32>,
}

impl EventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn start(mut self, start: DateTime<Local>) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end(mut self, end: DateTime<Local>) -> Self {
        self.end = Some(end);
        self
    }

    pub fn event_type(mut self, event_type: EventType) -> Self {
        self.event_type = event_type;
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn meeting(mut self, is_meeting: bool) -> Self {
        self.is_meeting = is_meeting;
        self
    }

    pub fn appointment(mut self, is_appointment: bool) -> Self {
        self.is_appointment = is_appointment;
        self
    }

    pub fn habit_id(mut self, habit_id: impl Into<String>) -> Self {
        self.habit_id = Some(habit_id.into());
        self
    }

    pub fn connected_goal(mut self, goal_id: impl Into<String>) -> Self {
        self.connected_goal_id = Some(goal_id.into());
        self
    }

    pub fn connected_project(mut self, project_id: impl Into<String>) -> Self {
        self.connected_project_id = Some(project_id.into());
        self
    }

    pub fn prep_time(mut self, minutes: u32) -> Self {
        self.prep_time = Some(minutes);
        self
    }

    pub fn travel_time(mut self, minutes: u32) -> Self {
        self.travel_time = Some(minutes);
        self
    }

    pub fn build(self) -> Result<Event, String> {
        let id = self.id.ok_or("Event id is required")?;
        let title = self.title.ok_or("Event title is required")?;
        let start = self.start.ok_or("Event start time is required")?;
        let end = self.end.ok_or("Event end time is required")?;

        let mut event = Event::new(id, title, start, end)?;
        event.description = self.description;
        event.event_type = self.event_type;
        event.priority = self.priority;
        event.is_meeting = self.is_meeting;
        event.is_appointment = self.is_appointment;
        event.habit_id = self.habit_id;
        event.connected_goal_id = self.connected_goal_id;
        event.connected_project_id = self.connected_project_id;
        event.prep_time = self.prep_time;
        event.travel_time = self.travel_time;

        Ok(event)
    }
}
