//! Reminder scheduler.
//!
//! Every poll looks at today's events that have not started yet. An event
//! is due once it is within its advance window, `max(prep + travel, 10)`
//! minutes. A due event fires at most once per day: the dedup marker is
//! checked before notifying and written right after.

mod dedup;
mod runner;

use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Local};

use crate::models::event::Event;
use crate::models::settings::Settings;
use crate::services::notification::{
    NotificationPermission, NotificationUrgency, Notifier, Toast,
};

pub use dedup::{dedup_key, DedupStore, MemoryDedupStore, SqliteDedupStore};
pub use runner::{run_alarm_loop, AlarmRunner, NowProvider};

pub const DEFAULT_MIN_LEAD_MINUTES: i64 = 10;

const NORMAL_TOAST: StdDuration = StdDuration::from_secs(5);
const HIGH_PRIORITY_TOAST: StdDuration = StdDuration::from_secs(10);

/// A reminder emitted by one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredAlarm {
    pub event_id: String,
    pub title: String,
    pub key: String,
    pub minutes_until: i64,
    pub high_priority: bool,
    pub message: String,
}

#[derive(Debug, Clone, Copy)]
pub struct AlarmScheduler {
    min_lead_minutes: i64,
}

impl Default for AlarmScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_LEAD_MINUTES)
    }
}

impl AlarmScheduler {
    pub fn new(min_lead_minutes: i64) -> Self {
        Self {
            min_lead_minutes: min_lead_minutes.max(0),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.min_alarm_lead_minutes)
    }

    pub fn advance_minutes(&self, event: &Event) -> i64 {
        event.buffer_minutes().max(self.min_lead_minutes)
    }

    /// Whole minutes until start (rounded up) when the event is due at
    /// `now`, otherwise `None`.
    pub fn due_in(&self, event: &Event, now: DateTime<Local>) -> Option<i64> {
        if !event.is_well_formed() || event.start < now {
            return None;
        }
        if event.start.date_naive() != now.date_naive() {
            return None;
        }

        let until = event.start - now;
        if until > Duration::minutes(self.advance_minutes(event)) {
            return None;
        }

        let seconds = until.num_seconds();
        Some((seconds + 59) / 60)
    }

    /// Evaluate every event once.
    pub fn poll<D, N>(
        &self,
        events: &[Event],
        now: DateTime<Local>,
        dedup: &mut D,
        notifier: &mut N,
    ) -> Vec<FiredAlarm>
    where
        D: DedupStore + ?Sized,
        N: Notifier + ?Sized,
    {
        let today = now.date_naive();
        let mut fired = Vec::new();

        for event in events {
            let Some(minutes_until) = self.due_in(event, now) else {
                continue;
            };

            let key = dedup_key(&event.id, today);
            match dedup.contains(&key) {
                Ok(true) => continue,
                Ok(false) => {}
                Err(err) => {
                    log::error!("Skipping alarm for {}: {:#}", event.id, err);
                    continue;
                }
            }

            let alarm = FiredAlarm {
                event_id: event.id.clone(),
                title: event.title.clone(),
                key,
                minutes_until,
                high_priority: event.priority.is_high(),
                message: alarm_message(minutes_until),
            };
            if let Err(err) = dedup.mark(&alarm.key, today, &alarm.title) {
                log::error!("Skipping alarm {}, marker not recorded: {:#}", alarm.key, err);
                continue;
            }
            deliver(&alarm, notifier);

            log::info!("Alarm fired for {} ({})", alarm.event_id, alarm.message);
            fired.push(alarm);
        }

        fired
    }
}

pub fn alarm_message(minutes_until: i64) -> String {
    match minutes_until {
        m if m <= 0 => "Starting now".to_string(),
        1 => "Starting in 1 minute".to_string(),
        m => format!("Starting in {} minutes", m),
    }
}

fn deliver<N: Notifier + ?Sized>(alarm: &FiredAlarm, notifier: &mut N) {
    let urgency = if alarm.high_priority {
        NotificationUrgency::Critical
    } else {
        NotificationUrgency::Normal
    };

    let permission = match notifier.permission() {
        NotificationPermission::Default => notifier.request_permission(),
        other => other,
    };

    if permission == NotificationPermission::Granted {
        if let Err(err) = notifier.system_notify(&alarm.title, &alarm.message, urgency) {
            log::warn!("System notification failed for {}: {:#}", alarm.event_id, err);
        }
    }

    let text = format!("{}: {}", alarm.title, alarm.message);
    let toast = if alarm.high_priority {
        Toast::error(text).with_duration(HIGH_PRIORITY_TOAST)
    } else {
        Toast::info(text).with_duration(NORMAL_TOAST)
    };
    notifier.toast(toast);
}
