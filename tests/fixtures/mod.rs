// Test fixtures - reusable test data
// Dates sit in June 2026 to stay clear of DST changes. 2026-06-01 is a Monday.

#![allow(dead_code)]

use chrono::{DateTime, Local, NaiveDate, TimeZone};

/// Sample dates for testing
pub mod dates {
    use super::*;

    pub fn june(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, day).unwrap()
    }

    pub fn monday() -> NaiveDate {
        june(1)
    }

    pub fn wednesday() -> NaiveDate {
        june(3)
    }

    pub fn at(day: u32, hour: u32, minute: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 6, day, hour, minute, 0).unwrap()
    }
}

/// Sample events and templates
pub mod events {
    use super::dates::at;
    use life_calendar::models::category::{EventType, Priority};
    use life_calendar::models::event::Event;
    use life_calendar::models::habit::Habit;

    pub fn standup(day: u32) -> Event {
        Event::builder()
            .id(format!("standup-{}", day))
            .title("Standup")
            .start(at(day, 9, 0))
            .end(at(day, 9, 30))
            .event_type(EventType::Meeting)
            .meeting(true)
            .build()
            .unwrap()
    }

    pub fn dentist() -> Event {
        Event::builder()
            .id("dentist")
            .title("Dentist")
            .start(at(3, 14, 0))
            .end(at(3, 15, 0))
            .priority(Priority::High)
            .appointment(true)
            .travel_time(20)
            .prep_time(5)
            .build()
            .unwrap()
    }

    /// Mon/Wed/Fri 07:00-07:30
    pub fn morning_run() -> Habit {
        Habit::new("run", "Morning run")
            .with_times("07:00", "07:30")
            .with_days([1, 3, 5])
    }
}

pub mod notifier {
    use life_calendar::services::notification::{
        NotificationPermission, NotificationUrgency, Notifier, Toast,
    };

    /// Records everything it is asked to show.
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub permission: NotificationPermission,
        pub system: Vec<(String, String, NotificationUrgency)>,
        pub toasts: Vec<Toast>,
    }

    impl RecordingNotifier {
        pub fn granted() -> Self {
            Self {
                permission: NotificationPermission::Granted,
                ..Self::default()
            }
        }
    }

    impl Notifier for RecordingNotifier {
        fn permission(&self) -> NotificationPermission {
            self.permission
        }

        fn request_permission(&mut self) -> NotificationPermission {
            self.permission = NotificationPermission::Denied;
            self.permission
        }

        fn system_notify(
            &mut self,
            title: &str,
            body: &str,
            urgency: NotificationUrgency,
        ) -> anyhow::Result<()> {
            self.system.push((title.to_string(), body.to_string(), urgency));
            Ok(())
        }

        fn toast(&mut self, toast: Toast) {
            self.toasts.push(toast);
        }
    }
}
