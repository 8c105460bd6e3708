// Date utility functions
// Local wall-clock helpers shared by layout, drag, materializer and alarms

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveTime, Timelike};

/// Width of one snap slot on the time grid, in minutes.
pub const SNAP_MINUTES: i64 = 15;

/// Resolve a wall-clock date and time to a local timestamp.
///
/// Returns `None` for wall-clock times that do not exist locally (DST gaps)
/// or are ambiguous.
pub fn local_datetime(date: NaiveDate, time: NaiveTime) -> Option<DateTime<Local>> {
    date.and_time(time).and_local_timezone(Local).single()
}

/// Local midnight for `date`. Falls back to the earliest candidate when
/// midnight is ambiguous.
pub fn start_of_day(date: NaiveDate) -> Option<DateTime<Local>> {
    date.and_time(NaiveTime::MIN)
        .and_local_timezone(Local)
        .earliest()
}

/// Parse a `HH:MM` wall-clock string.
pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

pub fn format_hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// `yyyy-MM-dd` key used in materialized ids, skip sets and alarm markers.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_date_key(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Weekday index with Sunday = 0 ... Saturday = 6.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// The seven days (Monday through Sunday) of the week containing `date`.
pub fn week_days(date: NaiveDate) -> Vec<NaiveDate> {
    let monday = week_start(date);
    (0..7).map(|offset| monday + Duration::days(offset)).collect()
}

/// Round a raw minute offset to the nearest multiple of the snap slot.
pub fn snap_minutes(minutes: f64) -> i64 {
    (minutes / SNAP_MINUTES as f64).round() as i64 * SNAP_MINUTES
}

/// Floor a time of day to the start of its snap slot.
pub fn floor_to_slot(time: NaiveTime) -> NaiveTime {
    let minute = time.minute() - time.minute() % SNAP_MINUTES as u32;
    NaiveTime::from_hms_opt(time.hour(), minute, 0).unwrap_or(time)
}

/// Round a timestamp to the nearest snap slot boundary.
pub fn snap_to_slot(value: DateTime<Local>) -> DateTime<Local> {
    let slot_seconds = SNAP_MINUTES * 60;
    let into_slot = i64::from(value.minute()) % SNAP_MINUTES * 60 + i64::from(value.second());
    let floored = value
        - Duration::seconds(into_slot)
        - Duration::nanoseconds(i64::from(value.nanosecond()));
    if into_slot * 2 >= slot_seconds {
        floored + Duration::seconds(slot_seconds)
    } else {
        floored
    }
}

pub fn is_snapped(value: DateTime<Local>) -> bool {
    value.minute() % SNAP_MINUTES as u32 == 0 && value.second() == 0
}
