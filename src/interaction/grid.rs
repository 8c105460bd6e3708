//! Vertical time-grid geometry.
//!
//! One day column runs from midnight at y = 0 to the next midnight at
//! y = 24 * pixels_per_hour.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, Timelike};

use crate::models::settings::{Settings, MAX_PIXELS_PER_HOUR, MIN_PIXELS_PER_HOUR};
use crate::utils::date::{local_datetime, snap_minutes, SNAP_MINUTES};

const MINUTES_PER_DAY: i64 = 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeGrid {
    pixels_per_hour: f32,
    zoom_step: f32,
}

impl Default for TimeGrid {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl TimeGrid {
    pub fn new(pixels_per_hour: f32, zoom_step: f32) -> Self {
        Self {
            pixels_per_hour: clamp_zoom(pixels_per_hour),
            zoom_step,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.clamped_pixels_per_hour(), settings.zoom_step)
    }

    pub fn pixels_per_hour(&self) -> f32 {
        self.pixels_per_hour
    }

    pub fn set_pixels_per_hour(&mut self, value: f32) {
        self.pixels_per_hour = clamp_zoom(value);
    }

    /// Apply scroll notches (positive zooms in). Returns true if the level
    /// changed.
    pub fn zoom_by(&mut self, notches: f32) -> bool {
        let before = self.pixels_per_hour;
        self.set_pixels_per_hour(before + notches * self.zoom_step);
        self.pixels_per_hour != before
    }

    /// Pointer travel converted to minutes, snapped to the slot grid.
    pub fn delta_minutes(&self, delta_y: f32) -> i64 {
        snap_minutes(delta_y as f64 / self.pixels_per_hour as f64 * 60.0)
    }

    /// Start of the slot under `y`, in minutes after midnight.
    pub fn slot_minutes_at(&self, y: f32) -> i64 {
        let raw = (y.max(0.0) as f64 / self.pixels_per_hour as f64 * 60.0).floor() as i64;
        let slot = raw - raw.rem_euclid(SNAP_MINUTES);
        slot.min(MINUTES_PER_DAY - SNAP_MINUTES)
    }

    pub fn slot_at(&self, date: NaiveDate, y: f32) -> Option<DateTime<Local>> {
        let minutes = self.slot_minutes_at(y);
        let time = NaiveTime::from_hms_opt((minutes / 60) as u32, (minutes % 60) as u32, 0)?;
        local_datetime(date, time)
    }

    pub fn y_for_time(&self, time: NaiveTime) -> f32 {
        let minutes = time.hour() as f32 * 60.0 + time.minute() as f32;
        minutes / 60.0 * self.pixels_per_hour
    }

    /// Top and height of an interval drawn in the column for `date`,
    /// clipped to that day.
    pub fn span(&self, date: NaiveDate, start: DateTime<Local>, end: DateTime<Local>) -> (f32, f32) {
        let day_height = 24.0 * self.pixels_per_hour;
        let top = if start.date_naive() < date {
            0.0
        } else {
            self.y_for_time(start.time())
        };
        let bottom = if end.date_naive() > date {
            day_height
        } else {
            self.y_for_time(end.time())
        };
        (top, (bottom - top).max(0.0))
    }
}

fn clamp_zoom(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(MIN_PIXELS_PER_HOUR, MAX_PIXELS_PER_HOUR)
    } else {
        MIN_PIXELS_PER_HOUR
    }
}
