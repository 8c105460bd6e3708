// Settings module
// Engine tuning loaded from config.toml

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const MIN_PIXELS_PER_HOUR: f32 = 40.0;
pub const MAX_PIXELS_PER_HOUR: f32 = 240.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Initial time-grid zoom, clamped to [40, 240].
    pub pixels_per_hour: f32,
    /// Zoom change per modifier+scroll notch.
    pub zoom_step: f32,
    pub alarm_poll_seconds: u64,
    /// Reminder lead used when an event has no larger prep/travel buffer.
    pub min_alarm_lead_minutes: i64,
    /// Window after a drag commit during which a stray click is ignored.
    pub click_suppression_ms: u64,
    pub system_notifications: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dedup_db_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pixels_per_hour: 60.0,
            zoom_step: 20.0,
            alarm_poll_seconds: 30,
            min_alarm_lead_minutes: 10,
            click_suppression_ms: 100,
            system_notifications: true,
            dedup_db_path: None,
            snapshot_path: None,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), String> {
        if !self.pixels_per_hour.is_finite() || self.pixels_per_hour <= 0.0 {
            return Err("pixels_per_hour must be a positive number".to_string());
        }
        if self.alarm_poll_seconds == 0 {
            return Err("alarm_poll_seconds must be at least 1".to_string());
        }
        if self.min_alarm_lead_minutes < 0 {
            return Err("min_alarm_lead_minutes cannot be negative".to_string());
        }
        Ok(())
    }

    /// Zoom level with the allowed range applied.
    pub fn clamped_pixels_per_hour(&self) -> f32 {
        self.pixels_per_hour
            .clamp(MIN_PIXELS_PER_HOUR, MAX_PIXELS_PER_HOUR)
    }
}
