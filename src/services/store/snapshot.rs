//! JSON snapshot of events and templates.
//!
//! Event records are decoded one by one so a record with a corrupted
//! `start` or `end` is dropped with a warning instead of failing the load.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::event::Event;
use crate::models::goal::Goal;
use crate::models::habit::Habit;

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub events: Vec<Event>,
    pub habits: Vec<Habit>,
    pub goals: Vec<Goal>,
    /// Event records that could not be decoded.
    #[serde(skip)]
    pub rejected_events: usize,
}

#[derive(Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    events: Vec<Value>,
    #[serde(default)]
    habits: Vec<Habit>,
    #[serde(default)]
    goals: Vec<Goal>,
}

pub fn parse_snapshot(data: &str) -> Result<Snapshot> {
    let raw: RawSnapshot = serde_json::from_str(data).context("failed to parse snapshot")?;

    let mut snapshot = Snapshot {
        habits: raw.habits,
        goals: raw.goals,
        ..Snapshot::default()
    };

    for value in raw.events {
        let id = value
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or("<no id>")
            .to_string();
        match serde_json::from_value::<Event>(value) {
            Ok(event) if event.is_well_formed() => snapshot.events.push(event),
            Ok(_) => {
                log::warn!("Skipping event {}: end is before start", id);
                snapshot.rejected_events += 1;
            }
            Err(err) => {
                log::warn!("Skipping event {}: {}", id, err);
                snapshot.rejected_events += 1;
            }
        }
    }

    Ok(snapshot)
}

/// Load a snapshot; a missing file yields an empty snapshot.
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    if !path.exists() {
        return Ok(Snapshot::default());
    }

    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot from {}", path.display()))?;
    parse_snapshot(&data).with_context(|| format!("in {}", path.display()))
}

pub fn save_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create dir {}", parent.display()))?;
    }

    let data = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, data)
        .with_context(|| format!("failed to write snapshot to {}", path.display()))?;
    Ok(())
}
