//! Fired-alarm markers.
//!
//! A marker is keyed by event id and calendar day, so a reminder shown
//! earlier today stays suppressed across restarts, while a materialized
//! instance for a different day gets its own key.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};

use crate::services::database::Database;
use crate::utils::date::{date_key, parse_date_key};

/// `alarm:<event id>:<yyyy-MM-dd>`
pub fn dedup_key(event_id: &str, day: NaiveDate) -> String {
    format!("alarm:{}:{}", event_id, date_key(day))
}

/// Durable key-value surface for alarm markers.
pub trait DedupStore {
    fn contains(&self, key: &str) -> Result<bool>;

    fn mark(&mut self, key: &str, day: NaiveDate, title: &str) -> Result<()>;

    /// Forget markers for days before `day`. Returns how many were removed.
    fn prune_before(&mut self, day: NaiveDate) -> Result<usize>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryDedupStore {
    markers: HashMap<String, NaiveDate>,
}

impl MemoryDedupStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

impl DedupStore for MemoryDedupStore {
    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.markers.contains_key(key))
    }

    fn mark(&mut self, key: &str, day: NaiveDate, _title: &str) -> Result<()> {
        self.markers.insert(key.to_string(), day);
        Ok(())
    }

    fn prune_before(&mut self, day: NaiveDate) -> Result<usize> {
        let before = self.markers.len();
        self.markers.retain(|_, fired_on| *fired_on >= day);
        Ok(before - self.markers.len())
    }
}

/// Markers stored in the `alarm_markers` SQLite table.
pub struct SqliteDedupStore {
    db: Database,
}

impl SqliteDedupStore {
    pub fn new(db: Database) -> Result<Self> {
        db.initialize_schema()?;
        Ok(Self { db })
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(Database::new(path)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    /// Day a marker was written, if present.
    pub fn fired_on(&self, key: &str) -> Result<Option<NaiveDate>> {
        let value: Option<String> = self
            .db
            .connection()
            .query_row(
                "SELECT fired_on FROM alarm_markers WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to read alarm marker")?;

        Ok(value.as_deref().and_then(parse_date_key))
    }
}

impl DedupStore for SqliteDedupStore {
    fn contains(&self, key: &str) -> Result<bool> {
        let count: i64 = self
            .db
            .connection()
            .query_row(
                "SELECT COUNT(*) FROM alarm_markers WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .context("Failed to look up alarm marker")?;
        Ok(count > 0)
    }

    fn mark(&mut self, key: &str, day: NaiveDate, title: &str) -> Result<()> {
        self.db
            .connection()
            .execute(
                "INSERT OR IGNORE INTO alarm_markers (key, fired_on, event_title)
                 VALUES (?1, ?2, ?3)",
                params![key, date_key(day), title],
            )
            .with_context(|| format!("Failed to write alarm marker {}", key))?;
        Ok(())
    }

    fn prune_before(&mut self, day: NaiveDate) -> Result<usize> {
        // yyyy-MM-dd sorts lexicographically in date order
        let removed = self
            .db
            .connection()
            .execute(
                "DELETE FROM alarm_markers WHERE fired_on < ?1",
                [date_key(day)],
            )
            .context("Failed to prune alarm markers")?;
        Ok(removed)
    }
}
