use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn initialize_schema(conn: &Connection) -> Result<()> {
    create_alarm_markers_table(conn)
}

/// One row per fired reminder, keyed by `alarm:<event id>:<yyyy-MM-dd>`.
fn create_alarm_markers_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS alarm_markers (
            key TEXT PRIMARY KEY,
            fired_on TEXT NOT NULL,
            event_title TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )
    .context("Failed to create alarm_markers table")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_alarm_markers_fired_on ON alarm_markers(fired_on)",
        [],
    )
    .context("Failed to index alarm_markers")?;

    Ok(())
}
