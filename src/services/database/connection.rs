use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use rusqlite::Connection;

use super::schema;

/// How long a write waits for another process holding the file lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Owns the SQLite connection used for persisted alarm markers.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (or creates) a database file. Pass `":memory:"` for a
    /// throwaway database.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;

        conn.busy_timeout(BUSY_TIMEOUT)
            .context("Failed to set busy timeout")?;

        Ok(Self { conn })
    }

    /// Opens the database and creates any missing tables.
    pub fn open_initialized(path: impl AsRef<Path>) -> Result<Self> {
        let db = Self::new(path)?;
        db.initialize_schema()?;
        Ok(db)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn initialize_schema(&self) -> Result<()> {
        schema::initialize_schema(self.connection())
    }
}
