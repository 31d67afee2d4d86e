//! Persistence for PIN level records
//!
//! The level store keeps an in-memory view and writes through to a
//! `PinStorage` collaborator. Hosts that bring their own storage implement
//! the trait; `SqlitePinStorage` is the default durable implementation.

use crate::{Error, Result};
use haven_core::Level;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::Path;

/// One stored PIN record: a level and its Argon2id PHC hash string.
#[derive(Debug, Clone)]
pub struct PinRecord {
    /// Level this pin unlocks
    pub level: Level,
    /// Argon2id PHC string (hash, salt, and kdf parameters)
    pub hash: String,
}

/// Durable storage for pin records.
pub trait PinStorage: Send + Sync {
    /// Load every stored record.
    fn load_all(&self) -> Result<Vec<PinRecord>>;

    /// Insert or replace the record for its level.
    fn upsert(&self, record: &PinRecord) -> Result<()>;

    /// Delete the record for a level; missing levels are not an error.
    fn delete(&self, level: Level) -> Result<()>;
}

/// In-memory storage for tests and hosts with external persistence.
#[derive(Default)]
pub struct MemoryPinStorage {
    records: Mutex<HashMap<Level, String>>,
}

impl MemoryPinStorage {
    /// Create empty storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PinStorage for MemoryPinStorage {
    fn load_all(&self) -> Result<Vec<PinRecord>> {
        Ok(self
            .records
            .lock()
            .iter()
            .map(|(level, hash)| PinRecord {
                level: *level,
                hash: hash.clone(),
            })
            .collect())
    }

    fn upsert(&self, record: &PinRecord) -> Result<()> {
        self.records
            .lock()
            .insert(record.level, record.hash.clone());
        Ok(())
    }

    fn delete(&self, level: Level) -> Result<()> {
        self.records.lock().remove(&level);
        Ok(())
    }
}

/// SQLite-backed pin storage.
pub struct SqlitePinStorage {
    conn: Mutex<Connection>,
}

impl SqlitePinStorage {
    /// Open (and migrate) the pin database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open an in-memory database (tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS pin_levels (
                level INTEGER PRIMARY KEY,
                pin_hash TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )",
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl PinStorage for SqlitePinStorage {
    fn load_all(&self) -> Result<Vec<PinRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT level, pin_hash FROM pin_levels")?;

        let rows = stmt.query_map([], |row| {
            let level: i32 = row.get(0)?;
            let hash: String = row.get(1)?;
            Ok((level, hash))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (level, hash) = row?;
            let level = Level::new(level).map_err(|e| Error::Storage(e.to_string()))?;
            records.push(PinRecord { level, hash });
        }

        Ok(records)
    }

    fn upsert(&self, record: &PinRecord) -> Result<()> {
        self.conn.lock().execute(
            "INSERT OR REPLACE INTO pin_levels (level, pin_hash, created_at)
             VALUES (?1, ?2, ?3)",
            params![
                record.level.value(),
                record.hash,
                chrono::Utc::now().timestamp()
            ],
        )?;

        Ok(())
    }

    fn delete(&self, level: Level) -> Result<()> {
        self.conn
            .lock()
            .execute("DELETE FROM pin_levels WHERE level = ?1", [level.value()])?;

        Ok(())
    }
}
