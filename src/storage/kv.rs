//! Key-value backends.

use super::KeyValueStore;
use super::schema::apply_schema;
use crate::error::{Error, Result};
use rusqlite::{Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::trace;

/// How long a write waits on a lock held by another process.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-based key-value backend.
#[derive(Debug)]
pub struct SqliteKv {
    conn: Connection,
}

impl SqliteKv {
    /// Open a database at the given path.
    ///
    /// Creates the database and applies schema if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema fails.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();
        self.conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            rusqlite::params![key, value, now],
        )?;
        trace!(key, bytes = value.len(), "kv set");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", [key])?;
        Ok(())
    }
}

/// In-memory key-value backend.
///
/// Can be put into a failing mode to exercise the persistence error path
/// (the equivalent of a full quota).
#[derive(Debug, Default, Clone)]
pub struct MemoryKv {
    entries: BTreeMap<String, String>,
    fail_writes: bool,
}

impl MemoryKv {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend pre-seeded with `entries`.
    #[must_use]
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            fail_writes: false,
        }
    }

    /// Make every subsequent write fail.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes {
            Err(Error::Storage("storage quota exceeded".to_string()))
        } else {
            Ok(())
        }
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.check_writable()?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.check_writable()?;
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn exercise(kv: &mut dyn KeyValueStore) {
        assert_eq!(kv.get("a").unwrap(), None);
        kv.set("a", "[1]").unwrap();
        kv.set("b", "[]").unwrap();
        kv.set("a", "[2]").unwrap();
        assert_eq!(kv.get("a").unwrap().as_deref(), Some("[2]"));
        assert_eq!(kv.get("b").unwrap().as_deref(), Some("[]"));
        kv.remove("a").unwrap();
        kv.remove("missing").unwrap();
        assert_eq!(kv.get("a").unwrap(), None);
    }

    #[test]
    fn test_sqlite_kv_roundtrip() {
        let mut kv = SqliteKv::open_memory().unwrap();
        exercise(&mut kv);
    }

    #[test]
    fn test_memory_kv_roundtrip() {
        let mut kv = MemoryKv::new();
        exercise(&mut kv);
    }

    #[test]
    fn test_sqlite_kv_persists_across_opens() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("macrum.db");
        {
            let mut kv = SqliteKv::open(&path).unwrap();
            kv.set("macrum.notes", "{\"content\":\"hi\"}").unwrap();
        }
        let kv = SqliteKv::open(&path).unwrap();
        assert_eq!(
            kv.get("macrum.notes").unwrap().as_deref(),
            Some("{\"content\":\"hi\"}")
        );
    }

    #[test]
    fn test_memory_kv_failing_writes() {
        let mut kv = MemoryKv::with_entries([("k", "v")]);
        kv.set_fail_writes(true);
        assert!(matches!(kv.set("k", "w"), Err(Error::Storage(_))));
        assert_eq!(kv.get("k").unwrap().as_deref(), Some("v"));
    }
}
