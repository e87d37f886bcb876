//! Initialize the Macrum database.
//!
//! Creates `~/.macrum/data/macrum.db` (or `~/.macrum/test/macrum.db` when
//! `MACRUM_TEST_DB` is set, or the `--db` path when given) with the
//! key-value schema applied.

use crate::config::resolve_db_path;
use crate::error::{Error, Result};
use crate::storage::SqliteKv;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Serialize)]
struct InitOutput<'a> {
    database: &'a Path,
    recreated: bool,
}

/// Execute the init command.
///
/// # Errors
///
/// Returns an error if the database already exists (without `force`), or
/// if the directory or database cannot be created.
pub fn execute(db_path: Option<&PathBuf>, force: bool, json: bool) -> Result<()> {
    let db_path = resolve_db_path(db_path.map(|p| p.as_path())).ok_or_else(|| {
        Error::Config("Could not determine the Macrum data directory".to_string())
    })?;

    let existed = db_path.exists();
    if existed && !force {
        return Err(Error::AlreadyInitialized { path: db_path });
    }

    if existed {
        remove_database(&db_path)?;
    }

    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    // Opening applies the schema
    SqliteKv::open(&db_path)?;
    info!(path = %db_path.display(), "initialized database");

    if json {
        let output = InitOutput {
            database: &db_path,
            recreated: existed,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Initialized Macrum database");
        println!("  Database: {}", db_path.display());
        println!();
        println!("Next: macrum business create <name>");
    }

    Ok(())
}

/// Remove the database file along with its WAL side files.
fn remove_database(db_path: &Path) -> Result<()> {
    fs::remove_file(db_path)?;
    for suffix in ["-wal", "-shm"] {
        let mut side = db_path.as_os_str().to_owned();
        side.push(suffix);
        let side = PathBuf::from(side);
        if side.exists() {
            fs::remove_file(side)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::KeyValueStore;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_database() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("macrum.db");

        execute(Some(&path), false, true).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_init_fails_if_already_initialized() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("macrum.db");

        execute(Some(&path), false, true).unwrap();
        let result = execute(Some(&path), false, true);
        assert!(matches!(result, Err(Error::AlreadyInitialized { .. })));
    }

    #[test]
    fn test_init_force_discards_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("macrum.db");

        execute(Some(&path), false, true).unwrap();
        {
            let mut kv = SqliteKv::open(&path).unwrap();
            kv.set("macrum.businesses", "[]").unwrap();
        }

        execute(Some(&path), true, true).unwrap();
        let kv = SqliteKv::open(&path).unwrap();
        assert_eq!(kv.get("macrum.businesses").unwrap(), None);
    }
}
