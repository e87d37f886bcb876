//! Configuration management.
//!
//! Macrum keeps a single database per user at
//! `~/.macrum/data/macrum.db`. The `--db` flag (or `MACRUM_DB`) points the
//! CLI elsewhere, and `MACRUM_TEST_DB=1` switches to an isolated test
//! database so development runs never touch real data.

use std::path::{Path, PathBuf};

/// File name of the database inside the data directory.
pub const DB_FILE_NAME: &str = "macrum.db";

/// Get the global Macrum directory location (`~/.macrum/`).
#[must_use]
pub fn global_macrum_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".macrum"))
}

/// Interpret an environment flag value. Empty, `0` and `false` are off.
fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && value != "0" && !value.eq_ignore_ascii_case("false")
}

/// Check if test mode is enabled via `MACRUM_TEST_DB`.
#[must_use]
pub fn is_test_mode() -> bool {
    std::env::var("MACRUM_TEST_DB")
        .map(|v| is_truthy(&v))
        .unwrap_or(false)
}

/// Directory holding the database: `test/` in test mode, `data/` otherwise.
#[must_use]
pub fn data_dir() -> Option<PathBuf> {
    let sub = if is_test_mode() { "test" } else { "data" };
    global_macrum_dir().map(|dir| dir.join(sub))
}

/// Resolve the database path.
///
/// Priority:
/// 1. If `explicit_path` is provided (`--db` or `MACRUM_DB`), use it directly
/// 2. `MACRUM_TEST_DB` → `~/.macrum/test/macrum.db`
/// 3. `~/.macrum/data/macrum.db`
///
/// Returns `None` if no home directory can be determined.
#[must_use]
pub fn resolve_db_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }
    data_dir().map(|dir| dir.join(DB_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_db_path_with_explicit() {
        let explicit = PathBuf::from("/custom/path/macrum.db");
        let result = resolve_db_path(Some(&explicit));
        assert_eq!(result, Some(explicit));
    }

    #[test]
    fn test_resolve_db_path_defaults_to_global() {
        let path = resolve_db_path(None).unwrap();
        assert!(path.ends_with(DB_FILE_NAME));
        assert!(path.starts_with(global_macrum_dir().unwrap()));
    }

    #[test]
    fn test_truthy_parsing() {
        for off in ["", "0", "false", "FALSE", "  "] {
            assert!(!is_truthy(off), "{off:?} should be off");
        }
        for on in ["1", "true", "yes"] {
            assert!(is_truthy(on), "{on:?} should be on");
        }
    }
}
