//! Command implementations.
//!
//! Every entity command follows the same shape: open the workspace,
//! validate input (blocking on errors), run the store operation, then print
//! the result together with the notices the operation produced.

pub mod business;
pub mod client;
pub mod completions;
pub mod dashboard;
pub mod init;
pub mod notes;
pub mod project;
pub mod task;
pub mod version;

use crate::cli::SortArgs;
use crate::config::resolve_db_path;
use crate::error::{Error, Result};
use crate::store::{Notice, NoticeLevel, Workspace};
use crate::view::SortOrder;
use chrono::NaiveDate;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;

/// Open the workspace at the resolved database path.
///
/// # Errors
///
/// Returns `Error::NotInitialized` if the database does not exist yet.
pub fn open_workspace(db_path: Option<&PathBuf>) -> Result<Workspace> {
    let db_path = resolve_db_path(db_path.map(|p| p.as_path())).ok_or(Error::NotInitialized)?;

    if !db_path.exists() {
        return Err(Error::NotInitialized);
    }

    Workspace::open_sqlite(&db_path)
}

/// Today's date in local time; the reference point for date buckets.
#[must_use]
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Print `payload` as JSON, with `notices` attached under `"notices"`
/// when the payload is an object and there is something to report.
pub(crate) fn print_json<T: Serialize>(payload: &T, notices: &[Notice]) -> Result<()> {
    let mut value = serde_json::to_value(payload)?;
    if !notices.is_empty() {
        if let Some(obj) = value.as_object_mut() {
            obj.insert("notices".to_string(), serde_json::to_value(notices)?);
        }
    }
    println!("{}", serde_json::to_string(&value)?);
    Ok(())
}

/// Print notices to stderr for table output.
pub(crate) fn print_notices(notices: &[Notice]) {
    for notice in notices {
        let tag = match notice.level {
            NoticeLevel::Success => "✓".green(),
            NoticeLevel::Warning => "!".yellow(),
            NoticeLevel::Error => "✗".red(),
        };
        eprintln!("{tag} {}", notice.message);
    }
}

/// Print only warnings and errors, for `--silent` where stdout carries the id.
pub(crate) fn print_problems(notices: &[Notice]) {
    let problems: Vec<Notice> = notices
        .iter()
        .filter(|n| n.level != NoticeLevel::Success)
        .cloned()
        .collect();
    print_notices(&problems);
}

/// Parse `--sort`/`--order`, falling back to `K::default()`.
pub(crate) fn parse_sort<K>(args: &SortArgs) -> Result<(K, SortOrder)>
where
    K: FromStr<Err = Error> + Default,
{
    let key = args.sort.as_deref().map(K::from_str).transpose()?.unwrap_or_default();
    let order = if args.order.trim().is_empty() {
        SortOrder::default()
    } else {
        args.order.parse()?
    };
    Ok((key, order))
}

/// Shorten `s` to `max` characters with a trailing ellipsis.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let cut: String = s.chars().take(max).collect();
        format!("{cut}...")
    } else {
        s.to_string()
    }
}

/// Fail with `InvalidArgument` when an update carries no changes.
pub(crate) fn require_changes(empty: bool) -> Result<()> {
    if empty {
        return Err(Error::InvalidArgument(
            "nothing to update; pass at least one field".to_string(),
        ));
    }
    Ok(())
}
