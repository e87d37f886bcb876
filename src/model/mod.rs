//! Data models for Macrum.
//!
//! This module contains all domain models:
//! - Business
//! - Client
//! - Project
//! - Task
//! - Notes
//!
//! Every record type implements [`Entity`], which is what the generic
//! entity store in [`crate::store`] is written against.

pub mod business;
pub mod client;
pub mod notes;
pub mod project;
pub mod task;

pub use business::{Business, BusinessPatch, NewBusiness};
pub use client::{Client, ClientPatch, ClientStatus, NewClient};
pub use notes::Notes;
pub use project::{NewProject, Project, ProjectPatch, ProjectStatus};
pub use task::{NewTask, Task, TaskPatch, TaskStatus};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four entity collections Macrum keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Business,
    Client,
    Project,
    Task,
}

impl EntityKind {
    /// Capitalized label used in messages ("Business", "Task").
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Business => "Business",
            Self::Client => "Client",
            Self::Project => "Project",
            Self::Task => "Task",
        }
    }

    /// Lowercase noun, matching the CLI subcommand name.
    #[must_use]
    pub const fn noun(&self) -> &'static str {
        match self {
            Self::Business => "business",
            Self::Client => "client",
            Self::Project => "project",
            Self::Task => "task",
        }
    }

    /// Prefix for generated identifiers.
    #[must_use]
    pub const fn id_prefix(&self) -> &'static str {
        match self {
            Self::Business => "biz",
            Self::Client => "cli",
            Self::Project => "prj",
            Self::Task => "tsk",
        }
    }

    /// Fixed storage key the collection is persisted under.
    #[must_use]
    pub const fn storage_key(&self) -> &'static str {
        match self {
            Self::Business => "macrum.businesses",
            Self::Client => "macrum.clients",
            Self::Project => "macrum.projects",
            Self::Task => "macrum.tasks",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.noun())
    }
}

/// Priority shared by projects and tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Get the string representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record held by an entity store.
///
/// `Draft` is the data supplied on creation, `Patch` the partial data
/// supplied on update (absent fields stay unchanged).
pub trait Entity: Clone + Serialize + DeserializeOwned {
    type Draft;
    type Patch;

    const KIND: EntityKind;

    fn id(&self) -> &str;

    /// Human-readable name used in notices.
    fn label(&self) -> &str;

    fn updated_at(&self) -> i64;

    /// Build a new record; `created_at` and `updated_at` are both `now`.
    fn from_draft(id: String, draft: Self::Draft, now: i64) -> Self;

    /// Merge the fields present in `patch`. Does not touch `updated_at`.
    fn apply(&mut self, patch: Self::Patch, now: i64);

    fn set_updated_at(&mut self, ts: i64);

    /// Refresh `updated_at` so it is strictly later than before.
    fn touch(&mut self, now: i64) {
        let next = next_timestamp(self.updated_at(), now);
        self.set_updated_at(next);
    }
}

/// Current time as Unix milliseconds.
#[must_use]
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// A timestamp strictly greater than `previous`, preferring `now`.
#[must_use]
pub fn next_timestamp(previous: i64, now: i64) -> i64 {
    if now > previous { now } else { previous + 1 }
}

/// Generate an identifier for `kind` (e.g. `prj_1a2b3c4d5e6f`).
#[must_use]
pub fn generate_id(kind: EntityKind) -> String {
    let uuid = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}", kind.id_prefix(), &uuid[..12])
}

/// Normalize an optional text field: trimmed, `None` when blank.
#[must_use]
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Format a millisecond timestamp as an ISO calendar date.
#[must_use]
pub fn format_date(ts: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ts)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| ts.to_string())
}

/// Format a millisecond timestamp as RFC 3339.
#[must_use]
pub fn format_timestamp(ts: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ts)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ts.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_prefix_and_length() {
        let id = generate_id(EntityKind::Business);
        assert!(id.starts_with("biz_"));
        assert_eq!(id.len(), 16);
        assert_ne!(id, generate_id(EntityKind::Business));
    }

    #[test]
    fn test_next_timestamp_is_strictly_later() {
        assert_eq!(next_timestamp(100, 200), 200);
        assert_eq!(next_timestamp(100, 100), 101);
        assert_eq!(next_timestamp(100, 50), 101);
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("  x ".to_string())), Some("x".to_string()));
        assert_eq!(non_empty(Some("   ".to_string())), None);
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn test_format_date() {
        // 2024-01-15T00:00:00Z
        assert_eq!(format_date(1_705_276_800_000), "2024-01-15");
    }
}
