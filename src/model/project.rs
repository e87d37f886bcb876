//! Project model for Macrum.
//!
//! Projects belong to one business and optionally one client. Progress is
//! derived from the task counters, which the workspace moves as tasks are
//! created, deleted, completed or reopened.

use super::{Entity, EntityKind, Priority, non_empty};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Project status values. Transitions are unguarded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    #[default]
    Planning,
    InProgress,
    OnHold,
    Completed,
}

impl ProjectStatus {
    /// Get the string representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::InProgress => "in-progress",
            Self::OnHold => "on-hold",
            Self::Completed => "completed",
        }
    }

    /// Whether a project in this status counts towards a business's
    /// active projects.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self, Self::Completed)
    }

    pub const ALL: [Self; 4] = [Self::Planning, Self::InProgress, Self::OnHold, Self::Completed];
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A project in Macrum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique identifier (`prj_` + 12 hex chars)
    pub id: String,

    pub name: String,

    pub description: String,

    /// Owning business (not enforced; may dangle)
    pub business_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    #[serde(default)]
    pub status: ProjectStatus,

    #[serde(default)]
    pub priority: Priority,

    /// Percentage of completed tasks, 0-100
    #[serde(default)]
    pub progress: u8,

    pub start_date: NaiveDate,

    pub due_date: NaiveDate,

    #[serde(default)]
    pub task_count: u32,

    #[serde(default)]
    pub completed_tasks: u32,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,

    /// Last update timestamp (Unix milliseconds)
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub business_id: String,
    pub client_id: Option<String>,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
}

impl NewProject {
    pub fn new(
        name: impl Into<String>,
        business_id: impl Into<String>,
        start_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            business_id: business_id.into(),
            client_id: None,
            status: ProjectStatus::default(),
            priority: Priority::default(),
            start_date,
            due_date,
        }
    }
}

impl From<&Project> for NewProject {
    fn from(p: &Project) -> Self {
        Self {
            name: p.name.clone(),
            description: p.description.clone(),
            business_id: p.business_id.clone(),
            client_id: p.client_id.clone(),
            status: p.status,
            priority: p.priority,
            start_date: p.start_date,
            due_date: p.due_date,
        }
    }
}

/// Partial update. An empty `client_id` unlinks the client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub business_id: Option<String>,
    pub client_id: Option<String>,
    pub status: Option<ProjectStatus>,
    pub priority: Option<Priority>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
}

impl ProjectPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// `completed * 100 / total`, rounded; 0 when there are no tasks.
#[must_use]
pub fn compute_progress(total: u32, completed: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = u64::from(completed.min(total));
    let pct = (completed * 200 + u64::from(total)) / (u64::from(total) * 2);
    u8::try_from(pct).unwrap_or(100)
}

impl Project {
    /// Recompute `progress` from the task counters.
    pub fn recompute_progress(&mut self) {
        self.completed_tasks = self.completed_tasks.min(self.task_count);
        self.progress = compute_progress(self.task_count, self.completed_tasks);
    }

    pub fn record_task_added(&mut self, completed: bool) {
        self.task_count += 1;
        if completed {
            self.completed_tasks += 1;
        }
        self.recompute_progress();
    }

    pub fn record_task_removed(&mut self, completed: bool) {
        self.task_count = self.task_count.saturating_sub(1);
        if completed {
            self.completed_tasks = self.completed_tasks.saturating_sub(1);
        }
        self.recompute_progress();
    }

    pub fn record_task_completion(&mut self, completed: bool) {
        if completed {
            self.completed_tasks += 1;
        } else {
            self.completed_tasks = self.completed_tasks.saturating_sub(1);
        }
        self.recompute_progress();
    }

    /// Days from `today` until the due date (negative when overdue).
    #[must_use]
    pub fn days_until_due(&self, today: NaiveDate) -> i64 {
        (self.due_date - today).num_days()
    }
}

impl Entity for Project {
    type Draft = NewProject;
    type Patch = ProjectPatch;

    const KIND: EntityKind = EntityKind::Project;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.name
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn set_updated_at(&mut self, ts: i64) {
        self.updated_at = ts;
    }

    fn from_draft(id: String, draft: NewProject, now: i64) -> Self {
        Self {
            id,
            name: draft.name.trim().to_string(),
            description: draft.description.trim().to_string(),
            business_id: draft.business_id.trim().to_string(),
            client_id: non_empty(draft.client_id),
            status: draft.status,
            priority: draft.priority,
            progress: 0,
            start_date: draft.start_date,
            due_date: draft.due_date,
            task_count: 0,
            completed_tasks: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: ProjectPatch, _now: i64) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = patch.description {
            self.description = description.trim().to_string();
        }
        if let Some(business_id) = patch.business_id {
            self.business_id = business_id.trim().to_string();
        }
        if patch.client_id.is_some() {
            self.client_id = non_empty(patch.client_id);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(start) = patch.start_date {
            self.start_date = start;
        }
        if let Some(due) = patch.due_date {
            self.due_date = due;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn project() -> Project {
        Project::from_draft(
            "prj_1".to_string(),
            NewProject::new("Website", "biz_1", date("2024-01-01"), date("2024-02-01")),
            1,
        )
    }

    #[test]
    fn test_new_project_defaults() {
        let p = project();
        assert_eq!(p.status, ProjectStatus::Planning);
        assert_eq!(p.priority, Priority::Medium);
        assert_eq!(p.progress, 0);
        assert_eq!(p.created_at, p.updated_at);
    }

    #[test]
    fn test_compute_progress() {
        assert_eq!(compute_progress(0, 0), 0);
        assert_eq!(compute_progress(4, 1), 25);
        assert_eq!(compute_progress(3, 1), 33);
        assert_eq!(compute_progress(3, 2), 67);
        assert_eq!(compute_progress(2, 2), 100);
        assert_eq!(compute_progress(2, 5), 100);
    }

    #[test]
    fn test_task_counters_drive_progress() {
        let mut p = project();
        p.record_task_added(false);
        p.record_task_added(false);
        assert_eq!(p.progress, 0);
        p.record_task_completion(true);
        assert_eq!((p.task_count, p.completed_tasks, p.progress), (2, 1, 50));
        p.record_task_removed(true);
        assert_eq!((p.task_count, p.completed_tasks, p.progress), (1, 0, 0));
        p.record_task_removed(false);
        p.record_task_removed(false);
        assert_eq!((p.task_count, p.completed_tasks), (0, 0));
    }

    #[test]
    fn test_status_kebab_case() {
        assert_eq!(
            serde_json::to_string(&ProjectStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
        let json = serde_json::to_value(project()).unwrap();
        assert_eq!(json["startDate"], "2024-01-01");
        assert_eq!(json["businessId"], "biz_1");
    }
}
