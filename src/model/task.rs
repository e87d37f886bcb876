//! Task model.

use super::{Entity, EntityKind, Priority, non_empty};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Get the string representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }

    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    pub const ALL: [Self; 3] = [Self::Todo, Self::InProgress, Self::Completed];
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task. `depends_on` is stored as entered and never enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub depends_on: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub project_id: Option<String>,
    pub assigned_to: Option<String>,
    pub tags: Vec<String>,
    pub depends_on: Vec<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

impl From<&Task> for NewTask {
    fn from(t: &Task) -> Self {
        Self {
            title: t.title.clone(),
            description: t.description.clone(),
            status: t.status,
            priority: t.priority,
            due_date: t.due_date,
            project_id: t.project_id.clone(),
            assigned_to: t.assigned_to.clone(),
            tags: t.tags.clone(),
            depends_on: t.depends_on.clone(),
        }
    }
}

/// Partial update.
///
/// `due_date` uses a nested option: `Some(None)` clears the date.
/// An empty `project_id` or `assigned_to` clears the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<NaiveDate>>,
    pub project_id: Option<String>,
    pub assigned_to: Option<String>,
    pub tags: Option<Vec<String>>,
    pub depends_on: Option<Vec<String>>,
}

impl TaskPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Patch that only changes the status.
    #[must_use]
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for v in values {
        let v = v.trim();
        if !v.is_empty() && !out.iter().any(|x| x == v) {
            out.push(v.to_string());
        }
    }
    out
}

impl Task {
    /// Set the status, maintaining `completed_at`.
    pub fn set_status(&mut self, status: TaskStatus, now: i64) {
        if status.is_completed() && !self.status.is_completed() {
            self.completed_at = Some(now);
        } else if !status.is_completed() {
            self.completed_at = None;
        }
        self.status = status;
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }

    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_completed() && self.due_date.is_some_and(|due| due < today)
    }
}

impl Entity for Task {
    type Draft = NewTask;
    type Patch = TaskPatch;

    const KIND: EntityKind = EntityKind::Task;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.title
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn set_updated_at(&mut self, ts: i64) {
        self.updated_at = ts;
    }

    fn from_draft(id: String, draft: NewTask, now: i64) -> Self {
        Self {
            id,
            title: draft.title.trim().to_string(),
            description: non_empty(draft.description),
            status: draft.status,
            priority: draft.priority,
            due_date: draft.due_date,
            project_id: non_empty(draft.project_id),
            assigned_to: non_empty(draft.assigned_to),
            tags: clean_list(draft.tags),
            depends_on: clean_list(draft.depends_on),
            created_at: now,
            updated_at: now,
            completed_at: draft.status.is_completed().then_some(now),
        }
    }

    fn apply(&mut self, patch: TaskPatch, now: i64) {
        if let Some(title) = patch.title {
            self.title = title.trim().to_string();
        }
        if patch.description.is_some() {
            self.description = non_empty(patch.description);
        }
        if let Some(status) = patch.status {
            self.set_status(status, now);
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(due) = patch.due_date {
            self.due_date = due;
        }
        if patch.project_id.is_some() {
            self.project_id = non_empty(patch.project_id);
        }
        if patch.assigned_to.is_some() {
            self.assigned_to = non_empty(patch.assigned_to);
        }
        if let Some(tags) = patch.tags {
            self.tags = clean_list(tags);
        }
        if let Some(deps) = patch.depends_on {
            self.depends_on = clean_list(deps);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> Task {
        Task::from_draft("tsk_1".into(), NewTask::new("Write copy"), 100)
    }

    #[test]
    fn test_completed_at_follows_status() {
        let mut t = task();
        assert_eq!(t.completed_at, None);

        t.apply(TaskPatch::status(TaskStatus::Completed), 200);
        assert_eq!(t.completed_at, Some(200));

        // Completing again keeps the original completion time
        t.apply(TaskPatch::status(TaskStatus::Completed), 300);
        assert_eq!(t.completed_at, Some(200));

        // Straight back to todo is allowed
        t.apply(TaskPatch::status(TaskStatus::Todo), 400);
        assert_eq!(t.completed_at, None);
        assert_eq!(t.status, TaskStatus::Todo);
    }

    #[test]
    fn test_created_completed() {
        let mut draft = NewTask::new("Done already");
        draft.status = TaskStatus::Completed;
        let t = Task::from_draft("tsk_2".into(), draft, 50);
        assert_eq!(t.completed_at, Some(50));
    }

    #[test]
    fn test_tags_are_trimmed_and_deduped() {
        let mut draft = NewTask::new("Tagged");
        draft.tags = vec!["ui".into(), " ui ".into(), "".into(), "api".into()];
        let t = Task::from_draft("tsk_3".into(), draft, 1);
        assert_eq!(t.tags, vec!["ui", "api"]);
    }

    #[test]
    fn test_overdue() {
        let mut t = task();
        let today: NaiveDate = "2024-03-10".parse().unwrap();
        assert!(!t.is_overdue(today));
        t.due_date = Some("2024-03-09".parse().unwrap());
        assert!(t.is_overdue(today));
        t.set_status(TaskStatus::Completed, 2);
        assert!(!t.is_overdue(today));
    }

    #[test]
    fn test_clear_due_date() {
        let mut t = task();
        t.due_date = Some("2024-03-09".parse().unwrap());
        t.apply(
            TaskPatch {
                due_date: Some(None),
                ..TaskPatch::default()
            },
            2,
        );
        assert_eq!(t.due_date, None);
    }
}
