//! Aggregate statistics over the collections.

use super::filter::{ProjectBucket, TaskBucket};
use crate::model::{
    Business, Client, ClientStatus, Priority, Project, ProjectStatus, Task, TaskStatus,
};
use crate::store::Workspace;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessStats {
    pub total: usize,
    pub total_projects: u32,
    pub active_projects: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientStats {
    pub total: usize,
    pub by_status: BTreeMap<&'static str, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStats {
    pub total: usize,
    pub by_status: BTreeMap<&'static str, usize>,
    pub overdue: usize,
    /// Mean progress percentage, one decimal.
    pub average_progress: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: usize,
    pub by_status: BTreeMap<&'static str, usize>,
    pub by_priority: BTreeMap<&'static str, usize>,
    pub overdue: usize,
    pub due_soon: usize,
    /// Completed tasks as a percentage of all tasks, one decimal.
    pub completion_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub businesses: BusinessStats,
    pub clients: ClientStats,
    pub projects: ProjectStats,
    pub tasks: TaskStats,
}

/// Every status gets a slot, so zero counts still show up.
fn zeroed(keys: impl IntoIterator<Item = &'static str>) -> BTreeMap<&'static str, usize> {
    keys.into_iter().map(|k| (k, 0)).collect()
}

#[allow(clippy::cast_precision_loss)]
fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round1(part as f64 * 100.0 / whole as f64)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[must_use]
pub fn business_stats(businesses: &[Business]) -> BusinessStats {
    BusinessStats {
        total: businesses.len(),
        total_projects: businesses.iter().map(|b| b.project_count).sum(),
        active_projects: businesses.iter().map(|b| b.active_projects).sum(),
    }
}

#[must_use]
pub fn client_stats(clients: &[Client]) -> ClientStats {
    let mut by_status = zeroed(ClientStatus::ALL.iter().map(ClientStatus::as_str));
    for client in clients {
        *by_status.entry(client.status.as_str()).or_default() += 1;
    }
    ClientStats {
        total: clients.len(),
        by_status,
    }
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn project_stats(projects: &[Project], today: NaiveDate) -> ProjectStats {
    let mut by_status = zeroed(ProjectStatus::ALL.iter().map(ProjectStatus::as_str));
    for project in projects {
        *by_status.entry(project.status.as_str()).or_default() += 1;
    }

    let overdue = projects
        .iter()
        .filter(|p| ProjectBucket::Overdue.contains(p, today))
        .count();

    let average_progress = if projects.is_empty() {
        0.0
    } else {
        let sum: u32 = projects.iter().map(|p| u32::from(p.progress)).sum();
        round1(f64::from(sum) / projects.len() as f64)
    };

    ProjectStats {
        total: projects.len(),
        by_status,
        overdue,
        average_progress,
    }
}

#[must_use]
pub fn task_stats(tasks: &[Task], today: NaiveDate) -> TaskStats {
    let mut by_status = zeroed(TaskStatus::ALL.iter().map(TaskStatus::as_str));
    let mut by_priority = zeroed(Priority::ALL.iter().map(Priority::as_str));
    for task in tasks {
        *by_status.entry(task.status.as_str()).or_default() += 1;
        *by_priority.entry(task.priority.as_str()).or_default() += 1;
    }

    let completed = tasks.iter().filter(|t| t.is_completed()).count();

    TaskStats {
        total: tasks.len(),
        overdue: tasks
            .iter()
            .filter(|t| TaskBucket::Overdue.contains(t, today))
            .count(),
        due_soon: tasks
            .iter()
            .filter(|t| TaskBucket::DueSoon.contains(t, today))
            .count(),
        completion_rate: percentage(completed, tasks.len()),
        by_status,
        by_priority,
    }
}

#[must_use]
pub fn dashboard(workspace: &Workspace, today: NaiveDate) -> DashboardSummary {
    DashboardSummary {
        businesses: business_stats(workspace.businesses().all()),
        clients: client_stats(workspace.clients().all()),
        projects: project_stats(workspace.projects().all(), today),
        tasks: task_stats(workspace.tasks().all(), today),
    }
}
