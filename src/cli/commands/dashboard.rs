//! Dashboard: aggregate statistics across every collection.

use super::project::print_project_stats;
use super::{open_workspace, print_json, print_notices, today};
use crate::error::Result;
use crate::model::{ClientStatus, Priority, Task, TaskStatus};
use crate::view::stats::{DashboardSummary, dashboard};
use crate::view::{TaskBucket, TaskFilter, TaskSort, SortOrder, query};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

/// Number of due-soon tasks listed below the counts.
const DUE_SOON_SHOWN: usize = 5;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardOutput<'a> {
    #[serde(flatten)]
    summary: &'a DashboardSummary,
    due_soon_tasks: Vec<&'a Task>,
}

/// Execute the dashboard command.
///
/// # Errors
///
/// Returns an error if the database is missing or output fails.
pub fn execute(db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let mut ws = open_workspace(db_path)?;
    let notices = ws.take_notices();
    let today = today();

    let summary = dashboard(&ws, today);
    let due_soon = TaskFilter {
        bucket: Some(TaskBucket::DueSoon),
        ..TaskFilter::default()
    };
    let due_soon_tasks = query(
        ws.tasks().all(),
        &due_soon,
        TaskSort::DueDate,
        SortOrder::Asc,
        Some(DUE_SOON_SHOWN),
        today,
    );

    if json {
        let output = DashboardOutput {
            summary: &summary,
            due_soon_tasks,
        };
        return print_json(&output, &notices);
    }

    print_notices(&notices);
    println!(
        "{}",
        "━━━ Macrum Dashboard ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".magenta().bold()
    );
    println!();

    println!("{}", "Businesses".cyan().bold());
    println!("  Total:            {}", summary.businesses.total);
    println!(
        "  Projects:         {} ({} active)",
        summary.businesses.total_projects, summary.businesses.active_projects
    );
    println!();

    println!("{}", "Clients".cyan().bold());
    println!("  Total:            {}", summary.clients.total);
    for status in ClientStatus::ALL {
        let count = summary.clients.by_status.get(status.as_str()).copied().unwrap_or(0);
        println!("  {:<17} {count}", format!("{status}:"));
    }
    println!();

    print_project_stats(&summary.projects);
    println!();

    let tasks = &summary.tasks;
    println!("{}", "Tasks".cyan().bold());
    println!("  Total:            {}", tasks.total);
    for status in TaskStatus::ALL {
        let count = tasks.by_status.get(status.as_str()).copied().unwrap_or(0);
        println!("  {:<17} {count}", format!("{status}:"));
    }
    for priority in Priority::ALL.iter().rev() {
        let count = tasks.by_priority.get(priority.as_str()).copied().unwrap_or(0);
        println!("  {:<17} {count}", format!("{priority} priority:"));
    }
    println!("  Overdue:          {}", tasks.overdue);
    println!("  Completion rate:  {:.1}%", tasks.completion_rate);

    if !due_soon_tasks.is_empty() {
        println!();
        println!("{}", "Due soon".yellow().bold());
        for t in &due_soon_tasks {
            let due = t.due_date.map(|d| d.to_string()).unwrap_or_default();
            println!("  {due}  [{}] {}", t.id, t.title);
        }
    }

    Ok(())
}
