//! Task management commands.
//!
//! - `macrum task create <title>` - Create a task
//! - `macrum task list` - List tasks
//! - `macrum task show <id>` - Show task details
//! - `macrum task update <id>` - Update task fields
//! - `macrum task complete <id>...` - Mark tasks completed
//! - `macrum task reopen <id>...` - Move tasks back to todo
//! - `macrum task delete <id>...` - Delete tasks

use super::{
    open_workspace, parse_sort, print_json, print_notices, print_problems, require_changes, today, truncate,
};
use crate::cli::{TaskCommands, TaskCreateArgs, TaskListArgs, TaskUpdateArgs};
use crate::error::{Error, Result};
use crate::model::{Entity, NewTask, Priority, Task, TaskPatch, TaskStatus, format_timestamp};
use crate::store::Workspace;
use crate::validate::{ValidationErrors, parse_priority, parse_task_status, validate_task};
use crate::view::{self, TaskBucket, TaskFilter, TaskSort};
use chrono::NaiveDate;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct TaskOutput<'a> {
    task: &'a Task,
}

#[derive(Serialize)]
struct TaskListOutput<'a> {
    tasks: Vec<&'a Task>,
    count: usize,
}

#[derive(Serialize)]
struct TaskBatchOutput<'a> {
    tasks: &'a [Task],
    count: usize,
}

/// Execute a task command.
///
/// # Errors
///
/// Returns an error if the database is missing, input fails validation,
/// or a referenced record does not exist.
pub fn execute(command: &TaskCommands, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let mut ws = open_workspace(db_path)?;

    match command {
        TaskCommands::Create(args) => create(&mut ws, args, json),
        TaskCommands::List(args) => list(&mut ws, args, json),
        TaskCommands::Show { id } => show(&mut ws, id, json),
        TaskCommands::Update(args) => update(&mut ws, args, json),
        TaskCommands::Complete { ids } => set_status(&mut ws, ids, TaskStatus::Completed, json),
        TaskCommands::Reopen { ids } => set_status(&mut ws, ids, TaskStatus::Todo, json),
        TaskCommands::Delete { ids } => delete(&mut ws, ids, json),
    }
}

fn status_icon(status: TaskStatus) -> colored::ColoredString {
    match status {
        TaskStatus::Todo => "○".normal(),
        TaskStatus::InProgress => "●".yellow(),
        TaskStatus::Completed => "✓".green(),
    }
}

fn priority_mark(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "!!",
        Priority::Medium => "! ",
        Priority::Low => "  ",
    }
}

/// Parse a `--due` value for updates: a date, or `none`/empty to clear.
fn parse_due(input: &str) -> Result<Option<NaiveDate>> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    trimmed
        .parse::<NaiveDate>()
        .map(Some)
        .map_err(|_| Error::InvalidArgument(format!("invalid due date '{input}' (expected YYYY-MM-DD or none)")))
}

fn require_project(ws: &Workspace, project_id: Option<&str>) -> Result<()> {
    if let Some(id) = project_id.filter(|p| !p.trim().is_empty()) {
        ws.projects().require(id)?;
    }
    Ok(())
}

fn create(ws: &mut Workspace, args: &TaskCreateArgs, json: bool) -> Result<()> {
    let draft = NewTask {
        title: args.title.clone(),
        description: args.description.clone(),
        status: args
            .status
            .as_deref()
            .map(parse_task_status)
            .transpose()?
            .unwrap_or_default(),
        priority: args
            .priority
            .as_deref()
            .map(parse_priority)
            .transpose()?
            .unwrap_or_default(),
        due_date: args.due,
        project_id: args.project.clone(),
        assigned_to: args.assign.clone(),
        tags: args.tags.clone(),
        depends_on: args.depends_on.clone(),
    };
    ValidationErrors::check(validate_task(&draft))?;
    require_project(ws, draft.project_id.as_deref())?;

    let task = ws.create_task(draft);
    let notices = ws.take_notices();

    if crate::is_silent() {
        print_problems(&notices);
        println!("{}", task.id);
    } else if json {
        print_json(&TaskOutput { task: &task }, &notices)?;
    } else {
        print_notices(&notices);
        println!("Created task: {}", task.title);
        println!("  ID: {}", task.id);
        if let Some(due) = task.due_date {
            println!("  Due: {due}");
        }
    }

    Ok(())
}

fn list(ws: &mut Workspace, args: &TaskListArgs, json: bool) -> Result<()> {
    let (key, order): (TaskSort, _) = parse_sort(&args.sort)?;
    let filter = TaskFilter {
        search: args.search.clone(),
        status: args.status.as_deref().map(parse_task_status).transpose()?,
        priority: args.priority.as_deref().map(parse_priority).transpose()?,
        project_id: args.project.clone(),
        tag: args.tag.clone(),
        bucket: args
            .bucket
            .as_deref()
            .map(str::parse::<TaskBucket>)
            .transpose()?,
    };

    let notices = ws.take_notices();
    let today = today();
    let tasks = view::query(ws.tasks().all(), &filter, key, order, args.sort.limit, today);

    if crate::is_csv() {
        // CSV goes to stdout; notices stay on stderr
        print_notices(&notices);
        println!("id,title,status,priority,due_date,project_id,tags");
        for t in &tasks {
            println!(
                "{},{},{},{},{},{},{}",
                t.id,
                crate::csv_escape(&t.title),
                t.status,
                t.priority,
                t.due_date.map(|d| d.to_string()).unwrap_or_default(),
                t.project_id.as_deref().unwrap_or(""),
                crate::csv_escape(&t.tags.join(";"))
            );
        }
    } else if json {
        let output = TaskListOutput {
            count: tasks.len(),
            tasks,
        };
        print_json(&output, &notices)?;
    } else {
        print_notices(&notices);
        if tasks.is_empty() {
            println!("No tasks found.");
            return Ok(());
        }
        println!("Tasks ({} found):\n", tasks.len());
        for t in &tasks {
            let due = match t.due_date {
                Some(d) if t.is_overdue(today) => format!(" due {d}").red().to_string(),
                Some(d) => format!(" due {d}"),
                None => String::new(),
            };
            println!(
                "{} [{}] {} {}{due}",
                status_icon(t.status),
                t.id,
                priority_mark(t.priority),
                t.title
            );
            if let Some(desc) = &t.description {
                println!("        {}", truncate(desc, 60));
            }
        }
    }

    Ok(())
}

fn show(ws: &mut Workspace, id: &str, json: bool) -> Result<()> {
    let notices = ws.take_notices();
    let task = ws.tasks().require(id)?;

    if json {
        return print_json(&TaskOutput { task }, &notices);
    }

    print_notices(&notices);
    println!("{} {}", status_icon(task.status), task.title.bold());
    println!("  ID:          {}", task.id);
    println!("  Status:      {}", task.status);
    println!("  Priority:    {}", task.priority);
    println!(
        "  Due:         {}",
        task.due_date.map_or_else(|| "-".to_string(), |d| d.to_string())
    );
    if let Some(pid) = &task.project_id {
        let name = ws.projects().get(pid).map_or("(deleted)", |p| p.name.as_str());
        println!("  Project:     {name} ({pid})");
    }
    println!("  Assigned to: {}", task.assigned_to.as_deref().unwrap_or("-"));
    if !task.tags.is_empty() {
        println!("  Tags:        {}", task.tags.join(", "));
    }
    if !task.depends_on.is_empty() {
        println!("  Depends on:  {}", task.depends_on.join(", "));
    }
    if let Some(desc) = &task.description {
        println!();
        println!("{desc}");
    }
    println!();
    println!("Created: {}", format_timestamp(task.created_at));
    println!("Updated: {}", format_timestamp(task.updated_at));
    if let Some(done) = task.completed_at {
        println!("Completed: {}", format_timestamp(done));
    }

    Ok(())
}

fn update(ws: &mut Workspace, args: &TaskUpdateArgs, json: bool) -> Result<()> {
    let patch = TaskPatch {
        title: args.title.clone(),
        description: args.description.clone(),
        status: args.status.as_deref().map(parse_task_status).transpose()?,
        priority: args.priority.as_deref().map(parse_priority).transpose()?,
        due_date: args.due.as_deref().map(parse_due).transpose()?,
        project_id: args.project.clone(),
        assigned_to: args.assign.clone(),
        tags: args.tags.clone(),
        depends_on: args.depends_on.clone(),
    };
    require_changes(patch.is_empty())?;
    require_project(ws, patch.project_id.as_deref())?;

    let mut merged = ws.tasks().require(&args.id)?.clone();
    let now = merged.updated_at;
    merged.apply(patch.clone(), now);
    ValidationErrors::check(validate_task(&NewTask::from(&merged)))?;

    let updated = ws.update_task(&args.id, patch);
    let notices = ws.take_notices();
    let Some(task) = updated else {
        print_notices(&notices);
        return Ok(());
    };

    if json {
        print_json(&TaskOutput { task: &task }, &notices)?;
    } else {
        print_notices(&notices);
        println!("Updated task: {}", task.title);
        println!("  ID: {}", task.id);
    }

    Ok(())
}

fn set_status(ws: &mut Workspace, ids: &[String], status: TaskStatus, json: bool) -> Result<()> {
    for id in ids {
        ws.tasks().require(id)?;
    }

    let changed: Vec<Task> = ids
        .iter()
        .filter_map(|id| match status {
            TaskStatus::Completed => ws.complete_task(id),
            _ => ws.reopen_task(id),
        })
        .collect();
    let notices = ws.take_notices();

    if json {
        let output = TaskBatchOutput {
            count: changed.len(),
            tasks: &changed,
        };
        print_json(&output, &notices)?;
    } else {
        print_notices(&notices);
        let verb = if status.is_completed() { "Completed" } else { "Reopened" };
        for task in &changed {
            println!("{verb}: [{}] {}", task.id, task.title);
        }
    }

    Ok(())
}

fn delete(ws: &mut Workspace, ids: &[String], json: bool) -> Result<()> {
    for id in ids {
        ws.tasks().require(id)?;
    }

    let deleted: Vec<&String> = ids.iter().filter(|id| ws.delete_task(id)).collect();
    let notices = ws.take_notices();

    if json {
        let output = serde_json::json!({
            "deleted": deleted,
            "count": deleted.len(),
        });
        print_json(&output, &notices)?;
    } else {
        print_notices(&notices);
        println!("Deleted {} task(s)", deleted.len());
    }

    Ok(())
}
