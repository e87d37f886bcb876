//! Project management commands.
//!
//! - `macrum project create <name> --business <id> --due <date>` - Create a project
//! - `macrum project list` - List projects
//! - `macrum project show <id>` - Show project details and tasks
//! - `macrum project update <id>` - Update project fields
//! - `macrum project delete <id>...` - Delete projects
//! - `macrum project stats` - Project statistics

use super::{
    open_workspace, parse_sort, print_json, print_notices, print_problems, require_changes, today, truncate,
};
use crate::cli::{ProjectCommands, ProjectCreateArgs, ProjectListArgs, ProjectUpdateArgs};
use crate::error::Result;
use crate::model::{Entity, NewProject, Project, ProjectPatch, ProjectStatus, Task, format_timestamp};
use crate::store::Workspace;
use crate::validate::{ValidationErrors, parse_priority, parse_project_status, validate_project};
use crate::view::stats::{ProjectStats, project_stats};
use crate::view::{self, ProjectBucket, ProjectFilter, ProjectSort};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct ProjectOutput<'a> {
    project: &'a Project,
}

#[derive(Serialize)]
struct ProjectListOutput<'a> {
    projects: Vec<&'a Project>,
    count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectDetailOutput<'a> {
    project: &'a Project,
    business_name: Option<&'a str>,
    client_name: Option<&'a str>,
    days_until_due: i64,
    tasks: Vec<&'a Task>,
}

/// Execute a project command.
///
/// # Errors
///
/// Returns an error if the database is missing, input fails validation,
/// or a referenced record does not exist.
pub fn execute(command: &ProjectCommands, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let mut ws = open_workspace(db_path)?;

    match command {
        ProjectCommands::Create(args) => create(&mut ws, args, json),
        ProjectCommands::List(args) => list(&mut ws, args, json),
        ProjectCommands::Show { id } => show(&mut ws, id, json),
        ProjectCommands::Update(args) => update(&mut ws, args, json),
        ProjectCommands::Delete { ids } => delete(&mut ws, ids, json),
        ProjectCommands::Stats { business } => stats(&mut ws, business.as_deref(), json),
    }
}

fn status_label(status: ProjectStatus) -> colored::ColoredString {
    match status {
        ProjectStatus::Planning => status.as_str().cyan(),
        ProjectStatus::InProgress => status.as_str().yellow(),
        ProjectStatus::OnHold => status.as_str().dimmed(),
        ProjectStatus::Completed => status.as_str().green(),
    }
}

/// Business and client references must point at existing records.
fn require_links(ws: &Workspace, business_id: &str, client_id: Option<&str>) -> Result<()> {
    ws.businesses().require(business_id)?;
    if let Some(client_id) = client_id.filter(|c| !c.trim().is_empty()) {
        ws.clients().require(client_id)?;
    }
    Ok(())
}

fn create(ws: &mut Workspace, args: &ProjectCreateArgs, json: bool) -> Result<()> {
    let draft = NewProject {
        name: args.name.clone(),
        description: args.description.clone(),
        business_id: args.business.clone(),
        client_id: args.client.clone(),
        status: args
            .status
            .as_deref()
            .map(parse_project_status)
            .transpose()?
            .unwrap_or_default(),
        priority: args
            .priority
            .as_deref()
            .map(parse_priority)
            .transpose()?
            .unwrap_or_default(),
        start_date: args.start.unwrap_or_else(today),
        due_date: args.due,
    };
    ValidationErrors::check(validate_project(&draft))?;
    require_links(ws, &draft.business_id, draft.client_id.as_deref())?;

    let project = ws.create_project(draft);
    let notices = ws.take_notices();

    if crate::is_silent() {
        print_problems(&notices);
        println!("{}", project.id);
    } else if json {
        print_json(&ProjectOutput { project: &project }, &notices)?;
    } else {
        print_notices(&notices);
        println!("Created project: {}", project.name);
        println!("  ID:  {}", project.id);
        println!("  Due: {}", project.due_date);
    }

    Ok(())
}

fn list(ws: &mut Workspace, args: &ProjectListArgs, json: bool) -> Result<()> {
    let (key, order): (ProjectSort, _) = parse_sort(&args.sort)?;
    let filter = ProjectFilter {
        search: args.search.clone(),
        status: args.status.as_deref().map(parse_project_status).transpose()?,
        priority: args.priority.as_deref().map(parse_priority).transpose()?,
        business_id: args.business.clone(),
        client_id: args.client.clone(),
        bucket: args
            .bucket
            .as_deref()
            .map(str::parse::<ProjectBucket>)
            .transpose()?,
    };

    let notices = ws.take_notices();
    let today = today();
    let projects = view::query(
        ws.projects().all(),
        &filter,
        key,
        order,
        args.sort.limit,
        today,
    );

    if crate::is_csv() {
        // CSV goes to stdout; notices stay on stderr
        print_notices(&notices);
        println!("id,name,business_id,status,priority,progress,start_date,due_date");
        for p in &projects {
            println!(
                "{},{},{},{},{},{},{},{}",
                p.id,
                crate::csv_escape(&p.name),
                p.business_id,
                p.status,
                p.priority,
                p.progress,
                p.start_date,
                p.due_date
            );
        }
    } else if json {
        let output = ProjectListOutput {
            count: projects.len(),
            projects,
        };
        print_json(&output, &notices)?;
    } else {
        print_notices(&notices);
        if projects.is_empty() {
            println!("No projects found.");
            return Ok(());
        }
        println!("Projects ({}):\n", projects.len());
        for p in &projects {
            let overdue = if ProjectBucket::Overdue.contains(p, today) {
                " OVERDUE".red().bold().to_string()
            } else {
                String::new()
            };
            println!(
                "  {} [{}] {} {}%{overdue}",
                p.name,
                status_label(p.status),
                p.priority,
                p.progress
            );
            println!("    ID:   {}", p.id);
            println!("    Due:  {} (started {})", p.due_date, p.start_date);
            if !p.description.is_empty() {
                println!("    Desc: {}", truncate(&p.description, 60));
            }
        }
    }

    Ok(())
}

fn show(ws: &mut Workspace, id: &str, json: bool) -> Result<()> {
    let notices = ws.take_notices();
    let project = ws.projects().require(id)?;
    let business_name = ws.businesses().get(&project.business_id).map(|b| b.name.as_str());
    let client_name = project
        .client_id
        .as_deref()
        .and_then(|cid| ws.clients().get(cid))
        .map(|c| c.name.as_str());
    let tasks: Vec<&Task> = ws
        .tasks()
        .iter()
        .filter(|t| t.project_id.as_deref() == Some(project.id.as_str()))
        .collect();
    let days_until_due = project.days_until_due(today());

    if json {
        let output = ProjectDetailOutput {
            project,
            business_name,
            client_name,
            days_until_due,
            tasks,
        };
        return print_json(&output, &notices);
    }

    print_notices(&notices);
    println!("Project: {}", project.name);
    println!("  ID:          {}", project.id);
    println!("  Status:      {}", status_label(project.status));
    println!("  Priority:    {}", project.priority);
    println!("  Business:    {} ({})", business_name.unwrap_or("(deleted)"), project.business_id);
    if let Some(cid) = &project.client_id {
        println!("  Client:      {} ({cid})", client_name.unwrap_or("(deleted)"));
    }
    println!("  Start:       {}", project.start_date);
    println!("  Due:         {} ({days_until_due} days)", project.due_date);
    println!(
        "  Progress:    {}% ({}/{} tasks)",
        project.progress, project.completed_tasks, project.task_count
    );
    if !project.description.is_empty() {
        println!("  Description: {}", project.description);
    }
    println!();
    println!("Tasks ({}):", tasks.len());
    for t in &tasks {
        let mark = if t.is_completed() { "✓" } else { "○" };
        println!("  {mark} [{}] {} ({})", t.id, t.title, t.priority);
    }
    println!();
    println!("Created: {}", format_timestamp(project.created_at));
    println!("Updated: {}", format_timestamp(project.updated_at));

    Ok(())
}

fn update(ws: &mut Workspace, args: &ProjectUpdateArgs, json: bool) -> Result<()> {
    let patch = ProjectPatch {
        name: args.name.clone(),
        description: args.description.clone(),
        business_id: args.business.clone(),
        client_id: args.client.clone(),
        status: args.status.as_deref().map(parse_project_status).transpose()?,
        priority: args.priority.as_deref().map(parse_priority).transpose()?,
        start_date: args.start,
        due_date: args.due,
    };
    require_changes(patch.is_empty())?;

    let mut merged = ws.projects().require(&args.id)?.clone();
    let now = merged.updated_at;
    merged.apply(patch.clone(), now);
    ValidationErrors::check(validate_project(&NewProject::from(&merged)))?;
    if patch.business_id.is_some() || patch.client_id.is_some() {
        require_links(ws, &merged.business_id, merged.client_id.as_deref())?;
    }

    let updated = ws.update_project(&args.id, patch);
    let notices = ws.take_notices();
    let Some(project) = updated else {
        print_notices(&notices);
        return Ok(());
    };

    if json {
        print_json(&ProjectOutput { project: &project }, &notices)?;
    } else {
        print_notices(&notices);
        println!("Updated project: {}", project.name);
        println!("  ID:     {}", project.id);
        println!("  Status: {}", status_label(project.status));
    }

    Ok(())
}

fn delete(ws: &mut Workspace, ids: &[String], json: bool) -> Result<()> {
    for id in ids {
        ws.projects().require(id)?;
    }

    let deleted: Vec<&String> = ids.iter().filter(|id| ws.delete_project(id)).collect();
    let notices = ws.take_notices();

    if json {
        let output = serde_json::json!({
            "deleted": deleted,
            "count": deleted.len(),
        });
        print_json(&output, &notices)?;
    } else {
        print_notices(&notices);
        println!("Deleted {} project(s)", deleted.len());
    }

    Ok(())
}

fn stats(ws: &mut Workspace, business: Option<&str>, json: bool) -> Result<()> {
    let notices = ws.take_notices();
    if let Some(id) = business {
        ws.businesses().require(id)?;
    }

    let projects: Vec<Project> = ws
        .projects()
        .iter()
        .filter(|p| business.is_none_or(|id| p.business_id == id))
        .cloned()
        .collect();
    let stats = project_stats(&projects, today());

    if json {
        return print_json(&stats, &notices);
    }

    print_notices(&notices);
    print_project_stats(&stats);
    Ok(())
}

pub(crate) fn print_project_stats(stats: &ProjectStats) {
    println!("{}", "Projects".cyan().bold());
    println!("  Total:            {}", stats.total);
    for status in ProjectStatus::ALL {
        let count = stats.by_status.get(status.as_str()).copied().unwrap_or(0);
        println!("  {:<17} {count}", format!("{}:", status_label(status)));
    }
    println!("  Overdue:          {}", stats.overdue);
    println!("  Average progress: {:.1}%", stats.average_progress);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::NewBusiness;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn create_args(business: &str, start: &str, due: &str) -> ProjectCreateArgs {
        ProjectCreateArgs {
            name: "Website".to_string(),
            business: business.to_string(),
            client: None,
            description: String::new(),
            status: Some("active".to_string()),
            priority: Some("urgent".to_string()),
            start: Some(date(start)),
            due: date(due),
        }
    }

    #[test]
    fn test_create_normalizes_and_counts() {
        let mut ws = Workspace::in_memory();
        let biz = ws.create_business(NewBusiness::new("Acme"));

        create(&mut ws, &create_args(&biz.id, "2024-01-01", "2024-02-01"), true).unwrap();

        let project = &ws.projects().all()[0];
        assert_eq!(project.status, ProjectStatus::InProgress);
        assert_eq!(project.priority, crate::model::Priority::High);
        assert_eq!(ws.businesses().get(&biz.id).unwrap().project_count, 1);
    }

    #[test]
    fn test_create_blocks_on_bad_dates() {
        let mut ws = Workspace::in_memory();
        let biz = ws.create_business(NewBusiness::new("Acme"));

        let err = create(&mut ws, &create_args(&biz.id, "2024-02-01", "2024-01-01"), true)
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(ws.projects().is_empty());
    }

    #[test]
    fn test_create_requires_business() {
        let mut ws = Workspace::in_memory();
        let err = create(&mut ws, &create_args("biz_missing", "2024-01-01", "2024-02-01"), true)
            .unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
