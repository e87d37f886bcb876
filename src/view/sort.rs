//! Single-field sorting with an ascending/descending toggle.
//!
//! Sorting is stable. Text compares by the byte order of its lowercase
//! form; missing optional values go last when ascending.

use crate::error::{Error, Result};
use crate::model::{Business, Client, Project, Task};
use std::cmp::Ordering;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            _ => Err(Error::InvalidArgument(format!(
                "unknown sort order '{s}' (expected asc or desc)"
            ))),
        }
    }
}

/// A field records of `T` can be ordered by.
pub trait SortKey<T>: Copy {
    fn compare(self, a: &T, b: &T) -> Ordering;
}

/// Stable in-place sort of a filtered view.
pub fn sort<T, K: SortKey<T>>(items: &mut [&T], key: K, order: SortOrder) {
    items.sort_by(|a, b| order.apply(key.compare(a, b)));
}

fn cmp_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// `None` sorts after every `Some`.
fn cmp_missing_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn cmp_opt_text(a: Option<&str>, b: Option<&str>) -> Ordering {
    cmp_missing_last(a.map(str::to_lowercase), b.map(str::to_lowercase))
}

/// Lowercase and drop separators so `due-date`, `due_date` and `dueDate`
/// name the same field.
fn field_name(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

fn unknown_field(kind: &str, s: &str, expected: &str) -> Error {
    Error::InvalidArgument(format!(
        "unknown {kind} sort field '{s}' (expected one of: {expected})"
    ))
}

// ── Businesses ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BusinessSort {
    #[default]
    Name,
    Industry,
    Projects,
    Created,
    Updated,
}

impl SortKey<Business> for BusinessSort {
    fn compare(self, a: &Business, b: &Business) -> Ordering {
        match self {
            Self::Name => cmp_text(&a.name, &b.name),
            Self::Industry => cmp_opt_text(a.industry.as_deref(), b.industry.as_deref()),
            Self::Projects => a.project_count.cmp(&b.project_count),
            Self::Created => a.created_at.cmp(&b.created_at),
            Self::Updated => a.updated_at.cmp(&b.updated_at),
        }
    }
}

impl FromStr for BusinessSort {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match field_name(s).as_str() {
            "name" => Ok(Self::Name),
            "industry" => Ok(Self::Industry),
            "projects" | "projectcount" => Ok(Self::Projects),
            "created" | "createdat" => Ok(Self::Created),
            "updated" | "updatedat" => Ok(Self::Updated),
            _ => Err(unknown_field(
                "business",
                s,
                "name, industry, projects, created, updated",
            )),
        }
    }
}

// ── Clients ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClientSort {
    #[default]
    Name,
    Email,
    Company,
    Status,
    Projects,
    Created,
}

impl SortKey<Client> for ClientSort {
    fn compare(self, a: &Client, b: &Client) -> Ordering {
        match self {
            Self::Name => cmp_text(&a.name, &b.name),
            Self::Email => cmp_text(&a.email, &b.email),
            Self::Company => cmp_opt_text(a.company.as_deref(), b.company.as_deref()),
            Self::Status => a.status.as_str().cmp(b.status.as_str()),
            Self::Projects => a.project_ids.len().cmp(&b.project_ids.len()),
            Self::Created => a.created_at.cmp(&b.created_at),
        }
    }
}

impl FromStr for ClientSort {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match field_name(s).as_str() {
            "name" => Ok(Self::Name),
            "email" => Ok(Self::Email),
            "company" => Ok(Self::Company),
            "status" => Ok(Self::Status),
            "projects" => Ok(Self::Projects),
            "created" | "createdat" => Ok(Self::Created),
            _ => Err(unknown_field(
                "client",
                s,
                "name, email, company, status, projects, created",
            )),
        }
    }
}

// ── Projects ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProjectSort {
    Name,
    Status,
    Priority,
    Progress,
    StartDate,
    #[default]
    DueDate,
    Created,
    Updated,
}

impl SortKey<Project> for ProjectSort {
    fn compare(self, a: &Project, b: &Project) -> Ordering {
        match self {
            Self::Name => cmp_text(&a.name, &b.name),
            // Lifecycle order: planning, in-progress, on-hold, completed
            Self::Status => (a.status as u8).cmp(&(b.status as u8)),
            Self::Priority => a.priority.cmp(&b.priority),
            Self::Progress => a.progress.cmp(&b.progress),
            Self::StartDate => a.start_date.cmp(&b.start_date),
            Self::DueDate => a.due_date.cmp(&b.due_date),
            Self::Created => a.created_at.cmp(&b.created_at),
            Self::Updated => a.updated_at.cmp(&b.updated_at),
        }
    }
}

impl FromStr for ProjectSort {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match field_name(s).as_str() {
            "name" => Ok(Self::Name),
            "status" => Ok(Self::Status),
            "priority" => Ok(Self::Priority),
            "progress" => Ok(Self::Progress),
            "start" | "startdate" => Ok(Self::StartDate),
            "due" | "duedate" => Ok(Self::DueDate),
            "created" | "createdat" => Ok(Self::Created),
            "updated" | "updatedat" => Ok(Self::Updated),
            _ => Err(unknown_field(
                "project",
                s,
                "name, status, priority, progress, start-date, due-date, created, updated",
            )),
        }
    }
}

// ── Tasks ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskSort {
    Title,
    Status,
    Priority,
    #[default]
    DueDate,
    Created,
    Updated,
}

impl SortKey<Task> for TaskSort {
    fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            Self::Title => cmp_text(&a.title, &b.title),
            Self::Status => (a.status as u8).cmp(&(b.status as u8)),
            Self::Priority => a.priority.cmp(&b.priority),
            Self::DueDate => cmp_missing_last(a.due_date, b.due_date),
            Self::Created => a.created_at.cmp(&b.created_at),
            Self::Updated => a.updated_at.cmp(&b.updated_at),
        }
    }
}

impl FromStr for TaskSort {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match field_name(s).as_str() {
            "title" => Ok(Self::Title),
            "status" => Ok(Self::Status),
            "priority" => Ok(Self::Priority),
            "due" | "duedate" => Ok(Self::DueDate),
            "created" | "createdat" => Ok(Self::Created),
            "updated" | "updatedat" => Ok(Self::Updated),
            _ => Err(unknown_field(
                "task",
                s,
                "title, status, priority, due-date, created, updated",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Entity, NewBusiness, NewTask, Priority};
    use chrono::NaiveDate;

    fn business(id: &str, name: &str) -> Business {
        Business::from_draft(id.to_string(), NewBusiness::new(name), 1)
    }

    fn task(id: &str, due: Option<&str>, priority: Priority) -> Task {
        let mut draft = NewTask::new(id);
        draft.due_date = due.map(|d| d.parse::<NaiveDate>().unwrap());
        draft.priority = priority;
        Task::from_draft(id.to_string(), draft, 1)
    }

    #[test]
    fn test_text_sort_is_case_insensitive() {
        let all = vec![
            business("biz_1", "beta"),
            business("biz_2", "Alpha"),
            business("biz_3", "Gamma"),
        ];
        let mut view: Vec<&Business> = all.iter().collect();
        sort(&mut view, BusinessSort::Name, SortOrder::Asc);
        let names: Vec<_> = view.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "beta", "Gamma"]);

        sort(&mut view, BusinessSort::Name, SortOrder::Desc);
        assert_eq!(view[0].name, "Gamma");
    }

    #[test]
    fn test_missing_due_dates_sort_last() {
        let all = vec![
            task("tsk_none", None, Priority::Low),
            task("tsk_late", Some("2024-05-01"), Priority::Low),
            task("tsk_early", Some("2024-01-01"), Priority::Low),
        ];
        let mut view: Vec<&Task> = all.iter().collect();
        sort(&mut view, TaskSort::DueDate, SortOrder::Asc);
        let ids: Vec<_> = view.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["tsk_early", "tsk_late", "tsk_none"]);
    }

    #[test]
    fn test_sort_is_stable() {
        let all = vec![
            task("tsk_a", None, Priority::High),
            task("tsk_b", None, Priority::Low),
            task("tsk_c", None, Priority::High),
        ];
        let mut view: Vec<&Task> = all.iter().collect();
        sort(&mut view, TaskSort::Priority, SortOrder::Desc);
        let ids: Vec<_> = view.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["tsk_a", "tsk_c", "tsk_b"]);
    }

    #[test]
    fn test_field_names_parse() {
        assert_eq!("due-date".parse::<ProjectSort>().unwrap(), ProjectSort::DueDate);
        assert_eq!("dueDate".parse::<TaskSort>().unwrap(), TaskSort::DueDate);
        assert_eq!("created_at".parse::<ClientSort>().unwrap(), ClientSort::Created);
        assert_eq!("DESC".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert!("color".parse::<BusinessSort>().is_err());
    }
}
