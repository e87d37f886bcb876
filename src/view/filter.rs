//! Record filters.
//!
//! A filter is a conjunction of optional predicates; an unset predicate
//! matches everything. Filtering keeps collection order.

use crate::error::{Error, Result};
use crate::model::{
    Business, Client, ClientStatus, Priority, Project, ProjectStatus, Task, TaskStatus,
};
use chrono::{Days, NaiveDate};
use std::str::FromStr;

/// Days ahead of today that count as "due soon".
pub const DUE_SOON_DAYS: u64 = 7;

pub trait Filter<T> {
    fn matches(&self, item: &T, today: NaiveDate) -> bool;
}

/// Records of `items` accepted by `filter`, in their original order.
pub fn apply<'a, T>(items: &'a [T], filter: &impl Filter<T>, today: NaiveDate) -> Vec<&'a T> {
    items.iter().filter(|item| filter.matches(item, today)).collect()
}

/// Case-insensitive substring match over any of `fields`.
fn text_matches<'a>(needle: Option<&str>, fields: impl IntoIterator<Item = &'a str>) -> bool {
    let Some(needle) = needle.map(str::trim).filter(|n| !n.is_empty()) else {
        return true;
    };
    let needle = needle.to_lowercase();
    fields
        .into_iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

fn eq_or_unset<T: PartialEq>(wanted: Option<&T>, actual: &T) -> bool {
    wanted.is_none_or(|w| w == actual)
}

// ── Date buckets ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectBucket {
    /// Starts after today.
    Upcoming,
    /// Started, not yet due, not completed.
    Current,
    /// Past due and not completed.
    Overdue,
    Completed,
}

impl ProjectBucket {
    pub const ALL: [Self; 4] = [Self::Upcoming, Self::Current, Self::Overdue, Self::Completed];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Current => "current",
            Self::Overdue => "overdue",
            Self::Completed => "completed",
        }
    }

    #[must_use]
    pub fn contains(&self, project: &Project, today: NaiveDate) -> bool {
        let completed = project.status == ProjectStatus::Completed;
        match self {
            Self::Upcoming => project.start_date > today,
            Self::Current => {
                !completed && project.start_date <= today && today <= project.due_date
            }
            Self::Overdue => !completed && project.due_date < today,
            Self::Completed => completed,
        }
    }
}

impl FromStr for ProjectBucket {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|b| b.as_str() == lower)
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "unknown project bucket '{s}' (expected upcoming, current, overdue or completed)"
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskBucket {
    Overdue,
    /// Due within the next [`DUE_SOON_DAYS`] days, today included.
    DueSoon,
}

impl TaskBucket {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Overdue => "overdue",
            Self::DueSoon => "due-soon",
        }
    }

    #[must_use]
    pub fn contains(&self, task: &Task, today: NaiveDate) -> bool {
        if task.is_completed() {
            return false;
        }
        let Some(due) = task.due_date else {
            return false;
        };
        match self {
            Self::Overdue => due < today,
            Self::DueSoon => {
                let horizon = today.checked_add_days(Days::new(DUE_SOON_DAYS)).unwrap_or(today);
                today <= due && due <= horizon
            }
        }
    }
}

impl FromStr for TaskBucket {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "overdue" => Ok(Self::Overdue),
            "due-soon" | "duesoon" | "soon" => Ok(Self::DueSoon),
            _ => Err(Error::InvalidArgument(format!(
                "unknown task bucket '{s}' (expected overdue or due-soon)"
            ))),
        }
    }
}

// ── Per-entity filters ───────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct BusinessFilter {
    /// Matches name, description or industry.
    pub search: Option<String>,
    pub industry: Option<String>,
}

impl Filter<Business> for BusinessFilter {
    fn matches(&self, b: &Business, _today: NaiveDate) -> bool {
        let industry_ok = self.industry.as_deref().is_none_or(|wanted| {
            b.industry
                .as_deref()
                .is_some_and(|i| i.eq_ignore_ascii_case(wanted.trim()))
        });
        industry_ok
            && text_matches(
                self.search.as_deref(),
                [
                    b.name.as_str(),
                    b.description.as_str(),
                    b.industry.as_deref().unwrap_or(""),
                ],
            )
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClientFilter {
    /// Matches name, email or company.
    pub search: Option<String>,
    pub status: Option<ClientStatus>,
    pub business_id: Option<String>,
}

impl Filter<Client> for ClientFilter {
    fn matches(&self, c: &Client, _today: NaiveDate) -> bool {
        eq_or_unset(self.status.as_ref(), &c.status)
            && self
                .business_id
                .as_ref()
                .is_none_or(|id| c.business_ids.contains(id))
            && text_matches(
                self.search.as_deref(),
                [
                    c.name.as_str(),
                    c.email.as_str(),
                    c.company.as_deref().unwrap_or(""),
                ],
            )
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    /// Matches name or description.
    pub search: Option<String>,
    pub status: Option<ProjectStatus>,
    pub priority: Option<Priority>,
    pub business_id: Option<String>,
    pub client_id: Option<String>,
    pub bucket: Option<ProjectBucket>,
}

impl Filter<Project> for ProjectFilter {
    fn matches(&self, p: &Project, today: NaiveDate) -> bool {
        eq_or_unset(self.status.as_ref(), &p.status)
            && eq_or_unset(self.priority.as_ref(), &p.priority)
            && eq_or_unset(self.business_id.as_ref(), &p.business_id)
            && self
                .client_id
                .as_ref()
                .is_none_or(|id| p.client_id.as_ref() == Some(id))
            && self.bucket.is_none_or(|b| b.contains(p, today))
            && text_matches(
                self.search.as_deref(),
                [p.name.as_str(), p.description.as_str()],
            )
    }
}

#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Matches title, description or any tag.
    pub search: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub project_id: Option<String>,
    pub tag: Option<String>,
    pub bucket: Option<TaskBucket>,
}

impl Filter<Task> for TaskFilter {
    fn matches(&self, t: &Task, today: NaiveDate) -> bool {
        eq_or_unset(self.status.as_ref(), &t.status)
            && eq_or_unset(self.priority.as_ref(), &t.priority)
            && self
                .project_id
                .as_ref()
                .is_none_or(|id| t.project_id.as_ref() == Some(id))
            && self
                .tag
                .as_deref()
                .is_none_or(|tag| t.tags.iter().any(|have| have.eq_ignore_ascii_case(tag)))
            && self.bucket.is_none_or(|b| b.contains(t, today))
            && text_matches(
                self.search.as_deref(),
                [t.title.as_str(), t.description.as_deref().unwrap_or("")]
                    .into_iter()
                    .chain(t.tags.iter().map(String::as_str)),
            )
    }
}
