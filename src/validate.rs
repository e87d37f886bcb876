//! Input validation and normalization.
//!
//! Two concerns live here:
//! - Field validation: pure functions mapping a draft to a list of
//!   `(field, message)` errors. Advisory only; callers decide whether to
//!   block on them.
//! - Enum normalization: statuses and priorities typed by hand resolve via
//!   exact match → synonym lookup → error with suggestion.

use crate::error::Error;
use crate::model::{ClientStatus, NewBusiness, NewClient, NewProject, NewTask, Priority, ProjectStatus, TaskStatus};
use regex::Regex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::LazyLock;

// ── Limits ───────────────────────────────────────────────────

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 1000;
pub const MAX_NOTES_LEN: usize = 2000;
pub const MAX_ADDRESS_LEN: usize = 250;

// ── Shape patterns ───────────────────────────────────────────

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?[0-9\s\-().]{7,20}$").expect("phone pattern compiles")
});

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("url pattern compiles")
});

#[must_use]
pub fn is_valid_email(s: &str) -> bool {
    EMAIL_RE.is_match(s.trim())
}

#[must_use]
pub fn is_valid_phone(s: &str) -> bool {
    PHONE_RE.is_match(s.trim())
}

#[must_use]
pub fn is_valid_url(s: &str) -> bool {
    URL_RE.is_match(s.trim())
}

// ── Field errors ─────────────────────────────────────────────

/// One validation failure for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// A non-empty list of field errors, carried by `Error::Validation`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// `Ok` when `errors` is empty, otherwise `Error::Validation`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` wrapping every field error.
    pub fn check(errors: Vec<FieldError>) -> Result<(), Error> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(Self(errors)))
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }
}

impl From<Vec<FieldError>> for ValidationErrors {
    fn from(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    fn new() -> Self {
        Self { errors: Vec::new() }
    }

    fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    fn required(&mut self, field: &'static str, label: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.errors.push(FieldError::new(field, format!("{label} is required")));
        }
        self
    }

    fn max_len(&mut self, field: &'static str, label: &str, value: &str, max: usize) -> &mut Self {
        if value.trim().chars().count() > max {
            self.errors.push(FieldError::new(
                field,
                format!("{label} must be at most {max} characters"),
            ));
        }
        self
    }

    fn shape(
        &mut self,
        field: &'static str,
        label: &str,
        value: Option<&str>,
        valid: fn(&str) -> bool,
    ) -> &mut Self {
        if self.has(field) {
            return self;
        }
        if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
            if !valid(v) {
                self.errors.push(FieldError::new(field, format!("{label} is invalid")));
            }
        }
        self
    }

    fn finish(self) -> Vec<FieldError> {
        self.errors
    }
}

// ── Entity validators ────────────────────────────────────────

#[must_use]
pub fn validate_business(b: &NewBusiness) -> Vec<FieldError> {
    let mut c = Checker::new();
    c.required("name", "Name", &b.name)
        .max_len("name", "Name", &b.name, MAX_NAME_LEN)
        .max_len("description", "Description", &b.description, MAX_DESCRIPTION_LEN)
        .shape("email", "Email", b.email.as_deref(), is_valid_email)
        .shape("phone", "Phone number", b.phone.as_deref(), is_valid_phone)
        .shape("website", "Website URL", b.website.as_deref(), is_valid_url)
        .max_len("address", "Address", b.address.as_deref().unwrap_or(""), MAX_ADDRESS_LEN);
    c.finish()
}

#[must_use]
pub fn validate_client(client: &NewClient) -> Vec<FieldError> {
    let mut c = Checker::new();
    c.required("name", "Name", &client.name)
        .max_len("name", "Name", &client.name, MAX_NAME_LEN)
        .required("email", "Email", &client.email)
        .shape("email", "Email", Some(&client.email), is_valid_email)
        .shape("phone", "Phone number", client.phone.as_deref(), is_valid_phone)
        .max_len("address", "Address", client.address.as_deref().unwrap_or(""), MAX_ADDRESS_LEN)
        .max_len("notes", "Notes", client.notes.as_deref().unwrap_or(""), MAX_NOTES_LEN);
    c.finish()
}

/// Besides the field checks, the due date must be strictly after the
/// start date.
#[must_use]
pub fn validate_project(p: &NewProject) -> Vec<FieldError> {
    let mut c = Checker::new();
    c.required("name", "Name", &p.name)
        .max_len("name", "Name", &p.name, MAX_NAME_LEN)
        .max_len("description", "Description", &p.description, MAX_DESCRIPTION_LEN)
        .required("businessId", "Business", &p.business_id);
    let mut errors = c.finish();
    if p.due_date <= p.start_date {
        errors.push(FieldError::new("dueDate", "Due date must be after start date"));
    }
    errors
}

#[must_use]
pub fn validate_task(t: &NewTask) -> Vec<FieldError> {
    let mut c = Checker::new();
    c.required("title", "Title", &t.title)
        .max_len("title", "Title", &t.title, MAX_NAME_LEN)
        .max_len(
            "description",
            "Description",
            t.description.as_deref().unwrap_or(""),
            MAX_DESCRIPTION_LEN,
        );
    c.finish()
}

// ── Valid value sets (O(1) lookups) ──────────────────────────

pub static VALID_PROJECT_STATUSES: LazyLock<HashSet<&str>> = LazyLock::new(|| {
    ProjectStatus::ALL.iter().map(ProjectStatus::as_str).collect()
});

pub static VALID_TASK_STATUSES: LazyLock<HashSet<&str>> = LazyLock::new(|| {
    TaskStatus::ALL.iter().map(TaskStatus::as_str).collect()
});

pub static VALID_CLIENT_STATUSES: LazyLock<HashSet<&str>> = LazyLock::new(|| {
    ClientStatus::ALL.iter().map(ClientStatus::as_str).collect()
});

pub static VALID_PRIORITIES: LazyLock<HashSet<&str>> = LazyLock::new(|| {
    Priority::ALL.iter().map(Priority::as_str).collect()
});

// ── Synonym maps ─────────────────────────────────────────────

pub static PROJECT_STATUS_SYNONYMS: LazyLock<HashMap<&str, &str>> = LazyLock::new(|| {
    [
        ("plan", "planning"),
        ("planned", "planning"),
        ("new", "planning"),
        ("in_progress", "in-progress"),
        ("inprogress", "in-progress"),
        ("active", "in-progress"),
        ("wip", "in-progress"),
        ("started", "in-progress"),
        ("on_hold", "on-hold"),
        ("hold", "on-hold"),
        ("paused", "on-hold"),
        ("in-review", "on-hold"),
        ("review", "on-hold"),
        ("done", "completed"),
        ("complete", "completed"),
        ("finished", "completed"),
    ]
    .into_iter()
    .collect()
});

pub static TASK_STATUS_SYNONYMS: LazyLock<HashMap<&str, &str>> = LazyLock::new(|| {
    [
        ("open", "todo"),
        ("new", "todo"),
        ("pending", "todo"),
        ("to-do", "todo"),
        ("in_progress", "in-progress"),
        ("inprogress", "in-progress"),
        ("wip", "in-progress"),
        ("doing", "in-progress"),
        ("started", "in-progress"),
        ("in-review", "in-progress"),
        ("done", "completed"),
        ("complete", "completed"),
        ("finished", "completed"),
        ("closed", "completed"),
    ]
    .into_iter()
    .collect()
});

pub static CLIENT_STATUS_SYNONYMS: LazyLock<HashMap<&str, &str>> = LazyLock::new(|| {
    [
        ("current", "active"),
        ("lead", "prospect"),
        ("potential", "prospect"),
        ("former", "inactive"),
        ("archived", "inactive"),
        ("lost", "inactive"),
    ]
    .into_iter()
    .collect()
});

pub static PRIORITY_SYNONYMS: LazyLock<HashMap<&str, &str>> = LazyLock::new(|| {
    [
        ("urgent", "high"),
        ("critical", "high"),
        ("important", "high"),
        ("hi", "high"),
        ("normal", "medium"),
        ("default", "medium"),
        ("med", "medium"),
        ("minor", "low"),
        ("trivial", "low"),
        ("lo", "low"),
    ]
    .into_iter()
    .collect()
});

/// Resolve `input` against a valid set and synonym map.
fn normalize(
    input: &str,
    valid: &HashSet<&str>,
    synonyms: &HashMap<&str, &str>,
) -> Result<String, (String, Option<String>)> {
    let lower = input.trim().to_lowercase();

    // Tier 1: exact match
    if valid.contains(lower.as_str()) {
        return Ok(lower);
    }

    // Tier 2: synonym lookup
    if let Some(&canonical) = synonyms.get(lower.as_str()) {
        return Ok(canonical.to_string());
    }

    // Tier 3: find closest suggestion
    let suggestion = find_closest_match(&lower, valid, synonyms);
    Err((input.to_string(), suggestion))
}

/// Normalize a project status via exact match or synonym lookup.
pub fn normalize_project_status(input: &str) -> Result<ProjectStatus, (String, Option<String>)> {
    let canonical = normalize(input, &VALID_PROJECT_STATUSES, &PROJECT_STATUS_SYNONYMS)?;
    ProjectStatus::ALL
        .into_iter()
        .find(|s| s.as_str() == canonical)
        .ok_or((input.to_string(), None))
}

/// Normalize a task status via exact match or synonym lookup.
pub fn normalize_task_status(input: &str) -> Result<TaskStatus, (String, Option<String>)> {
    let canonical = normalize(input, &VALID_TASK_STATUSES, &TASK_STATUS_SYNONYMS)?;
    TaskStatus::ALL
        .into_iter()
        .find(|s| s.as_str() == canonical)
        .ok_or((input.to_string(), None))
}

/// Normalize a client status via exact match or synonym lookup.
pub fn normalize_client_status(input: &str) -> Result<ClientStatus, (String, Option<String>)> {
    let canonical = normalize(input, &VALID_CLIENT_STATUSES, &CLIENT_STATUS_SYNONYMS)?;
    ClientStatus::ALL
        .into_iter()
        .find(|s| s.as_str() == canonical)
        .ok_or((input.to_string(), None))
}

/// Normalize a priority from a name, synonym, or 1-3 digit.
pub fn normalize_priority(input: &str) -> Result<Priority, (String, Option<String>)> {
    match input.trim() {
        "1" => return Ok(Priority::Low),
        "2" => return Ok(Priority::Medium),
        "3" => return Ok(Priority::High),
        _ => {}
    }
    let canonical = normalize(input, &VALID_PRIORITIES, &PRIORITY_SYNONYMS)?;
    Priority::ALL
        .into_iter()
        .find(|p| p.as_str() == canonical)
        .ok_or((input.to_string(), None))
}

fn invalid(what: &str, (input, suggestion): (String, Option<String>)) -> Error {
    match suggestion {
        Some(s) => Error::InvalidArgument(format!("unknown {what} '{input}' (did you mean '{s}'?)")),
        None => Error::InvalidArgument(format!("unknown {what} '{input}'")),
    }
}

/// [`normalize_project_status`] with an `Error` on failure.
///
/// # Errors
///
/// Returns `Error::InvalidArgument` with a suggestion when one exists.
pub fn parse_project_status(input: &str) -> Result<ProjectStatus, Error> {
    normalize_project_status(input).map_err(|e| invalid("project status", e))
}

/// # Errors
///
/// Returns `Error::InvalidArgument` with a suggestion when one exists.
pub fn parse_task_status(input: &str) -> Result<TaskStatus, Error> {
    normalize_task_status(input).map_err(|e| invalid("task status", e))
}

/// # Errors
///
/// Returns `Error::InvalidArgument` with a suggestion when one exists.
pub fn parse_client_status(input: &str) -> Result<ClientStatus, Error> {
    normalize_client_status(input).map_err(|e| invalid("client status", e))
}

/// # Errors
///
/// Returns `Error::InvalidArgument` with a suggestion when one exists.
pub fn parse_priority(input: &str) -> Result<Priority, Error> {
    normalize_priority(input).map_err(|e| invalid("priority", e))
}

/// Find the closest matching value across valid set and synonyms.
///
/// Ties on distance go to the alphabetically first candidate.
fn find_closest_match(
    input: &str,
    valid: &HashSet<&str>,
    synonyms: &HashMap<&str, &str>,
) -> Option<String> {
    let best = valid
        .iter()
        .chain(synonyms.keys())
        .map(|&v| (levenshtein_distance(input, v), v))
        .filter(|(dist, _)| *dist <= 3)
        .min()?;

    // For synonyms, show what it maps to
    let shown = synonyms.get(best.1).copied().unwrap_or(best.1);
    Some(shown.to_string())
}

// ── Levenshtein distance ─────────────────────────────────────

/// Compute the Levenshtein edit distance between two strings.
#[must_use]
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let a_len = a.len();
    let b_len = b.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    // Single-row optimization
    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for i in 1..=a_len {
        curr[0] = i;
        for j in 1..=b_len {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1) // deletion
                .min(curr[j - 1] + 1) // insertion
                .min(prev[j - 1] + cost); // substitution
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// Find existing IDs similar to the searched ID.
///
/// Returns up to `max` suggestions with edit distance ≤ 3,
/// sorted by distance then alphabetically.
#[must_use]
pub fn find_similar_ids(searched: &str, existing: &[String], max: usize) -> Vec<String> {
    let mut candidates: Vec<(usize, &str)> = existing
        .iter()
        .map(|id| (levenshtein_distance(searched, id), id.as_str()))
        .filter(|(dist, _)| *dist <= 3)
        .collect();

    candidates.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));

    candidates
        .into_iter()
        .take(max)
        .map(|(_, id)| id.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn business(name: &str, email: &str) -> NewBusiness {
        NewBusiness {
            name: name.to_string(),
            email: Some(email.to_string()),
            ..NewBusiness::default()
        }
    }

    #[test]
    fn test_validate_business_reports_name_and_email() {
        let errors = validate_business(&business("", "not-an-email"));
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["name", "email"]);
    }

    #[test]
    fn test_validate_business_accepts_valid_input() {
        assert!(validate_business(&business("Acme", "a@b.com")).is_empty());
    }

    #[test]
    fn test_validate_business_shapes() {
        let mut b = NewBusiness::new("Acme");
        b.website = Some("acme.com".to_string());
        b.phone = Some("call me".to_string());
        let fields: Vec<_> = validate_business(&b).iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["phone", "website"]);

        b.website = Some("https://acme.com/about".to_string());
        b.phone = Some("+1 (555) 123-4567".to_string());
        assert!(validate_business(&b).is_empty());
    }

    #[test]
    fn test_validate_business_max_length() {
        let b = NewBusiness::new("x".repeat(MAX_NAME_LEN + 1));
        let errors = validate_business(&b);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("at most 100"));
    }

    #[test]
    fn test_whitespace_only_is_missing() {
        let errors = validate_business(&NewBusiness::new("   "));
        assert_eq!(errors[0].message, "Name is required");
    }

    #[test]
    fn test_validate_project_dates() {
        let bad = NewProject::new("Site", "biz_1", date("2024-02-01"), date("2024-01-01"));
        let fields: Vec<_> = validate_project(&bad).iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["dueDate"]);

        let good = NewProject::new("Site", "biz_1", date("2024-01-01"), date("2024-02-01"));
        assert!(validate_project(&good).is_empty());

        let same_day = NewProject::new("Site", "biz_1", date("2024-01-01"), date("2024-01-01"));
        assert_eq!(validate_project(&same_day).len(), 1);
    }

    #[test]
    fn test_validate_client_requires_email() {
        let errors = validate_client(&NewClient::new("Jane", ""));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "email");
        assert_eq!(errors[0].message, "Email is required");

        assert!(validate_client(&NewClient::new("Jane", "jane@example.com")).is_empty());
    }

    #[test]
    fn test_validate_task() {
        assert_eq!(validate_task(&NewTask::new(""))[0].field, "title");
        assert!(validate_task(&NewTask::new("Ship it")).is_empty());
    }

    #[test]
    fn test_validation_errors_check() {
        assert!(ValidationErrors::check(Vec::new()).is_ok());
        let err = ValidationErrors::check(vec![FieldError::new("name", "Name is required")])
            .unwrap_err();
        assert_eq!(err.to_string(), "Validation failed: name: Name is required");
    }

    #[test]
    fn test_normalize_statuses() {
        assert_eq!(normalize_project_status("planning"), Ok(ProjectStatus::Planning));
        assert_eq!(normalize_project_status("Done"), Ok(ProjectStatus::Completed));
        assert_eq!(normalize_project_status("paused"), Ok(ProjectStatus::OnHold));
        assert_eq!(normalize_task_status("wip"), Ok(TaskStatus::InProgress));
        assert_eq!(normalize_task_status("open"), Ok(TaskStatus::Todo));
        assert_eq!(normalize_client_status("lead"), Ok(ClientStatus::Prospect));
        assert!(normalize_task_status("nonsense").is_err());
    }

    #[test]
    fn test_normalize_priority() {
        assert_eq!(normalize_priority("HIGH"), Ok(Priority::High));
        assert_eq!(normalize_priority("urgent"), Ok(Priority::High));
        assert_eq!(normalize_priority("1"), Ok(Priority::Low));
        assert!(normalize_priority("9").is_err());
    }

    #[test]
    fn test_suggestion_for_typo() {
        let (input, suggestion) = normalize_project_status("planing").unwrap_err();
        assert_eq!(input, "planing");
        assert_eq!(suggestion.as_deref(), Some("planning"));

        let err = parse_priority("hihg").unwrap_err();
        assert!(err.to_string().contains("did you mean 'high'"));
    }

    #[test]
    fn test_suggestion_tie_is_stable() {
        // "doing" and "done" are both one edit away
        for _ in 0..20 {
            let (_, suggestion) = normalize_task_status("dong").unwrap_err();
            assert_eq!(suggestion.as_deref(), Some("in-progress"));
        }
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("abc", "abc"), 0);
        assert_eq!(levenshtein_distance("abc", "abd"), 1);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn test_find_similar_ids() {
        let ids = vec!["prj_a1b2".to_string(), "prj_a1b3".to_string(), "prj_xxxx".to_string()];
        let result = find_similar_ids("prj_a1b1", &ids, 3);
        assert_eq!(result, vec!["prj_a1b2", "prj_a1b3"]);
    }
}
