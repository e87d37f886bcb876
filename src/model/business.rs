//! Business model.
//!
//! A business owns projects by reference. Its project counters are not
//! derived from the project collection; they are moved explicitly by the
//! workspace whenever a project is created, deleted, completed or reopened.

use super::{Entity, EntityKind, non_empty};
use serde::{Deserialize, Serialize};

/// A business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Business {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
    /// Last update timestamp (Unix milliseconds)
    pub updated_at: i64,
    #[serde(default)]
    pub project_count: u32,
    #[serde(default)]
    pub active_projects: u32,
}

/// Data supplied when creating a business.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewBusiness {
    pub name: String,
    pub description: String,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl NewBusiness {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// The editable fields of an existing record, for validating a merged update.
impl From<&Business> for NewBusiness {
    fn from(b: &Business) -> Self {
        Self {
            name: b.name.clone(),
            description: b.description.clone(),
            industry: b.industry.clone(),
            website: b.website.clone(),
            email: b.email.clone(),
            phone: b.phone.clone(),
            address: b.address.clone(),
        }
    }
}

/// Partial update. An empty string clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusinessPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl BusinessPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Business {
    /// Register a new project under this business.
    pub fn increment_projects(&mut self, active: bool) {
        self.project_count += 1;
        if active {
            self.active_projects += 1;
        }
    }

    /// Forget a project. Counters saturate at zero and
    /// `active_projects` never exceeds `project_count`.
    pub fn decrement_projects(&mut self, was_active: bool) {
        self.project_count = self.project_count.saturating_sub(1);
        if was_active {
            self.active_projects = self.active_projects.saturating_sub(1);
        }
        self.active_projects = self.active_projects.min(self.project_count);
    }

    /// A project moved into or out of the completed state.
    pub fn shift_active(&mut self, became_active: bool) {
        if became_active {
            self.active_projects = (self.active_projects + 1).min(self.project_count);
        } else {
            self.active_projects = self.active_projects.saturating_sub(1);
        }
    }
}

impl Entity for Business {
    type Draft = NewBusiness;
    type Patch = BusinessPatch;

    const KIND: EntityKind = EntityKind::Business;

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

    fn from_draft(id: String, draft: NewBusiness, now: i64) -> Self {
        Self {
            id,
            name: draft.name.trim().to_string(),
            description: draft.description.trim().to_string(),
            industry: non_empty(draft.industry),
            website: non_empty(draft.website),
            email: non_empty(draft.email),
            phone: non_empty(draft.phone),
            address: non_empty(draft.address),
            created_at: now,
            updated_at: now,
            project_count: 0,
            active_projects: 0,
        }
    }

    fn apply(&mut self, patch: BusinessPatch, _now: i64) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = patch.description {
            self.description = description.trim().to_string();
        }
        if patch.industry.is_some() {
            self.industry = non_empty(patch.industry);
        }
        if patch.website.is_some() {
            self.website = non_empty(patch.website);
        }
        if patch.email.is_some() {
            self.email = non_empty(patch.email);
        }
        if patch.phone.is_some() {
            self.phone = non_empty(patch.phone);
        }
        if patch.address.is_some() {
            self.address = non_empty(patch.address);
        }
    }
}
