//! Client model.

use super::{Entity, EntityKind, non_empty};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Client relationship status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    #[default]
    Active,
    Inactive,
    Prospect,
}

impl ClientStatus {
    /// Get the string representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Prospect => "prospect",
        }
    }

    pub const ALL: [Self; 3] = [Self::Active, Self::Inactive, Self::Prospect];
}

impl fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A client. `business_ids` and `project_ids` hold plain identifiers
/// with set semantics; they are never checked against the other stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub business_ids: Vec<String>,
    #[serde(default)]
    pub project_ids: Vec<String>,
    #[serde(default)]
    pub status: ClientStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewClient {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub business_ids: Vec<String>,
    pub status: ClientStatus,
}

impl NewClient {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            ..Self::default()
        }
    }
}

impl From<&Client> for NewClient {
    fn from(c: &Client) -> Self {
        Self {
            name: c.name.clone(),
            email: c.email.clone(),
            phone: c.phone.clone(),
            company: c.company.clone(),
            address: c.address.clone(),
            notes: c.notes.clone(),
            business_ids: c.business_ids.clone(),
            status: c.status,
        }
    }
}

/// Partial update. An empty string clears an optional field;
/// `business_ids` replaces the whole set when present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub business_ids: Option<Vec<String>>,
    pub status: Option<ClientStatus>,
}

impl ClientPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Insert `id` unless already present. Returns whether the set changed.
pub(crate) fn insert_unique(ids: &mut Vec<String>, id: &str) -> bool {
    if ids.iter().any(|existing| existing == id) {
        false
    } else {
        ids.push(id.to_string());
        true
    }
}

fn dedup_ids(ids: Vec<String>) -> Vec<String> {
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        let id = id.trim();
        if !id.is_empty() {
            insert_unique(&mut out, id);
        }
    }
    out
}

impl Client {
    pub fn link_business(&mut self, business_id: &str) -> bool {
        insert_unique(&mut self.business_ids, business_id)
    }

    pub fn link_project(&mut self, project_id: &str) -> bool {
        insert_unique(&mut self.project_ids, project_id)
    }

    pub fn unlink_project(&mut self, project_id: &str) -> bool {
        let before = self.project_ids.len();
        self.project_ids.retain(|id| id != project_id);
        self.project_ids.len() != before
    }
}

impl Entity for Client {
    type Draft = NewClient;
    type Patch = ClientPatch;

    const KIND: EntityKind = EntityKind::Client;

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

    fn from_draft(id: String, draft: NewClient, now: i64) -> Self {
        Self {
            id,
            name: draft.name.trim().to_string(),
            email: draft.email.trim().to_string(),
            phone: non_empty(draft.phone),
            company: non_empty(draft.company),
            address: non_empty(draft.address),
            notes: non_empty(draft.notes),
            business_ids: dedup_ids(draft.business_ids),
            project_ids: Vec::new(),
            status: draft.status,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: ClientPatch, _now: i64) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(email) = patch.email {
            self.email = email.trim().to_string();
        }
        if patch.phone.is_some() {
            self.phone = non_empty(patch.phone);
        }
        if patch.company.is_some() {
            self.company = non_empty(patch.company);
        }
        if patch.address.is_some() {
            self.address = non_empty(patch.address);
        }
        if patch.notes.is_some() {
            self.notes = non_empty(patch.notes);
        }
        if let Some(ids) = patch.business_ids {
            self.business_ids = dedup_ids(ids);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }
}
