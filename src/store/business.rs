//! Business store extensions: explicit project counters.

use super::entity::EntityStore;
use crate::model::Business;

impl EntityStore<'_, Business> {
    /// Count a new project against `business_id`.
    pub fn increment_project_count(&mut self, business_id: &str, active: bool) -> bool {
        self.modify(business_id, |b| b.increment_projects(active))
    }

    /// Remove a project from `business_id`'s counters.
    pub fn decrement_project_count(&mut self, business_id: &str, was_active: bool) -> bool {
        self.modify(business_id, |b| b.decrement_projects(was_active))
    }

    /// A project of `business_id` was completed (`false`) or reopened (`true`).
    pub fn set_project_active(&mut self, business_id: &str, became_active: bool) -> bool {
        self.modify(business_id, |b| b.shift_active(became_active))
    }
}
