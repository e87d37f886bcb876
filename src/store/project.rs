//! Project store extensions: task counters and derived progress.

use super::entity::EntityStore;
use crate::model::Project;

impl EntityStore<'_, Project> {
    pub fn record_task_added(&mut self, project_id: &str, completed: bool) -> bool {
        self.modify(project_id, |p| p.record_task_added(completed))
    }

    pub fn record_task_removed(&mut self, project_id: &str, completed: bool) -> bool {
        self.modify(project_id, |p| p.record_task_removed(completed))
    }

    /// A task of `project_id` was completed (`true`) or reopened (`false`).
    pub fn record_task_completion(&mut self, project_id: &str, completed: bool) -> bool {
        self.modify(project_id, |p| p.record_task_completion(completed))
    }
}
