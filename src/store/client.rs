//! Client store extensions: relationship links.

use super::entity::EntityStore;
use crate::model::Client;

impl EntityStore<'_, Client> {
    pub fn link_business(&mut self, client_id: &str, business_id: &str) -> bool {
        self.modify(client_id, |c| {
            c.link_business(business_id);
        })
    }

    pub fn link_project(&mut self, client_id: &str, project_id: &str) -> bool {
        self.modify(client_id, |c| {
            c.link_project(project_id);
        })
    }

    pub fn unlink_project(&mut self, client_id: &str, project_id: &str) -> bool {
        self.modify(client_id, |c| {
            c.unlink_project(project_id);
        })
    }
}
