//! The application context.
//!
//! A [`Workspace`] is constructed once at start-up from a storage backend
//! and passed to whatever needs the stores. It owns the four collections,
//! the notes document and the notice log, and wires the bookkeeping between
//! entities: business project counters follow project mutations, project
//! task counters follow task mutations, and clients pick up links to the
//! projects assigned to them. Deletes never cascade.

use super::entity::{Collection, EntityStore};
use super::notice::{Notice, NoticeKind, Notices};
use crate::error::Result;
use crate::model::{
    Business, BusinessPatch, Client, ClientPatch, NewBusiness, NewClient, NewProject, NewTask,
    Notes, Project, ProjectPatch, Task, TaskPatch, TaskStatus, next_timestamp, now_millis,
};
use crate::storage::{KeyValueStore, MemoryKv, SqliteKv};
use std::path::Path;
use tracing::{debug, error, warn};

pub struct Workspace {
    kv: Box<dyn KeyValueStore>,
    businesses: Collection<Business>,
    clients: Collection<Client>,
    projects: Collection<Project>,
    tasks: Collection<Task>,
    notes: Notes,
    notices: Notices,
}

impl Workspace {
    /// Load every collection from `kv`.
    ///
    /// Corrupted collections are reset individually; the notices explain
    /// which ones.
    pub fn open(kv: impl KeyValueStore + 'static) -> Self {
        Self::from_boxed(Box::new(kv))
    }

    pub fn from_boxed(mut kv: Box<dyn KeyValueStore>) -> Self {
        let mut notices = Notices::new();
        let businesses = Collection::load(kv.as_mut(), &mut notices);
        let clients = Collection::load(kv.as_mut(), &mut notices);
        let projects = Collection::load(kv.as_mut(), &mut notices);
        let tasks = Collection::load(kv.as_mut(), &mut notices);
        let notes = load_notes(kv.as_mut(), &mut notices);

        Self {
            kv,
            businesses,
            clients,
            projects,
            tasks,
            notes,
            notices,
        }
    }

    /// Open a workspace backed by the SQLite database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open_sqlite(path: &Path) -> Result<Self> {
        Ok(Self::open(SqliteKv::open(path)?))
    }

    /// A throwaway workspace that persists nowhere durable.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::open(MemoryKv::new())
    }

    // ==================
    // Read access
    // ==================

    #[must_use]
    pub fn businesses(&self) -> &Collection<Business> {
        &self.businesses
    }

    #[must_use]
    pub fn clients(&self) -> &Collection<Client> {
        &self.clients
    }

    #[must_use]
    pub fn projects(&self) -> &Collection<Project> {
        &self.projects
    }

    #[must_use]
    pub fn tasks(&self) -> &Collection<Task> {
        &self.tasks
    }

    #[must_use]
    pub fn notes(&self) -> &Notes {
        &self.notes
    }

    #[must_use]
    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    /// Take the notices produced so far.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    // ==================
    // Raw stores
    // ==================

    pub fn businesses_mut(&mut self) -> EntityStore<'_, Business> {
        EntityStore::new(&mut self.businesses, self.kv.as_mut(), &mut self.notices)
    }

    pub fn clients_mut(&mut self) -> EntityStore<'_, Client> {
        EntityStore::new(&mut self.clients, self.kv.as_mut(), &mut self.notices)
    }

    pub fn projects_mut(&mut self) -> EntityStore<'_, Project> {
        EntityStore::new(&mut self.projects, self.kv.as_mut(), &mut self.notices)
    }

    pub fn tasks_mut(&mut self) -> EntityStore<'_, Task> {
        EntityStore::new(&mut self.tasks, self.kv.as_mut(), &mut self.notices)
    }

    // ==================
    // Business Operations
    // ==================

    pub fn create_business(&mut self, draft: NewBusiness) -> Business {
        self.businesses_mut().add(draft).clone()
    }

    pub fn update_business(&mut self, id: &str, patch: BusinessPatch) -> Option<Business> {
        self.businesses_mut().update(id, patch).cloned()
    }

    /// Projects and clients referring to the business keep their ids.
    pub fn delete_business(&mut self, id: &str) -> bool {
        self.businesses_mut().delete(id)
    }

    // ==================
    // Client Operations
    // ==================

    pub fn create_client(&mut self, draft: NewClient) -> Client {
        self.clients_mut().add(draft).clone()
    }

    pub fn update_client(&mut self, id: &str, patch: ClientPatch) -> Option<Client> {
        self.clients_mut().update(id, patch).cloned()
    }

    pub fn delete_client(&mut self, id: &str) -> bool {
        self.clients_mut().delete(id)
    }

    // ==================
    // Project Operations
    // ==================

    pub fn create_project(&mut self, draft: NewProject) -> Project {
        let project = self.projects_mut().add(draft).clone();

        if !self
            .businesses_mut()
            .increment_project_count(&project.business_id, project.status.is_active())
        {
            debug!(business_id = %project.business_id, "project created for unknown business");
        }

        if let Some(client_id) = &project.client_id {
            let mut clients = self.clients_mut();
            clients.link_project(client_id, &project.id);
            clients.link_business(client_id, &project.business_id);
        }

        project
    }

    pub fn update_project(&mut self, id: &str, patch: ProjectPatch) -> Option<Project> {
        let before = self.projects.get(id).cloned();
        let after = self.projects_mut().update(id, patch).cloned()?;
        if let Some(before) = before {
            self.reconcile_project(&before, &after);
        }
        Some(after)
    }

    /// Tasks of the project keep their `project_id`.
    pub fn delete_project(&mut self, id: &str) -> bool {
        let Some(before) = self.projects.get(id).cloned() else {
            return false;
        };
        self.projects_mut().delete(id);
        self.businesses_mut()
            .decrement_project_count(&before.business_id, before.status.is_active());
        true
    }

    fn reconcile_project(&mut self, before: &Project, after: &Project) {
        let was_active = before.status.is_active();
        let is_active = after.status.is_active();
        let business_changed = before.business_id != after.business_id;

        if business_changed {
            let mut businesses = self.businesses_mut();
            businesses.decrement_project_count(&before.business_id, was_active);
            businesses.increment_project_count(&after.business_id, is_active);
        } else if was_active != is_active {
            self.businesses_mut()
                .set_project_active(&after.business_id, is_active);
        }

        let client_changed = before.client_id != after.client_id;
        let mut clients = self.clients_mut();
        if client_changed {
            if let Some(old) = &before.client_id {
                clients.unlink_project(old, &after.id);
            }
            if let Some(new) = &after.client_id {
                clients.link_project(new, &after.id);
            }
        }
        if let Some(client_id) = after
            .client_id
            .as_ref()
            .filter(|_| client_changed || business_changed)
        {
            clients.link_business(client_id, &after.business_id);
        }
    }

    // ==================
    // Task Operations
    // ==================

    pub fn create_task(&mut self, draft: NewTask) -> Task {
        let task = self.tasks_mut().add(draft).clone();
        if let Some(project_id) = &task.project_id {
            if !self
                .projects_mut()
                .record_task_added(project_id, task.is_completed())
            {
                debug!(project_id = %project_id, "task created for unknown project");
            }
        }
        task
    }

    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> Option<Task> {
        let before = self.tasks.get(id).cloned();
        let after = self.tasks_mut().update(id, patch).cloned()?;
        if let Some(before) = before {
            self.reconcile_task(&before, &after);
        }
        Some(after)
    }

    pub fn complete_task(&mut self, id: &str) -> Option<Task> {
        self.update_task(id, TaskPatch::status(TaskStatus::Completed))
    }

    pub fn reopen_task(&mut self, id: &str) -> Option<Task> {
        self.update_task(id, TaskPatch::status(TaskStatus::Todo))
    }

    pub fn delete_task(&mut self, id: &str) -> bool {
        let Some(before) = self.tasks.get(id).cloned() else {
            return false;
        };
        self.tasks_mut().delete(id);
        if let Some(project_id) = &before.project_id {
            self.projects_mut()
                .record_task_removed(project_id, before.is_completed());
        }
        true
    }

    fn reconcile_task(&mut self, before: &Task, after: &Task) {
        let mut projects = self.projects_mut();
        if before.project_id != after.project_id {
            if let Some(old) = &before.project_id {
                projects.record_task_removed(old, before.is_completed());
            }
            if let Some(new) = &after.project_id {
                projects.record_task_added(new, after.is_completed());
            }
        } else if before.is_completed() != after.is_completed() {
            if let Some(project_id) = &after.project_id {
                projects.record_task_completion(project_id, after.is_completed());
            }
        }
    }

    // ==================
    // Notes
    // ==================

    pub fn set_notes(&mut self, content: impl Into<String>) {
        self.notes.content = content.into();
        self.save_notes("Notes saved");
    }

    pub fn append_notes(&mut self, text: &str) {
        self.notes.append(text);
        self.save_notes("Notes saved");
    }

    pub fn clear_notes(&mut self) {
        self.notes.content.clear();
        self.save_notes("Notes cleared");
    }

    fn save_notes(&mut self, message: &str) {
        self.notes.updated_at = next_timestamp(self.notes.updated_at, now_millis());
        let result = serde_json::to_string(&self.notes)
            .map_err(crate::error::Error::from)
            .and_then(|json| self.kv.set(Notes::STORAGE_KEY, &json));

        match result {
            Ok(()) => self.notices.success(NoticeKind::Updated, message),
            Err(e) => {
                error!(error = %e, "failed to persist notes");
                self.notices
                    .error(NoticeKind::SaveFailed, format!("Failed to save notes: {e}"));
            }
        }
    }
}

fn load_notes(kv: &mut dyn KeyValueStore, notices: &mut Notices) -> Notes {
    let raw = match kv.get(Notes::STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Notes::default(),
        Err(e) => {
            warn!(error = %e, "failed to read notes");
            notices.warning(
                NoticeKind::DataReset,
                "Could not read saved notes; starting empty (data reset)",
            );
            return Notes::default();
        }
    };

    serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!(error = %e, "discarding corrupted notes");
        if let Err(e) = kv.remove(Notes::STORAGE_KEY) {
            warn!(error = %e, "failed to clear corrupted notes");
        }
        notices.warning(
            NoticeKind::DataReset,
            "Saved notes were corrupted and have been reset",
        );
        Notes::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Entity, ProjectStatus};
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn seeded() -> (Workspace, Business) {
        let mut ws = Workspace::in_memory();
        let business = ws.create_business(NewBusiness::new("Acme"));
        (ws, business)
    }

    fn new_project(ws: &mut Workspace, business_id: &str) -> Project {
        ws.create_project(NewProject::new(
            "Website",
            business_id,
            date("2024-01-01"),
            date("2024-03-01"),
        ))
    }

    fn counters(ws: &Workspace, id: &str) -> (u32, u32) {
        let b = ws.businesses().get(id).unwrap();
        (b.project_count, b.active_projects)
    }

    #[test]
    fn test_project_lifecycle_moves_business_counters() {
        let (mut ws, biz) = seeded();
        let p1 = new_project(&mut ws, &biz.id);
        let p2 = new_project(&mut ws, &biz.id);
        assert_eq!(counters(&ws, &biz.id), (2, 2));

        ws.update_project(
            &p1.id,
            ProjectPatch {
                status: Some(ProjectStatus::Completed),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(counters(&ws, &biz.id), (2, 1));

        ws.update_project(
            &p1.id,
            ProjectPatch {
                status: Some(ProjectStatus::InProgress),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(counters(&ws, &biz.id), (2, 2));

        assert!(ws.delete_project(&p2.id));
        assert_eq!(counters(&ws, &biz.id), (1, 1));
        assert!(!ws.delete_project(&p2.id));
        assert_eq!(counters(&ws, &biz.id), (1, 1));
    }

    #[test]
    fn test_moving_project_between_businesses() {
        let (mut ws, a) = seeded();
        let b = ws.create_business(NewBusiness::new("Globex"));
        let p = new_project(&mut ws, &a.id);

        ws.update_project(
            &p.id,
            ProjectPatch {
                business_id: Some(b.id.clone()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(counters(&ws, &a.id), (0, 0));
        assert_eq!(counters(&ws, &b.id), (1, 1));
    }

    #[test]
    fn test_deleting_business_does_not_cascade() {
        let (mut ws, biz) = seeded();
        let p = new_project(&mut ws, &biz.id);
        assert!(ws.delete_business(&biz.id));
        let orphan = ws.projects().get(&p.id).unwrap();
        assert_eq!(orphan.business_id, biz.id);
        assert!(ws.businesses().get(&orphan.business_id).is_none());
    }

    #[test]
    fn test_task_mutations_drive_project_progress() {
        let (mut ws, biz) = seeded();
        let p = new_project(&mut ws, &biz.id);

        let mut draft = NewTask::new("Design");
        draft.project_id = Some(p.id.clone());
        let t1 = ws.create_task(draft.clone());
        draft.title = "Build".to_string();
        let t2 = ws.create_task(draft);

        ws.complete_task(&t1.id).unwrap();
        let project = ws.projects().get(&p.id).unwrap();
        assert_eq!((project.task_count, project.completed_tasks, project.progress), (2, 1, 50));

        ws.complete_task(&t2.id).unwrap();
        assert_eq!(ws.projects().get(&p.id).unwrap().progress, 100);

        ws.reopen_task(&t2.id).unwrap();
        assert_eq!(ws.projects().get(&p.id).unwrap().progress, 50);

        assert!(ws.delete_task(&t1.id));
        let project = ws.projects().get(&p.id).unwrap();
        assert_eq!((project.task_count, project.completed_tasks, project.progress), (1, 0, 0));
    }

    #[test]
    fn test_deleting_project_keeps_tasks() {
        let (mut ws, biz) = seeded();
        let p = new_project(&mut ws, &biz.id);
        let mut draft = NewTask::new("Orphan me");
        draft.project_id = Some(p.id.clone());
        let t = ws.create_task(draft);

        ws.delete_project(&p.id);
        assert_eq!(ws.tasks().get(&t.id).unwrap().project_id.as_deref(), Some(p.id.as_str()));
    }

    #[test]
    fn test_task_can_jump_from_todo_to_completed_and_back() {
        let mut ws = Workspace::in_memory();
        let t = ws.create_task(NewTask::new("Free-floating"));
        let done = ws.complete_task(&t.id).unwrap();
        assert_eq!(done.status, TaskStatus::Completed);
        assert!(done.completed_at.is_some());
        let back = ws.reopen_task(&t.id).unwrap();
        assert_eq!(back.status, TaskStatus::Todo);
        assert!(back.completed_at.is_none());
    }

    #[test]
    fn test_project_with_client_links_client() {
        let (mut ws, biz) = seeded();
        let client = ws.create_client(NewClient::new("Jane", "jane@example.com"));
        let mut draft = NewProject::new("Rebrand", &biz.id, date("2024-01-01"), date("2024-02-01"));
        draft.client_id = Some(client.id.clone());
        let p = ws.create_project(draft);

        let linked = ws.clients().get(&client.id).unwrap();
        assert_eq!(linked.project_ids, vec![p.id.clone()]);
        assert_eq!(linked.business_ids, vec![biz.id.clone()]);

        ws.update_project(
            &p.id,
            ProjectPatch {
                client_id: Some(String::new()),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(ws.clients().get(&client.id).unwrap().project_ids.is_empty());
    }

    #[test]
    fn test_moving_project_links_client_to_new_business() {
        let (mut ws, a) = seeded();
        let b = ws.create_business(NewBusiness::new("Globex"));
        let client = ws.create_client(NewClient::new("Jane", "jane@example.com"));
        let mut draft = NewProject::new("Rebrand", &a.id, date("2024-01-01"), date("2024-02-01"));
        draft.client_id = Some(client.id.clone());
        let p = ws.create_project(draft);

        ws.update_project(
            &p.id,
            ProjectPatch {
                business_id: Some(b.id.clone()),
                ..Default::default()
            },
        )
        .unwrap();

        let linked = ws.clients().get(&client.id).unwrap();
        assert_eq!(linked.project_ids, vec![p.id.clone()]);
        assert_eq!(linked.business_ids, vec![a.id.clone(), b.id.clone()]);
    }

    #[test]
    fn test_reload_restores_everything() {
        let kv = SqliteKv::open_memory().unwrap();
        let mut ws = Workspace::open(kv);
        let biz = ws.create_business(NewBusiness::new("Acme"));
        new_project(&mut ws, &biz.id);
        ws.create_task(NewTask::new("Call back"));
        ws.set_notes("remember the milk");

        // Reopen over the same backend
        let Workspace { kv, .. } = ws;
        let reopened = Workspace::from_boxed(kv);
        assert_eq!(reopened.businesses().len(), 1);
        assert_eq!(reopened.projects().len(), 1);
        assert_eq!(reopened.tasks().len(), 1);
        assert_eq!(reopened.notes().content, "remember the milk");
        assert_eq!(reopened.businesses().all()[0].project_count, 1);
        assert!(reopened.notices().is_empty());
    }

    #[test]
    fn test_corrupted_collection_only_resets_that_collection() {
        let business = Business::from_draft(
            "biz_test00000000".to_string(),
            NewBusiness::new("Seed"),
            1,
        );
        let kv = MemoryKv::with_entries([
            (
                "macrum.businesses",
                serde_json::to_string(&vec![business]).unwrap(),
            ),
            ("macrum.tasks", "][".to_string()),
        ]);
        let mut ws = Workspace::open(kv);
        assert_eq!(ws.businesses().len(), 1);
        assert!(ws.tasks().is_empty());
        let notices = ws.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].kind, NoticeKind::DataReset);

        ws.create_task(NewTask::new("Works again"));
        assert_eq!(ws.tasks().len(), 1);
    }

    #[test]
    fn test_notes_append_and_clear() {
        let mut ws = Workspace::in_memory();
        ws.append_notes("one");
        ws.append_notes("two");
        assert_eq!(ws.notes().content, "one\ntwo");
        let first = ws.notes().updated_at;
        ws.clear_notes();
        assert!(ws.notes().is_empty());
        assert!(ws.notes().updated_at > first);
    }
}
