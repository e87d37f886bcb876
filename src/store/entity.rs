//! Generic entity store.
//!
//! A [`Collection`] owns the ordered records of one entity type. An
//! [`EntityStore`] is a short-lived mutable view over a collection, the
//! storage backend and the notice log; every mutation through it writes
//! the whole collection back under the entity's storage key.

use super::notice::{NoticeKind, Notices};
use crate::error::{Error, Result};
use crate::model::{Entity, generate_id, now_millis};
use crate::storage::KeyValueStore;
use crate::validate::find_similar_ids;
use tracing::{debug, error, warn};

/// The in-memory records of one entity type, in insertion order.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    records: Vec<T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<T: Entity> Collection<T> {
    #[must_use]
    pub fn from_records(records: Vec<T>) -> Self {
        Self { records }
    }

    /// Restore the collection from `kv`.
    ///
    /// A missing key yields an empty collection. Unreadable or unparsable
    /// content is discarded wholesale: the key is cleared, a data-reset
    /// warning is recorded, and the collection starts empty.
    pub fn load(kv: &mut dyn KeyValueStore, notices: &mut Notices) -> Self {
        let key = T::KIND.storage_key();
        let raw = match kv.get(key) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "failed to read collection");
                notices.warning(
                    NoticeKind::DataReset,
                    format!(
                        "Could not read saved {} data; starting empty (data reset)",
                        T::KIND.noun()
                    ),
                );
                return Self::default();
            }
        };

        let Some(raw) = raw else {
            debug!(key, "no stored collection");
            return Self::default();
        };

        match serde_json::from_str::<Vec<T>>(&raw) {
            Ok(records) => {
                debug!(key, count = records.len(), "loaded collection");
                Self { records }
            }
            Err(e) => {
                warn!(key, error = %e, "discarding corrupted collection");
                if let Err(e) = kv.remove(key) {
                    warn!(key, error = %e, "failed to clear corrupted collection");
                }
                notices.warning(
                    NoticeKind::DataReset,
                    format!(
                        "Saved {} data was corrupted and has been reset",
                        T::KIND.noun()
                    ),
                );
                Self::default()
            }
        }
    }

    /// Linear scan by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Like [`Collection::get`], but a miss becomes a not-found error
    /// carrying similar ids as suggestions.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if no record has this id.
    pub fn require(&self, id: &str) -> Result<&T> {
        self.get(id).ok_or_else(|| Error::NotFound {
            kind: T::KIND,
            id: id.to_string(),
            similar: find_similar_ids(id, &self.ids(), 3),
        })
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    #[must_use]
    pub fn all(&self) -> &[T] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.records.iter()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.records.iter().map(|r| r.id().to_string()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = generate_id(T::KIND);
            if !self.contains(&id) {
                return id;
            }
        }
    }
}

/// Mutable view used for create/update/delete on one collection.
pub struct EntityStore<'a, T> {
    collection: &'a mut Collection<T>,
    kv: &'a mut dyn KeyValueStore,
    notices: &'a mut Notices,
}

impl<'a, T: Entity> EntityStore<'a, T> {
    pub fn new(
        collection: &'a mut Collection<T>,
        kv: &'a mut dyn KeyValueStore,
        notices: &'a mut Notices,
    ) -> Self {
        Self {
            collection,
            kv,
            notices,
        }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&T> {
        self.collection.get(id)
    }

    #[must_use]
    pub fn list(&self) -> &[T] {
        self.collection.all()
    }

    /// Create a record from `draft` with a fresh id, append and persist.
    pub fn add(&mut self, draft: T::Draft) -> &T {
        let id = self.collection.fresh_id();
        let record = T::from_draft(id, draft, now_millis());
        let message = format!("{} \"{}\" created", T::KIND.label(), record.label());
        self.collection.records.push(record);
        self.persist();
        self.notices.success(NoticeKind::Created, message);

        let last = self.collection.records.len() - 1;
        &self.collection.records[last]
    }

    /// Merge `patch` into the record with `id`, refresh `updated_at`
    /// and persist. Returns `None` when no such record exists.
    pub fn update(&mut self, id: &str, patch: T::Patch) -> Option<&T> {
        let Some(idx) = self.collection.position(id) else {
            self.notices.error(
                NoticeKind::NotFound,
                format!("{} {id} not found", T::KIND.label()),
            );
            return None;
        };

        let now = now_millis();
        let record = &mut self.collection.records[idx];
        record.apply(patch, now);
        record.touch(now);
        let message = format!("{} \"{}\" updated", T::KIND.label(), record.label());

        self.persist();
        self.notices.success(NoticeKind::Updated, message);
        Some(&self.collection.records[idx])
    }

    /// Remove the record with `id`. Returns `false` and changes nothing
    /// if it does not exist. Dependent records are left alone.
    pub fn delete(&mut self, id: &str) -> bool {
        let Some(idx) = self.collection.position(id) else {
            return false;
        };

        let removed = self.collection.records.remove(idx);
        self.persist();
        self.notices.success(
            NoticeKind::Deleted,
            format!("{} \"{}\" deleted", T::KIND.label(), removed.label()),
        );
        true
    }

    /// Apply `f` to the record with `id` without a user-facing notice.
    /// Used for bookkeeping fields such as counters.
    pub(crate) fn modify<F>(&mut self, id: &str, f: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        let Some(idx) = self.collection.position(id) else {
            debug!(kind = %T::KIND, id, "bookkeeping target missing");
            return false;
        };

        let record = &mut self.collection.records[idx];
        f(record);
        record.touch(now_millis());
        self.persist();
        true
    }

    /// Write the whole collection to its storage key.
    ///
    /// Failures are logged and recorded as a notice; the in-memory
    /// state is kept.
    pub fn persist(&mut self) {
        let key = T::KIND.storage_key();
        let result = serde_json::to_string(&self.collection.records)
            .map_err(Error::from)
            .and_then(|json| self.kv.set(key, &json));

        match result {
            Ok(()) => debug!(key, count = self.collection.records.len(), "persisted collection"),
            Err(e) => {
                error!(key, error = %e, "failed to persist collection");
                self.notices.error(
                    NoticeKind::SaveFailed,
                    format!("Failed to save {} data: {e}", T::KIND.noun()),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Business, BusinessPatch, NewBusiness};
    use crate::storage::{MemoryKv, SqliteKv};
    use crate::store::notice::NoticeLevel;
    use std::collections::HashSet;

    struct Fixture {
        collection: Collection<Business>,
        kv: MemoryKv,
        notices: Notices,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                collection: Collection::default(),
                kv: MemoryKv::new(),
                notices: Notices::new(),
            }
        }

        fn store(&mut self) -> EntityStore<'_, Business> {
            EntityStore::new(&mut self.collection, &mut self.kv, &mut self.notices)
        }
    }

    #[test]
    fn test_add_generates_unique_ids_and_equal_timestamps() {
        let mut fx = Fixture::new();
        let mut ids = HashSet::new();
        for i in 0..50 {
            let b = fx.store().add(NewBusiness::new(format!("Biz {i}"))).clone();
            assert_eq!(b.created_at, b.updated_at);
            assert!(ids.insert(b.id));
        }
        assert_eq!(fx.collection.len(), 50);
        assert!(fx.notices.iter().all(|n| n.level == NoticeLevel::Success));
    }

    #[test]
    fn test_update_merges_only_listed_fields() {
        let mut fx = Fixture::new();
        let mut draft = NewBusiness::new("Acme");
        draft.description = "Widgets".to_string();
        draft.email = Some("hello@acme.test".to_string());
        let before = fx.store().add(draft).clone();

        let after = fx
            .store()
            .update(
                &before.id,
                BusinessPatch {
                    name: Some("Acme Corp".to_string()),
                    ..Default::default()
                },
            )
            .cloned()
            .unwrap();

        assert_eq!(after.name, "Acme Corp");
        assert_eq!(after.description, before.description);
        assert_eq!(after.email, before.email);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at > before.updated_at);
    }

    #[test]
    fn test_update_missing_returns_none() {
        let mut fx = Fixture::new();
        assert!(fx.store().update("biz_nope", BusinessPatch::default()).is_none());
        assert!(fx.notices.contains(NoticeKind::NotFound));
    }

    #[test]
    fn test_delete_semantics() {
        let mut fx = Fixture::new();
        let a = fx.store().add(NewBusiness::new("A")).id.clone();
        fx.store().add(NewBusiness::new("B"));
        let snapshot = fx.collection.all().to_vec();

        assert!(!fx.store().delete("biz_missing"));
        assert_eq!(fx.collection.all(), snapshot.as_slice());

        assert!(fx.store().delete(&a));
        assert_eq!(fx.collection.len(), 1);
        assert!(fx.collection.get(&a).is_none());
        assert!(!fx.store().delete(&a));
    }

    #[test]
    fn test_persist_and_reload_roundtrip() {
        let mut kv = SqliteKv::open_memory().unwrap();
        let mut notices = Notices::new();
        let mut collection = Collection::<Business>::default();
        {
            let mut store = EntityStore::new(&mut collection, &mut kv, &mut notices);
            let mut draft = NewBusiness::new("Acme");
            draft.website = Some("https://acme.test".to_string());
            store.add(draft);
            store.add(NewBusiness::new("Globex"));
        }

        let reloaded = Collection::<Business>::load(&mut kv, &mut notices);
        assert_eq!(reloaded.all(), collection.all());
        assert!(!notices.contains(NoticeKind::DataReset));
    }

    #[test]
    fn test_corrupted_storage_resets_collection() {
        let mut kv = MemoryKv::with_entries([("macrum.businesses", "{not json")]);
        let mut notices = Notices::new();

        let mut collection = Collection::<Business>::load(&mut kv, &mut notices);
        assert!(collection.is_empty());
        assert!(notices.contains(NoticeKind::DataReset));
        assert_eq!(kv.get("macrum.businesses").unwrap(), None);

        // Still usable afterwards
        let mut store = EntityStore::new(&mut collection, &mut kv, &mut notices);
        store.add(NewBusiness::new("Fresh"));
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_old_shape_payload_is_treated_as_corrupt() {
        let mut kv = MemoryKv::with_entries([("macrum.businesses", "[{\"title\": \"x\"}]")]);
        let mut notices = Notices::new();
        let collection = Collection::<Business>::load(&mut kv, &mut notices);
        assert!(collection.is_empty());
        assert!(notices.contains(NoticeKind::DataReset));
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let mut fx = Fixture::new();
        fx.kv.set_fail_writes(true);
        fx.store().add(NewBusiness::new("Offline"));

        assert_eq!(fx.collection.len(), 1);
        assert!(fx.notices.contains(NoticeKind::SaveFailed));
        assert_eq!(fx.kv.get("macrum.businesses").unwrap(), None);
    }

    #[test]
    fn test_require_suggests_similar_ids() {
        let collection = Collection::from_records(vec![Business::from_draft(
            "biz_abc123".to_string(),
            NewBusiness::new("Acme"),
            1,
        )]);
        let err = collection.require("biz_abc124").unwrap_err();
        match err {
            Error::NotFound { similar, .. } => assert_eq!(similar, vec!["biz_abc123"]),
            other => panic!("unexpected error: {other}"),
        }
    }
}
