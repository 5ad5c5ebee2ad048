//! In-memory stores for tests and embedding.
//!
//! Both stores keep their data in a `BTreeMap` behind a `RwLock`. Values are
//! cloned on read and write, so callers never share state with the store.
//! Data is lost when the store is dropped.

use std::collections::BTreeMap;
use std::sync::RwLock;

use redraft_types::{RecordId, Value};
use tracing::debug;

use crate::draft::StoredDraft;
use crate::error::{StoreError, StoreResult};
use crate::traits::{DraftStore, RecordStore};

#[derive(Debug)]
struct Records {
    rows: BTreeMap<RecordId, Value>,
    next_id: u64,
}

/// In-memory implementation of [`RecordStore`].
///
/// Ids are assigned sequentially from 1.
#[derive(Debug)]
pub struct InMemoryRecordStore {
    records: RwLock<Records>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Records {
                rows: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Number of records currently stored.
    pub fn len(&self) -> StoreResult<usize> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        Ok(records.rows.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn fetch(&self, id: RecordId) -> StoreResult<Option<Value>> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        Ok(records.rows.get(&id).cloned())
    }

    fn save(&self, record: &Value) -> StoreResult<Value> {
        if !record.is_mapping() {
            return Err(StoreError::NotARecord(record.kind()));
        }
        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;

        let (id, stored) = match RecordId::of(record) {
            Some(id) => {
                if !records.rows.contains_key(&id) {
                    return Err(StoreError::NotFound(id));
                }
                (id, record.clone())
            }
            None => {
                let id = RecordId(records.next_id);
                records.next_id += 1;
                (id, id.stamp(record)?)
            }
        };

        debug!(%id, "record saved");
        records.rows.insert(id, stored.clone());
        Ok(stored)
    }

    fn delete(&self, record: &Value) -> StoreResult<bool> {
        let Some(id) = RecordId::of(record) else {
            return Ok(false);
        };
        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;
        let existed = records.rows.remove(&id).is_some();
        debug!(%id, existed, "record deleted");
        Ok(existed)
    }
}

/// In-memory implementation of [`DraftStore`].
#[derive(Debug, Default)]
pub struct InMemoryDraftStore {
    drafts: RwLock<BTreeMap<String, StoredDraft>>,
}

impl InMemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DraftStore for InMemoryDraftStore {
    fn put(&self, name: &str, draft: &StoredDraft) -> StoreResult<()> {
        let mut drafts = self.drafts.write().map_err(|_| StoreError::Poisoned)?;
        drafts.insert(name.to_owned(), draft.clone());
        Ok(())
    }

    fn get(&self, name: &str) -> StoreResult<Option<StoredDraft>> {
        let drafts = self.drafts.read().map_err(|_| StoreError::Poisoned)?;
        Ok(drafts.get(name).cloned())
    }

    fn remove(&self, name: &str) -> StoreResult<bool> {
        let mut drafts = self.drafts.write().map_err(|_| StoreError::Poisoned)?;
        Ok(drafts.remove(name).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn record(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    // -----------------------------------------------------------------------
    // Records
    // -----------------------------------------------------------------------

    #[test]
    fn insert_assigns_sequential_ids() {
        let store = InMemoryRecordStore::new();
        let a = store.save(&record(json!({"title": "a"}))).unwrap();
        let b = store.save(&record(json!({"title": "b"}))).unwrap();
        assert_eq!(RecordId::of(&a), Some(RecordId(1)));
        assert_eq!(RecordId::of(&b), Some(RecordId(2)));
        assert_eq!(store.len().unwrap(), 2);
    }

    #[test]
    fn fetch_returns_stored_version() {
        let store = InMemoryRecordStore::new();
        let saved = store.save(&record(json!({"title": "a"}))).unwrap();
        assert_eq!(store.fetch(RecordId(1)).unwrap(), Some(saved));
        assert_eq!(store.fetch(RecordId(9)).unwrap(), None);
    }

    #[test]
    fn update_replaces_record() {
        let store = InMemoryRecordStore::new();
        store.save(&record(json!({"title": "a"}))).unwrap();
        let updated = store.save(&record(json!({"id": 1, "title": "b"}))).unwrap();
        assert_eq!(updated, record(json!({"id": 1, "title": "b"})));
        assert_eq!(store.fetch(RecordId(1)).unwrap(), Some(updated));
    }

    #[test]
    fn update_of_missing_record_fails() {
        let store = InMemoryRecordStore::new();
        let err = store.save(&record(json!({"id": 5, "title": "x"}))).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(RecordId(5))));
    }

    #[test]
    fn non_mapping_is_rejected() {
        let store = InMemoryRecordStore::new();
        let err = store.save(&Value::from("text")).unwrap_err();
        assert!(matches!(err, StoreError::NotARecord(_)));
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn delete_removes_record() {
        let store = InMemoryRecordStore::new();
        let saved = store.save(&record(json!({"title": "a"}))).unwrap();
        assert!(store.delete(&saved).unwrap());
        assert!(!store.delete(&saved).unwrap());
        assert!(!store.delete(&record(json!({"title": "unsaved"}))).unwrap());
        assert_eq!(store.fetch(RecordId(1)).unwrap(), None);
    }

    // -----------------------------------------------------------------------
    // Drafts
    // -----------------------------------------------------------------------

    #[test]
    fn draft_put_get_remove() {
        let store = InMemoryDraftStore::new();
        let draft = StoredDraft::new(record(json!({"title": "wip"})), Utc::now());

        assert_eq!(store.get("todo-1").unwrap(), None);
        store.put("todo-1", &draft).unwrap();
        assert_eq!(store.get("todo-1").unwrap(), Some(draft));
        assert!(store.remove("todo-1").unwrap());
        assert!(!store.remove("todo-1").unwrap());
    }
}
