use std::sync::Arc;

use redraft_types::{RecordId, Value};

use crate::draft::StoredDraft;
use crate::error::StoreResult;

/// Authoritative record storage.
///
/// Records are mappings identified by their `"id"` field. Implementations
/// must be thread-safe; each call is atomic on its own, nothing more.
pub trait RecordStore: Send + Sync {
    /// Fetch the current version of a record.
    ///
    /// Returns `Ok(None)` if the record does not exist (never created, or
    /// deleted).
    fn fetch(&self, id: RecordId) -> StoreResult<Option<Value>>;

    /// Store a record and return the stored version.
    ///
    /// A record without an id is inserted and receives a fresh one. A record
    /// with an id replaces the stored version; if no such record exists the
    /// call fails with [`StoreError::NotFound`](crate::StoreError::NotFound).
    fn save(&self, record: &Value) -> StoreResult<Value>;

    /// Delete a record. Returns `true` if it existed.
    fn delete(&self, record: &Value) -> StoreResult<bool>;
}

/// Named storage for in-progress drafts.
///
/// This is a plain blob store: it does not interpret the draft or apply any
/// expiry. See [`DraftKeeper`](crate::DraftKeeper) for the restore policy.
pub trait DraftStore: Send + Sync {
    /// Store a draft under `name`, replacing any previous one.
    fn put(&self, name: &str, draft: &StoredDraft) -> StoreResult<()>;

    /// Read the draft stored under `name`.
    fn get(&self, name: &str) -> StoreResult<Option<StoredDraft>>;

    /// Remove the draft stored under `name`. Returns `true` if it existed.
    fn remove(&self, name: &str) -> StoreResult<bool>;
}

impl<T: RecordStore + ?Sized> RecordStore for &T {
    fn fetch(&self, id: RecordId) -> StoreResult<Option<Value>> {
        (**self).fetch(id)
    }

    fn save(&self, record: &Value) -> StoreResult<Value> {
        (**self).save(record)
    }

    fn delete(&self, record: &Value) -> StoreResult<bool> {
        (**self).delete(record)
    }
}

impl<T: RecordStore + ?Sized> RecordStore for Arc<T> {
    fn fetch(&self, id: RecordId) -> StoreResult<Option<Value>> {
        (**self).fetch(id)
    }

    fn save(&self, record: &Value) -> StoreResult<Value> {
        (**self).save(record)
    }

    fn delete(&self, record: &Value) -> StoreResult<bool> {
        (**self).delete(record)
    }
}

impl<T: DraftStore + ?Sized> DraftStore for &T {
    fn put(&self, name: &str, draft: &StoredDraft) -> StoreResult<()> {
        (**self).put(name, draft)
    }

    fn get(&self, name: &str) -> StoreResult<Option<StoredDraft>> {
        (**self).get(name)
    }

    fn remove(&self, name: &str) -> StoreResult<bool> {
        (**self).remove(name)
    }
}

impl<T: DraftStore + ?Sized> DraftStore for Arc<T> {
    fn put(&self, name: &str, draft: &StoredDraft) -> StoreResult<()> {
        (**self).put(name, draft)
    }

    fn get(&self, name: &str) -> StoreResult<Option<StoredDraft>> {
        (**self).get(name)
    }

    fn remove(&self, name: &str) -> StoreResult<bool> {
        (**self).remove(name)
    }
}
