use std::time::Duration;

use chrono::{DateTime, Utc};
use redraft_types::{RecordId, Value};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StoreResult;
use crate::traits::DraftStore;

/// A preserved draft together with the time it was written.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredDraft {
    pub object: Value,
    #[serde(rename = "date")]
    pub saved_at: DateTime<Utc>,
}

impl StoredDraft {
    pub fn new(object: Value, saved_at: DateTime<Utc>) -> Self {
        Self { object, saved_at }
    }

    /// Age of the draft at `now`. A draft from the future has age zero.
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.saved_at)
            .to_std()
            .unwrap_or_default()
    }
}

/// Restore policy for preserved drafts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DraftConfig {
    /// Drafts this old or older are ignored on restore.
    pub max_age: Duration,
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self {
            max_age: Duration::from_secs(60 * 60),
        }
    }
}

/// Preserves and restores drafts through a [`DraftStore`].
#[derive(Debug)]
pub struct DraftKeeper<S> {
    store: S,
    config: DraftConfig,
}

impl<S: DraftStore> DraftKeeper<S> {
    pub fn new(store: S, config: DraftConfig) -> Self {
        Self { store, config }
    }

    pub fn with_defaults(store: S) -> Self {
        Self::new(store, DraftConfig::default())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &DraftConfig {
        &self.config
    }

    /// Preserve `draft` under `name`, or remove the stored draft when `None`.
    pub fn preserve(&self, name: &str, draft: Option<&Value>) -> StoreResult<()> {
        self.preserve_at(name, draft, Utc::now())
    }

    pub fn preserve_at(
        &self,
        name: &str,
        draft: Option<&Value>,
        now: DateTime<Utc>,
    ) -> StoreResult<()> {
        match draft {
            Some(object) => self.store.put(name, &StoredDraft::new(object.clone(), now)),
            None => self.store.remove(name).map(|_| ()),
        }
    }

    /// Restore the draft stored under `name` for the record `base`.
    ///
    /// Returns `None` when no draft exists, when it was made from a different
    /// record (the ids differ; two records without ids match), or when it has
    /// expired.
    pub fn restore(&self, name: &str, base: Option<&Value>) -> StoreResult<Option<Value>> {
        self.restore_at(name, base, Utc::now())
    }

    pub fn restore_at(
        &self,
        name: &str,
        base: Option<&Value>,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Value>> {
        let Some(draft) = self.store.get(name)? else {
            return Ok(None);
        };

        let draft_id = RecordId::of(&draft.object);
        let base_id = base.and_then(RecordId::of);
        if draft_id != base_id {
            debug!(draft = name, ?draft_id, ?base_id, "draft belongs to another record");
            return Ok(None);
        }

        let age = draft.age_at(now);
        if age >= self.config.max_age {
            debug!(draft = name, age_secs = age.as_secs(), "draft expired");
            return Ok(None);
        }

        Ok(Some(draft.object))
    }

    /// Remove the draft stored under `name`. Returns `true` if it existed.
    pub fn discard(&self, name: &str) -> StoreResult<bool> {
        self.store.remove(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryDraftStore;
    use chrono::TimeZone;
    use serde_json::json;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn keeper() -> DraftKeeper<InMemoryDraftStore> {
        DraftKeeper::with_defaults(InMemoryDraftStore::new())
    }

    #[test]
    fn default_max_age_is_one_hour() {
        assert_eq!(DraftConfig::default().max_age, Duration::from_secs(3600));
    }

    #[test]
    fn restores_fresh_draft_for_same_record() {
        let keeper = keeper();
        let base = Value::from(json!({"id": 1, "title": "a"}));
        let draft = Value::from(json!({"id": 1, "title": "b"}));

        keeper.preserve_at("draft", Some(&draft), at(0)).unwrap();
        let restored = keeper.restore_at("draft", Some(&base), at(60)).unwrap();
        assert_eq!(restored, Some(draft));
    }

    #[test]
    fn ignores_draft_of_other_record() {
        let keeper = keeper();
        let draft = Value::from(json!({"id": 1, "title": "b"}));
        keeper.preserve_at("draft", Some(&draft), at(0)).unwrap();

        let other = Value::from(json!({"id": 2}));
        assert_eq!(keeper.restore_at("draft", Some(&other), at(1)).unwrap(), None);
        assert_eq!(keeper.restore_at("draft", None, at(1)).unwrap(), None);
    }

    #[test]
    fn new_record_drafts_match_without_ids() {
        let keeper = keeper();
        let draft = Value::from(json!({"title": "unsaved"}));
        keeper.preserve_at("new", Some(&draft), at(0)).unwrap();

        assert_eq!(keeper.restore_at("new", None, at(1)).unwrap(), Some(draft.clone()));
        let blank = Value::from(json!({"title": ""}));
        assert_eq!(keeper.restore_at("new", Some(&blank), at(1)).unwrap(), Some(draft));
    }

    #[test]
    fn expired_draft_is_ignored() {
        let keeper = keeper();
        let base = Value::from(json!({"id": 1}));
        keeper.preserve_at("draft", Some(&base), at(0)).unwrap();

        assert!(keeper.restore_at("draft", Some(&base), at(3599)).unwrap().is_some());
        assert!(keeper.restore_at("draft", Some(&base), at(3600)).unwrap().is_none());
    }

    #[test]
    fn preserving_none_removes_draft() {
        let keeper = keeper();
        let draft = Value::from(json!({"id": 1}));
        keeper.preserve_at("draft", Some(&draft), at(0)).unwrap();
        keeper.preserve_at("draft", None, at(1)).unwrap();
        assert!(keeper.store().get("draft").unwrap().is_none());
    }

    #[test]
    fn future_draft_has_zero_age() {
        let draft = StoredDraft::new(Value::Null, at(100));
        assert_eq!(draft.age_at(at(0)), Duration::ZERO);
    }

    #[test]
    fn stored_draft_serializes_with_date_field() {
        let draft = StoredDraft::new(Value::from(json!({"id": 1})), at(0));
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["object"], json!({"id": 1}));
        assert_eq!(json["date"], json!("2023-11-14T22:13:20Z"));
    }
}
