use redraft_merge::{MergeReport, Merger};
use redraft_store::{DraftKeeper, DraftStore, RecordStore};
use redraft_types::{Mapping, RecordId, Value};
use tracing::{debug, info};

use crate::error::{SessionError, SessionResult};

/// Name under which the draft of a record is preserved.
pub fn draft_name(id: Option<RecordId>) -> String {
    match id {
        Some(id) => format!("record-{id}"),
        None => "record-new".to_owned(),
    }
}

/// Result of [`DraftSession::save`].
#[derive(Clone, Debug, PartialEq)]
pub struct SaveOutcome {
    /// The record as stored.
    pub record: Value,
    /// Conflicts resolved while merging the draft with the stored version.
    pub report: MergeReport,
    /// Whether the stored version had changed since the draft was started.
    pub remote_changed: bool,
}

/// An offline-first editing session for a single record.
///
/// The session remembers the version the draft started from (the base).
/// Every edit is preserved through the draft keeper. Saving fetches the
/// current stored version and three-way merges it with the draft before
/// writing, so concurrent remote edits are kept wherever they do not collide
/// with local ones.
///
/// `save` and `refresh` take `&mut self`: a session never has two saves in
/// flight.
#[derive(Debug)]
pub struct DraftSession<R, D> {
    records: R,
    drafts: DraftKeeper<D>,
    base: Option<Value>,
    draft: Value,
}

impl<R: RecordStore, D: DraftStore> DraftSession<R, D> {
    /// Start editing the stored record `id`, picking up a preserved draft if
    /// one is still valid.
    pub fn open(records: R, drafts: DraftKeeper<D>, id: RecordId) -> SessionResult<Self> {
        let base = records.fetch(id)?.ok_or(SessionError::NotFound(id))?;
        let draft = match drafts.restore(&draft_name(Some(id)), Some(&base))? {
            Some(restored) => {
                debug!(%id, "restored preserved draft");
                restored
            }
            None => base.clone(),
        };
        Ok(Self {
            records,
            drafts,
            base: Some(base),
            draft,
        })
    }

    /// Start editing a record that has not been stored yet.
    pub fn create(records: R, drafts: DraftKeeper<D>) -> SessionResult<Self> {
        let draft = drafts
            .restore(&draft_name(None), None)?
            .unwrap_or_else(Value::mapping);
        Ok(Self {
            records,
            drafts,
            base: None,
            draft,
        })
    }

    /// Id of the record, `None` until it is first saved.
    pub fn id(&self) -> Option<RecordId> {
        self.base.as_ref().and_then(RecordId::of)
    }

    pub fn base(&self) -> Option<&Value> {
        self.base.as_ref()
    }

    pub fn draft(&self) -> &Value {
        &self.draft
    }

    pub fn records(&self) -> &R {
        &self.records
    }

    pub fn drafts(&self) -> &DraftKeeper<D> {
        &self.drafts
    }

    /// Returns `true` if the draft differs from the version it started from.
    pub fn is_dirty(&self) -> bool {
        match &self.base {
            Some(base) => self.draft != *base,
            None => self.draft != Value::mapping(),
        }
    }

    /// Modify the draft's fields and preserve the result.
    pub fn edit<F>(&mut self, f: F) -> SessionResult<()>
    where
        F: FnOnce(&mut Mapping),
    {
        let kind = self.draft.kind();
        let fields = self
            .draft
            .as_mapping_mut()
            .ok_or(SessionError::NotARecord(kind))?;
        f(fields);
        self.drafts.preserve(&self.name(), Some(&self.draft))?;
        Ok(())
    }

    pub fn set_field(&mut self, key: &str, value: impl Into<Value>) -> SessionResult<()> {
        let value = value.into();
        self.edit(|fields| {
            fields.insert(key.to_owned(), value);
        })
    }

    pub fn remove_field(&mut self, key: &str) -> SessionResult<()> {
        self.edit(|fields| {
            fields.remove(key);
        })
    }

    /// Rebase the draft onto the current stored version without saving.
    ///
    /// Fails with [`SessionError::RemotelyDeleted`] if the record is gone.
    pub fn refresh(&mut self) -> SessionResult<MergeReport> {
        let Some(id) = self.id() else {
            return Ok(MergeReport::new());
        };

        let theirs = self.records.fetch(id)?;
        let mut merger = Merger::new();
        let merged = merger.merge_values(self.base.as_ref(), Some(&self.draft), theirs.as_ref());
        let (Some(theirs), Some(merged)) = (theirs, merged) else {
            return Err(SessionError::RemotelyDeleted(id));
        };

        self.base = Some(theirs);
        self.draft = merged;
        if self.is_dirty() {
            self.drafts.preserve(&self.name(), Some(&self.draft))?;
        } else {
            self.drafts.discard(&self.name())?;
        }
        Ok(merger.into_report())
    }

    /// Merge the draft with the current stored version and store the result.
    ///
    /// A new record is inserted as is. After a successful save the session is
    /// rebased onto the stored record and the preserved draft is removed. If
    /// the record was deleted remotely the draft stays preserved and
    /// [`SessionError::RemotelyDeleted`] is returned.
    pub fn save(&mut self) -> SessionResult<SaveOutcome> {
        if !self.draft.is_mapping() {
            return Err(SessionError::NotARecord(self.draft.kind()));
        }
        let name = self.name();

        let (to_save, report, remote_changed) = match self.id() {
            None => (self.draft.clone(), MergeReport::new(), false),
            Some(id) => {
                let theirs = self.records.fetch(id)?;
                let remote_changed = theirs.as_ref() != self.base.as_ref();

                let mut merger = Merger::new();
                let merged = merger
                    .merge_values(self.base.as_ref(), Some(&self.draft), theirs.as_ref())
                    .ok_or(SessionError::RemotelyDeleted(id))?;
                // The id is not up for merging.
                let merged = id
                    .stamp(&merged)
                    .map_err(|_| SessionError::NotARecord(merged.kind()))?;
                (merged, merger.into_report(), remote_changed)
            }
        };

        if remote_changed {
            info!(
                id = ?self.id(),
                conflicts = report.len(),
                clean = report.is_clean(),
                "merged draft with remote changes"
            );
        }

        let saved = self.records.save(&to_save)?;
        self.drafts.discard(&name)?;
        debug!(id = ?RecordId::of(&saved), "draft saved");

        self.base = Some(saved.clone());
        self.draft = saved.clone();
        Ok(SaveOutcome {
            record: saved,
            report,
            remote_changed,
        })
    }

    /// Drop local edits and go back to the base version.
    pub fn discard(&mut self) -> SessionResult<()> {
        let name = self.name();
        self.draft = self.base.clone().unwrap_or_else(Value::mapping);
        self.drafts.discard(&name)?;
        Ok(())
    }

    /// Delete the record from the store and drop the draft.
    ///
    /// Returns `true` if a stored record was deleted.
    pub fn delete(self) -> SessionResult<bool> {
        let name = self.name();
        let deleted = match &self.base {
            Some(base) => self.records.delete(base)?,
            None => false,
        };
        self.drafts.discard(&name)?;
        Ok(deleted)
    }

    fn name(&self) -> String {
        draft_name(self.id())
    }
}
