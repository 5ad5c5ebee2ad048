//! Directory-backed draft store.
//!
//! Each draft is a pretty-printed JSON document `<dir>/<name>.json`. Writes go
//! to a temporary file in the same directory which is then renamed over the
//! target, so a reader never sees a half-written draft.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::draft::StoredDraft;
use crate::error::{StoreError, StoreResult};
use crate::traits::DraftStore;

/// File-backed implementation of [`DraftStore`].
#[derive(Clone, Debug)]
pub struct FileDraftStore {
    dir: PathBuf,
}

impl FileDraftStore {
    /// Use `dir` for drafts. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The file a draft named `name` is stored in.
    pub fn path_for(&self, name: &str) -> StoreResult<PathBuf> {
        validate_draft_name(name)?;
        Ok(self.dir.join(format!("{name}.json")))
    }
}

impl DraftStore for FileDraftStore {
    fn put(&self, name: &str, draft: &StoredDraft) -> StoreResult<()> {
        let path = self.path_for(name)?;
        let json = serde_json::to_vec_pretty(draft)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        fs::create_dir_all(&self.dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&json)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;

        debug!(path = %path.display(), "draft written");
        Ok(())
    }

    fn get(&self, name: &str) -> StoreResult<Option<StoredDraft>> {
        let path = self.path_for(name)?;
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let draft = serde_json::from_str(&text).map_err(|e| {
            warn!(path = %path.display(), error = %e, "unreadable draft");
            StoreError::Serialization(e.to_string())
        })?;
        Ok(Some(draft))
    }

    fn remove(&self, name: &str) -> StoreResult<bool> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Draft names become file names: ASCII letters, digits, `-`, `_` and `.`,
/// not starting with `.`.
fn validate_draft_name(name: &str) -> StoreResult<()> {
    let invalid = |reason: &str| StoreError::InvalidDraftName {
        name: name.to_owned(),
        reason: reason.to_owned(),
    };

    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    if name.starts_with('.') {
        return Err(invalid("name starts with '.'"));
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(invalid(&format!("character {c:?} not allowed")));
    }
    Ok(())
}
