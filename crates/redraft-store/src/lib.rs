//! Storage collaborators of the redraft merge cycle.
//!
//! The merge engine itself never touches storage. The layer that drives it
//! needs two stores:
//!
//! - a [`RecordStore`] holding the authoritative records (the server side),
//!   which supplies "theirs" and accepts the merged result;
//! - a [`DraftStore`] holding in-progress local edits by name, so a draft
//!   survives a restart. [`DraftKeeper`] adds the restore policy on top: a
//!   draft is only handed back for the record it was made from and only while
//!   it is younger than [`DraftConfig::max_age`].
//!
//! # Backends
//!
//! - [`InMemoryRecordStore`] / [`InMemoryDraftStore`] -- map-based stores for
//!   tests and embedding
//! - [`FileDraftStore`] -- one JSON document per draft in a directory

pub mod draft;
pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use draft::{DraftConfig, DraftKeeper, StoredDraft};
pub use error::{StoreError, StoreResult};
pub use file::FileDraftStore;
pub use memory::{InMemoryDraftStore, InMemoryRecordStore};
pub use traits::{DraftStore, RecordStore};
