//! High-level redraft API.
//!
//! A [`DraftSession`] edits one record offline-first: every edit is preserved
//! as a draft, and saving merges the draft with whatever the record store
//! holds by then, using the version the draft was started from as the common
//! ancestor.
//!
//! ```ignore
//! let mut session = DraftSession::open(records, drafts, RecordId(1))?;
//! session.set_field("title", "Buy oat milk")?;
//! let outcome = session.save()?;
//! ```

pub mod error;
pub mod session;

pub use error::{SessionError, SessionResult};
pub use session::{draft_name, DraftSession, SaveOutcome};

// Re-export key types
pub use redraft_merge::{merge_mappings, merge_strings, merge_values, MergeReport, Resolution};
pub use redraft_store::{
    DraftConfig, DraftKeeper, DraftStore, FileDraftStore, InMemoryDraftStore,
    InMemoryRecordStore, RecordStore,
};
pub use redraft_types::{Mapping, RecordId, Value};
