use redraft_types::{RecordId, ValueKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("record not found: {0}")]
    NotFound(RecordId),

    #[error("record {0} was deleted remotely")]
    RemotelyDeleted(RecordId),

    #[error("draft is not a record: expected mapping, got {0}")]
    NotARecord(ValueKind),

    #[error("store error: {0}")]
    Store(#[from] redraft_store::StoreError),
}

pub type SessionResult<T> = Result<T, SessionError>;
