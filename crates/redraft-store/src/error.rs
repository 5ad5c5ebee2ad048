use redraft_types::{RecordId, TypeError, ValueKind};

/// Errors from record and draft store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The record to update or fetch does not exist.
    #[error("record not found: {0}")]
    NotFound(RecordId),

    /// Only mappings can be stored as records.
    #[error("not a record: expected mapping, got {0}")]
    NotARecord(ValueKind),

    /// Draft names must be usable as file names.
    #[error("invalid draft name {name:?}: {reason}")]
    InvalidDraftName { name: String, reason: String },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from a file-backed store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A lock guarding an in-memory store was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    Poisoned,
}

impl From<TypeError> for StoreError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::UnexpectedKind { actual, .. } => StoreError::NotARecord(actual),
            other => StoreError::Serialization(other.to_string()),
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
