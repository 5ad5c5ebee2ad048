use thiserror::Error;

use crate::value::ValueKind;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("expected {expected}, got {actual}")]
    UnexpectedKind {
        expected: ValueKind,
        actual: ValueKind,
    },

    #[error("invalid record id: {0}")]
    InvalidRecordId(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
