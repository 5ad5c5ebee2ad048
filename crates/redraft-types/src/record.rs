use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::value::Value;

/// Name of the field that carries a record's identifier.
pub const ID_FIELD: &str = "id";

/// Identifier of a stored record.
///
/// Records are mappings; a record that has been saved at least once carries a
/// non-negative integer in its `"id"` field. A record without one is new.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl RecordId {
    /// Read the identifier of a record, if it has a valid one.
    pub fn of(record: &Value) -> Option<Self> {
        record.get(ID_FIELD).and_then(Value::as_u64).map(Self)
    }

    /// Return a copy of `record` with its `"id"` field set to this identifier.
    ///
    /// Fails if `record` is not a mapping.
    pub fn stamp(self, record: &Value) -> Result<Value, TypeError> {
        let mut fields = record.clone().into_mapping()?;
        fields.insert(ID_FIELD.to_owned(), Value::from(self.0));
        Ok(Value::Mapping(fields))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .map(Self)
            .map_err(|_| TypeError::InvalidRecordId(s.to_owned()))
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}
