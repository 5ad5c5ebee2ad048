//! Foundation types for redraft.
//!
//! Every other redraft crate depends on `redraft-types`. The central type is
//! [`Value`], the plain decoded data a record is made of. Merges, stores and
//! drafts all operate on it.
//!
//! # Key Types
//!
//! - [`Value`]: Tagged union over mappings, strings, lists and scalars
//! - [`Mapping`]: String-keyed map of values (key order is irrelevant)
//! - [`ValueKind`]: The variant of a value, for diagnostics
//! - [`RecordId`]: Identifier read from a record's `"id"` field
//!
//! Absence (a field that does not exist, or a record that does not exist yet)
//! is expressed as `Option<Value>::None`, never as a variant.

pub mod error;
pub mod record;
pub mod value;

pub use error::TypeError;
pub use record::{RecordId, ID_FIELD};
pub use value::{Mapping, Value, ValueKind};
