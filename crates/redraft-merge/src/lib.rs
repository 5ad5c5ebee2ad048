//! Three-way merge engine for redraft.
//!
//! Reconciles a locally edited draft ("ours") with a concurrently updated
//! server version ("theirs"), given the version both started from ("base").
//! The merge is a pure function of its three inputs: it performs no I/O,
//! never mutates its inputs and never fails.
//!
//! # Resolution Rules
//!
//! 1. Both sides agree: keep the agreed value.
//! 2. Only one side changed relative to base: take that side (including a
//!    deletion).
//! 3. Both changed differently:
//!    - two mappings are merged field by field, recursively;
//!    - if either side is a string, the strings are merged sentence by
//!      sentence ([`merge_strings`]);
//!    - anything else resolves to theirs.
//!
//! [`Merger`] applies the same rules and additionally records every
//! conflicting field in a [`MergeReport`].

pub mod path;
pub mod report;
pub mod structural;
pub mod text;

pub use path::FieldPath;
pub use report::{Conflict, MergeReport, Resolution};
pub use structural::{merge_mappings, merge_values, Merger};
pub use text::{merge_strings, merge_text, TextMerge};
