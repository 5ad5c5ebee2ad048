//! Sentence-level three-way text merge.
//!
//! Whole-string replacement would throw away a local edit whenever the other
//! side touched the same field. Merging by sentence keeps both edits as long
//! as they land on different sentences.

use redraft_diff::diff_sentences;
use redraft_types::Value;
use tracing::trace;

/// The outcome of a text merge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextMerge {
    pub text: String,
    /// Sentence positions edited on both sides, resolved in favor of theirs.
    pub overlapping: usize,
}

/// Merge three optional values as text.
///
/// Anything that is not a string (including an absent value) is treated as
/// the empty string.
pub fn merge_strings(base: Option<&Value>, ours: Option<&Value>, theirs: Option<&Value>) -> String {
    merge_text(as_text(base), as_text(ours), as_text(theirs)).text
}

pub(crate) fn as_text(value: Option<&Value>) -> &str {
    value.and_then(Value::as_str).unwrap_or("")
}

/// Merge `ours` and `theirs`, both derived from `base`, sentence by sentence.
///
/// Walks the diff between ours and theirs. Shared regions are copied once.
/// Inside a differing region each position is decided separately: if our
/// sentence there is unchanged from base, theirs is taken; otherwise, if
/// their sentence is unchanged from base, ours is taken; otherwise both edited
/// it and theirs is taken.
pub fn merge_text(base: &str, ours: &str, theirs: &str) -> TextMerge {
    let diff = diff_sentences(ours, theirs);
    let our_changes = diff_sentences(base, ours).change_map();
    let their_changes = diff_sentences(base, theirs).change_map();

    let mut merged: Vec<&str> = Vec::new();
    let mut our_index = 0;
    let mut their_index = 0;
    let mut overlapping = 0;

    for segment in &diff {
        if !segment.changed {
            merged.extend(segment.after.iter().copied());
            our_index += segment.before.len();
            their_index += segment.after.len();
            continue;
        }

        let width = segment.before.len().max(segment.after.len());
        for pos in 0..width {
            let our_token = segment.before.get(pos).copied();
            let their_token = segment.after.get(pos).copied();

            let chosen = if !our_changes.is_changed(our_index) {
                their_token
            } else if !their_changes.is_changed(their_index) {
                our_token
            } else {
                overlapping += 1;
                their_token
            };
            merged.extend(chosen);

            if our_token.is_some() {
                our_index += 1;
            }
            if their_token.is_some() {
                their_index += 1;
            }
        }
    }

    trace!(
        segments = diff.segments.len(),
        ours_len = our_changes.len(),
        theirs_len = their_changes.len(),
        overlapping,
        "text merged"
    );
    TextMerge {
        text: merged.concat(),
        overlapping,
    }
}
