//! Two-way token diff expressed as contiguous segments.
//!
//! Uses the `similar` crate (Myers diff algorithm) over token sequences. The
//! result covers both inputs completely: concatenating every segment's
//! `before` tokens rebuilds the old text, and every `after` the new text.

use similar::{capture_diff_slices, Algorithm, DiffTag};
use tracing::trace;

use crate::sentence::tokenize_sentences;

/// One contiguous region of a two-way diff.
///
/// For an unchanged region `before` and `after` hold the same tokens. For a
/// changed region `before` was replaced by `after`; either side may be empty
/// (pure insertion or pure deletion).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffSegment<'a> {
    /// Tokens on the old side.
    pub before: Vec<&'a str>,
    /// Tokens on the new side.
    pub after: Vec<&'a str>,
    /// Whether this region differs between the two sides.
    pub changed: bool,
}

impl<'a> DiffSegment<'a> {
    /// A region present on both sides.
    pub fn unchanged(tokens: Vec<&'a str>) -> Self {
        Self {
            before: tokens.clone(),
            after: tokens,
            changed: false,
        }
    }

    /// A region where `before` was replaced by `after`.
    pub fn changed(before: Vec<&'a str>, after: Vec<&'a str>) -> Self {
        Self {
            before,
            after,
            changed: true,
        }
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }
}

/// The ordered segments of a diff between two token sequences.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenDiff<'a> {
    pub segments: Vec<DiffSegment<'a>>,
}

impl<'a> TokenDiff<'a> {
    /// Returns `true` if the two sides are identical.
    pub fn is_unchanged(&self) -> bool {
        self.segments.iter().all(|s| !s.changed)
    }

    /// Number of changed segments.
    pub fn changes(&self) -> usize {
        self.segments.iter().filter(|s| s.changed).count()
    }

    /// Total number of tokens removed across changed segments.
    pub fn removed(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| s.changed)
            .map(|s| s.before.len())
            .sum()
    }

    /// Total number of tokens added across changed segments.
    pub fn added(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| s.changed)
            .map(|s| s.after.len())
            .sum()
    }

    /// Per-position change flags over the new side.
    pub fn change_map(&self) -> ChangeMap {
        ChangeMap::from_segments(&self.segments)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DiffSegment<'a>> {
        self.segments.iter()
    }
}

impl<'s, 'a> IntoIterator for &'s TokenDiff<'a> {
    type Item = &'s DiffSegment<'a>;
    type IntoIter = std::slice::Iter<'s, DiffSegment<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

/// Diff two texts after splitting each with `tokenize`.
///
/// A pure insertion that directly follows a pure deletion is folded into the
/// deletion's segment, so a rewritten span always appears as a single changed
/// segment.
pub fn diff_tokens<'a, F>(before: &'a str, after: &'a str, tokenize: F) -> TokenDiff<'a>
where
    F: Fn(&'a str) -> Vec<&'a str>,
{
    let old = tokenize(before);
    let new = tokenize(after);
    let mut segments: Vec<DiffSegment<'a>> = Vec::new();

    for op in capture_diff_slices(Algorithm::Myers, &old, &new) {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        if old_range.is_empty() && new_range.is_empty() {
            continue;
        }
        let removed = old[old_range].to_vec();
        let added = new[new_range].to_vec();
        match tag {
            DiffTag::Equal => segments.push(DiffSegment::unchanged(removed)),
            DiffTag::Delete => segments.push(DiffSegment::changed(removed, Vec::new())),
            DiffTag::Insert => match segments.last_mut() {
                Some(last) if last.changed && last.after.is_empty() => last.after = added,
                _ => segments.push(DiffSegment::changed(Vec::new(), added)),
            },
            DiffTag::Replace => segments.push(DiffSegment::changed(removed, added)),
        }
    }

    trace!(
        old_tokens = old.len(),
        new_tokens = new.len(),
        segments = segments.len(),
        "token diff computed"
    );
    TokenDiff { segments }
}

/// Diff two texts sentence by sentence.
pub fn diff_sentences<'a>(before: &'a str, after: &'a str) -> TokenDiff<'a> {
    diff_tokens(before, after, tokenize_sentences)
}

/// Answers "was the token at this position of the new side changed?".
///
/// Built once from a diff; positions past the end report `false`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeMap {
    flags: Vec<bool>,
}

impl ChangeMap {
    pub fn from_segments(segments: &[DiffSegment<'_>]) -> Self {
        let flags = segments
            .iter()
            .flat_map(|s| std::iter::repeat(s.changed).take(s.after.len()))
            .collect();
        Self { flags }
    }

    pub fn is_changed(&self, index: usize) -> bool {
        self.flags.get(index).copied().unwrap_or(false)
    }

    /// Number of positions on the new side.
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}
