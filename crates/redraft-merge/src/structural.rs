//! Field-by-field structural merge of record values.

use std::collections::BTreeSet;

use redraft_types::{Mapping, Value};
use tracing::{debug, trace};

use crate::path::FieldPath;
use crate::report::{MergeReport, Resolution};
use crate::text::{as_text, merge_text};

/// Merge two versions of a value against their common ancestor.
///
/// Any of the three may be absent. Returns `None` when the merged value is
/// absent, i.e. the field (or record) was deleted.
pub fn merge_values(
    base: Option<&Value>,
    ours: Option<&Value>,
    theirs: Option<&Value>,
) -> Option<Value> {
    Merger::new().merge_values(base, ours, theirs)
}

/// Merge two versions of a mapping against their common ancestor.
///
/// The result holds only keys present in `ours` or `theirs`, and never a key
/// whose merged value is absent.
pub fn merge_mappings(
    base: Option<&Mapping>,
    ours: Option<&Mapping>,
    theirs: Option<&Mapping>,
) -> Mapping {
    Merger::new().merge_mappings(base, ours, theirs)
}

/// Three-way merger that keeps a [`MergeReport`] of the conflicts it resolves.
///
/// The merged output is identical to what [`merge_values`] and
/// [`merge_mappings`] return; a `Merger` can be reused and its report
/// accumulates across calls.
#[derive(Debug, Default)]
pub struct Merger {
    report: MergeReport,
}

impl Merger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge_values(
        &mut self,
        base: Option<&Value>,
        ours: Option<&Value>,
        theirs: Option<&Value>,
    ) -> Option<Value> {
        self.value_at(&FieldPath::root(), base, ours, theirs)
    }

    pub fn merge_mappings(
        &mut self,
        base: Option<&Mapping>,
        ours: Option<&Mapping>,
        theirs: Option<&Mapping>,
    ) -> Mapping {
        self.mapping_at(&FieldPath::root(), base, ours, theirs)
    }

    pub fn report(&self) -> &MergeReport {
        &self.report
    }

    pub fn into_report(self) -> MergeReport {
        self.report
    }

    fn value_at(
        &mut self,
        path: &FieldPath,
        base: Option<&Value>,
        ours: Option<&Value>,
        theirs: Option<&Value>,
    ) -> Option<Value> {
        if ours == theirs {
            trace!(%path, "both sides agree");
            return ours.cloned();
        }
        if ours == base {
            trace!(%path, "unchanged in ours, taking theirs");
            return theirs.cloned();
        }
        if theirs == base {
            trace!(%path, "unchanged in theirs, taking ours");
            return ours.cloned();
        }

        match (ours, theirs) {
            (Some(Value::Mapping(our_fields)), Some(Value::Mapping(their_fields))) => {
                debug!(%path, "conflicting mappings, merging fields");
                self.report.record(path.clone(), Resolution::Recursed);
                let base_fields = base.and_then(Value::as_mapping);
                let merged = self.mapping_at(path, base_fields, Some(our_fields), Some(their_fields));
                Some(Value::Mapping(merged))
            }
            _ if ours.is_some_and(Value::is_string) || theirs.is_some_and(Value::is_string) => {
                let merged = merge_text(as_text(base), as_text(ours), as_text(theirs));
                debug!(%path, overlapping = merged.overlapping, "conflicting strings, merged by sentence");
                self.report.record(
                    path.clone(),
                    Resolution::TextMerged {
                        overlapping: merged.overlapping,
                    },
                );
                Some(Value::String(merged.text))
            }
            _ => {
                let our_kind = ours.map(Value::kind);
                let their_kind = theirs.map(Value::kind);
                debug!(
                    %path,
                    ours = ?our_kind,
                    theirs = ?their_kind,
                    "unmergeable conflict, taking theirs"
                );
                self.report.record(path.clone(), Resolution::TheirsWon);
                theirs.cloned()
            }
        }
    }

    fn mapping_at(
        &mut self,
        path: &FieldPath,
        base: Option<&Mapping>,
        ours: Option<&Mapping>,
        theirs: Option<&Mapping>,
    ) -> Mapping {
        let keys: BTreeSet<&String> = ours
            .into_iter()
            .flat_map(Mapping::keys)
            .chain(theirs.into_iter().flat_map(Mapping::keys))
            .collect();

        let mut merged = Mapping::new();
        for key in keys {
            let merged_value = self.value_at(
                &path.child(key),
                base.and_then(|m| m.get(key)),
                ours.and_then(|m| m.get(key)),
                theirs.and_then(|m| m.get(key)),
            );
            if let Some(value) = merged_value {
                merged.insert(key.clone(), value);
            }
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    fn m(json: serde_json::Value) -> Mapping {
        v(json).into_mapping().unwrap()
    }

    #[test]
    fn agreeing_sides_keep_value() {
        let x = v(json!({"title": "same"}));
        let base = v(json!({"title": "old"}));
        assert_eq!(merge_values(Some(&base), Some(&x), Some(&x)), Some(x));
    }

    #[test]
    fn unchanged_ours_accepts_theirs() {
        let base = v(json!(1));
        let theirs = v(json!("new"));
        assert_eq!(merge_values(Some(&base), Some(&base), Some(&theirs)), Some(theirs));
    }

    #[test]
    fn numerically_equal_sides_agree() {
        let base = v(json!("s"));
        let ours = v(json!(1));
        let theirs = v(json!(1.0));
        let mut merger = Merger::new();
        assert_eq!(merger.merge_values(Some(&base), Some(&ours), Some(&theirs)), Some(ours));
        assert!(merger.report().is_empty());
    }

    #[test]
    fn unchanged_theirs_keeps_ours() {
        let base = v(json!([1, 2]));
        let ours = v(json!([1, 2, 3]));
        assert_eq!(merge_values(Some(&base), Some(&ours), Some(&base)), Some(ours));
    }

    #[test]
    fn deletion_on_one_side_propagates() {
        let base = m(json!({"title": "x", "note": "keep me?"}));
        let ours = m(json!({"title": "x", "note": "keep me?"}));
        let theirs = m(json!({"title": "x"}));
        let merged = merge_mappings(Some(&base), Some(&ours), Some(&theirs));
        assert_eq!(merged, m(json!({"title": "x"})));
    }

    #[test]
    fn deletion_on_both_sides_drops_key() {
        let base = m(json!({"a": 1, "gone": true}));
        let ours = m(json!({"a": 2}));
        let theirs = m(json!({"a": 1}));
        let merged = merge_mappings(Some(&base), Some(&ours), Some(&theirs));
        assert_eq!(merged, m(json!({"a": 2})));
    }

    #[test]
    fn additions_from_both_sides_are_kept() {
        let base = m(json!({"title": "x"}));
        let ours = m(json!({"title": "x", "due": "monday"}));
        let theirs = m(json!({"title": "x", "done": true}));
        let merged = merge_mappings(Some(&base), Some(&ours), Some(&theirs));
        assert_eq!(merged, m(json!({"title": "x", "due": "monday", "done": true})));
    }

    #[test]
    fn nested_mappings_merge_recursively() {
        let base = m(json!({"title": "x", "meta": {"a": 1, "b": 1}}));
        let ours = m(json!({"title": "x", "meta": {"a": 2, "b": 1}}));
        let theirs = m(json!({"title": "x", "meta": {"a": 1, "b": 2}}));

        let mut merger = Merger::new();
        let merged = merger.merge_mappings(Some(&base), Some(&ours), Some(&theirs));
        assert_eq!(merged, m(json!({"title": "x", "meta": {"a": 2, "b": 2}})));

        let report = merger.into_report();
        assert_eq!(report.len(), 1);
        assert_eq!(report.conflicts[0].path, FieldPath::root().child("meta"));
        assert_eq!(report.conflicts[0].resolution, Resolution::Recursed);
        assert!(report.is_clean());
    }

    #[test]
    fn scalar_conflict_favors_theirs() {
        let mut merger = Merger::new();
        let merged = merger.merge_values(
            Some(&v(json!(5))),
            Some(&v(json!(6))),
            Some(&v(json!(7))),
        );
        assert_eq!(merged, Some(v(json!(7))));
        assert_eq!(merger.report().conflicts[0].resolution, Resolution::TheirsWon);
        assert!(!merger.report().is_clean());
    }

    #[test]
    fn string_conflict_merges_sentences() {
        let base = m(json!({"description": "A. B. C."}));
        let ours = m(json!({"description": "A2. B. C."}));
        let theirs = m(json!({"description": "A. B2. C."}));

        let mut merger = Merger::new();
        let merged = merger.merge_mappings(Some(&base), Some(&ours), Some(&theirs));
        assert_eq!(merged, m(json!({"description": "A2. B2. C."})));
        assert_eq!(
            merger.report().conflicts[0].resolution,
            Resolution::TextMerged { overlapping: 0 }
        );
    }

    #[test]
    fn string_against_non_string_merges_as_text() {
        // Ours turned a number into text; theirs changed the number.
        let merged = merge_values(
            Some(&v(json!(1))),
            Some(&v(json!("one."))),
            Some(&v(json!(2))),
        );
        assert_eq!(merged, Some(v(json!("one."))));
    }

    #[test]
    fn mapping_against_scalar_favors_theirs() {
        let merged = merge_values(
            Some(&v(json!(null))),
            Some(&v(json!({"a": 1}))),
            Some(&v(json!(3))),
        );
        assert_eq!(merged, Some(v(json!(3))));
    }

    #[test]
    fn edit_against_deletion_favors_deletion() {
        let base = m(json!({"title": "x", "priority": 1}));
        let ours = m(json!({"title": "x", "priority": 2}));
        let theirs = m(json!({"title": "x"}));
        let merged = merge_mappings(Some(&base), Some(&ours), Some(&theirs));
        assert_eq!(merged, m(json!({"title": "x"})));
    }

    #[test]
    fn text_edit_against_deletion_keeps_text() {
        // A string conflict always produces a string.
        let base = m(json!({"note": "Old."}));
        let ours = m(json!({"note": "New."}));
        let theirs = m(json!({}));
        let merged = merge_mappings(Some(&base), Some(&ours), Some(&theirs));
        assert_eq!(merged, m(json!({"note": "New."})));
    }

    #[test]
    fn missing_base_treats_fields_as_new() {
        let ours = m(json!({"title": "mine", "a": 1}));
        let theirs = m(json!({"title": "mine", "b": 2}));
        let merged = merge_mappings(None, Some(&ours), Some(&theirs));
        assert_eq!(merged, m(json!({"title": "mine", "a": 1, "b": 2})));
    }

    #[test]
    fn non_mapping_base_is_ignored_when_recursing() {
        let merged = merge_values(
            Some(&v(json!("was text"))),
            Some(&v(json!({"a": 1}))),
            Some(&v(json!({"b": 2}))),
        );
        assert_eq!(merged, Some(v(json!({"a": 1, "b": 2}))));
    }

    #[test]
    fn deleted_record_on_both_sides_is_absent() {
        let base = v(json!({"id": 1}));
        assert_eq!(merge_values(Some(&base), None, None), None);
    }

    #[test]
    fn inputs_are_left_untouched() {
        let base = v(json!({"meta": {"a": 1, "b": 1}}));
        let ours = v(json!({"meta": {"a": 2, "b": 1}}));
        let theirs = v(json!({"meta": {"a": 1, "b": 2}}));
        let snapshot = (base.clone(), ours.clone(), theirs.clone());
        let _ = merge_values(Some(&base), Some(&ours), Some(&theirs));
        assert_eq!((base, ours, theirs), snapshot);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn arb_value() -> impl Strategy<Value = Value> {
            let leaf = prop_oneof![
                Just(Value::Null),
                any::<bool>().prop_map(Value::from),
                (0i64..4).prop_map(Value::from),
                prop::sample::select(vec!["A.", "A. B.", "B. C.", ""]).prop_map(Value::from),
            ];
            leaf.prop_recursive(3, 24, 4, |inner| {
                prop::collection::btree_map("[a-d]", inner, 0..4).prop_map(Value::Mapping)
            })
        }

        fn arb_mapping() -> impl Strategy<Value = Mapping> {
            prop::collection::btree_map("[a-e]", arb_value(), 0..5)
        }

        proptest! {
            #[test]
            fn identical_sides_are_returned(b in arb_value(), x in arb_value()) {
                prop_assert_eq!(merge_values(Some(&b), Some(&x), Some(&x)), Some(x));
            }

            #[test]
            fn unchanged_side_accepts_other(b in arb_value(), o in arb_value()) {
                prop_assert_eq!(merge_values(Some(&b), Some(&b), Some(&o)), Some(o.clone()));
                prop_assert_eq!(merge_values(Some(&b), Some(&o), Some(&b)), Some(o));
            }

            #[test]
            fn output_keys_come_from_ours_or_theirs(
                b in arb_mapping(),
                o in arb_mapping(),
                t in arb_mapping(),
            ) {
                let merged = merge_mappings(Some(&b), Some(&o), Some(&t));
                for key in merged.keys() {
                    prop_assert!(o.contains_key(key) || t.contains_key(key));
                }
            }

            #[test]
            fn untouched_deletions_propagate(
                b in arb_mapping(),
                t in arb_mapping(),
            ) {
                // Ours left every field alone; any field theirs removed is gone.
                let merged = merge_mappings(Some(&b), Some(&b), Some(&t));
                for key in b.keys() {
                    if !t.contains_key(key) {
                        prop_assert!(!merged.contains_key(key));
                    }
                }
            }
        }
    }
}
