use serde::Serialize;

use crate::path::FieldPath;

/// How a field changed on both sides was resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    /// Both sides were mappings; their fields were merged one by one.
    Recursed,
    /// The strings were merged sentence by sentence. `overlapping` counts the
    /// sentence positions both sides had edited, where theirs was kept.
    TextMerged { overlapping: usize },
    /// The values could not be combined and theirs was kept.
    TheirsWon,
}

/// A field that both sides changed, differently, relative to base.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub path: FieldPath,
    pub resolution: Resolution,
}

/// Every conflict encountered during one merge, in visiting order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub conflicts: Vec<Conflict>,
}

impl MergeReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, path: FieldPath, resolution: Resolution) {
        self.conflicts.push(Conflict { path, resolution });
    }

    /// Returns `true` if no local edit was overridden by theirs.
    pub fn is_clean(&self) -> bool {
        self.conflicts.iter().all(|c| match c.resolution {
            Resolution::Recursed => true,
            Resolution::TextMerged { overlapping } => overlapping == 0,
            Resolution::TheirsWon => false,
        })
    }

    /// Number of conflicts recorded.
    pub fn len(&self) -> usize {
        self.conflicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Paths of the fields where a local edit was overridden by theirs.
    pub fn overridden_paths(&self) -> Vec<&FieldPath> {
        self.conflicts
            .iter()
            .filter(|c| match c.resolution {
                Resolution::Recursed => false,
                Resolution::TextMerged { overlapping } => overlapping > 0,
                Resolution::TheirsWon => true,
            })
            .map(|c| &c.path)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_is_clean() {
        let report = MergeReport::new();
        assert!(report.is_empty());
        assert!(report.is_clean());
        assert!(report.overridden_paths().is_empty());
    }

    #[test]
    fn theirs_won_is_not_clean() {
        let mut report = MergeReport::new();
        report.record(FieldPath::root().child("meta"), Resolution::Recursed);
        report.record(FieldPath::root().child("meta").child("n"), Resolution::TheirsWon);
        assert_eq!(report.len(), 2);
        assert!(!report.is_clean());
        assert_eq!(report.overridden_paths(), vec![&FieldPath::root().child("meta").child("n")]);
    }

    #[test]
    fn disjoint_text_merge_is_clean() {
        let mut report = MergeReport::new();
        report.record(
            FieldPath::root().child("description"),
            Resolution::TextMerged { overlapping: 0 },
        );
        assert!(report.is_clean());

        report.record(
            FieldPath::root().child("title"),
            Resolution::TextMerged { overlapping: 1 },
        );
        assert!(!report.is_clean());
    }
}
