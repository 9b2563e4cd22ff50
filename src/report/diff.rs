//! Line-level differences between the current and proposed target content.

use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use std::fmt;

/// Lines of unchanged context shown around each hunk by default.
const DEFAULT_CONTEXT: usize = 3;

/// How a line differs between the two texts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Present only in the proposed text
    Added,
    /// Present only in the current text
    Removed,
    /// Present in both
    Unchanged,
}

/// One line of a diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineChange {
    /// Added, removed, or unchanged
    pub kind: ChangeKind,
    /// Line text without its trailing newline
    pub text: String,
}

/// Compute line-level changes turning `current` into `proposed`.
///
/// # Examples
///
/// ```rust
/// use update_conf::report::{ChangeKind, diff_lines};
///
/// let changes = diff_lines("a\nb\n", "a\nc\n");
/// let kinds: Vec<_> = changes.iter().map(|c| c.kind).collect();
/// assert_eq!(kinds, vec![ChangeKind::Unchanged, ChangeKind::Removed, ChangeKind::Added]);
/// ```
pub fn diff_lines(current: &str, proposed: &str) -> Vec<LineChange> {
    TextDiff::from_lines(current, proposed)
        .iter_all_changes()
        .map(|change| LineChange {
            kind: match change.tag() {
                ChangeTag::Insert => ChangeKind::Added,
                ChangeTag::Delete => ChangeKind::Removed,
                ChangeTag::Equal => ChangeKind::Unchanged,
            },
            text: change.value().trim_end_matches(['\r', '\n']).to_string(),
        })
        .collect()
}

/// A printable unified diff of the target before and after an update.
pub struct DiffReport<'a> {
    current: &'a str,
    proposed: &'a str,
    from_label: String,
    to_label: String,
    context: usize,
}

impl<'a> DiffReport<'a> {
    /// Report comparing `current` with `proposed`.
    pub fn new(current: &'a str, proposed: &'a str) -> Self {
        Self {
            current,
            proposed,
            from_label: "current".to_string(),
            to_label: "proposed".to_string(),
            context: DEFAULT_CONTEXT,
        }
    }

    /// Set the `---`/`+++` header labels.
    pub fn with_labels(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.from_label = from.into();
        self.to_label = to.into();
        self
    }

    /// Set the number of context lines around each hunk.
    pub fn with_context(mut self, lines: usize) -> Self {
        self.context = lines;
        self
    }

    /// Every line with its change kind.
    pub fn changes(&self) -> Vec<LineChange> {
        diff_lines(self.current, self.proposed)
    }

    /// Number of (added, removed) lines.
    pub fn counts(&self) -> (usize, usize) {
        self.changes()
            .iter()
            .fold((0, 0), |(added, removed), change| match change.kind {
                ChangeKind::Added => (added + 1, removed),
                ChangeKind::Removed => (added, removed + 1),
                ChangeKind::Unchanged => (added, removed),
            })
    }
}

impl fmt::Display for DiffReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let diff = TextDiff::from_lines(self.current, self.proposed);
        let mut unified = diff.unified_diff();
        unified
            .context_radius(self.context)
            .header(&self.from_label, &self.to_label);
        write!(f, "{}", unified)
    }
}
