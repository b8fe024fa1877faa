//! Errors raised at the record boundary.

use std::fmt;

use thiserror::Error;

/// Which record shape a violation was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Commit,
    HunkLine,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Commit => write!(f, "Commit"),
            RecordKind::HunkLine => write!(f, "HunkLine"),
        }
    }
}

/// Cross-field rules a record must satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invariant {
    /// `isMerge` disagrees with the number of parents.
    MergeFlag { parents: usize, is_merge: bool },
    /// A real (unfiltered) revision claims to stand in for skipped ones.
    SkippedWithoutFilter { num_skipped: u32 },
    /// A placeholder that hides nothing.
    EmptyPlaceholder,
    /// A diff line on neither side of the diff.
    NoLineNumbers,
}

impl fmt::Display for Invariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invariant::MergeFlag { parents, is_merge } => write!(
                f,
                "isMerge is {is_merge} but the revision has {parents} parent(s)"
            ),
            Invariant::SkippedWithoutFilter { num_skipped } => write!(
                f,
                "numSkipped is {num_skipped} on a record that is not filtered"
            ),
            Invariant::EmptyPlaceholder => write!(f, "filtered placeholder skips no revisions"),
            Invariant::NoLineNumbers => write!(f, "oldNum and newNum are both absent"),
        }
    }
}

/// A record that failed to decode or broke one of its invariants.
#[derive(Error, Debug)]
pub enum SchemaViolation {
    /// Missing required field, wrong value type or unparseable input.
    #[error("malformed {record} record: {source}")]
    Malformed {
        record: RecordKind,
        #[source]
        source: serde_json::Error,
    },

    /// Structurally valid record whose fields contradict each other.
    #[error("{record} {position}: {rule}")]
    Invariant {
        record: RecordKind,
        position: String,
        rule: Invariant,
    },
}

impl SchemaViolation {
    pub fn record(&self) -> RecordKind {
        match self {
            SchemaViolation::Malformed { record, .. } => *record,
            SchemaViolation::Invariant { record, .. } => *record,
        }
    }

    /// The broken rule, if this was an invariant violation.
    pub fn rule(&self) -> Option<&Invariant> {
        match self {
            SchemaViolation::Malformed { .. } => None,
            SchemaViolation::Invariant { rule, .. } => Some(rule),
        }
    }
}
