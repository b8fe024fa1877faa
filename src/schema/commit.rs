use serde::{Deserialize, Serialize};

use super::date::DateResult;
use super::refs::RefInfo;
use crate::error::{Invariant, RecordKind, SchemaViolation};

/// Revision data as read from the repository, before list-level fields
/// (`is_merge`, `filtered`, `num_skipped`) are settled.
#[derive(Debug, Clone)]
pub struct CommitInfo {
    pub author: String,
    pub email: String,
    pub date: DateResult,
    pub id: String,
    pub index: usize,
    pub parent_ids: Vec<String>,
    pub message: String,
    pub stash_id: Option<String>,
    pub refs: Vec<RefInfo>,
}

/// One entry of a history listing handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    pub author: String,
    pub email: String,
    pub date: DateResult,
    pub id: String,
    pub index: usize,
    pub parent_ids: Vec<String>,
    pub is_merge: bool,
    pub message: String,
    pub stash_id: Option<String>,
    pub refs: Vec<RefInfo>,

    pub filtered: bool,
    pub num_skipped: u32,
}

impl Commit {
    pub fn from_info(info: CommitInfo) -> Self {
        Self {
            is_merge: info.parent_ids.len() > 1,
            author: info.author,
            email: info.email,
            date: info.date,
            id: info.id,
            index: info.index,
            parent_ids: info.parent_ids,
            message: info.message,
            stash_id: info.stash_id,
            refs: info.refs,
            filtered: false,
            num_skipped: 0,
        }
    }

    /// Placeholder standing in for a run of hidden revisions.
    ///
    /// Takes its id and date from the first hidden revision and its parents
    /// from the last one, so the graph stays connected. Returns `None` for an
    /// empty run.
    pub fn placeholder(hidden: &[Commit]) -> Option<Self> {
        let first = hidden.first()?;
        let last = hidden.last()?;
        let num_skipped = hidden
            .iter()
            .map(|c| c.num_skipped.max(1))
            .fold(0u32, u32::saturating_add);

        Some(Self {
            author: String::new(),
            email: String::new(),
            date: first.date,
            id: first.id.clone(),
            index: first.index,
            parent_ids: last.parent_ids.clone(),
            is_merge: last.parent_ids.len() > 1,
            message: String::new(),
            stash_id: None,
            refs: Vec::new(),
            filtered: true,
            num_skipped,
        })
    }

    pub fn is_stash(&self) -> bool {
        self.stash_id.is_some()
    }

    pub fn validate(&self) -> Result<(), SchemaViolation> {
        let violation = |rule| SchemaViolation::Invariant {
            record: RecordKind::Commit,
            position: self.id.clone(),
            rule,
        };

        let parents = self.parent_ids.len();
        if self.is_merge != (parents > 1) {
            return Err(violation(Invariant::MergeFlag {
                parents,
                is_merge: self.is_merge,
            }));
        }
        if !self.filtered && self.num_skipped != 0 {
            return Err(violation(Invariant::SkippedWithoutFilter {
                num_skipped: self.num_skipped,
            }));
        }
        if self.filtered && self.num_skipped == 0 {
            return Err(violation(Invariant::EmptyPlaceholder));
        }
        Ok(())
    }
}
