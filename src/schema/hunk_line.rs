use serde::{Deserialize, Serialize};

use crate::error::{Invariant, RecordKind, SchemaViolation};

/// Which side(s) of the diff a line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HunkLineStatus {
    #[serde(rename = "+")]
    Added,
    #[serde(rename = "-")]
    Removed,
    #[serde(rename = " ")]
    Unchanged,
}

impl HunkLineStatus {
    /// Maps a libgit2 line origin marker. File and hunk headers and the
    /// end-of-file newline markers have no status.
    pub fn from_origin(origin: char) -> Option<Self> {
        match origin {
            '+' => Some(HunkLineStatus::Added),
            '-' => Some(HunkLineStatus::Removed),
            ' ' => Some(HunkLineStatus::Unchanged),
            _ => None,
        }
    }

    pub fn marker(&self) -> char {
        match self {
            HunkLineStatus::Added => '+',
            HunkLineStatus::Removed => '-',
            HunkLineStatus::Unchanged => ' ',
        }
    }
}

/// One displayed line of a diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HunkLine {
    pub status: HunkLineStatus,
    pub old_num: Option<u32>,
    pub new_num: Option<u32>,
    pub hunk_index: u32,
    pub text: String,
    pub index: usize,
    pub line_ending: String,
}

impl HunkLine {
    /// Builds a line from its raw content, terminator included.
    pub fn new(
        status: HunkLineStatus,
        old_num: Option<u32>,
        new_num: Option<u32>,
        hunk_index: u32,
        raw: &str,
        index: usize,
    ) -> Result<Self, SchemaViolation> {
        let (text, line_ending) = split_line_ending(raw);
        let line = Self {
            status,
            old_num,
            new_num,
            hunk_index,
            text: text.to_string(),
            index,
            line_ending: line_ending.to_string(),
        };
        line.validate()?;
        Ok(line)
    }

    pub fn validate(&self) -> Result<(), SchemaViolation> {
        if self.old_num.is_none() && self.new_num.is_none() {
            return Err(SchemaViolation::Invariant {
                record: RecordKind::HunkLine,
                position: format!("line {}", self.index),
                rule: Invariant::NoLineNumbers,
            });
        }
        Ok(())
    }
}

/// Splits a line into content and its terminator (`"\r\n"`, `"\n"` or `""`).
pub fn split_line_ending(raw: &str) -> (&str, &str) {
    if let Some(text) = raw.strip_suffix("\r\n") {
        (text, &raw[text.len()..])
    } else if let Some(text) = raw.strip_suffix('\n') {
        (text, &raw[text.len()..])
    } else {
        (raw, "")
    }
}
