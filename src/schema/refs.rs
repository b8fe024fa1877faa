use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefType {
    Branch,
    Tag,
    Stash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefLocation {
    Local,
    Remote,
}

/// A branch, tag or stash pointing at a revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefInfo {
    /// Full ref name, unique within a repository.
    pub id: String,
    pub location: RefLocation,
    pub full_name: String,
    pub short_name: String,
    pub remote_name: Option<String>,
    /// Local branch <-> remote branch with the same short name.
    pub sibling_id: Option<String>,
    pub ref_type: RefType,
    pub head: bool,
    pub commit_id: String,
    /// Target commit time, epoch ms.
    pub time: i64,
}

impl RefInfo {
    pub fn is_local_branch(&self) -> bool {
        self.ref_type == RefType::Branch && self.location == RefLocation::Local
    }

    pub fn is_remote_branch(&self) -> bool {
        self.ref_type == RefType::Branch && self.location == RefLocation::Remote
    }
}
