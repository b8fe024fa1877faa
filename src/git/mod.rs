pub mod history;
pub mod hunks;
pub mod refs;
pub mod repository;
pub mod stashes;

#[cfg(test)]
pub(crate) mod test_repo;

pub use hunks::{DiffTarget, HunkEngine, HunkOptions};
pub use repository::RepoCache;
