//! Throwaway repositories for tests.

use std::cell::Cell;
use std::path::Path;

use git2::{Oid, Repository, Signature, Time};
use tempfile::TempDir;

pub const START_TIME: i64 = 1_700_000_000;

pub struct TestRepo {
    dir: TempDir,
    repo: Repository,
    clock: Cell<i64>,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        Self {
            dir,
            repo,
            clock: Cell::new(START_TIME),
        }
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    pub fn repo_mut(&mut self) -> &mut Repository {
        &mut self.repo
    }

    /// Each signature is one minute later than the previous one.
    pub fn signature(&self) -> Signature<'static> {
        let now = self.clock.get();
        self.clock.set(now + 60);
        Signature::new("Ada Lovelace", "ada@example.com", &Time::new(now, 60)).unwrap()
    }

    pub fn write(&self, path: &str, contents: &str) {
        let full = self.dir().join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full, contents).unwrap();
    }

    pub fn head_branch(&self) -> String {
        self.repo.head().unwrap().shorthand().unwrap().to_string()
    }

    /// Writes, stages and commits one file on top of HEAD.
    pub fn commit_file(&self, path: &str, contents: &str, message: &str) -> Oid {
        self.write(path, contents);
        let mut index = self.repo.index().unwrap();
        index.add_path(Path::new(path)).unwrap();
        index.write().unwrap();
        self.commit_index(message, None)
    }

    /// Commits the current index on HEAD, optionally as a merge with `other`.
    pub fn commit_index(&self, message: &str, other: Option<Oid>) -> Oid {
        let mut index = self.repo.index().unwrap();
        let tree = self.repo.find_tree(index.write_tree().unwrap()).unwrap();

        let mut parents = Vec::new();
        if let Ok(head) = self.repo.head() {
            parents.push(head.peel_to_commit().unwrap());
        }
        if let Some(oid) = other {
            parents.push(self.repo.find_commit(oid).unwrap());
        }
        let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();

        let sig = self.signature();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
            .unwrap()
    }

    pub fn branch(&self, name: &str, target: Oid) {
        let commit = self.repo.find_commit(target).unwrap();
        self.repo.branch(name, &commit, true).unwrap();
    }

    pub fn tag(&self, name: &str, target: Oid) {
        let obj = self.repo.find_object(target, None).unwrap();
        self.repo.tag_lightweight(name, &obj, true).unwrap();
    }

    pub fn remote_branch(&self, remote: &str, name: &str, target: Oid) {
        self.repo
            .reference(
                &format!("refs/remotes/{remote}/{name}"),
                target,
                true,
                "test remote",
            )
            .unwrap();
    }

    /// Moves HEAD to `branch` and resets the working tree to it.
    pub fn checkout(&self, branch: &str) {
        self.repo.set_head(&format!("refs/heads/{branch}")).unwrap();
        self.repo
            .checkout_head(Some(git2::build::CheckoutBuilder::new().force()))
            .unwrap();
    }

    pub fn stash(&mut self, message: &str) -> Oid {
        let sig = self.signature();
        self.repo.stash_save(&sig, message, None).unwrap()
    }
}
