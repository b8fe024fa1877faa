use anyhow::{Context, Result};
use git2::{Oid, Repository};
use std::path::{Path, PathBuf};

pub struct RepoCache {
    repo: Repository,
    path: PathBuf,
}

impl RepoCache {
    pub fn open(path: &Path) -> Result<Self> {
        let repo =
            Repository::discover(path).context("Not a git repository (or any parent directory)")?;
        let path = repo
            .workdir()
            .unwrap_or_else(|| repo.path())
            .to_path_buf();
        Ok(Self { repo, path })
    }

    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    /// Stash iteration needs exclusive access.
    pub fn repo_mut(&mut self) -> &mut Repository {
        &mut self.repo
    }

    /// Working tree root, or the git dir for bare repositories.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    pub fn resolve_commit(&self, rev: &str) -> Result<Oid> {
        let obj = self
            .repo
            .revparse_single(rev)
            .with_context(|| format!("Could not resolve: {rev}"))?;
        let commit = obj
            .peel_to_commit()
            .with_context(|| format!("{rev} does not point to a commit"))?;
        Ok(commit.id())
    }
}
