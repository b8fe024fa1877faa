use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::filter::{apply_commit_filters, CommitFilter};
use crate::git::history::load_commits;
use crate::git::refs::load_refs;
use crate::git::stashes::{load_stashes, merge_stashes};
use crate::git::RepoCache;
use crate::schema::{Commit, RefInfo};

#[derive(Debug, Clone)]
pub struct HistoryOptions {
    pub num_commits: usize,
    pub skip_stashes: bool,
    pub filters: Vec<CommitFilter>,
}

/// A history listing and the refs it was built from.
#[derive(Debug, Clone, Serialize)]
pub struct History {
    pub commits: Vec<Commit>,
    pub refs: Vec<RefInfo>,
}

/// Loads refs, commits and stashes on blocking tasks (stashes in parallel with
/// the rest), merges them and applies the filters.
pub async fn load_history(repo_path: PathBuf, options: HistoryOptions) -> Result<History> {
    let now = Instant::now();
    let num_commits = options.num_commits;

    let commits_path = repo_path.clone();
    let commits_task = tokio::task::spawn_blocking(move || -> Result<(Vec<Commit>, Vec<RefInfo>)> {
        let repo = RepoCache::open(&commits_path)?;
        let refs = load_refs(repo.repo())?;
        let commits = load_commits(repo.repo(), &refs, num_commits)?;
        Ok((commits, refs))
    });

    let stashes_task = if options.skip_stashes {
        None
    } else {
        Some(tokio::task::spawn_blocking(move || -> Result<Vec<Commit>> {
            let mut repo = RepoCache::open(&repo_path)?;
            load_stashes(repo.repo_mut())
        }))
    };

    let (commits, refs) = match commits_task
        .await
        .context("Commit loader panicked")
        .and_then(|r| r)
    {
        Ok(loaded) => loaded,
        Err(e) => {
            if let Some(task) = stashes_task {
                task.abort();
            }
            return Err(e);
        }
    };

    let commits = match stashes_task {
        Some(task) => {
            let stashes = task.await.context("Stash loader panicked")??;
            merge_stashes(commits, stashes)
        }
        None => commits,
    };

    let commits = apply_commit_filters(commits, &refs, &options.filters);

    info!(
        commits = commits.len(),
        refs = refs.len(),
        elapsed_ms = now.elapsed().as_millis() as u64,
        "history loaded"
    );
    debug!(filters = ?options.filters, skip_stashes = options.skip_stashes, "history options");

    Ok(History { commits, refs })
}
