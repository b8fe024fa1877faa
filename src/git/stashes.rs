use anyhow::{Context, Result};
use git2::{Oid, Repository};
use tracing::debug;

use crate::schema::{Commit, CommitInfo, DateResult, RefInfo, RefLocation, RefType};

/// Reads `refs/stash` as commit records, newest stash first.
///
/// Only the first parent is kept, so a stash shows up as a side node hanging
/// off the revision it was taken on rather than as a merge with its index
/// and untracked-file commits.
pub fn load_stashes(repo: &mut Repository) -> Result<Vec<Commit>> {
    let mut entries: Vec<(usize, String, Oid)> = Vec::new();
    repo.stash_foreach(|index, message, oid| {
        entries.push((index, message.to_string(), *oid));
        true
    })?;

    let mut stashes = Vec::with_capacity(entries.len());
    for (index, message, oid) in entries {
        let commit = repo
            .find_commit(oid)
            .with_context(|| format!("Could not read stash commit {oid}"))?;
        let id = oid.to_string();
        let stash_id = format!("stash@{{{index}}}");
        let date = DateResult::from_git_time(commit.time());
        let author = commit.author();

        let stash_ref = RefInfo {
            id: format!("refs/{stash_id}"),
            location: RefLocation::Local,
            full_name: "refs/stash".to_string(),
            short_name: stash_id.clone(),
            remote_name: None,
            sibling_id: None,
            ref_type: RefType::Stash,
            head: false,
            commit_id: id.clone(),
            time: date.ms,
        };

        stashes.push(Commit::from_info(CommitInfo {
            author: author.name().unwrap_or_default().to_string(),
            email: author.email().unwrap_or_default().to_string(),
            date,
            id,
            index,
            parent_ids: commit
                .parent_ids()
                .take(1)
                .map(|p| p.to_string())
                .collect(),
            message,
            stash_id: Some(stash_id),
            refs: vec![stash_ref],
        }));
    }

    debug!(count = stashes.len(), "loaded stashes");

    Ok(stashes)
}

/// Interleaves stashes into a history listing by date and renumbers `index`.
///
/// Each stash goes in front of the first revision that is not newer than it,
/// and never below the revision it was taken on. The relative order of the
/// revisions themselves never changes.
pub fn merge_stashes(commits: Vec<Commit>, mut stashes: Vec<Commit>) -> Vec<Commit> {
    stashes.sort_by(|a, b| b.date.ms.cmp(&a.date.ms));

    let mut merged = Vec::with_capacity(commits.len() + stashes.len());
    let mut pending = stashes.into_iter().peekable();

    for commit in commits {
        while let Some(stash) = pending.next_if(|s| {
            s.date.ms >= commit.date.ms || s.parent_ids.first() == Some(&commit.id)
        }) {
            merged.push(stash);
        }
        merged.push(commit);
    }
    merged.extend(pending);

    for (i, c) in merged.iter_mut().enumerate() {
        c.index = i;
    }

    merged
}
