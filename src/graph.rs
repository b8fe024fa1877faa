//! Ancestry queries over an already loaded history listing.

use std::collections::{HashMap, HashSet};

use crate::schema::{Commit, RefInfo};

pub fn commit_map(commits: &[Commit]) -> HashMap<&str, &Commit> {
    commits.iter().map(|c| (c.id.as_str(), c)).collect()
}

/// Every loaded ancestor of `commit`, excluding the commit itself. Parents
/// outside the loaded range are included by id but not followed.
pub fn find_commit_ancestors<'a>(
    commit: &'a Commit,
    commits: &HashMap<&str, &'a Commit>,
) -> HashSet<&'a str> {
    let mut ancestors: HashSet<&'a str> = HashSet::new();
    let mut stack: Vec<&'a str> = commit.parent_ids.iter().map(String::as_str).collect();

    while let Some(id) = stack.pop() {
        if !ancestors.insert(id) {
            continue;
        }
        if let Some(&c) = commits.get(id) {
            stack.extend(c.parent_ids.iter().map(String::as_str));
        }
    }

    ancestors
}

/// Whether `candidate_id` is a proper ancestor of `commit_id`. `false` when
/// `commit_id` is not loaded.
pub fn commit_is_ancestor(commits: &[Commit], commit_id: &str, candidate_id: &str) -> bool {
    let map = commit_map(commits);
    match map.get(commit_id) {
        Some(commit) => find_commit_ancestors(commit, &map).contains(candidate_id),
        None => false,
    }
}

/// Ids reachable from `to` but not from `from` (`from..to`), in listing
/// order. `None` when either end is outside the loaded range.
pub fn commit_ids_between(commits: &[Commit], from: &str, to: &str) -> Option<Vec<String>> {
    let map = commit_map(commits);
    let from_commit = map.get(from)?;
    let to_commit = map.get(to)?;

    let mut excluded = find_commit_ancestors(from_commit, &map);
    excluded.insert(from_commit.id.as_str());

    let mut included = find_commit_ancestors(to_commit, &map);
    included.insert(to_commit.id.as_str());

    Some(
        commits
            .iter()
            .filter(|c| included.contains(c.id.as_str()) && !excluded.contains(c.id.as_str()))
            .map(|c| c.id.clone())
            .collect(),
    )
}

/// The branch HEAD is on, if any.
pub fn find_head_ref(refs: &[RefInfo]) -> Option<&RefInfo> {
    refs.iter().find(|r| r.head)
}

/// The other copy of a branch: the remote-tracking ref of a local branch or
/// the local branch of a remote one.
pub fn find_sibling_ref<'a>(r: &RefInfo, refs: &'a [RefInfo]) -> Option<&'a RefInfo> {
    let sibling_id = r.sibling_id.as_deref()?;
    refs.iter().find(|o| o.id == sibling_id)
}

/// Ids on the HEAD branch that its remote copy does not have. `None` when
/// there is no HEAD branch, it has no remote copy, or either tip is outside
/// the loaded range.
pub fn unpushed_commit_ids(commits: &[Commit], refs: &[RefInfo]) -> Option<Vec<String>> {
    let head = find_head_ref(refs)?;
    let remote = find_sibling_ref(head, refs)?;
    commit_ids_between(commits, &remote.commit_id, &head.commit_id)
}
