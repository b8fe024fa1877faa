//! Hiding revisions from a history listing behind placeholder records.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::graph::{commit_map, find_commit_ancestors};
use crate::schema::{Commit, RefInfo};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum CommitFilter {
    /// Author name or email contains the text.
    Author(String),
    /// Message contains the text, ignoring case.
    Message(String),
    /// Reachable from a branch with this short name.
    Branch(String),
}

/// Keeps the commits that match every filter and collapses each run of
/// hidden commits into a single placeholder, then renumbers `index`.
pub fn apply_commit_filters(
    commits: Vec<Commit>,
    refs: &[RefInfo],
    filters: &[CommitFilter],
) -> Vec<Commit> {
    if filters.is_empty() {
        return commits;
    }

    let visible: Vec<bool> = {
        let branch_sets: Vec<Option<HashSet<String>>> = filters
            .iter()
            .map(|f| match f {
                CommitFilter::Branch(name) => Some(branch_members(&commits, refs, name)),
                _ => None,
            })
            .collect();

        commits
            .iter()
            .map(|c| {
                filters
                    .iter()
                    .zip(&branch_sets)
                    .all(|(f, members)| matches_filter(c, f, members.as_ref()))
            })
            .collect()
    };

    let mut result = Vec::with_capacity(commits.len());
    let mut hidden: Vec<Commit> = Vec::new();

    for (commit, keep) in commits.into_iter().zip(visible) {
        if keep {
            result.extend(Commit::placeholder(&hidden));
            hidden.clear();
            result.push(commit);
        } else {
            hidden.push(commit);
        }
    }
    result.extend(Commit::placeholder(&hidden));

    for (i, c) in result.iter_mut().enumerate() {
        c.index = i;
    }

    result
}

fn matches_filter(
    commit: &Commit,
    filter: &CommitFilter,
    branch: Option<&HashSet<String>>,
) -> bool {
    match filter {
        CommitFilter::Author(text) => commit.author.contains(text) || commit.email.contains(text),
        CommitFilter::Message(text) => commit
            .message
            .to_lowercase()
            .contains(&text.to_lowercase()),
        CommitFilter::Branch(_) => branch.is_some_and(|ids| ids.contains(&commit.id)),
    }
}

/// Tips of every branch (local or remote) called `short_name` plus all of
/// their loaded ancestors.
fn branch_members(commits: &[Commit], refs: &[RefInfo], short_name: &str) -> HashSet<String> {
    let map = commit_map(commits);
    let mut members = HashSet::new();

    for r in refs
        .iter()
        .filter(|r| (r.is_local_branch() || r.is_remote_branch()) && r.short_name == short_name)
    {
        if let Some(&tip) = map.get(r.commit_id.as_str()) {
            members.insert(tip.id.clone());
            members.extend(
                find_commit_ancestors(tip, &map)
                    .into_iter()
                    .map(str::to_string),
            );
        }
    }

    members
}
