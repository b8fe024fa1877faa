use std::collections::HashMap;
use std::time::Instant;

use anyhow::{Context, Result};
use git2::{ErrorCode, Oid, Repository, Revwalk, Sort};
use tracing::debug;

use crate::schema::{Commit, CommitInfo, DateResult, RefInfo};

/// Loads up to `num` revisions reachable from any branch, remote branch, tag
/// or HEAD, newest first with children before their parents.
pub fn load_commits(repo: &Repository, refs: &[RefInfo], num: usize) -> Result<Vec<Commit>> {
    let now = Instant::now();

    let mut walk = repo.revwalk()?;
    walk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
    walk.push_glob("refs/heads")?;
    walk.push_glob("refs/remotes")?;
    walk.push_glob("refs/tags")?;
    // Covers a detached HEAD; an unborn one has nothing to push.
    if repo.head().is_ok() {
        walk.push_head()?;
    }

    let refs_by_commit = group_refs(refs);

    let mut commits = Vec::new();
    for (index, oid) in walk.take(num).enumerate() {
        commits.push(read_commit(repo, oid?, index, &refs_by_commit)?);
    }

    debug!(
        count = commits.len(),
        elapsed_ms = now.elapsed().as_millis() as u64,
        "loaded commits"
    );

    Ok(commits)
}

/// The commit HEAD points to, or `None` for an unborn HEAD.
pub fn load_head_commit(repo: &Repository, refs: &[RefInfo]) -> Result<Option<Commit>> {
    let head = match repo.head() {
        Ok(head) => head,
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    let oid = head.peel_to_commit()?.id();
    read_commit(repo, oid, 0, &group_refs(refs)).map(Some)
}

/// The newest commit of `branch` (any revision name git understands), or
/// `None` when it does not exist.
pub fn load_top_commit(repo: &Repository, refs: &[RefInfo], branch: &str) -> Result<Option<Commit>> {
    let obj = match repo.revparse_single(branch) {
        Ok(obj) => obj,
        Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("Could not resolve: {branch}")),
    };
    let oid = obj
        .peel_to_commit()
        .with_context(|| format!("{branch} does not point to a commit"))?
        .id();
    read_commit(repo, oid, 0, &group_refs(refs)).map(Some)
}

/// Ids reachable from `to` but not from `from`, read straight from the object
/// database. Used when either end is outside a loaded listing.
pub fn ids_between(repo: &Repository, from: Oid, to: Oid) -> Result<Vec<String>> {
    let mut walk = repo.revwalk()?;
    walk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
    walk.push(to)?;
    walk.hide(from)?;
    collect_ids(walk)
}

/// Ids reachable from HEAD that no remote branch contains.
pub fn unpushed_ids(repo: &Repository) -> Result<Vec<String>> {
    if repo.head().is_err() {
        return Ok(Vec::new());
    }
    let mut walk = repo.revwalk()?;
    walk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
    walk.push_head()?;
    walk.hide_glob("refs/remotes")?;
    collect_ids(walk)
}

fn collect_ids(walk: Revwalk<'_>) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    for oid in walk {
        ids.push(oid?.to_string());
    }
    Ok(ids)
}

fn group_refs(refs: &[RefInfo]) -> HashMap<&str, Vec<RefInfo>> {
    let mut refs_by_commit: HashMap<&str, Vec<RefInfo>> = HashMap::new();
    for r in refs {
        refs_by_commit
            .entry(r.commit_id.as_str())
            .or_default()
            .push(r.clone());
    }
    refs_by_commit
}

fn read_commit(
    repo: &Repository,
    oid: Oid,
    index: usize,
    refs_by_commit: &HashMap<&str, Vec<RefInfo>>,
) -> Result<Commit> {
    let commit = repo
        .find_commit(oid)
        .with_context(|| format!("Could not read commit {oid}"))?;
    let id = oid.to_string();
    let author = commit.author();

    Ok(Commit::from_info(CommitInfo {
        author: author.name().unwrap_or_default().to_string(),
        email: author.email().unwrap_or_default().to_string(),
        date: DateResult::from_git_time(commit.time()),
        refs: refs_by_commit.get(id.as_str()).cloned().unwrap_or_default(),
        id,
        index,
        parent_ids: commit.parent_ids().map(|p| p.to_string()).collect(),
        message: commit.message().unwrap_or_default().trim_end().to_string(),
        stash_id: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::refs::load_refs;
    use crate::git::test_repo::TestRepo;

    fn load(repo: &TestRepo, num: usize) -> Vec<Commit> {
        let refs = load_refs(repo.repo()).unwrap();
        load_commits(repo.repo(), &refs, num).unwrap()
    }

    #[test]
    fn test_empty_repository() {
        let repo = TestRepo::new();
        assert!(load(&repo, 10).is_empty());
    }

    #[test]
    fn test_linear_history() {
        let repo = TestRepo::new();
        let a = repo.commit_file("f.txt", "1\n", "first");
        let b = repo.commit_file("f.txt", "2\n", "second\n\nbody text\n");

        let commits = load(&repo, 10);
        assert_eq!(commits.len(), 2);

        assert_eq!(commits[0].id, b.to_string());
        assert_eq!(commits[0].index, 0);
        assert_eq!(commits[0].parent_ids, vec![a.to_string()]);
        assert_eq!(commits[0].message, "second\n\nbody text");
        assert_eq!(commits[0].author, "Ada Lovelace");
        assert_eq!(commits[0].email, "ada@example.com");
        assert_eq!(commits[0].date.adjustment, 60);
        assert_eq!(commits[0].refs.len(), 1);
        assert!(commits[0].refs[0].head);

        let root = &commits[1];
        assert_eq!(root.index, 1);
        assert!(root.parent_ids.is_empty());
        assert!(!root.is_merge);
        assert!(root.refs.is_empty());

        for c in &commits {
            assert!(c.validate().is_ok());
        }
    }

    #[test]
    fn test_limit() {
        let repo = TestRepo::new();
        for i in 0..5 {
            repo.commit_file("f.txt", &format!("{i}\n"), &format!("c{i}"));
        }
        let commits = load(&repo, 3);
        assert_eq!(commits.len(), 3);
        assert_eq!(commits[2].message, "c2");
    }

    #[test]
    fn test_merge_and_side_branch() {
        let repo = TestRepo::new();
        let base = repo.commit_file("f.txt", "base\n", "base");
        let main = repo.head_branch();

        repo.branch("side", base);
        repo.checkout("side");
        let side = repo.commit_file("side.txt", "side\n", "side work");

        repo.checkout(&main);
        repo.commit_file("f.txt", "main\n", "main work");
        let merge = repo.commit_index("merge side", Some(side));

        let commits = load(&repo, 100);
        assert_eq!(commits.len(), 4);
        assert_eq!(commits[0].id, merge.to_string());
        assert!(commits[0].is_merge);
        assert_eq!(commits[0].parent_ids.len(), 2);
        assert_eq!(commits.last().unwrap().id, base.to_string());

        let side_commit = commits.iter().find(|c| c.id == side.to_string()).unwrap();
        assert!(side_commit.refs.iter().any(|r| r.short_name == "side"));

        for (i, c) in commits.iter().enumerate() {
            assert_eq!(c.index, i);
            assert_eq!(c.is_merge, c.parent_ids.len() > 1);
        }
    }

    #[test]
    fn test_unmerged_branch_is_included() {
        let repo = TestRepo::new();
        let base = repo.commit_file("f.txt", "base\n", "base");
        let main = repo.head_branch();
        repo.branch("topic", base);
        repo.checkout("topic");
        let topic = repo.commit_file("t.txt", "t\n", "topic only");
        repo.checkout(&main);

        let commits = load(&repo, 100);
        assert!(commits.iter().any(|c| c.id == topic.to_string()));
    }

    #[test]
    fn test_head_commit() {
        let repo = TestRepo::new();
        assert!(load_head_commit(repo.repo(), &[]).unwrap().is_none());

        repo.commit_file("f.txt", "1\n", "first");
        let b = repo.commit_file("f.txt", "2\n", "second");
        let refs = load_refs(repo.repo()).unwrap();

        let head = load_head_commit(repo.repo(), &refs).unwrap().unwrap();
        assert_eq!(head.id, b.to_string());
        assert_eq!(head.index, 0);
        assert_eq!(head.message, "second");
        assert!(head.refs.iter().any(|r| r.head));
    }

    #[test]
    fn test_top_commit_for_branch() {
        let repo = TestRepo::new();
        let base = repo.commit_file("f.txt", "base\n", "base");
        repo.commit_file("f.txt", "main\n", "main work");
        repo.branch("topic", base);
        let refs = load_refs(repo.repo()).unwrap();

        let top = load_top_commit(repo.repo(), &refs, "topic").unwrap().unwrap();
        assert_eq!(top.id, base.to_string());
        assert!(top.refs.iter().any(|r| r.short_name == "topic"));

        assert!(load_top_commit(repo.repo(), &refs, "no-such-branch")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_ids_between_walks_full_history() {
        let repo = TestRepo::new();
        let a = repo.commit_file("f.txt", "1\n", "a");
        let b = repo.commit_file("f.txt", "2\n", "b");
        let c = repo.commit_file("f.txt", "3\n", "c");

        let ids = ids_between(repo.repo(), a, c).unwrap();
        assert_eq!(ids, vec![c.to_string(), b.to_string()]);
        assert!(ids_between(repo.repo(), c, a).unwrap().is_empty());
    }

    #[test]
    fn test_unpushed_ids() {
        let repo = TestRepo::new();
        let a = repo.commit_file("f.txt", "1\n", "a");
        let b = repo.commit_file("f.txt", "2\n", "b");
        let c = repo.commit_file("f.txt", "3\n", "c");

        assert_eq!(unpushed_ids(repo.repo()).unwrap().len(), 3);

        repo.remote_branch("origin", &repo.head_branch(), a);
        assert_eq!(
            unpushed_ids(repo.repo()).unwrap(),
            vec![c.to_string(), b.to_string()]
        );
    }
}
