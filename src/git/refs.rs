use anyhow::Result;
use git2::Repository;
use tracing::{debug, warn};

use crate::schema::{DateResult, RefInfo, RefLocation, RefType};

/// Where a ref name lives, split out of its full name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefName {
    pub location: RefLocation,
    pub ref_type: RefType,
    pub remote_name: Option<String>,
    pub short_name: String,
}

/// Classifies a full ref name. Returns `None` for refs that are not shown
/// alongside commits (`refs/stash`, notes, `<remote>/HEAD`).
pub fn classify_ref_name(full_name: &str) -> Option<RefName> {
    if let Some(short) = full_name.strip_prefix("refs/heads/") {
        return Some(RefName {
            location: RefLocation::Local,
            ref_type: RefType::Branch,
            remote_name: None,
            short_name: short.to_string(),
        });
    }
    if let Some(rest) = full_name.strip_prefix("refs/remotes/") {
        let (remote, short) = rest.split_once('/')?;
        if short == "HEAD" || short.is_empty() {
            return None;
        }
        return Some(RefName {
            location: RefLocation::Remote,
            ref_type: RefType::Branch,
            remote_name: Some(remote.to_string()),
            short_name: short.to_string(),
        });
    }
    if let Some(short) = full_name.strip_prefix("refs/tags/") {
        return Some(RefName {
            location: RefLocation::Local,
            ref_type: RefType::Tag,
            remote_name: None,
            short_name: short.to_string(),
        });
    }
    None
}

/// Fills `sibling_id` for branches that exist both locally and on a remote.
/// A local branch prefers the `origin` copy when several remotes carry it.
pub fn link_siblings(refs: &mut [RefInfo]) {
    let siblings: Vec<Option<String>> = refs
        .iter()
        .map(|r| {
            if r.is_local_branch() {
                let mut remotes = refs
                    .iter()
                    .filter(|o| o.is_remote_branch() && o.short_name == r.short_name);
                let first = remotes.next()?;
                let origin = std::iter::once(first)
                    .chain(remotes)
                    .find(|o| o.remote_name.as_deref() == Some("origin"));
                Some(origin.unwrap_or(first).id.clone())
            } else if r.is_remote_branch() {
                refs.iter()
                    .find(|o| o.is_local_branch() && o.short_name == r.short_name)
                    .map(|o| o.id.clone())
            } else {
                None
            }
        })
        .collect();

    for (r, sibling) in refs.iter_mut().zip(siblings) {
        r.sibling_id = sibling;
    }
}

pub fn load_refs(repo: &Repository) -> Result<Vec<RefInfo>> {
    let head_name = repo
        .head()
        .ok()
        .filter(|h| h.is_branch())
        .and_then(|h| h.name().map(str::to_string));

    let mut refs = Vec::new();

    for reference in repo.references()? {
        let reference = reference?;
        let Some(full_name) = reference.name() else {
            continue;
        };
        let Some(name) = classify_ref_name(full_name) else {
            continue;
        };
        let commit = match reference.peel_to_commit() {
            Ok(c) => c,
            Err(e) => {
                warn!(ref_name = full_name, error = %e, "ref does not point to a commit");
                continue;
            }
        };

        refs.push(RefInfo {
            id: full_name.to_string(),
            location: name.location,
            full_name: full_name.to_string(),
            short_name: name.short_name,
            remote_name: name.remote_name,
            sibling_id: None,
            ref_type: name.ref_type,
            head: head_name.as_deref() == Some(full_name),
            commit_id: commit.id().to_string(),
            time: DateResult::from_git_time(commit.time()).ms,
        });
    }

    link_siblings(&mut refs);
    debug!(count = refs.len(), "loaded refs");

    Ok(refs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::test_repo::TestRepo;

    fn branch(location: RefLocation, remote: Option<&str>, short: &str) -> RefInfo {
        let full_name = match remote {
            Some(r) => format!("refs/remotes/{r}/{short}"),
            None => format!("refs/heads/{short}"),
        };
        RefInfo {
            id: full_name.clone(),
            location,
            full_name,
            short_name: short.to_string(),
            remote_name: remote.map(str::to_string),
            sibling_id: None,
            ref_type: RefType::Branch,
            head: false,
            commit_id: "c0".to_string(),
            time: 0,
        }
    }

    #[test]
    fn test_classify_local_branch() {
        let name = classify_ref_name("refs/heads/feature/login").unwrap();
        assert_eq!(name.location, RefLocation::Local);
        assert_eq!(name.ref_type, RefType::Branch);
        assert_eq!(name.short_name, "feature/login");
        assert_eq!(name.remote_name, None);
    }

    #[test]
    fn test_classify_remote_branch() {
        let name = classify_ref_name("refs/remotes/upstream/feature/login").unwrap();
        assert_eq!(name.location, RefLocation::Remote);
        assert_eq!(name.remote_name.as_deref(), Some("upstream"));
        assert_eq!(name.short_name, "feature/login");
    }

    #[test]
    fn test_classify_skips_hidden_refs() {
        assert!(classify_ref_name("refs/remotes/origin/HEAD").is_none());
        assert!(classify_ref_name("refs/stash").is_none());
        assert!(classify_ref_name("refs/notes/commits").is_none());
        assert!(classify_ref_name("HEAD").is_none());
    }

    #[test]
    fn test_classify_tag() {
        let name = classify_ref_name("refs/tags/v1.0").unwrap();
        assert_eq!(name.ref_type, RefType::Tag);
        assert_eq!(name.short_name, "v1.0");
    }

    #[test]
    fn test_link_siblings_prefers_origin() {
        let mut refs = vec![
            branch(RefLocation::Local, None, "main"),
            branch(RefLocation::Remote, Some("fork"), "main"),
            branch(RefLocation::Remote, Some("origin"), "main"),
            branch(RefLocation::Local, None, "lonely"),
        ];
        link_siblings(&mut refs);

        assert_eq!(refs[0].sibling_id.as_deref(), Some("refs/remotes/origin/main"));
        assert_eq!(refs[1].sibling_id.as_deref(), Some("refs/heads/main"));
        assert_eq!(refs[2].sibling_id.as_deref(), Some("refs/heads/main"));
        assert_eq!(refs[3].sibling_id, None);
    }

    #[test]
    fn test_load_refs_from_repository() {
        let repo = TestRepo::new();
        let first = repo.commit_file("a.txt", "a\n", "first");
        let second = repo.commit_file("a.txt", "b\n", "second");
        repo.branch("topic", first);
        repo.tag("v1", first);
        repo.remote_branch("origin", "topic", second);

        let refs = load_refs(repo.repo()).unwrap();
        let head_branch = format!("refs/heads/{}", repo.head_branch());

        let head = refs.iter().find(|r| r.head).unwrap();
        assert_eq!(head.id, head_branch);
        assert_eq!(head.commit_id, second.to_string());
        assert_eq!(refs.iter().filter(|r| r.head).count(), 1);

        let topic = refs.iter().find(|r| r.id == "refs/heads/topic").unwrap();
        assert_eq!(topic.commit_id, first.to_string());
        assert_eq!(topic.sibling_id.as_deref(), Some("refs/remotes/origin/topic"));

        let tag = refs.iter().find(|r| r.ref_type == RefType::Tag).unwrap();
        assert_eq!(tag.short_name, "v1");
        assert_eq!(tag.time, crate::git::test_repo::START_TIME * 1000);
    }
}
