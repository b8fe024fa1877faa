use std::path::Path;

use anyhow::{Context, Result};
use git2::{Diff, DiffFormat, DiffOptions, Oid, Repository};
use tracing::debug;

use crate::error::SchemaViolation;
use crate::schema::{HunkLine, HunkLineStatus};

/// What a file is diffed against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffTarget {
    /// A commit against its first parent (the empty tree for a root commit).
    Commit(Oid),
    /// Working directory and index against HEAD.
    HeadVsWorkdir,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HunkOptions {
    pub context_lines: u32,
    pub ignore_whitespace: bool,
}

impl Default for HunkOptions {
    fn default() -> Self {
        Self {
            context_lines: 3,
            ignore_whitespace: false,
        }
    }
}

pub struct HunkEngine;

impl HunkEngine {
    pub fn load_hunk_lines(
        repo: &Repository,
        target: &DiffTarget,
        path: &Path,
        options: &HunkOptions,
    ) -> Result<Vec<HunkLine>> {
        let mut diff_opts = DiffOptions::new();
        diff_opts.pathspec(path);
        diff_opts.disable_pathspec_match(true);
        diff_opts.ignore_whitespace(options.ignore_whitespace);
        diff_opts.context_lines(options.context_lines);

        let diff = match target {
            DiffTarget::Commit(oid) => {
                let commit = repo
                    .find_commit(*oid)
                    .with_context(|| format!("Could not find commit {oid}"))?;
                let tree = commit.tree()?;
                let parent_tree = match commit.parent(0) {
                    Ok(parent) => Some(parent.tree()?),
                    Err(_) => None,
                };
                repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut diff_opts))?
            }
            DiffTarget::HeadVsWorkdir => {
                diff_opts.include_untracked(true);
                diff_opts.recurse_untracked_dirs(true);
                diff_opts.show_untracked_content(true);

                // New repos may have no commits
                let head_tree = match repo.head() {
                    Ok(head) => {
                        let commit = head.peel_to_commit()?;
                        Some(commit.tree()?)
                    }
                    Err(_) => None,
                };
                repo.diff_tree_to_workdir_with_index(head_tree.as_ref(), Some(&mut diff_opts))?
            }
        };

        let lines = Self::collect_lines(&diff)?;
        debug!(path = %path.display(), lines = lines.len(), "loaded hunk lines");
        Ok(lines)
    }

    /// Flattens a patch into numbered lines. Headers and "no newline at end
    /// of file" markers are dropped; binary deltas produce nothing.
    fn collect_lines(diff: &Diff<'_>) -> Result<Vec<HunkLine>> {
        let mut lines: Vec<HunkLine> = Vec::new();
        let mut current_hunk: Option<u32> = None;
        let mut failure: Option<SchemaViolation> = None;

        let printed = diff.print(DiffFormat::Patch, |delta, _hunk, line| {
            if delta.flags().is_binary() {
                return true;
            }

            if line.origin() == 'H' {
                current_hunk = Some(current_hunk.map_or(0, |h| h + 1));
                return true;
            }

            let Some(status) = HunkLineStatus::from_origin(line.origin()) else {
                return true;
            };

            let raw = String::from_utf8_lossy(line.content());
            match HunkLine::new(
                status,
                line.old_lineno(),
                line.new_lineno(),
                current_hunk.unwrap_or(0),
                &raw,
                lines.len(),
            ) {
                Ok(hunk_line) => {
                    lines.push(hunk_line);
                    true
                }
                Err(e) => {
                    failure = Some(e);
                    false
                }
            }
        });

        if let Some(e) = failure {
            return Err(e.into());
        }
        printed?;

        Ok(lines)
    }
}
