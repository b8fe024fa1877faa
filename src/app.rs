use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::debug;

use crate::cli::{Command, CommitsArgs, DiffArgs, RecordArg};
use crate::config::RecordsConfig;
use crate::filter::CommitFilter;
use crate::git::history;
use crate::git::refs::load_refs;
use crate::git::{DiffTarget, HunkEngine, HunkOptions, RepoCache};
use crate::graph;
use crate::loader::{load_history, History, HistoryOptions};
use crate::schema::codec::{decode_list, decode_list_strict};
use crate::schema::{Commit, HunkLine};

pub struct App {
    config: RecordsConfig,
    repo_path: PathBuf,
    cwd: Option<PathBuf>,
    pretty: bool,
}

impl App {
    pub fn new(config: RecordsConfig, repo_path: PathBuf, pretty: bool) -> Self {
        Self {
            config,
            repo_path,
            cwd: std::env::current_dir().ok(),
            pretty,
        }
    }

    /// Directory that relative file arguments are resolved against.
    pub fn with_cwd(mut self, cwd: PathBuf) -> Self {
        self.cwd = Some(cwd);
        self
    }

    pub async fn run(&self, command: Command, out: &mut impl Write) -> Result<()> {
        match command {
            Command::Commits(args) => self.commits(args, out).await,
            Command::Refs => {
                let repo = self.open()?;
                let refs = load_refs(repo.repo())?;
                self.write_json(out, &refs)
            }
            Command::Head => {
                let repo = self.open()?;
                let refs = load_refs(repo.repo())?;
                let commit = history::load_head_commit(repo.repo(), &refs)?;
                self.write_json(out, &commit)
            }
            Command::TopCommit { branch } => {
                let repo = self.open()?;
                let refs = load_refs(repo.repo())?;
                let commit = history::load_top_commit(repo.repo(), &refs, &branch)?;
                self.write_json(out, &commit)
            }
            Command::Unpushed { num_commits } => {
                let loaded = self.plain_history(num_commits).await?;
                let ids = match graph::unpushed_commit_ids(&loaded.commits, &loaded.refs) {
                    Some(ids) => ids,
                    None => {
                        debug!("branch tips not in loaded history, walking the repository");
                        history::unpushed_ids(self.open()?.repo())?
                    }
                };
                self.write_json(out, &ids)
            }
            Command::Hunks { commit, file, diff } => {
                let repo = self.open()?;
                let oid = repo.resolve_commit(&commit)?;
                let file = self.workdir_relative(&repo, &file);
                let lines = HunkEngine::load_hunk_lines(
                    repo.repo(),
                    &DiffTarget::Commit(oid),
                    &file,
                    &self.hunk_options(&diff),
                )?;
                self.write_lines(out, &lines, diff.text)
            }
            Command::Wip { file, diff } => {
                let repo = self.open()?;
                if repo.workdir().is_none() {
                    bail!("Bare repositories have no working directory");
                }
                let file = self.workdir_relative(&repo, &file);
                let lines = HunkEngine::load_hunk_lines(
                    repo.repo(),
                    &DiffTarget::HeadVsWorkdir,
                    &file,
                    &self.hunk_options(&diff),
                )?;
                self.write_lines(out, &lines, diff.text)
            }
            Command::Between {
                from,
                to,
                num_commits,
            } => {
                let repo = self.open()?;
                let from = repo.resolve_commit(&from)?;
                let to = repo.resolve_commit(&to)?;
                let loaded = self.plain_history(num_commits).await?;
                let ids = match graph::commit_ids_between(
                    &loaded.commits,
                    &from.to_string(),
                    &to.to_string(),
                ) {
                    Some(ids) => ids,
                    None => {
                        debug!(%from, %to, "range outside loaded history, walking the repository");
                        history::ids_between(repo.repo(), from, to)?
                    }
                };
                self.write_json(out, &ids)
            }
            Command::IsAncestor {
                commit,
                candidate,
                num_commits,
            } => {
                let (commit, candidate) = self.resolve_pair(&commit, &candidate)?;
                let history = self.plain_history(num_commits).await?;
                let answer = graph::commit_is_ancestor(&history.commits, &commit, &candidate);
                self.write_json(out, &answer)
            }
            Command::Validate { kind, file, strict } => {
                let text = read_input(file.as_deref())?;
                let count = validate_records(kind, &text, strict)?;
                writeln!(out, "{count} valid record(s)")?;
                Ok(())
            }
        }
    }

    async fn commits(&self, args: CommitsArgs, out: &mut impl Write) -> Result<()> {
        let mut filters = Vec::new();
        if let Some(author) = args.author {
            filters.push(CommitFilter::Author(author));
        }
        if let Some(message) = args.message {
            filters.push(CommitFilter::Message(message));
        }
        if let Some(branch) = args.branch {
            filters.push(CommitFilter::Branch(branch));
        }

        let history = load_history(
            self.repo_path.clone(),
            HistoryOptions {
                num_commits: args.num_commits.unwrap_or(self.config.num_commits),
                skip_stashes: args.skip_stashes || self.config.skip_stashes,
                filters,
            },
        )
        .await?;

        if args.text {
            for c in &history.commits {
                writeln!(out, "{}", format_commit_line(c))?;
            }
            Ok(())
        } else if args.with_refs {
            self.write_json(out, &history)
        } else {
            self.write_json(out, &history.commits)
        }
    }

    async fn plain_history(&self, num_commits: Option<usize>) -> Result<History> {
        load_history(
            self.repo_path.clone(),
            HistoryOptions {
                num_commits: num_commits.unwrap_or(self.config.num_commits),
                skip_stashes: true,
                filters: Vec::new(),
            },
        )
        .await
    }

    /// Paths given relative to the current directory are rebased onto the
    /// working tree root, which is what pathspecs are matched against.
    fn workdir_relative(&self, repo: &RepoCache, file: &Path) -> PathBuf {
        let Some(workdir) = repo.workdir() else {
            return file.to_path_buf();
        };
        let absolute = if file.is_absolute() {
            file.to_path_buf()
        } else {
            match &self.cwd {
                Some(cwd) => cwd.join(file),
                None => return file.to_path_buf(),
            }
        };
        let workdir = workdir.canonicalize().unwrap_or_else(|_| workdir.to_path_buf());
        // The file itself may be deleted in the working tree; resolve its directory.
        let absolute = match (
            absolute.parent().and_then(|p| p.canonicalize().ok()),
            absolute.file_name(),
        ) {
            (Some(dir), Some(name)) => dir.join(name),
            _ => absolute.clone(),
        };

        match absolute.strip_prefix(&workdir) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => file.to_path_buf(),
        }
    }

    fn open(&self) -> Result<RepoCache> {
        RepoCache::open(&self.repo_path)
    }

    fn resolve_pair(&self, a: &str, b: &str) -> Result<(String, String)> {
        let repo = self.open()?;
        Ok((
            repo.resolve_commit(a)?.to_string(),
            repo.resolve_commit(b)?.to_string(),
        ))
    }

    fn hunk_options(&self, diff: &DiffArgs) -> HunkOptions {
        HunkOptions {
            context_lines: diff.context_lines.unwrap_or(self.config.context_lines),
            ignore_whitespace: diff.ignore_whitespace || self.config.ignore_whitespace,
        }
    }

    fn write_lines(&self, out: &mut impl Write, lines: &[HunkLine], text: bool) -> Result<()> {
        if !text {
            return self.write_json(out, lines);
        }
        for line in lines {
            writeln!(out, "{}", format_hunk_line(line))?;
        }
        Ok(())
    }

    fn write_json<T: Serialize + ?Sized>(&self, out: &mut impl Write, value: &T) -> Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut *out, value)?;
        } else {
            serde_json::to_writer(&mut *out, value)?;
        }
        writeln!(out)?;
        Ok(())
    }
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

/// Decodes a JSON array of records, returning how many there were.
pub fn validate_records(kind: RecordArg, text: &str, strict: bool) -> Result<usize> {
    let count = match (kind, strict) {
        (RecordArg::Commit, false) => decode_list::<Commit>(text)?.len(),
        (RecordArg::Commit, true) => decode_list_strict::<Commit>(text)?.len(),
        (RecordArg::HunkLine, false) => decode_list::<HunkLine>(text)?.len(),
        (RecordArg::HunkLine, true) => decode_list_strict::<HunkLine>(text)?.len(),
    };
    Ok(count)
}

/// `   3    4 +text`: old and new line numbers, then the diff marker.
pub fn format_hunk_line(line: &HunkLine) -> String {
    let num = |n: Option<u32>| n.map(|n| n.to_string()).unwrap_or_default();
    format!(
        "{:>4} {:>4} {}{}",
        num(line.old_num),
        num(line.new_num),
        line.status.marker(),
        line.text
    )
}

/// `abc1234  2024-01-02 10:00 +0100  Ada  subject`, one line per record.
pub fn format_commit_line(commit: &Commit) -> String {
    let short_id: String = commit.id.chars().take(7).collect();
    if commit.filtered {
        return format!("{short_id}  ... {} hidden", commit.num_skipped);
    }

    let date = commit
        .date
        .to_datetime()
        .map(|d| d.format("%Y-%m-%d %H:%M %z").to_string())
        .unwrap_or_else(|| "????-??-?? ??:??".to_string());
    let subject = commit.message.lines().next().unwrap_or_default();
    let label = match &commit.stash_id {
        Some(stash_id) => format!("{stash_id}: "),
        None => String::new(),
    };

    format!("{short_id}  {date}  {}  {label}{subject}", commit.author)
}
