use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "git-records",
    version,
    about = "Print git history and diff lines as JSON records"
)]
pub struct Cli {
    /// Repository to read (defaults to the current directory)
    #[arg(short = 'C', long, global = true)]
    pub repo: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// History listing as Commit records, stashes included
    Commits(CommitsArgs),

    /// Branches and tags
    Refs,

    /// The commit HEAD points to (null when HEAD is unborn)
    Head,

    /// The newest commit of BRANCH (null when it does not exist)
    TopCommit { branch: String },

    /// Commit ids on the current branch that its remote copy does not have
    Unpushed {
        /// Number of commits to load
        #[arg(short = 'n', long)]
        num_commits: Option<usize>,
    },

    /// Diff lines of FILE in COMMIT against its first parent
    Hunks {
        commit: String,
        file: PathBuf,
        #[command(flatten)]
        diff: DiffArgs,
    },

    /// Diff lines of uncommitted changes to FILE
    Wip {
        file: PathBuf,
        #[command(flatten)]
        diff: DiffArgs,
    },

    /// Commit ids reachable from TO but not from FROM
    Between {
        from: String,
        to: String,
        /// Number of commits to load
        #[arg(short = 'n', long)]
        num_commits: Option<usize>,
    },

    /// Whether CANDIDATE is an ancestor of COMMIT
    IsAncestor {
        commit: String,
        candidate: String,
        /// Number of commits to load
        #[arg(short = 'n', long)]
        num_commits: Option<usize>,
    },

    /// Check a JSON array of records read from FILE (or stdin)
    Validate {
        #[arg(value_enum)]
        kind: RecordArg,
        file: Option<PathBuf>,
        /// Also check cross-field rules (merge flag, skipped counts, line numbers)
        #[arg(long)]
        strict: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct CommitsArgs {
    /// Number of commits to load
    #[arg(short = 'n', long)]
    pub num_commits: Option<usize>,

    /// Leave stashes out of the listing
    #[arg(long)]
    pub skip_stashes: bool,

    /// Only show commits whose author name or email contains this text
    #[arg(long)]
    pub author: Option<String>,

    /// Only show commits whose message contains this text
    #[arg(long)]
    pub message: Option<String>,

    /// Only show commits reachable from this branch
    #[arg(long)]
    pub branch: Option<String>,

    /// Print `{ commits, refs }` instead of the commit array
    #[arg(long)]
    pub with_refs: bool,

    /// One line per commit instead of JSON
    #[arg(long)]
    pub text: bool,
}

#[derive(Args, Debug, Default)]
pub struct DiffArgs {
    /// Lines of context around each change
    #[arg(short = 'U', long = "context")]
    pub context_lines: Option<u32>,

    /// Ignore whitespace changes
    #[arg(short = 'w', long = "ignore-ws")]
    pub ignore_whitespace: bool,

    /// Print lines as `old new marker text` instead of JSON
    #[arg(long)]
    pub text: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordArg {
    Commit,
    HunkLine,
}
