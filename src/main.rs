use anyhow::Result;
use clap::Parser;
use std::env;
use std::io::Write;

use git_records::app::App;
use git_records::cli::{Cli, Command};
use git_records::config;
use git_records::git::RepoCache;
use git_records::logging;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install().ok();

    let cli = Cli::parse();

    // Load config, apply CLI overrides
    let config = config::load_config();
    logging::init(cli.log_level.as_deref().unwrap_or(&config.log_level));

    let start_dir = match cli.repo {
        Some(ref path) => path.clone(),
        None => env::current_dir()?,
    };

    // Validation reads records, not a repository
    let repo_path = if matches!(cli.command, Command::Validate { .. }) {
        start_dir
    } else {
        match RepoCache::open(&start_dir) {
            Ok(repo) => repo.path().to_path_buf(),
            Err(_) => {
                eprintln!(
                    "git-records: not a git repository (or any parent up to mount point /)\n\
                     Run this command from inside a git repository or pass -C <path>."
                );
                std::process::exit(1);
            }
        }
    };

    let app = App::new(config, repo_path, cli.pretty);
    let mut stdout = std::io::stdout().lock();
    let result = app.run(cli.command, &mut stdout).await;
    stdout.flush()?;

    if let Err(e) = result {
        eprintln!("git-records: {e:#}");
        std::process::exit(1);
    }

    Ok(())
}
