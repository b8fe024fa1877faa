use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_NUM_COMMITS: usize = 1000;
pub const DEFAULT_CONTEXT_LINES: u32 = 3;
pub const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordsConfig {
    pub num_commits: usize,
    pub skip_stashes: bool,
    pub context_lines: u32,
    pub ignore_whitespace: bool,
    pub log_level: String,
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            num_commits: DEFAULT_NUM_COMMITS,
            skip_stashes: false,
            context_lines: DEFAULT_CONTEXT_LINES,
            ignore_whitespace: false,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    num_commits: Option<usize>,
    #[serde(default)]
    skip_stashes: Option<bool>,
    #[serde(default)]
    context_lines: Option<u32>,
    #[serde(default)]
    ignore_whitespace: Option<bool>,
    #[serde(default)]
    log_level: Option<String>,
}

pub fn config_path() -> PathBuf {
    let mut path = dirs_home().unwrap_or_else(|| PathBuf::from("."));
    path.push(".config");
    path.push("git-records");
    path.push("config.toml");
    path
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Load config from `~/.config/git-records/config.toml`, falling back to defaults.
pub fn load_config() -> RecordsConfig {
    load_config_from(&config_path())
}

/// Missing keys take their defaults; an unreadable or malformed file yields
/// the default config.
pub fn load_config_from(path: &Path) -> RecordsConfig {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return RecordsConfig::default(),
    };

    parse_config(&contents).unwrap_or_default()
}

fn parse_config(contents: &str) -> Option<RecordsConfig> {
    let file: ConfigFile = toml::from_str(contents).ok()?;
    let defaults = RecordsConfig::default();

    Some(RecordsConfig {
        num_commits: file.num_commits.unwrap_or(defaults.num_commits),
        skip_stashes: file.skip_stashes.unwrap_or(defaults.skip_stashes),
        context_lines: file.context_lines.unwrap_or(defaults.context_lines),
        ignore_whitespace: file.ignore_whitespace.unwrap_or(defaults.ignore_whitespace),
        log_level: file.log_level.unwrap_or(defaults.log_level),
    })
}
