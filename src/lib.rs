//! Commit and diff hunk line records exchanged between a git core and a
//! presentation layer, plus a git2-backed producer for them.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod git;
pub mod graph;
pub mod loader;
pub mod logging;
pub mod schema;

pub use error::{Invariant, RecordKind, SchemaViolation};
pub use schema::{Commit, DateResult, HunkLine, HunkLineStatus, RefInfo, RefLocation, RefType};
