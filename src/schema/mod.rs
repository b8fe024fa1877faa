//! Records passed from the git core to the presentation layer.

pub mod codec;
pub mod commit;
pub mod date;
pub mod hunk_line;
pub mod refs;

pub use codec::Record;
pub use commit::{Commit, CommitInfo};
pub use date::DateResult;
pub use hunk_line::{HunkLine, HunkLineStatus};
pub use refs::{RefInfo, RefLocation, RefType};
