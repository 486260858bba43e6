//! Error kinds that callers need to tell apart.
//!
//! Most failures travel as plain [`anyhow::Error`]s. The variants here are
//! wrapped inside them and recovered with `downcast_ref` at the top level,
//! where each maps to a specific message and exit status.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GwtreeError {
    /// `git rev-parse --show-toplevel` did not succeed.
    #[error("not a git repository")]
    NotAGitRepository { stderr: String },

    /// The computed worktree directory is already present on disk.
    #[error("Directory {name} already exists")]
    DirectoryExists { name: String },

    /// A git invocation whose failure aborts the flow exited non-zero.
    #[error("git {} failed: {}", .args.join(" "), .stderr.trim())]
    GitCommand { args: Vec<String>, stderr: String },
}
