//! The interactive flows behind each subcommand.
//!
//! Every flow has a `*_with` variant taking the git runner and prompt
//! provider, so tests can drive it with [`crate::git::MockGitRunner`] and
//! [`crate::selection::MockSelectionProvider`].

pub mod create;
pub mod list;
pub mod remove;

use anyhow::Result;
use std::path::Path;

use crate::git::GitRepo;
use crate::selection::SelectionProvider;
use crate::ui;

/// How a flow ended when it did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
    Completed,
    /// The user backed out, or there was nothing to act on
    Cancelled,
}

fn cancelled(message: &str) -> FlowOutcome {
    ui::cancel(message);
    FlowOutcome::Cancelled
}

/// Removes a worktree behind a spinner
fn remove_with_spinner(
    provider: &dyn SelectionProvider,
    repo: &GitRepo<'_>,
    path: &Path,
    success_message: &str,
) -> Result<()> {
    let mut spinner = provider.spinner("Removing worktree...");
    match repo.remove_worktree(path) {
        Ok(()) => {
            spinner.stop(success_message);
            Ok(())
        }
        Err(e) => {
            spinner.fail("Failed to remove worktree");
            Err(e)
        }
    }
}
