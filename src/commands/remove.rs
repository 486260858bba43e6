use anyhow::Result;
use std::path::Path;

use crate::commands::{FlowOutcome, cancelled, remove_with_spinner};
use crate::git::porcelain::find_by_path;
use crate::git::{GitRepo, SystemGit, removable_worktrees};
use crate::selection::{Prompted, RealSelectionProvider, SelectOption, SelectionProvider};
use crate::traits::GitRunner;
use crate::ui;

/// Removes one worktree chosen interactively
///
/// # Errors
/// Returns an error if:
/// - The current directory is not inside a git repository
/// - Listing or removing the worktree fails
/// - A prompt cannot be shown
pub fn remove_worktree() -> Result<FlowOutcome> {
    remove_worktree_with(&SystemGit, &RealSelectionProvider, None)
}

/// Removes a worktree with a custom git runner and selection provider (for testing)
///
/// # Errors
/// Returns an error if:
/// - `cwd` is not inside a git repository
/// - Listing or removing the worktree fails
/// - A prompt cannot be shown
pub fn remove_worktree_with(
    git: &dyn GitRunner,
    provider: &dyn SelectionProvider,
    cwd: Option<&Path>,
) -> Result<FlowOutcome> {
    ui::intro("Remove Git Worktree");

    let repo = GitRepo::discover(git, cwd)?;
    let entries = repo.list_worktrees()?;
    let removable = removable_worktrees(&entries);
    if removable.is_empty() {
        return Ok(cancelled("No worktrees to remove"));
    }

    let options: Vec<SelectOption> = removable
        .iter()
        .map(|entry| {
            SelectOption::new(
                entry.path.to_string_lossy(),
                format!("{} - {}", entry.display_ref(), entry.path.display()),
            )
        })
        .collect();

    let Prompted::Answer(choice) = provider.select("Select worktree to remove:", options, 0)? else {
        return Ok(cancelled("Operation cancelled"));
    };
    let Some(entry) = find_by_path(removable, Path::new(&choice)) else {
        anyhow::bail!("Selected worktree not found: {}", choice);
    };

    let message = format!("Remove worktree at {}?", entry.path.display());
    let confirmed = provider.confirm(&message, false)?;
    if confirmed != Prompted::Answer(true) {
        return Ok(cancelled("Operation cancelled"));
    }

    remove_with_spinner(provider, &repo, &entry.path, "Worktree removed successfully!")?;

    ui::outro("✓ Done");
    Ok(FlowOutcome::Completed)
}
