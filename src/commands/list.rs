use anyhow::Result;
use std::path::Path;

use crate::commands::{FlowOutcome, cancelled, remove_with_spinner};
use crate::git::porcelain::find_by_path;
use crate::git::{GitRepo, SystemGit, removable_worktrees};
use crate::selection::{Prompted, RealSelectionProvider, SelectOption, SelectionProvider};
use crate::traits::GitRunner;
use crate::ui;

/// Lists worktrees and offers to delete them one at a time until the user exits
///
/// # Errors
/// Returns an error if:
/// - The current directory is not inside a git repository
/// - Listing or removing a worktree fails
/// - A prompt cannot be shown
pub fn list_worktrees() -> Result<FlowOutcome> {
    list_worktrees_with(&SystemGit, &RealSelectionProvider, None)
}

/// Runs the list-and-delete loop with a custom git runner and selection provider (for testing)
///
/// # Errors
/// Returns an error if:
/// - `cwd` is not inside a git repository
/// - Listing or removing a worktree fails
/// - A prompt cannot be shown
pub fn list_worktrees_with(
    git: &dyn GitRunner,
    provider: &dyn SelectionProvider,
    cwd: Option<&Path>,
) -> Result<FlowOutcome> {
    ui::intro("Manage Worktrees");

    let repo = GitRepo::discover(git, cwd)?;

    loop {
        let entries = repo.list_worktrees()?;
        let removable = removable_worktrees(&entries);
        if removable.is_empty() {
            return Ok(cancelled("No worktrees found"));
        }

        let options: Vec<SelectOption> = removable
            .iter()
            .map(|entry| {
                SelectOption::new(
                    entry.path.to_string_lossy(),
                    format!("{} {}", entry.display_ref(), ui::dim(&entry.dir_name())),
                )
            })
            .collect();

        let Prompted::Answer(choice) =
            provider.select("Select worktree to delete (ESC to exit):", options, 0)?
        else {
            ui::outro("Done");
            return Ok(FlowOutcome::Cancelled);
        };
        let Some(entry) = find_by_path(removable, Path::new(&choice)) else {
            anyhow::bail!("Selected worktree not found: {}", choice);
        };

        let name = entry.dir_name();
        let Prompted::Answer(confirmed) = provider.confirm(&format!("Delete {name}?"), false)?
        else {
            ui::outro("Done");
            return Ok(FlowOutcome::Cancelled);
        };

        if confirmed {
            remove_with_spinner(provider, &repo, &entry.path, &format!("{name} removed!"))?;
        }
    }
}
