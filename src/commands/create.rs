use anyhow::Result;
use std::path::Path;

use crate::commands::{FlowOutcome, cancelled};
use crate::config::{EditorChoice, GwtreeConfig};
use crate::editor;
use crate::error::GwtreeError;
use crate::git::{GitRepo, RepositoryContext, SystemGit};
use crate::hooks::{self, HookContext};
use crate::naming::{
    BranchChoice, BranchSelection, CreationPlan, WorktreeName, default_base_branch,
    validate_new_branch_name,
};
use crate::selection::{
    Prompted, RealSelectionProvider, SelectOption, SelectionProvider, TextPrompt,
};
use crate::traits::GitRunner;
use crate::ui;

/// Select value for "Create new branch"; `:` cannot appear in a branch name
pub const NEW_BRANCH_VALUE: &str = ":new";
/// Base for a new branch when HEAD is detached
const DETACHED_BASE: &str = "HEAD";

/// Creates a worktree interactively in the repository containing the
/// current directory
///
/// # Errors
/// Returns an error if:
/// - The current directory is not inside a git repository
/// - The target directory already exists
/// - `git worktree add` fails
/// - A prompt cannot be shown
pub fn create_worktree(config: &GwtreeConfig) -> Result<FlowOutcome> {
    create_worktree_with(&SystemGit, &RealSelectionProvider, config, None)
}

/// Creates a worktree with a custom git runner and selection provider (for testing)
///
/// # Errors
/// Returns an error if:
/// - `cwd` is not inside a git repository
/// - The target directory already exists
/// - `git worktree add` fails
/// - A prompt cannot be shown
pub fn create_worktree_with(
    git: &dyn GitRunner,
    provider: &dyn SelectionProvider,
    config: &GwtreeConfig,
    cwd: Option<&Path>,
) -> Result<FlowOutcome> {
    ui::intro("Create Git Worktree");

    let repo = GitRepo::discover(git, cwd)?;
    let mut context = repo.context()?;

    let Some(selection) = prompt_branch(provider, config, &context)? else {
        return Ok(cancelled("Operation cancelled"));
    };

    let source_branch = match &selection {
        BranchSelection::Existing(branch) | BranchSelection::New { name: branch, .. } => {
            branch.clone()
        }
    };
    let Some(name) =
        prompt_worktree_name(provider, config, &context.repo_name, &source_branch)?
    else {
        return Ok(cancelled("Operation cancelled"));
    };

    context.refresh_branches(&repo)?;
    let plan = CreationPlan::resolve(&config.naming, &context, &selection, &name);

    // symlink_metadata also sees dangling links, which git would trip over
    if plan.path.symlink_metadata().is_ok() {
        return Err(GwtreeError::DirectoryExists {
            name: plan.worktree_name,
        }
        .into());
    }

    let mut spinner = provider.spinner("Creating worktree...");
    if let Err(e) = repo.add_worktree(&plan) {
        spinner.fail("Failed to create worktree");
        return Err(e);
    }
    spinner.stop("Worktree created successfully!");

    offer_editor(provider, config, &plan.path)?;

    if !config.hooks.is_empty() {
        let hook_context = HookContext {
            git_root: repo.root(),
            worktree_path: &plan.path,
            branch_name: &plan.branch,
        };
        let report = hooks::run_on_create(&config.hooks, &hook_context);
        for warning in &report.warnings {
            ui::warn(warning);
        }
        ui::info(&format!(
            "Hooks: {} copied, {} command(s) succeeded",
            report.copied.len(),
            report.commands_run.len()
        ));
    }

    ui::outro(&format!(
        "✓ Worktree ready at: {}\n   Branch: {}",
        plan.path.display(),
        plan.branch
    ));
    Ok(FlowOutcome::Completed)
}

/// Asks for the existing branch to start from, or a new branch name.
/// `None` means the user cancelled.
fn prompt_branch(
    provider: &dyn SelectionProvider,
    config: &GwtreeConfig,
    context: &RepositoryContext,
) -> Result<Option<BranchSelection>> {
    let branches = &context.branches;
    let current_branch = context.current_branch.as_str();

    let mut options = Vec::new();
    if let Some(main_branch) = default_base_branch(branches, current_branch) {
        options.push(SelectOption::new(main_branch.clone(), main_branch));
    }
    options.push(SelectOption::new(NEW_BRANCH_VALUE, "Create new branch"));

    let initial = match config.naming.branch_choice {
        BranchChoice::New => options.len() - 1,
        BranchChoice::Current => 0,
    };
    let Prompted::Answer(choice) = provider.select("Branch:", options, initial)? else {
        return Ok(None);
    };

    if choice != NEW_BRANCH_VALUE {
        return Ok(Some(BranchSelection::Existing(choice)));
    }

    let existing = branches.clone();
    let placeholder_base = if current_branch.is_empty() {
        context.repo_name.as_str()
    } else {
        current_branch
    };
    let prompt = TextPrompt::new("New branch name:")
        .with_placeholder(format!("{placeholder_base}-worktree"))
        .with_validator(move |value| validate_new_branch_name(value.trim(), &existing));

    let Prompted::Answer(name) = provider.text(&prompt)? else {
        return Ok(None);
    };

    let base = if current_branch.is_empty() {
        DETACHED_BASE.to_string()
    } else {
        current_branch.to_string()
    };
    Ok(Some(BranchSelection::New {
        name: name.trim().to_string(),
        base,
    }))
}

/// Asks for the suffix; cancelling it offers a full custom name instead.
/// `None` means the custom name was cancelled too.
fn prompt_worktree_name(
    provider: &dyn SelectionProvider,
    config: &GwtreeConfig,
    repo_name: &str,
    branch: &str,
) -> Result<Option<WorktreeName>> {
    let prefix = config.naming.prefix(repo_name, branch);
    let default_suffix = &config.naming.default_suffix;
    let label = format!("Worktree name: {}", ui::dim(&format!("{prefix}-")));
    let suffix_prompt = TextPrompt::new(label)
        .with_default(default_suffix.clone())
        .with_placeholder(format!("{default_suffix} (ESC for full edit)"));

    if let Prompted::Answer(suffix) = provider.text(&suffix_prompt)? {
        return Ok(Some(WorktreeName::Suffix(suffix)));
    }

    let default_name = format!("{repo_name}-{branch}");
    let custom_prompt = TextPrompt::new("Custom name:")
        .with_default(default_name.clone())
        .with_placeholder(default_name);

    Ok(provider.text(&custom_prompt)?.answer().map(WorktreeName::Custom))
}

/// Offers to open the new worktree; launch problems are only reported
fn offer_editor(
    provider: &dyn SelectionProvider,
    config: &GwtreeConfig,
    path: &Path,
) -> Result<()> {
    let preferred = if config.open_editor {
        config.editor
    } else {
        EditorChoice::None
    };
    let options: Vec<SelectOption> = EditorChoice::ALL
        .iter()
        .map(|choice| SelectOption::new(choice.value(), choice.label()))
        .collect();
    let initial = EditorChoice::ALL
        .iter()
        .position(|choice| *choice == preferred)
        .unwrap_or_default();

    let Prompted::Answer(value) = provider.select("Open in:", options, initial)? else {
        return Ok(());
    };
    let choice = EditorChoice::from_value(&value).unwrap_or(EditorChoice::None);

    match choice {
        EditorChoice::None => {}
        // A terminal editor owns the screen, so no spinner around it
        EditorChoice::Default => {
            if let Err(e) = editor::open(choice, path) {
                ui::warn(&format!("Failed to open editor: {e:#}"));
            }
        }
        EditorChoice::Code => {
            let mut spinner = provider.spinner("Opening editor...");
            match editor::open(choice, path) {
                Ok(()) => spinner.stop("Editor opened!"),
                Err(e) => {
                    spinner.fail("Failed to open editor");
                    ui::warn(&format!("{e:#}"));
                }
            }
        }
    }

    Ok(())
}
