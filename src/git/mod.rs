//! Git facade: every repository read or mutation goes through the `git`
//! executable, invoked with an argument vector and never through a shell.

pub mod porcelain;

use anyhow::{Context, Result};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::GwtreeError;
use crate::naming::CreationPlan;
use crate::traits::GitRunner;

pub use porcelain::{WorktreeEntry, parse_worktree_list, removable_worktrees};

/// Captured result of one git invocation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GitOutput {
    pub succeeded: bool,
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    #[must_use]
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    #[must_use]
    pub fn failure(stderr: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Snapshot of the repository taken once per command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryContext {
    pub git_root: PathBuf,
    /// Directory that receives new worktrees, next to the repository
    pub parent_dir: PathBuf,
    pub repo_name: String,
    /// Empty when HEAD is detached
    pub current_branch: String,
    pub branches: Vec<String>,
}

impl RepositoryContext {
    #[must_use]
    pub fn new(git_root: &Path, current_branch: &str, branches: Vec<String>) -> Self {
        let parent_dir = git_root.parent().unwrap_or(git_root).to_path_buf();
        let repo_name = git_root
            .file_name()
            .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
        Self {
            git_root: git_root.to_path_buf(),
            parent_dir,
            repo_name,
            current_branch: current_branch.to_string(),
            branches,
        }
    }

    /// Re-reads local branches before a uniqueness check
    ///
    /// # Errors
    /// Returns an error if git could not be spawned
    pub fn refresh_branches(&mut self, repo: &GitRepo<'_>) -> Result<()> {
        self.branches = repo.local_branches()?;
        Ok(())
    }
}

/// Runs the real `git` found on `PATH`
pub struct SystemGit;

impl GitRunner for SystemGit {
    fn run(&self, args: &[&str], cwd: Option<&Path>) -> Result<GitOutput> {
        let mut cmd = Command::new("git");
        cmd.args(args);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        let output = cmd
            .output()
            .with_context(|| format!("Failed to execute git {}", args.join(" ")))?;

        tracing::debug!(
            args = %args.join(" "),
            cwd = ?cwd,
            status = ?output.status.code(),
            "git invocation"
        );

        Ok(GitOutput {
            succeeded: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// A repository located by `git rev-parse --show-toplevel`.
///
/// All later commands run with the repository root as working directory.
pub struct GitRepo<'a> {
    runner: &'a dyn GitRunner,
    root: PathBuf,
}

impl<'a> GitRepo<'a> {
    /// Resolves the repository containing `cwd` (or the process directory)
    ///
    /// # Errors
    /// Returns [`GwtreeError::NotAGitRepository`] if git does not report a
    /// top-level directory, or an error if git could not be spawned
    pub fn discover(runner: &'a dyn GitRunner, cwd: Option<&Path>) -> Result<Self> {
        let output = runner.run(&["rev-parse", "--show-toplevel"], cwd)?;
        let root = output.stdout.trim();
        if !output.succeeded || root.is_empty() {
            return Err(GwtreeError::NotAGitRepository {
                stderr: output.stderr,
            }
            .into());
        }

        Ok(Self {
            runner,
            root: PathBuf::from(root),
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reads the current branch and local branches
    ///
    /// # Errors
    /// Returns an error if git could not be spawned
    pub fn context(&self) -> Result<RepositoryContext> {
        let current_branch = self.current_branch()?;
        let branches = self.local_branches()?;
        Ok(RepositoryContext::new(&self.root, &current_branch, branches))
    }

    /// Runs git in the repository root without judging the exit status
    ///
    /// # Errors
    /// Returns an error if git could not be spawned
    pub fn run(&self, args: &[&str]) -> Result<GitOutput> {
        self.runner.run(args, Some(&self.root))
    }

    /// Runs git in the repository root and fails on a non-zero exit
    ///
    /// # Errors
    /// Returns [`GwtreeError::GitCommand`] carrying git's stderr when the
    /// command does not succeed
    pub fn run_or_fail(&self, args: &[&str]) -> Result<String> {
        let output = self.run(args)?;
        if !output.succeeded {
            return Err(GwtreeError::GitCommand {
                args: args.iter().map(|arg| (*arg).to_string()).collect(),
                stderr: output.stderr,
            }
            .into());
        }
        Ok(output.stdout)
    }

    /// Name of the checked-out branch, empty when HEAD is detached
    ///
    /// # Errors
    /// Returns an error if git could not be spawned
    pub fn current_branch(&self) -> Result<String> {
        let output = self.run(&["branch", "--show-current"])?;
        if !output.succeeded {
            tracing::debug!(stderr = %output.stderr.trim(), "could not read current branch");
            return Ok(String::new());
        }
        Ok(output.stdout.trim().to_string())
    }

    /// Lists local branch short names
    ///
    /// # Errors
    /// Returns an error if git could not be spawned
    pub fn local_branches(&self) -> Result<Vec<String>> {
        let output = self.run(&["branch", "--format=%(refname:short)"])?;
        Ok(output
            .stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    /// Lists every worktree, primary first
    ///
    /// # Errors
    /// Returns an error if `git worktree list` fails
    pub fn list_worktrees(&self) -> Result<Vec<WorktreeEntry>> {
        let stdout = self.run_or_fail(&["worktree", "list", "--porcelain"])?;
        Ok(parse_worktree_list(&stdout))
    }

    /// Runs `git worktree add -b <branch> <path> <base>` for a plan
    ///
    /// # Errors
    /// Returns [`GwtreeError::GitCommand`] if git rejects the worktree
    pub fn add_worktree(&self, plan: &CreationPlan) -> Result<()> {
        let args = plan.git_args();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run_or_fail(&args)?;
        Ok(())
    }

    /// Runs `git worktree remove <path>`
    ///
    /// # Errors
    /// Returns [`GwtreeError::GitCommand`] if git refuses the removal
    pub fn remove_worktree(&self, path: &Path) -> Result<()> {
        let path = path.to_string_lossy();
        self.run_or_fail(&["worktree", "remove", &path])?;
        Ok(())
    }
}

/// Scripted git for tests.
///
/// Responses are matched on the exact argument vector. When several are
/// registered for the same arguments they are replayed in order and the last
/// one repeats. Unregistered invocations succeed with empty output.
#[derive(Default)]
pub struct MockGitRunner {
    responses: RefCell<Vec<(Vec<String>, VecDeque<GitOutput>)>>,
    invocations: RefCell<Vec<Vec<String>>>,
}

impl MockGitRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A repository rooted at `root` with the given current and local branches
    #[must_use]
    pub fn repository(root: &Path, current_branch: &str, branches: &[&str]) -> Self {
        let mut listing = branches.join("\n");
        listing.push('\n');
        Self::new()
            .respond(
                &["rev-parse", "--show-toplevel"],
                GitOutput::success(format!("{}\n", root.display())),
            )
            .respond(
                &["branch", "--show-current"],
                GitOutput::success(format!("{current_branch}\n")),
            )
            .respond(&["branch", "--format=%(refname:short)"], GitOutput::success(listing))
    }

    /// Queues a response for the given argument vector
    #[must_use]
    pub fn respond(self, args: &[&str], output: GitOutput) -> Self {
        {
            let mut responses = self.responses.borrow_mut();
            let key: Vec<String> = args.iter().map(|arg| (*arg).to_string()).collect();
            if let Some((_, queue)) = responses.iter_mut().find(|(k, _)| *k == key) {
                queue.push_back(output);
            } else {
                responses.push((key, VecDeque::from([output])));
            }
        }
        self
    }

    /// Every argument vector passed to `run`, in call order
    #[must_use]
    pub fn invocations(&self) -> Vec<Vec<String>> {
        self.invocations.borrow().clone()
    }

    /// Invocations that change the repository (`worktree add`/`worktree remove`)
    #[must_use]
    pub fn mutations(&self) -> Vec<Vec<String>> {
        self.invocations
            .borrow()
            .iter()
            .filter(|args| {
                args.first().is_some_and(|a| a == "worktree")
                    && args.get(1).is_some_and(|a| a == "add" || a == "remove")
            })
            .cloned()
            .collect()
    }
}

impl GitRunner for MockGitRunner {
    fn run(&self, args: &[&str], _cwd: Option<&Path>) -> Result<GitOutput> {
        let key: Vec<String> = args.iter().map(|arg| (*arg).to_string()).collect();
        self.invocations.borrow_mut().push(key.clone());

        let mut responses = self.responses.borrow_mut();
        let Some((_, queue)) = responses.iter_mut().find(|(k, _)| *k == key) else {
            return Ok(GitOutput::success(""));
        };
        let output = if queue.len() > 1 {
            queue.pop_front().unwrap_or_default()
        } else {
            queue.front().cloned().unwrap_or_default()
        };
        Ok(output)
    }
}
