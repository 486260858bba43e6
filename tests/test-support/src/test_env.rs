#![allow(clippy::unwrap_used)] // Tests use unwrap for simplicity

use anyhow::{Context, Result};
use assert_fs::TempDir;
use assert_fs::prelude::*;

use std::path::PathBuf;
use std::process::Command;

/// Test environment with a real git repository on branch `main`, placed in a
/// temporary directory that also receives the sibling worktrees
pub struct CliTestEnvironment {
    pub repo_dir: assert_fs::fixture::ChildPath,
    pub outside_dir: assert_fs::fixture::ChildPath,
    temp_dir: TempDir, // Keep temp_dir private to ensure cleanup, but don't expose it
}

impl CliTestEnvironment {
    /// Creates a new test environment with a real git repository
    ///
    /// # Errors
    /// Returns an error if:
    /// - Failed to create temporary directory
    /// - Failed to initialize git repository
    /// - Failed to configure git settings
    /// - Failed to create initial commit
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new().context("Failed to create temporary directory")?;
        let repo_dir = temp_dir.child("test_repo");
        let outside_dir = temp_dir.child("not_a_repo");

        repo_dir.create_dir_all()?;
        outside_dir.create_dir_all()?;

        Self::run_git_command(&repo_dir, &["init"])?;
        Self::run_git_command(&repo_dir, &["config", "user.name", "Test User"])?;
        Self::run_git_command(&repo_dir, &["config", "user.email", "test@example.com"])?;

        repo_dir.child("README.md").write_str("# Test Repo")?;
        Self::run_git_command(&repo_dir, &["add", "."])?;
        Self::run_git_command(&repo_dir, &["commit", "-m", "Initial commit"])?;

        // Ensure we have a main branch (some git versions default to 'master')
        Self::run_git_command(&repo_dir, &["branch", "-M", "main"])?;

        Ok(Self {
            repo_dir,
            outside_dir,
            temp_dir,
        })
    }

    fn run_git_command(repo_path: &assert_fs::fixture::ChildPath, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(repo_path.path())
            .output()
            .context("Failed to execute git command")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Git command failed: {}", stderr);
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run a git command in the repository and return its stdout
    ///
    /// # Errors
    /// Returns an error if git fails
    pub fn git(&self, args: &[&str]) -> Result<String> {
        Self::run_git_command(&self.repo_dir, args)
    }

    /// Canonical repository path, as git reports it
    ///
    /// # Errors
    /// Returns an error if the path cannot be canonicalized
    pub fn repo_root(&self) -> Result<PathBuf> {
        Ok(self.repo_dir.path().canonicalize()?)
    }

    /// Path of a sibling directory next to the repository
    pub fn sibling(&self, name: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(name)
    }

    /// Execute the CLI in the repository directory
    ///
    /// # Errors
    /// Returns an error if the binary cannot be found
    pub fn run_command(&self, args: &[&str]) -> Result<assert_cmd::Command> {
        self.command_in(self.repo_dir.path(), args)
    }

    /// Execute the CLI in a directory that is not inside any git repository
    ///
    /// # Errors
    /// Returns an error if the binary cannot be found
    pub fn run_outside_repo(&self, args: &[&str]) -> Result<assert_cmd::Command> {
        self.command_in(self.outside_dir.path(), args)
    }

    fn command_in(&self, dir: &std::path::Path, args: &[&str]) -> Result<assert_cmd::Command> {
        let mut cmd =
            assert_cmd::Command::cargo_bin("gwtree").context("Failed to find gwtree binary")?;

        cmd.current_dir(dir)
            // Stop git from discovering a repository above the temp dir
            .env("GIT_CEILING_DIRECTORIES", self.temp_dir.path())
            .env("NO_COLOR", "1")
            .env_remove("GWTREE_LOG");

        cmd.args(args);
        Ok(cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use predicates::prelude::*;

    #[test]
    fn test_cli_test_environment_creation() -> Result<()> {
        let env = CliTestEnvironment::new()?;

        env.repo_dir.assert(predicate::path::is_dir());
        env.repo_dir.child(".git").assert(predicate::path::exists());
        env.repo_dir
            .child("README.md")
            .assert(predicate::str::contains("# Test Repo"));
        env.outside_dir.assert(predicate::path::is_dir());

        assert_eq!(env.git(&["branch", "--show-current"])?.trim(), "main");

        Ok(())
    }
}
