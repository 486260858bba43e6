//! Worktree directory and branch naming.
//!
//! Everything here is pure: the interactive flow gathers answers and the
//! repository snapshot, and these functions turn them into a [`CreationPlan`].

use serde::Deserialize;
use std::path::PathBuf;

use crate::git::RepositoryContext;

pub const DEFAULT_NAME_PATTERN: &str = "{repo}-{branch}-wt-{suffix}";
pub const DEFAULT_SUFFIX: &str = "1";

const REPO_PLACEHOLDER: &str = "{repo}";
const BRANCH_PLACEHOLDER: &str = "{branch}";
const SUFFIX_SEGMENT: &str = "-{suffix}";
/// Used in the worktree branch name when no suffix was entered
const FALLBACK_BRANCH_SUFFIX: &str = "wt";

/// Which option the branch prompt starts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchChoice {
    #[default]
    Current,
    New,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingConfig {
    pub branch_choice: BranchChoice,
    pub default_suffix: String,
    pub name_pattern: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            branch_choice: BranchChoice::default(),
            default_suffix: DEFAULT_SUFFIX.to_string(),
            name_pattern: DEFAULT_NAME_PATTERN.to_string(),
        }
    }
}

impl NamingConfig {
    /// Checks that a pattern names both the repository and the branch
    ///
    /// # Errors
    /// Returns a description of the missing placeholder
    pub fn validate_pattern(pattern: &str) -> Result<(), String> {
        for placeholder in [REPO_PLACEHOLDER, BRANCH_PLACEHOLDER] {
            if !pattern.contains(placeholder) {
                return Err(format!("namePattern must contain {placeholder}"));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn prefix(&self, repo: &str, branch: &str) -> String {
        worktree_prefix(&self.name_pattern, repo, branch)
    }
}

/// The part of the worktree name the user does not edit.
///
/// `{repo}-{branch}-wt-{suffix}` with repo `app` and branch `main` gives
/// `app-main-wt`.
#[must_use]
pub fn worktree_prefix(pattern: &str, repo: &str, branch: &str) -> String {
    pattern
        .replace(REPO_PLACEHOLDER, repo)
        .replace(BRANCH_PLACEHOLDER, branch)
        .replace(SUFFIX_SEGMENT, "")
}

#[must_use]
pub fn worktree_name(prefix: &str, suffix: &str) -> String {
    format!("{prefix}-{suffix}")
}

/// First branch name tried for a worktree attached to an existing branch
#[must_use]
pub fn worktree_branch_candidate(branch: &str, suffix: &str) -> String {
    let suffix = if suffix.is_empty() {
        FALLBACK_BRANCH_SUFFIX
    } else {
        suffix
    };
    format!("{branch}-{suffix}")
}

/// Returns `candidate` if unused, otherwise `candidate-1`, `candidate-2`, ...
///
/// Terminates because `existing` is finite: at most `existing.len() + 1`
/// names are tried.
#[must_use]
pub fn unique_branch_name(candidate: &str, existing: &[String]) -> String {
    let taken = |name: &str| existing.iter().any(|b| b == name);
    if !taken(candidate) {
        return candidate.to_string();
    }
    (1..)
        .map(|n| format!("{candidate}-{n}"))
        .find(|name| !taken(name))
        .unwrap_or_else(|| candidate.to_string())
}

/// Validation for the "new branch" prompt
///
/// # Errors
/// Returns the message shown under the prompt
pub fn validate_new_branch_name(name: &str, existing: &[String]) -> Result<(), String> {
    if name.is_empty() {
        return Err("Branch name is required".to_string());
    }
    if existing.iter().any(|b| b == name) {
        return Err("Branch already exists".to_string());
    }
    Ok(())
}

/// The existing branch offered first: `main` or `master` if present,
/// otherwise the current branch. `None` when detached with neither.
#[must_use]
pub fn default_base_branch(branches: &[String], current_branch: &str) -> Option<String> {
    branches
        .iter()
        .find(|b| *b == "main" || *b == "master")
        .cloned()
        .or_else(|| (!current_branch.is_empty()).then(|| current_branch.to_string()))
}

/// Which branch the new worktree is built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchSelection {
    /// Start from an existing branch; a fresh branch is derived for the worktree
    Existing(String),
    /// Create exactly this branch from `base`
    New { name: String, base: String },
}

/// How the user named the worktree directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorktreeName {
    /// Appended to the pattern prefix
    Suffix(String),
    /// Used verbatim, bypassing the pattern
    Custom(String),
}

/// Everything `git worktree add` needs. Built once, consumed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationPlan {
    pub branch: String,
    pub base: String,
    pub worktree_name: String,
    pub path: PathBuf,
}

impl CreationPlan {
    /// Resolves names against a repository snapshot.
    ///
    /// For an existing branch the derived worktree branch is made unique
    /// against `context.branches`, so the snapshot should be fresh.
    #[must_use]
    pub fn resolve(
        config: &NamingConfig,
        context: &RepositoryContext,
        selection: &BranchSelection,
        name: &WorktreeName,
    ) -> Self {
        let source_branch = match selection {
            BranchSelection::Existing(branch) | BranchSelection::New { name: branch, .. } => branch,
        };

        let worktree_name = match name {
            WorktreeName::Suffix(suffix) => {
                worktree_name(&config.prefix(&context.repo_name, source_branch), suffix)
            }
            WorktreeName::Custom(custom) => custom.clone(),
        };

        let (branch, base) = match selection {
            BranchSelection::New { name, base } => (name.clone(), base.clone()),
            BranchSelection::Existing(existing) => {
                let suffix = match name {
                    WorktreeName::Suffix(suffix) => suffix.as_str(),
                    WorktreeName::Custom(_) => "",
                };
                let candidate = worktree_branch_candidate(existing, suffix);
                (unique_branch_name(&candidate, &context.branches), existing.clone())
            }
        };

        Self {
            branch,
            base,
            path: context.parent_dir.join(&worktree_name),
            worktree_name,
        }
    }

    /// Arguments for `git worktree add -b <branch> <path> <base>`
    #[must_use]
    pub fn git_args(&self) -> Vec<String> {
        vec![
            "worktree".to_string(),
            "add".to_string(),
            "-b".to_string(),
            self.branch.clone(),
            self.path.to_string_lossy().into_owned(),
            self.base.clone(),
        ]
    }
}
