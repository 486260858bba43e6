//! Parsing of `git worktree list --porcelain`.
//!
//! The format is line oriented:
//!
//! ```text
//! worktree /home/user/repo
//! HEAD 3f2a9c1d8e7b6a5f4e3d2c1b0a9f8e7d6c5b4a3f
//! branch refs/heads/main
//!
//! worktree /home/user/repo-main-wt-1
//! HEAD 9b8a7c6d5e4f3a2b1c0d9e8f7a6b5c4d3e2f1a0b
//! detached
//! ```
//!
//! A `worktree` line opens a record. The first record is always the primary
//! worktree at the repository root.

use std::path::{Path, PathBuf};

/// Length of the abbreviated commit id shown for detached worktrees
pub const SHORT_HEAD_LEN: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorktreeEntry {
    pub path: PathBuf,
    /// Short branch name; `None` for a detached HEAD
    pub branch: Option<String>,
    pub head_short: String,
}

impl WorktreeEntry {
    /// Branch name, or the abbreviated HEAD when detached
    #[must_use]
    pub fn display_ref(&self) -> &str {
        self.branch.as_deref().unwrap_or(&self.head_short)
    }

    /// Final path component, used as the worktree's short name
    #[must_use]
    pub fn dir_name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| self.path.display().to_string(), |n| n.to_string_lossy().into_owned())
    }
}

/// One classified porcelain line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PorcelainLine<'a> {
    Worktree(&'a str),
    Branch(&'a str),
    Head(&'a str),
    Other,
}

impl<'a> PorcelainLine<'a> {
    #[must_use]
    pub fn classify(line: &'a str) -> Self {
        if let Some(path) = line.strip_prefix("worktree ") {
            PorcelainLine::Worktree(path)
        } else if let Some(reference) = line.strip_prefix("branch ") {
            PorcelainLine::Branch(reference)
        } else if let Some(head) = line.strip_prefix("HEAD ") {
            PorcelainLine::Head(head)
        } else {
            PorcelainLine::Other
        }
    }
}

#[derive(Default)]
struct RecordBuilder {
    path: Option<PathBuf>,
    branch: Option<String>,
    head_short: String,
}

impl RecordBuilder {
    fn finish(self) -> Option<WorktreeEntry> {
        self.path.map(|path| WorktreeEntry {
            path,
            branch: self.branch,
            head_short: self.head_short,
        })
    }
}

/// Parses porcelain output into entries in git's order
#[must_use]
pub fn parse_worktree_list(output: &str) -> Vec<WorktreeEntry> {
    let mut entries = Vec::new();
    let mut current = RecordBuilder::default();

    for line in output.lines() {
        match PorcelainLine::classify(line) {
            PorcelainLine::Worktree(path) => {
                let finished = std::mem::take(&mut current);
                entries.extend(finished.finish());
                current.path = Some(PathBuf::from(path));
            }
            PorcelainLine::Branch(reference) => {
                // refs/heads/feature/x keeps only its final segment
                let short = reference.rsplit('/').next().unwrap_or(reference);
                current.branch = Some(short.to_string());
            }
            PorcelainLine::Head(head) => {
                current.head_short = head.chars().take(SHORT_HEAD_LEN).collect();
            }
            PorcelainLine::Other => {}
        }
    }
    entries.extend(current.finish());

    entries
}

/// Every entry except the primary worktree
#[must_use]
pub fn removable_worktrees(entries: &[WorktreeEntry]) -> &[WorktreeEntry] {
    entries.get(1..).unwrap_or_default()
}

/// Looks up an entry by path
#[must_use]
pub fn find_by_path<'e>(entries: &'e [WorktreeEntry], path: &Path) -> Option<&'e WorktreeEntry> {
    entries.iter().find(|entry| entry.path == path)
}
