//! # gwtree
//!
//! An interactive CLI for everyday `git worktree` workflows: create a worktree
//! next to the repository with a predictable name, browse and delete existing
//! worktrees, and run post-create hooks.
//!
//! ## Features
//!
//! - **Predictable Names** - Worktrees land in `<parent>/<repo>-<branch>-wt-<suffix>` by default
//! - **Branch Safety** - A fresh, non-colliding branch is derived when starting from an existing branch
//! - **Cancel Anywhere** - ESC at any prompt leaves the repository untouched
//! - **Hooks** - Copy local files and run setup commands in each new worktree
//! - **Project Config** - `.gwtreerc`, `.gwtreerc.json`, `.gwtreerc.toml` or a `gwtree` field in `package.json`
//!
//! ## Quick Start
//!
//! ```bash
//! # Create a worktree (the default command)
//! gwtree
//!
//! # Browse worktrees and delete them one by one
//! gwtree ls
//!
//! # Remove a single worktree
//! gwtree rm
//! ```
//!
//! ## Module Structure
//!
//! - [`commands`] - The create, list and remove flows
//! - [`naming`] - Worktree directory and branch naming
//! - [`git`] - Git executable facade and `worktree list --porcelain` parsing
//! - [`config`] - Config discovery, parsing and defaults
//! - [`hooks`] - Post-create file copies and commands
//! - [`selection`] - Abstracts interactive prompts for testability
//! - [`traits`] - Defines the GitRunner trait for testability and abstraction

pub mod commands;
pub mod config;
pub mod editor;
pub mod error;
pub mod git;
pub mod hooks;
pub mod naming;
pub mod selection;
pub mod traits;
pub mod ui;

pub use anyhow::Result;
