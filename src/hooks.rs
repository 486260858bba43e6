//! Post-create hooks: copy files from the repository into a new worktree,
//! then run shell commands inside it.
//!
//! Hooks never fail the creation. Each problem is collected in the
//! [`HookReport`] and execution moves on to the next entry.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::{CopyEntry, HookConfig};

const ROOT_PREFIX: &str = "root/";
const SAME_NAME: &str = ".";

pub struct HookContext<'a> {
    pub git_root: &'a Path,
    pub worktree_path: &'a Path,
    pub branch_name: &'a str,
}

#[derive(Debug, Default)]
pub struct HookReport {
    /// Destination of every file or directory copied
    pub copied: Vec<PathBuf>,
    /// Commands that exited successfully, after substitution
    pub commands_run: Vec<String>,
    pub warnings: Vec<String>,
}

/// Source path for a copy entry; `root/x` and `x` are the same file
#[must_use]
pub fn resolve_source(git_root: &Path, src: &str) -> PathBuf {
    git_root.join(src.strip_prefix(ROOT_PREFIX).unwrap_or(src))
}

/// Destination for a copy entry; `.` keeps the source's base name
#[must_use]
pub fn resolve_destination(worktree_path: &Path, source: &Path, dst: &str) -> PathBuf {
    if dst == SAME_NAME {
        match source.file_name() {
            Some(name) => worktree_path.join(name),
            None => worktree_path.to_path_buf(),
        }
    } else {
        worktree_path.join(dst)
    }
}

/// Substitutes `{worktreePath}` and `{branchName}`
#[must_use]
pub fn expand_command(command: &str, context: &HookContext<'_>) -> String {
    command
        .replace("{worktreePath}", &context.worktree_path.to_string_lossy())
        .replace("{branchName}", context.branch_name)
}

/// Runs the copy step and then the command step
pub fn run_on_create(hooks: &HookConfig, context: &HookContext<'_>) -> HookReport {
    let mut report = HookReport::default();
    copy_files(&hooks.copy_files, context, &mut report);
    run_commands(&hooks.run_commands, context, &mut report);
    report
}

pub fn copy_files(entries: &[CopyEntry], context: &HookContext<'_>, report: &mut HookReport) {
    for entry in entries {
        let source = resolve_source(context.git_root, &entry.src);
        if !source.exists() {
            report
                .warnings
                .push(format!("Hook copyFiles: Source not found: {}", source.display()));
            continue;
        }

        let destination = resolve_destination(context.worktree_path, &source, &entry.dst);
        let copied = if source.is_dir() {
            copy_dir_recursive(&source, &destination)
        } else {
            copy_file(&source, &destination)
        };

        match copied {
            Ok(()) => report.copied.push(destination),
            Err(e) => report.warnings.push(format!(
                "Hook copyFiles failed for {} -> {}: {e:#}",
                entry.src, entry.dst
            )),
        }
    }
}

pub fn run_commands(commands: &[String], context: &HookContext<'_>, report: &mut HookReport) {
    for command in commands {
        let expanded = expand_command(command, context);
        tracing::debug!(
            command = %expanded,
            cwd = %context.worktree_path.display(),
            "running hook command"
        );

        match shell(&expanded).current_dir(context.worktree_path).output() {
            Ok(output) if output.status.success() => report.commands_run.push(expanded),
            Ok(output) => report.warnings.push(format!(
                "Hook command failed: {expanded}\n{}",
                String::from_utf8_lossy(&output.stderr).trim_end()
            )),
            Err(e) => report
                .warnings
                .push(format!("Hook command error: {command}: {e}")),
        }
    }
}

#[cfg(unix)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

fn copy_file(source: &Path, destination: &Path) -> Result<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::copy(source, destination)
        .with_context(|| format!("Failed to copy {}", source.display()))?;
    Ok(())
}

/// Copies the contents of `source` into `target`, merging with what is there
fn copy_dir_recursive(source: &Path, target: &Path) -> Result<()> {
    fs::create_dir_all(target)
        .with_context(|| format!("Failed to create directory {}", target.display()))?;

    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let source_path = entry.path();
        let target_path = target.join(entry.file_name());

        // file_type does not follow links, so links are recreated, never entered
        let file_type = entry.file_type()?;
        if file_type.is_symlink() {
            copy_symlink(&source_path, &target_path)?;
        } else if file_type.is_dir() {
            copy_dir_recursive(&source_path, &target_path)?;
        } else {
            fs::copy(&source_path, &target_path)
                .with_context(|| format!("Failed to copy {}", source_path.display()))?;
        }
    }

    Ok(())
}

/// Recreates the link at `target` with the same (possibly dangling) target
fn copy_symlink(source: &Path, target: &Path) -> Result<()> {
    let link = fs::read_link(source)
        .with_context(|| format!("Failed to read link {}", source.display()))?;

    if fs::symlink_metadata(target).is_ok_and(|existing| !existing.is_dir()) {
        fs::remove_file(target)
            .with_context(|| format!("Failed to replace {}", target.display()))?;
    }

    create_symlink(source, &link, target)
        .with_context(|| format!("Failed to create link {}", target.display()))
}

#[cfg(unix)]
fn create_symlink(_source: &Path, link: &Path, target: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(link, target)
}

#[cfg(windows)]
fn create_symlink(source: &Path, link: &Path, target: &Path) -> std::io::Result<()> {
    if source.is_dir() {
        std::os::windows::fs::symlink_dir(link, target)
    } else {
        std::os::windows::fs::symlink_file(link, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Dirs {
        _temp: TempDir,
        root: PathBuf,
        worktree: PathBuf,
    }

    fn dirs() -> Result<Dirs> {
        let temp = TempDir::new()?;
        let root = temp.path().join("repo");
        let worktree = temp.path().join("repo-main-wt-1");
        fs::create_dir_all(&root)?;
        fs::create_dir_all(&worktree)?;
        Ok(Dirs {
            _temp: temp,
            root,
            worktree,
        })
    }

    fn entry(src: &str, dst: &str) -> CopyEntry {
        CopyEntry {
            src: src.into(),
            dst: dst.into(),
        }
    }

    #[test]
    fn test_root_prefix_is_an_alias() {
        let root = Path::new("/repo");
        assert_eq!(resolve_source(root, "root/.env"), resolve_source(root, ".env"));
        assert_eq!(resolve_source(root, "config/a.json"), PathBuf::from("/repo/config/a.json"));
    }

    #[test]
    fn test_dot_destination_keeps_base_name() {
        let dst = resolve_destination(Path::new("/wt"), Path::new("/repo/config/.env"), ".");
        assert_eq!(dst, PathBuf::from("/wt/.env"));
        let dst = resolve_destination(Path::new("/wt"), Path::new("/repo/.env"), "env/.env.local");
        assert_eq!(dst, PathBuf::from("/wt/env/.env.local"));
    }

    #[test]
    fn test_expand_command() {
        let context = HookContext {
            git_root: Path::new("/repo"),
            worktree_path: Path::new("/repo-main-wt-1"),
            branch_name: "main-1",
        };
        assert_eq!(
            expand_command("echo {branchName} {worktreePath} {branchName}", &context),
            "echo main-1 /repo-main-wt-1 main-1"
        );
    }

    #[test]
    fn test_copy_files_and_directories() -> Result<()> {
        let d = dirs()?;
        fs::write(d.root.join(".env"), "KEY=value")?;
        fs::create_dir_all(d.root.join("config/local/nested"))?;
        fs::write(d.root.join("config/local/nested/a.json"), "{}")?;

        let context = HookContext {
            git_root: &d.root,
            worktree_path: &d.worktree,
            branch_name: "main-1",
        };
        let mut report = HookReport::default();
        copy_files(
            &[
                entry("root/.env", "."),
                entry("config/local", "settings"),
                entry(".env", "deep/dir/.env.copy"),
            ],
            &context,
            &mut report,
        );

        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
        assert_eq!(fs::read_to_string(d.worktree.join(".env"))?, "KEY=value");
        assert!(d.worktree.join("settings/nested/a.json").is_file());
        assert!(d.worktree.join("deep/dir/.env.copy").is_file());
        assert_eq!(report.copied.len(), 3);
        Ok(())
    }

    #[test]
    fn test_missing_source_is_a_warning() -> Result<()> {
        let d = dirs()?;
        fs::write(d.root.join("present.txt"), "x")?;
        let context = HookContext {
            git_root: &d.root,
            worktree_path: &d.worktree,
            branch_name: "main-1",
        };

        let mut report = HookReport::default();
        copy_files(
            &[entry("missing.txt", "."), entry("present.txt", ".")],
            &context,
            &mut report,
        );

        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("Source not found"));
        assert!(d.worktree.join("present.txt").is_file());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_directory_copy_keeps_symlinks_as_links() -> Result<()> {
        use std::os::unix::fs::symlink;

        let d = dirs()?;
        let cfg = d.root.join("cfg");
        fs::create_dir_all(cfg.join("real"))?;
        fs::write(cfg.join("real/file.txt"), "data")?;
        fs::write(cfg.join("plain.txt"), "plain")?;
        symlink("real", cfg.join("alias"))?;
        symlink("does-not-exist", cfg.join("a_link"))?;
        symlink(".", cfg.join("self_loop"))?;

        let context = HookContext {
            git_root: &d.root,
            worktree_path: &d.worktree,
            branch_name: "main-1",
        };
        let mut report = HookReport::default();
        copy_files(&[entry("cfg", ".")], &context, &mut report);

        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
        let copied = d.worktree.join("cfg");
        assert_eq!(fs::read_to_string(copied.join("real/file.txt"))?, "data");
        assert_eq!(fs::read_to_string(copied.join("plain.txt"))?, "plain");
        let links = [
            ("alias", "real"),
            ("a_link", "does-not-exist"),
            ("self_loop", "."),
        ];
        for (name, points_to) in links {
            let metadata = fs::symlink_metadata(copied.join(name))?;
            assert!(metadata.file_type().is_symlink(), "{name} should stay a link");
            assert_eq!(fs::read_link(copied.join(name))?, PathBuf::from(points_to));
        }
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_commands_continue_after_failure() -> Result<()> {
        let d = dirs()?;
        let context = HookContext {
            git_root: &d.root,
            worktree_path: &d.worktree,
            branch_name: "feature-x",
        };
        let hooks = HookConfig {
            copy_files: Vec::new(),
            run_commands: vec![
                "echo oops >&2; exit 3".to_string(),
                "echo {branchName} > branch.txt".to_string(),
            ],
        };

        let report = run_on_create(&hooks, &context);

        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("oops"));
        assert_eq!(report.commands_run, vec!["echo feature-x > branch.txt"]);
        assert_eq!(fs::read_to_string(d.worktree.join("branch.txt"))?.trim(), "feature-x");
        Ok(())
    }
}
