use anyhow::{Context, Result};
use std::path::Path;
use std::process::Command;

use crate::config::EditorChoice;

const VSCODE_LAUNCHER: &str = "code";
const FALLBACK_EDITOR: &str = "vim";

impl EditorChoice {
    pub const ALL: [EditorChoice; 3] = [
        EditorChoice::Code,
        EditorChoice::Default,
        EditorChoice::None,
    ];

    #[must_use]
    pub fn value(self) -> &'static str {
        match self {
            EditorChoice::Code => "code",
            EditorChoice::Default => "default",
            EditorChoice::None => "none",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            EditorChoice::Code => "VS Code",
            EditorChoice::Default => "Default ($EDITOR)",
            EditorChoice::None => "Don't open",
        }
    }

    #[must_use]
    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|choice| choice.value() == value)
    }
}

/// `$EDITOR`, or `vim` when unset or blank
#[must_use]
pub fn default_editor_command() -> String {
    std::env::var("EDITOR")
        .ok()
        .filter(|editor| !editor.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_EDITOR.to_string())
}

/// Opens `path` in the chosen editor and waits for the launcher to return
///
/// # Errors
/// Returns an error if the editor cannot be started or exits non-zero
pub fn open(choice: EditorChoice, path: &Path) -> Result<()> {
    let (program, status) = match choice {
        EditorChoice::None => return Ok(()),
        EditorChoice::Code => {
            let output = Command::new(VSCODE_LAUNCHER)
                .arg(path)
                .output()
                .with_context(|| format!("Failed to launch {VSCODE_LAUNCHER}"))?;
            (VSCODE_LAUNCHER.to_string(), output.status)
        }
        EditorChoice::Default => {
            let editor = default_editor_command();
            // Terminal editors take over stdio until they exit
            let status = Command::new(&editor)
                .arg(path)
                .status()
                .with_context(|| format!("Failed to launch {editor}"))?;
            (editor, status)
        }
    };

    if !status.success() {
        anyhow::bail!("{} exited with {}", program, status);
    }
    Ok(())
}
