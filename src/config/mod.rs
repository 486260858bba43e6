//! Configuration for worktree naming, editor choice and post-create hooks.
//!
//! This module provides:
//! - Discovery of a project config file, searching upward from the working directory
//! - Parsing of JSON and TOML sources (including a `gwtree` field in `package.json`)
//! - Validation with a fallback to defaults, so loading never fails
//!
//! # Search Order
//!
//! In each directory, from the starting directory up to the home directory,
//! the first of these that exists wins:
//!
//! 1. `.gwtreerc` (JSON, or TOML if it is not valid JSON)
//! 2. `.gwtreerc.json`
//! 3. `.gwtreerc.toml`
//! 4. the `gwtree` field of `package.json`
//!
//! # Configuration Example
//!
//! ```toml
//! defaultBranchChoice = "new"
//! defaultSuffix = "dev"
//! defaultEditor = "none"
//! namePattern = "{repo}-{branch}-{suffix}"
//!
//! [hooks.onCreate]
//! copyFiles = [{ src = ".env", dst = "." }, { src = "root/config/local", dst = "config/local" }]
//! runCommands = ["npm install", "echo ready {branchName} at {worktreePath}"]
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::naming::{BranchChoice, NamingConfig};
use crate::ui;

const RC_FILE: &str = ".gwtreerc";
const RC_JSON_FILE: &str = ".gwtreerc.json";
const RC_TOML_FILE: &str = ".gwtreerc.toml";
const PACKAGE_MANIFEST: &str = "package.json";
const PACKAGE_FIELD: &str = "gwtree";

/// Editor offered first after a worktree is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorChoice {
    /// VS Code via the `code` launcher
    #[default]
    Code,
    /// `$EDITOR`, falling back to `vim`
    Default,
    None,
}

/// A file or directory copied from the repository into a new worktree
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CopyEntry {
    /// Relative to the repository root; a leading `root/` is accepted and ignored
    pub src: String,
    /// Relative to the new worktree; `.` keeps the source's base name
    pub dst: String,
}

/// Actions run after a worktree has been created
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HookConfig {
    pub copy_files: Vec<CopyEntry>,
    /// Shell commands; `{worktreePath}` and `{branchName}` are substituted
    pub run_commands: Vec<String>,
}

impl HookConfig {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.copy_files.is_empty() && self.run_commands.is_empty()
    }
}

/// Fully defaulted configuration, passed explicitly to the create flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GwtreeConfig {
    pub naming: NamingConfig,
    pub open_editor: bool,
    pub editor: EditorChoice,
    pub hooks: HookConfig,
}

impl Default for GwtreeConfig {
    fn default() -> Self {
        Self {
            naming: NamingConfig::default(),
            open_editor: true,
            editor: EditorChoice::default(),
            hooks: HookConfig::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    default_branch_choice: Option<BranchChoice>,
    default_suffix: Option<String>,
    default_open_editor: Option<bool>,
    default_editor: Option<EditorChoice>,
    name_pattern: Option<String>,
    hooks: Option<RawHooks>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawHooks {
    on_create: Option<RawOnCreate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOnCreate {
    copy_files: Option<Vec<CopyEntry>>,
    run_commands: Option<Vec<String>>,
}

impl RawConfig {
    fn into_config(self) -> Result<GwtreeConfig> {
        let defaults = GwtreeConfig::default();

        let name_pattern = self.name_pattern.unwrap_or(defaults.naming.name_pattern);
        NamingConfig::validate_pattern(&name_pattern).map_err(anyhow::Error::msg)?;

        let on_create = self.hooks.and_then(|h| h.on_create).unwrap_or_default();

        Ok(GwtreeConfig {
            naming: NamingConfig {
                branch_choice: self
                    .default_branch_choice
                    .unwrap_or(defaults.naming.branch_choice),
                default_suffix: self.default_suffix.unwrap_or(defaults.naming.default_suffix),
                name_pattern,
            },
            open_editor: self.default_open_editor.unwrap_or(defaults.open_editor),
            editor: self.default_editor.unwrap_or(defaults.editor),
            hooks: HookConfig {
                copy_files: on_create.copy_files.unwrap_or_default(),
                run_commands: on_create.run_commands.unwrap_or_default(),
            },
        })
    }
}

/// How a config file's content is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
    /// JSON first, then TOML (the extensionless rc file)
    JsonOrToml,
    /// The `gwtree` field of a `package.json`
    PackageField,
}

/// A config file found on disk, read but not yet parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    pub path: PathBuf,
    pub format: ConfigFormat,
    pub content: String,
}

impl ConfigSource {
    #[must_use]
    pub fn new(
        path: impl Into<PathBuf>,
        format: ConfigFormat,
        content: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            format,
            content: content.into(),
        }
    }

    /// Searches `start` and its ancestors, stopping at the home directory
    ///
    /// # Errors
    /// Returns an error if a candidate file exists but cannot be read
    pub fn find(start: &Path) -> Result<Option<Self>> {
        let home = dirs::home_dir();

        for dir in start.ancestors() {
            if let Some(source) = Self::find_in_dir(dir)? {
                return Ok(Some(source));
            }
            if home.as_deref() == Some(dir) {
                break;
            }
        }

        Ok(None)
    }

    fn find_in_dir(dir: &Path) -> Result<Option<Self>> {
        let candidates = [
            (RC_FILE, ConfigFormat::JsonOrToml),
            (RC_JSON_FILE, ConfigFormat::Json),
            (RC_TOML_FILE, ConfigFormat::Toml),
            (PACKAGE_MANIFEST, ConfigFormat::PackageField),
        ];

        for (file_name, format) in candidates {
            let path = dir.join(file_name);
            if !path.is_file() {
                continue;
            }
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;

            // A package.json without our field does not count as a config
            if format == ConfigFormat::PackageField && !has_package_field(&content) {
                continue;
            }

            tracing::debug!(path = %path.display(), "using config file");
            return Ok(Some(Self::new(path, format, content)));
        }

        Ok(None)
    }
}

fn has_package_field(content: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(content)
        .ok()
        .is_some_and(|manifest| manifest.get(PACKAGE_FIELD).is_some())
}

fn parse_raw(source: &ConfigSource) -> Result<RawConfig> {
    // Blank files behave like a missing config
    if source.content.trim().is_empty() {
        return Ok(RawConfig::default());
    }

    let raw: RawConfig = match source.format {
        ConfigFormat::Json => serde_json::from_str(&source.content)?,
        ConfigFormat::Toml => toml::from_str(&source.content)?,
        ConfigFormat::JsonOrToml => match serde_json::from_str(&source.content) {
            Ok(raw) => raw,
            Err(json_err) => toml::from_str(&source.content).with_context(|| {
                format!("neither valid JSON ({json_err}) nor valid TOML")
            })?,
        },
        ConfigFormat::PackageField => {
            let mut manifest: serde_json::Value = serde_json::from_str(&source.content)?;
            match manifest.get_mut(PACKAGE_FIELD).map(serde_json::Value::take) {
                Some(field) => serde_json::from_value(field)?,
                None => RawConfig::default(),
            }
        }
    };
    Ok(raw)
}

impl GwtreeConfig {
    /// Parses and validates a source without falling back
    ///
    /// # Errors
    /// Returns an error if the content does not parse or a value is invalid
    pub fn from_source(source: &ConfigSource) -> Result<Self> {
        parse_raw(source)?.into_config()
    }

    /// Finds and loads the config that applies to `start`.
    ///
    /// Always succeeds: unreadable or invalid files produce a warning and
    /// the defaults.
    #[must_use]
    pub fn discover(start: &Path) -> Self {
        match ConfigSource::find(start) {
            Ok(source) => load_config(source.as_ref()),
            Err(e) => {
                ui::warn(&format!("{e:#}, using defaults"));
                Self::default()
            }
        }
    }
}

/// Turns an optional source into a complete configuration.
///
/// Missing source means defaults; an invalid one is reported and replaced by
/// defaults as a whole.
#[must_use]
pub fn load_config(source: Option<&ConfigSource>) -> GwtreeConfig {
    let Some(source) = source else {
        return GwtreeConfig::default();
    };

    match GwtreeConfig::from_source(source) {
        Ok(config) => config,
        Err(e) => {
            tracing::debug!(
                path = %source.path.display(),
                error = %e,
                "invalid config, falling back to defaults"
            );
            ui::warn(&format!(
                "Config validation failed for {}, using defaults: {e:#}",
                source.path.display()
            ));
            GwtreeConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::DEFAULT_NAME_PATTERN;
    use tempfile::TempDir;

    fn json(content: &str) -> ConfigSource {
        ConfigSource::new(".gwtreerc.json", ConfigFormat::Json, content)
    }

    #[test]
    fn test_defaults() {
        let config = load_config(None);
        assert_eq!(config.naming.branch_choice, BranchChoice::Current);
        assert_eq!(config.naming.default_suffix, "1");
        assert_eq!(config.naming.name_pattern, DEFAULT_NAME_PATTERN);
        assert!(config.open_editor);
        assert_eq!(config.editor, EditorChoice::Code);
        assert!(config.hooks.is_empty());
    }

    #[test]
    fn test_partial_json_merges_with_defaults() {
        let source = json(r#"{"defaultSuffix": "dev", "defaultEditor": "none"}"#);
        let config = load_config(Some(&source));
        assert_eq!(config.naming.default_suffix, "dev");
        assert_eq!(config.editor, EditorChoice::None);
        assert_eq!(config.naming.name_pattern, DEFAULT_NAME_PATTERN);
    }

    #[test]
    fn test_hooks_are_read() -> Result<()> {
        let config = GwtreeConfig::from_source(&json(
            r#"{
                "hooks": {
                    "onCreate": {
                        "copyFiles": [{"src": ".env", "dst": "."}],
                        "runCommands": ["npm install"]
                    }
                }
            }"#,
        ))?;
        assert_eq!(
            config.hooks.copy_files,
            vec![CopyEntry {
                src: ".env".into(),
                dst: ".".into()
            }]
        );
        assert_eq!(config.hooks.run_commands, vec!["npm install"]);
        Ok(())
    }

    #[test]
    fn test_invalid_values_fall_back_to_defaults() {
        let source = json(r#"{"defaultSuffix": "x", "defaultEditor": "emacs"}"#);
        let bad_enum = load_config(Some(&source));
        assert_eq!(bad_enum, GwtreeConfig::default());

        let bad_pattern = load_config(Some(&json(r#"{"namePattern": "{repo}-only"}"#)));
        assert_eq!(bad_pattern, GwtreeConfig::default());

        let bad_syntax = load_config(Some(&json("{not json")));
        assert_eq!(bad_syntax, GwtreeConfig::default());
    }

    #[test]
    fn test_toml_and_extensionless_rc() -> Result<()> {
        let toml_content = r#"
defaultBranchChoice = "new"
namePattern = "{branch}-{repo}-{suffix}"

[hooks.onCreate]
runCommands = ["make"]
"#;
        let toml_config = GwtreeConfig::from_source(&ConfigSource::new(
            ".gwtreerc.toml",
            ConfigFormat::Toml,
            toml_content,
        ))?;
        assert_eq!(toml_config.naming.branch_choice, BranchChoice::New);
        assert_eq!(toml_config.hooks.run_commands, vec!["make"]);

        let rc_toml = GwtreeConfig::from_source(&ConfigSource::new(
            ".gwtreerc",
            ConfigFormat::JsonOrToml,
            toml_content,
        ))?;
        assert_eq!(rc_toml, toml_config);

        let rc_json = GwtreeConfig::from_source(&ConfigSource::new(
            ".gwtreerc",
            ConfigFormat::JsonOrToml,
            r#"{"defaultOpenEditor": false}"#,
        ))?;
        assert!(!rc_json.open_editor);
        Ok(())
    }

    #[test]
    fn test_package_field() -> Result<()> {
        let source = ConfigSource::new(
            "package.json",
            ConfigFormat::PackageField,
            r#"{"name": "app", "gwtree": {"defaultSuffix": "pkg"}}"#,
        );
        assert_eq!(GwtreeConfig::from_source(&source)?.naming.default_suffix, "pkg");
        Ok(())
    }

    #[test]
    fn test_find_prefers_rc_file_and_walks_up() -> Result<()> {
        let temp = TempDir::new()?;
        let root = temp.path().join("project");
        let nested = root.join("src").join("deep");
        fs::create_dir_all(&nested)?;

        fs::write(root.join(RC_JSON_FILE), r#"{"defaultSuffix": "json"}"#)?;
        fs::write(root.join(RC_FILE), r#"{"defaultSuffix": "rc"}"#)?;

        let source = ConfigSource::find(&nested)?;
        assert_eq!(source.as_ref().map(|s| s.path.clone()), Some(root.join(RC_FILE)));
        assert_eq!(GwtreeConfig::discover(&nested).naming.default_suffix, "rc");
        Ok(())
    }

    #[test]
    fn test_find_skips_package_json_without_field() -> Result<()> {
        let temp = TempDir::new()?;
        let root = temp.path().join("project");
        let nested = root.join("web");
        fs::create_dir_all(&nested)?;

        fs::write(nested.join(PACKAGE_MANIFEST), r#"{"name": "web"}"#)?;
        fs::write(root.join(RC_TOML_FILE), "defaultSuffix = \"outer\"\n")?;

        assert_eq!(GwtreeConfig::discover(&nested).naming.default_suffix, "outer");
        Ok(())
    }
}
