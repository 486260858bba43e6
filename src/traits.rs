use anyhow::Result;
use std::path::Path;

use crate::git::GitOutput;

/// Trait for invoking the git executable, so flows can run against a mock in tests
pub trait GitRunner {
    /// Runs `git` with the given arguments and captures its output.
    ///
    /// A non-zero exit is not an error here: it is reported through
    /// [`GitOutput::succeeded`] and left to the caller.
    ///
    /// # Errors
    /// Returns an error only if the process could not be spawned
    fn run(&self, args: &[&str], cwd: Option<&Path>) -> Result<GitOutput>;
}
