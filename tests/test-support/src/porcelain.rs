/// Builds `git worktree list --porcelain` output for scripted git responses
#[derive(Default)]
pub struct PorcelainBuilder {
    output: String,
    records: usize,
}

impl PorcelainBuilder {
    /// Starts a listing whose first record is the primary worktree on `main`
    pub fn primary(path: &str) -> Self {
        Self::default().branch(path, "main")
    }

    /// Adds a worktree checked out on `branch`
    #[must_use]
    pub fn branch(mut self, path: &str, branch: &str) -> Self {
        let head = self.next_head();
        self.output.push_str(&format!(
            "worktree {path}\nHEAD {head}\nbranch refs/heads/{branch}\n\n"
        ));
        self
    }

    /// Adds a worktree with a detached HEAD
    #[must_use]
    pub fn detached(mut self, path: &str) -> Self {
        let head = self.next_head();
        self.output
            .push_str(&format!("worktree {path}\nHEAD {head}\ndetached\n\n"));
        self
    }

    pub fn build(&self) -> String {
        self.output.clone()
    }

    fn next_head(&mut self) -> String {
        self.records += 1;
        format!("{:040x}", 0xabc_0000 + self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_output_shape() {
        let output = PorcelainBuilder::primary("/r").detached("/r-wt").build();
        assert!(output.starts_with("worktree /r\nHEAD "));
        assert!(output.contains("branch refs/heads/main\n"));
        assert!(output.contains("worktree /r-wt\n"));
        assert!(output.contains("detached\n"));
    }
}
