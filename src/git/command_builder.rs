//! Git command constructors
//!
//! Every command is pinned to a repository with `-C <dir>`, so git operations
//! never depend on the process working directory.

use std::path::Path;

use crate::process::ToolCommand;

/// Platform-specific git executable name.
pub const fn git_program() -> &'static str {
    if cfg!(windows) { "git.exe" } else { "git" }
}

/// Constructors for the git commands a mirroring run issues.
///
/// # Examples
///
/// ```rust,no_run
/// use plugin_mirror::git::command_builder::GitCommand;
///
/// # async fn example() -> Result<(), plugin_mirror::core::MirrorError> {
/// GitCommand::add_all("/path/to/repo").execute().await?.expect_success()?;
/// # Ok(())
/// # }
/// ```
pub struct GitCommand;

impl GitCommand {
    /// Bare `git -C <repo_dir>` command to append arguments to.
    pub fn in_repo(repo_dir: impl AsRef<Path>) -> ToolCommand {
        ToolCommand::new(git_program())
            .arg("-C")
            .arg(repo_dir.as_ref().display().to_string())
            .with_context("git")
    }

    /// `git config <key> <value>`
    pub fn config(repo_dir: impl AsRef<Path>, key: &str, value: &str) -> ToolCommand {
        Self::in_repo(repo_dir).args(["config", key, value])
    }

    /// `git add --all`
    pub fn add_all(repo_dir: impl AsRef<Path>) -> ToolCommand {
        Self::in_repo(repo_dir).args(["add", "--all"])
    }

    /// `git commit --all -m <message>`
    pub fn commit_all(repo_dir: impl AsRef<Path>, message: &str) -> ToolCommand {
        Self::in_repo(repo_dir).args(["commit", "--all", "-m", message])
    }

    /// `git push <remote> <branch>`
    pub fn push(repo_dir: impl AsRef<Path>, remote: &str, branch: &str) -> ToolCommand {
        Self::in_repo(repo_dir).args(["push", remote, branch])
    }
}
