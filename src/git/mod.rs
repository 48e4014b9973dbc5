//! Version control of the mirror repository
//!
//! The mirror repository is an existing checkout (usually the CI workspace).
//! A run only ever configures the committer, stages everything, commits, and
//! pushes. All of it goes through the system `git` binary so the runner's
//! credential setup applies unchanged.
//!
//! [`VcsClient`] is the seam the pipeline depends on; [`GitCli`] is the real
//! implementation. Methods return the raw [`CommandOutput`] because the
//! pipeline, not the client, decides which exit codes are acceptable.

pub mod command_builder;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::core::MirrorError;
use crate::process::CommandOutput;
use command_builder::GitCommand;

/// Version-control operations a publish run needs.
#[async_trait]
pub trait VcsClient: Send + Sync {
    /// Set a repository-local configuration value.
    async fn config(&self, key: &str, value: &str) -> Result<CommandOutput, MirrorError>;

    /// Stage every change, including deletions.
    async fn add_all(&self) -> Result<CommandOutput, MirrorError>;

    /// Commit all staged and tracked changes. Exit code `1` means nothing to commit.
    async fn commit_all(&self, message: &str) -> Result<CommandOutput, MirrorError>;

    /// Push `branch` to `remote`.
    async fn push(&self, remote: &str, branch: &str) -> Result<CommandOutput, MirrorError>;
}

/// [`VcsClient`] backed by the `git` command line.
#[derive(Debug, Clone)]
pub struct GitCli {
    repo_dir: PathBuf,
}

impl GitCli {
    /// Client for the checkout at `repo_dir`.
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
        }
    }

    /// Repository directory.
    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }
}

#[async_trait]
impl VcsClient for GitCli {
    async fn config(&self, key: &str, value: &str) -> Result<CommandOutput, MirrorError> {
        GitCommand::config(&self.repo_dir, key, value).execute().await
    }

    async fn add_all(&self) -> Result<CommandOutput, MirrorError> {
        GitCommand::add_all(&self.repo_dir).execute().await
    }

    async fn commit_all(&self, message: &str) -> Result<CommandOutput, MirrorError> {
        GitCommand::commit_all(&self.repo_dir, message).execute().await
    }

    async fn push(&self, remote: &str, branch: &str) -> Result<CommandOutput, MirrorError> {
        GitCommand::push(&self.repo_dir, remote, branch).execute().await
    }
}
