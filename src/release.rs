//! Release host access through the GitHub CLI.
//!
//! Whether a version was already mirrored is decided by the release host
//! alone: a release tagged `v<version>` means the run has nothing to do. The
//! `gh` CLI signals "no such release" with exit code `1`; any other non-zero
//! code is a real failure. Every `gh` call runs with `GH_PROMPT_DISABLED`
//! set, so an unattended run never waits on input.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::constants::RELEASE_NOT_FOUND_CODE;
use crate::core::MirrorError;
use crate::models::ReleaseTag;
use crate::process::{CommandOutput, ToolCommand};

/// Everything needed to publish one release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRequest {
    /// Tag to create.
    pub tag: ReleaseTag,
    /// File attached to the release.
    pub asset: PathBuf,
    /// Release title, the bare version.
    pub title: String,
    /// Release notes, possibly empty.
    pub notes: String,
}

/// Release host operations a run needs.
#[async_trait]
pub trait ReleaseClient: Send + Sync {
    /// Look up the release for `tag`. Exit code `1` means it does not exist.
    async fn view(&self, tag: &ReleaseTag) -> Result<CommandOutput, MirrorError>;

    /// Check that the host accepts the configured credentials.
    async fn auth_status(&self) -> Result<CommandOutput, MirrorError>;

    /// Create a release with its asset attached.
    async fn create(&self, request: &ReleaseRequest) -> Result<CommandOutput, MirrorError>;
}

/// Whether a release for `tag` is already published.
///
/// # Errors
///
/// [`MirrorError::CommandFailed`] when the lookup exits with anything other
/// than `0` (exists) or `1` (not found).
pub async fn release_exists(
    client: &dyn ReleaseClient,
    tag: &ReleaseTag,
) -> Result<bool, MirrorError> {
    let output = client.view(tag).await?.expect_codes(&[0, RELEASE_NOT_FOUND_CODE])?;
    Ok(output.success())
}

/// [`ReleaseClient`] backed by `gh`, run inside the mirror repository so the
/// target repository is inferred from its remote.
#[derive(Debug, Clone)]
pub struct GhCli {
    repo_dir: PathBuf,
}

impl GhCli {
    /// Client operating on the repository checked out at `repo_dir`.
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
        }
    }

    /// Repository directory.
    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    fn command(&self) -> ToolCommand {
        ToolCommand::new("gh")
            .current_dir(&self.repo_dir)
            .env("GH_PROMPT_DISABLED", "1")
            .with_context("gh")
    }

    fn view_command(&self, tag: &ReleaseTag) -> ToolCommand {
        self.command().args(["release", "view", tag.as_str()])
    }

    fn create_command(&self, request: &ReleaseRequest) -> ToolCommand {
        self.command()
            .args(["release", "create", request.tag.as_str()])
            .arg(request.asset.display().to_string())
            .args(["--title", request.title.as_str(), "--notes", request.notes.as_str()])
    }
}

#[async_trait]
impl ReleaseClient for GhCli {
    async fn view(&self, tag: &ReleaseTag) -> Result<CommandOutput, MirrorError> {
        self.view_command(tag).execute().await
    }

    async fn auth_status(&self) -> Result<CommandOutput, MirrorError> {
        self.command().args(["auth", "status"]).execute().await
    }

    async fn create(&self, request: &ReleaseRequest) -> Result<CommandOutput, MirrorError> {
        self.create_command(request).execute().await
    }
}
