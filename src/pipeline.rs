//! The mirroring run, start to finish.
//!
//! ```text
//! update check ─► release exists? ──yes──► AlreadyReleased (exit 0)
//!                        │ no
//!                        ▼
//!        working tree ─► download ─► extract ─► manifest ─► sync
//!                        ─► config / add / commit / auth / push ─► release
//!                        ─► cleanup (always)
//! ```
//!
//! Stages run strictly in order and the first failure stops the run. Every
//! external effect goes through a capability trait in [`Capabilities`], so a
//! run can be driven entirely by fakes. The working tree is only created once
//! a release is known to be missing, and is removed on every path after that.
//!
//! Two steps tolerate non-zero exits: `commit` exiting `1` means there was
//! nothing to commit, and a failed `push` is logged as an error without
//! stopping the run. Every other command must exit `0`, and its code becomes
//! the process exit code when it does not.

use std::path::PathBuf;

use crate::archive::Archiver;
use crate::config::MirrorContext;
use crate::constants::NOTHING_TO_COMMIT_CODE;
use crate::core::{MirrorError, Stage, StageError, StageResultExt};
use crate::fetch::Fetcher;
use crate::git::VcsClient;
use crate::models::{ReleaseTag, UpdateRecord};
use crate::oracle::UpdateOracle;
use crate::release::{ReleaseClient, ReleaseRequest, release_exists};
use crate::stager::ArtifactStager;
use crate::sync::{SyncReport, Synchronizer, check_source};
use crate::ui;
use crate::workspace::WorkingTree;

/// External effects a run depends on.
#[derive(Clone, Copy)]
pub struct Capabilities<'a> {
    /// Latest-version lookup.
    pub oracle: &'a dyn UpdateOracle,
    /// Release host.
    pub releases: &'a dyn ReleaseClient,
    /// Archive download.
    pub fetcher: &'a dyn Fetcher,
    /// Archive extraction.
    pub archiver: &'a dyn Archiver,
    /// Repository synchronization.
    pub synchronizer: &'a dyn Synchronizer,
    /// Version control.
    pub vcs: &'a dyn VcsClient,
}

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A release for the latest version already exists; nothing was changed.
    AlreadyReleased {
        /// Existing release tag.
        tag: ReleaseTag,
    },
    /// The latest version was mirrored and released.
    Published {
        /// Created release tag.
        tag: ReleaseTag,
        /// Mirrored version.
        version: String,
        /// What the sync changed.
        sync: SyncReport,
        /// `false` when the repository already matched and nothing was committed.
        committed: bool,
        /// `false` when the push failed.
        pushed: bool,
    },
}

impl Outcome {
    /// Release tag the run ended on.
    pub const fn tag(&self) -> &ReleaseTag {
        match self {
            Self::AlreadyReleased {
                tag,
            }
            | Self::Published {
                tag,
                ..
            } => tag,
        }
    }
}

/// Commit message for `version`.
pub fn commit_message(version: &str) -> String {
    format!("Updates to {version}")
}

/// One mirroring run.
pub struct Pipeline<'a> {
    ctx: &'a MirrorContext,
    caps: Capabilities<'a>,
    temp_root: Option<PathBuf>,
}

impl<'a> Pipeline<'a> {
    /// Run for `ctx` with the given capabilities.
    pub const fn new(ctx: &'a MirrorContext, caps: Capabilities<'a>) -> Self {
        Self {
            ctx,
            caps,
            temp_root: None,
        }
    }

    /// Create the working tree under `root` instead of the system temp dir.
    #[must_use]
    pub fn with_temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(root.into());
        self
    }

    /// Execute the run.
    ///
    /// # Errors
    ///
    /// The first failing stage. When a run fails after the working tree was
    /// created, the tree is still removed and the original error is returned;
    /// a failed removal after an otherwise successful run is reported as
    /// [`Stage::Cleanup`].
    pub async fn run(&self) -> Result<Outcome, StageError> {
        let record = {
            let _group = ui::group(Stage::UpdateCheck.heading());
            self.caps
                .oracle
                .check(&self.ctx.credentials, &self.ctx.product)
                .await
                .in_stage(Stage::UpdateCheck)?
        };
        let tag = record.release_tag();

        if release_exists(self.caps.releases, &tag).await.in_stage(Stage::ReleaseLookup)? {
            ui::status("Release exists.");
            tracing::info!(target: "pipeline", "Release {tag} already published, nothing to do");
            return Ok(Outcome::AlreadyReleased {
                tag,
            });
        }

        let tree = match &self.temp_root {
            Some(root) => WorkingTree::create_in(root),
            None => WorkingTree::create(),
        }
        .in_stage(Stage::Prepare)?;

        let result = self.publish(&tree, &record, tag).await;
        let cleanup = {
            let _group = ui::group(Stage::Cleanup.heading());
            tree.cleanup()
        };
        settle(result, cleanup)
    }

    async fn publish(
        &self,
        tree: &WorkingTree,
        record: &UpdateRecord,
        tag: ReleaseTag,
    ) -> Result<Outcome, StageError> {
        let settings = &self.ctx.settings;
        let staged = ArtifactStager::new(self.caps.fetcher, self.caps.archiver)
            .stage(tree, &self.ctx.product, record, &settings.namespace)
            .await?;

        let sync = {
            let _group = ui::group(Stage::Sync.heading());
            check_source(&staged.plugin_dir).in_stage(Stage::Sync)?;
            self.caps
                .synchronizer
                .sync(&staged.plugin_dir, &settings.repo_dir, &settings.sync_excludes)
                .await
                .in_stage(Stage::Sync)?
        };

        let (committed, pushed) = {
            let _group = ui::group(Stage::VersionControl.heading());
            self.commit_and_push(&record.version).await.in_stage(Stage::VersionControl)?
        };

        {
            let _group = ui::group(Stage::Release.heading());
            let request = ReleaseRequest {
                tag: tag.clone(),
                asset: staged.archive.clone(),
                title: record.version.clone(),
                notes: settings.release_notes.clone(),
            };
            self.caps
                .releases
                .create(&request)
                .await
                .and_then(|output| output.expect_success())
                .in_stage(Stage::Release)?;
        }

        Ok(Outcome::Published {
            tag,
            version: record.version.clone(),
            sync,
            committed,
            pushed,
        })
    }

    async fn commit_and_push(&self, version: &str) -> Result<(bool, bool), MirrorError> {
        let settings = &self.ctx.settings;
        let vcs = self.caps.vcs;

        vcs.config("user.email", &settings.committer.email).await?.expect_success()?;
        vcs.config("user.name", &settings.committer.name).await?.expect_success()?;
        vcs.add_all().await?.expect_success()?;

        let commit = vcs
            .commit_all(&commit_message(version))
            .await?
            .expect_codes(&[0, NOTHING_TO_COMMIT_CODE])?;
        let committed = commit.success();
        if !committed {
            tracing::info!(target: "pipeline", "Nothing to commit for {version}");
        }

        self.caps.releases.auth_status().await?.expect_success()?;

        let push = vcs.push(&settings.remote, &settings.branch).await?;
        let pushed = push.success();
        if !pushed {
            tracing::error!(
                target: "pipeline",
                "Push to {} {} failed with exit code {}: {}",
                settings.remote,
                settings.branch,
                push.code,
                push.stderr.trim()
            );
        }

        Ok((committed, pushed))
    }
}

fn settle(
    result: Result<Outcome, StageError>,
    cleanup: Result<(), MirrorError>,
) -> Result<Outcome, StageError> {
    match (result, cleanup) {
        (Ok(outcome), Ok(())) => Ok(outcome),
        (Ok(_), Err(e)) => Err(StageError::new(Stage::Cleanup, e)),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(cleanup_error)) => {
            tracing::error!(target: "pipeline", "{cleanup_error}");
            Err(e)
        }
    }
}
