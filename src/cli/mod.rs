//! Command-line interface for plugin-mirror
//!
//! The binary has no subcommands: one invocation is one mirroring run. Every
//! required input can come from a flag or from the variable a GitHub Actions
//! runner sets for an action input of the same name (`INPUT_<NAME>`, name
//! upper-cased with dashes kept):
//!
//! | Flag | Environment |
//! |---|---|
//! | `--woo-access-token` | `INPUT_WOO-ACCESS-TOKEN` |
//! | `--woo-access-token-secret` | `INPUT_WOO-ACCESS-TOKEN-SECRET` |
//! | `--woo-product-id` | `INPUT_WOO-PRODUCT-ID` |
//! | `--plugin-basename` | `INPUT_PLUGIN-BASENAME` |
//!
//! # Examples
//!
//! ```bash
//! # Inside a workflow step, inputs come from the environment
//! plugin-mirror
//!
//! # Locally, against a checkout of the mirror repository
//! plugin-mirror --woo-product-id 18734 --plugin-basename foo/foo.php --repo-dir ../foo-mirror
//! ```
//!
//! # Logging
//!
//! `RUST_LOG` takes precedence; otherwise `--verbose` enables debug output and
//! `--quiet` limits it to warnings. Logs go to stderr, the job log to stdout.

use anyhow::{Result, anyhow};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::archive::ZipArchiver;
use crate::config::{Committer, MirrorSettings, RunInputs};
use crate::constants::{
    COMMITTER_EMAIL, COMMITTER_NAME, DEFAULT_BRANCH, DEFAULT_REMOTE, PACKAGE_NAMESPACE,
    SYNC_EXCLUDES, UPDATE_CHECK_URL,
};
use crate::core::{Stage, StageError, StageResultExt};
use crate::fetch::HttpFetcher;
use crate::git::GitCli;
use crate::oracle::UpdateCheckClient;
use crate::pipeline::{Capabilities, Outcome, Pipeline};
use crate::release::GhCli;
use crate::sync::DirSynchronizer;

/// Mirror the latest release of a WooCommerce.com plugin into this repository
#[derive(Parser, Debug)]
#[command(name = "plugin-mirror", version, about)]
pub struct Cli {
    /// WooCommerce.com access token
    #[arg(long, env = "INPUT_WOO-ACCESS-TOKEN", hide_env_values = true)]
    woo_access_token: Option<String>,

    /// WooCommerce.com access token secret, used to sign the update check
    #[arg(long, env = "INPUT_WOO-ACCESS-TOKEN-SECRET", hide_env_values = true)]
    woo_access_token_secret: Option<String>,

    /// WooCommerce.com product ID
    #[arg(long, env = "INPUT_WOO-PRODUCT-ID")]
    woo_product_id: Option<String>,

    /// Plugin main file relative to the plugins directory, e.g. `foo/foo.php`
    #[arg(long, env = "INPUT_PLUGIN-BASENAME")]
    plugin_basename: Option<String>,

    /// Update-check endpoint
    #[arg(long, env = "PLUGIN_MIRROR_UPDATE_CHECK_URL", default_value = UPDATE_CHECK_URL)]
    update_check_url: String,

    /// Composer vendor namespace of the generated package
    #[arg(long, default_value = PACKAGE_NAMESPACE)]
    namespace: String,

    /// Mirror repository checkout
    #[arg(long, default_value = ".")]
    repo_dir: PathBuf,

    /// Remote to push to
    #[arg(long, default_value = DEFAULT_REMOTE)]
    remote: String,

    /// Branch to push
    #[arg(long, default_value = DEFAULT_BRANCH)]
    branch: String,

    /// Commit author name
    #[arg(long, default_value = COMMITTER_NAME)]
    committer_name: String,

    /// Commit author email
    #[arg(long, default_value = COMMITTER_EMAIL)]
    committer_email: String,

    /// Release notes
    #[arg(long, default_value = "")]
    release_notes: String,

    /// Debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    /// Level used when `RUST_LOG` is not set.
    pub const fn default_log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }

    /// Install the global tracing subscriber, writing to stderr.
    ///
    /// # Errors
    ///
    /// When a subscriber is already installed.
    pub fn init_logging(&self) -> Result<()> {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(self.default_log_level())
        };

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init()
            .map_err(|e| anyhow!("failed to initialize logging: {e}"))
    }

    /// Inputs as parsed, not yet validated.
    pub fn inputs(&self) -> RunInputs {
        RunInputs {
            access_token: self.woo_access_token.clone(),
            access_token_secret: self.woo_access_token_secret.clone(),
            product_id: self.woo_product_id.clone(),
            plugin_basename: self.plugin_basename.clone(),
            settings: MirrorSettings {
                update_check_url: self.update_check_url.clone(),
                namespace: self.namespace.clone(),
                repo_dir: self.repo_dir.clone(),
                remote: self.remote.clone(),
                branch: self.branch.clone(),
                committer: Committer {
                    name: self.committer_name.clone(),
                    email: self.committer_email.clone(),
                },
                release_notes: self.release_notes.clone(),
                sync_excludes: SYNC_EXCLUDES.iter().map(ToString::to_string).collect(),
            },
        }
    }

    /// Validate the inputs and run the pipeline against the real services.
    ///
    /// # Errors
    ///
    /// The first failing stage; [`Stage::Inputs`] before anything is contacted.
    pub async fn execute(self) -> Result<Outcome, StageError> {
        let ctx = self.inputs().into_context().in_stage(Stage::Inputs)?;
        let settings = &ctx.settings;

        let oracle = UpdateCheckClient::new(settings.update_check_url.clone());
        let releases = GhCli::new(settings.repo_dir.clone());
        let fetcher = HttpFetcher::new();
        let vcs = GitCli::new(settings.repo_dir.clone());
        let caps = Capabilities {
            oracle: &oracle,
            releases: &releases,
            fetcher: &fetcher,
            archiver: &ZipArchiver,
            synchronizer: &DirSynchronizer,
            vcs: &vcs,
        };

        Pipeline::new(&ctx, caps).run().await
    }
}
