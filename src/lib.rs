//! plugin-mirror - mirror vendor-hosted WordPress plugin releases
//!
//! Premium WooCommerce.com extensions are only distributed through the
//! vendor's authenticated update API. This crate keeps a Git repository in
//! step with such a plugin: each run asks the API for the latest version and,
//! when no release is tagged for it yet, downloads the archive, replaces the
//! repository contents with it, adds a Composer manifest, commits, pushes, and
//! publishes a GitHub release carrying the original archive.
//!
//! Runs are idempotent: when the release `v<version>` already exists the run
//! stops before touching the filesystem and exits successfully.
//!
//! # Core Modules
//!
//! ## Pipeline
//! - [`pipeline`] - stage ordering, failure semantics, and cleanup
//! - [`config`] - run-time inputs and the validated run context
//! - [`core`] - error taxonomy, stages, and user-facing error display
//! - [`cli`] - argument parsing and logging setup
//!
//! ## Vendor API
//! - [`signing`] - HMAC-signed request construction
//! - [`json`] - the vendor's canonical JSON encoding
//! - [`oracle`] - update-check payload, client, and response parsing
//!
//! ## Staging
//! - [`workspace`] - the per-run working tree
//! - [`fetch`] - archive download
//! - [`archive`] - archive extraction
//! - [`composer`] - generated `composer.json`
//! - [`stager`] - download, extract, and manifest as one step
//! - [`sync`] - one-way sync into the mirror repository
//!
//! ## Publishing
//! - [`git`] - commit and push through the `git` CLI
//! - [`release`] - release lookup and creation through the `gh` CLI
//! - [`process`] - external command execution
//!
//! ## Supporting Modules
//! - [`models`] - credentials, product reference, update record, release tag
//! - [`constants`] - endpoint, identity, and layout defaults
//! - [`ui`] - job log output
//!
//! # Example
//!
//! ```rust,no_run
//! use plugin_mirror::archive::ZipArchiver;
//! use plugin_mirror::config::{MirrorSettings, RunInputs};
//! use plugin_mirror::fetch::HttpFetcher;
//! use plugin_mirror::git::GitCli;
//! use plugin_mirror::oracle::UpdateCheckClient;
//! use plugin_mirror::pipeline::{Capabilities, Pipeline};
//! use plugin_mirror::release::GhCli;
//! use plugin_mirror::sync::DirSynchronizer;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let ctx = RunInputs {
//!     access_token: Some("ck_...".into()),
//!     access_token_secret: Some("cs_...".into()),
//!     product_id: Some("18734".into()),
//!     plugin_basename: Some("woocommerce-subscriptions/woocommerce-subscriptions.php".into()),
//!     settings: MirrorSettings::default(),
//! }
//! .into_context()?;
//!
//! let oracle = UpdateCheckClient::default();
//! let releases = GhCli::new(".");
//! let fetcher = HttpFetcher::new();
//! let vcs = GitCli::new(".");
//! let caps = Capabilities {
//!     oracle: &oracle,
//!     releases: &releases,
//!     fetcher: &fetcher,
//!     archiver: &ZipArchiver,
//!     synchronizer: &DirSynchronizer,
//!     vcs: &vcs,
//! };
//! let outcome = Pipeline::new(&ctx, caps).run().await?;
//! println!("{}", outcome.tag());
//! # Ok(())
//! # }
//! ```

// Pipeline
pub mod cli;
pub mod config;
pub mod core;
pub mod pipeline;

// Vendor API
pub mod json;
pub mod oracle;
pub mod signing;

// Staging
pub mod archive;
pub mod composer;
pub mod fetch;
pub mod stager;
pub mod sync;
pub mod workspace;

// Publishing
pub mod git;
pub mod process;
pub mod release;

// Supporting modules
pub mod constants;
pub mod models;
pub mod ui;

// Test utilities (available for both unit and integration tests)
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
