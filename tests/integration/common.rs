//! Shared fixtures for the integration suite.

use plugin_mirror::config::{MirrorContext, MirrorSettings, RunInputs};
use plugin_mirror::test_utils::{
    CallLog, FakeFetcher, FakeOracle, FakeReleaseClient, FakeVcs, RecordingArchiver,
    RecordingSynchronizer, init_test_logging, plugin_zip,
};
use std::path::Path;
use tempfile::TempDir;

pub const PRODUCT_ID: &str = "18734";
pub const VERSION: &str = "2.0.0";
pub const PACKAGE_URL: &str = "https://example.com/pkg.zip";

/// Validated context for plugin `foo` mirrored into `repo_dir`.
pub fn context(repo_dir: &Path) -> MirrorContext {
    RunInputs {
        access_token: Some("ck_token".to_string()),
        access_token_secret: Some("cs_secret".to_string()),
        product_id: Some(PRODUCT_ID.to_string()),
        plugin_basename: Some("foo/foo.php".to_string()),
        settings: MirrorSettings {
            repo_dir: repo_dir.to_path_buf(),
            ..MirrorSettings::default()
        },
    }
    .into_context()
    .unwrap()
}

/// Temporary directories and fakes for one pipeline run.
pub struct Harness {
    pub log: CallLog,
    pub temp_root: TempDir,
    pub repo: TempDir,
    pub oracle: FakeOracle,
    pub releases: FakeReleaseClient,
    pub fetcher: FakeFetcher,
    pub archiver: RecordingArchiver,
    pub synchronizer: RecordingSynchronizer,
    pub vcs: FakeVcs,
}

impl Harness {
    /// Version 2.0.0 of `foo` is available and not yet released.
    pub fn new() -> Self {
        init_test_logging(None);
        let log = CallLog::default();
        let archive = plugin_zip(
            "foo",
            &[
                ("foo.php", "<?php\n/* Plugin Name: Foo */\n"),
                ("includes/class-foo.php", "<?php\n"),
            ],
        );
        Self {
            oracle: FakeOracle::returning(log.clone(), VERSION, PACKAGE_URL),
            releases: FakeReleaseClient::new(log.clone()),
            fetcher: FakeFetcher::new(log.clone(), archive),
            archiver: RecordingArchiver::new(log.clone()),
            synchronizer: RecordingSynchronizer::new(log.clone()),
            vcs: FakeVcs::new(log.clone()),
            temp_root: TempDir::new().unwrap(),
            repo: TempDir::new().unwrap(),
            log,
        }
    }

    /// Whether any working tree is left under the temp root.
    pub fn working_trees_left(&self) -> usize {
        std::fs::read_dir(self.temp_root.path()).unwrap().count()
    }
}
