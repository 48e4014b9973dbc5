//! Pipeline runs against recording fakes.

use plugin_mirror::core::{MirrorError, Stage, StageError};
use plugin_mirror::pipeline::{Capabilities, Outcome, Pipeline};
use plugin_mirror::test_utils::{FakeFetcher, FakeOracle, FakeReleaseClient, FakeVcs, plugin_zip};

use crate::common::{Harness, PACKAGE_URL, PRODUCT_ID, context};

async fn run(h: &Harness) -> Result<Outcome, StageError> {
    let ctx = context(h.repo.path());
    let caps = Capabilities {
        oracle: &h.oracle,
        releases: &h.releases,
        fetcher: &h.fetcher,
        archiver: &h.archiver,
        synchronizer: &h.synchronizer,
        vcs: &h.vcs,
    };
    Pipeline::new(&ctx, caps).with_temp_root(h.temp_root.path()).run().await
}

#[tokio::test]
async fn test_new_version_runs_every_stage_in_order() {
    let h = Harness::new();
    std::fs::create_dir_all(h.repo.path().join(".git")).unwrap();
    std::fs::write(h.repo.path().join(".git/HEAD"), "ref: refs/heads/main\n").unwrap();
    std::fs::write(h.repo.path().join("stale.php"), "<?php\n").unwrap();

    let outcome = run(&h).await.unwrap();

    assert_eq!(
        h.log.calls(),
        vec![
            format!("check {PRODUCT_ID}"),
            "gh release view v2.0.0".to_string(),
            format!("download {PACKAGE_URL}"),
            "extract foo-2.0.0.zip".to_string(),
            "sync --exclude=.git,.github".to_string(),
            "git config user.email info@woo.com".to_string(),
            "git config user.name Woo".to_string(),
            "git add --all".to_string(),
            "git commit --all -m Updates to 2.0.0".to_string(),
            "gh auth status".to_string(),
            "git push origin main".to_string(),
            "gh release create v2.0.0 foo-2.0.0.zip --title 2.0.0".to_string(),
        ]
    );

    match outcome {
        Outcome::Published {
            tag,
            version,
            sync,
            committed,
            pushed,
        } => {
            assert_eq!(tag.as_str(), "v2.0.0");
            assert_eq!(version, "2.0.0");
            assert_eq!(sync.copied, 3);
            assert_eq!(sync.deleted, 1);
            assert!(committed);
            assert!(pushed);
        }
        other => panic!("expected Published, got {other:?}"),
    }

    let repo = h.repo.path();
    assert!(repo.join("foo.php").is_file());
    assert!(repo.join("includes/class-foo.php").is_file());
    assert!(!repo.join("stale.php").exists());
    assert!(repo.join(".git/HEAD").is_file());
    let manifest = std::fs::read_to_string(repo.join("composer.json")).unwrap();
    assert!(manifest.contains("\"name\": \"woocommerce/foo\""));
    assert!(manifest.contains("\"version\": \"2.0.0\""));

    assert_eq!(h.working_trees_left(), 0);
}

#[tokio::test]
async fn test_existing_release_stops_without_side_effects() {
    let mut h = Harness::new();
    h.releases = FakeReleaseClient::new(h.log.clone()).with_view_code(0);

    let outcome = run(&h).await.unwrap();

    assert!(matches!(outcome, Outcome::AlreadyReleased { ref tag } if tag.as_str() == "v2.0.0"));
    assert_eq!(h.log.calls(), vec![format!("check {PRODUCT_ID}"), "gh release view v2.0.0".to_string()]);
    assert_eq!(h.working_trees_left(), 0);
    assert_eq!(std::fs::read_dir(h.repo.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_release_lookup_failure_propagates_code() {
    let mut h = Harness::new();
    h.releases = FakeReleaseClient::new(h.log.clone()).with_view_code(4);

    let err = run(&h).await.unwrap_err();

    assert_eq!(err.stage, Stage::ReleaseLookup);
    assert_eq!(err.exit_code(), 4);
    assert!(!h.log.contains("download"));
    assert_eq!(h.working_trees_left(), 0);
}

#[tokio::test]
async fn test_update_check_failure_stops_run() {
    let mut h = Harness::new();
    h.oracle = FakeOracle::failing(h.log.clone(), |id| MirrorError::ProductNotFound {
        product_id: id.to_string(),
    });

    let err = run(&h).await.unwrap_err();

    assert_eq!(err.stage, Stage::UpdateCheck);
    assert_eq!(err.exit_code(), 1);
    assert_eq!(h.log.calls(), vec![format!("check {PRODUCT_ID}")]);
}

#[tokio::test]
async fn test_download_failure_cleans_up() {
    let mut h = Harness::new();
    h.fetcher = FakeFetcher::failing(h.log.clone());

    let err = run(&h).await.unwrap_err();

    assert_eq!(err.stage, Stage::Download);
    assert_eq!(err.exit_code(), 1);
    assert!(!h.log.contains("extract"));
    assert!(!h.log.contains("git"));
    assert_eq!(h.working_trees_left(), 0);
}

#[tokio::test]
async fn test_archive_without_plugin_directory_fails_extract() {
    let mut h = Harness::new();
    h.fetcher = FakeFetcher::new(h.log.clone(), plugin_zip("bar", &[("bar.php", "<?php\n")]));

    let err = run(&h).await.unwrap_err();

    assert_eq!(err.stage, Stage::Extract);
    assert!(matches!(err.error, MirrorError::PluginDirMissing { .. }));
    assert!(!h.log.contains("sync"));
    assert_eq!(h.working_trees_left(), 0);
}

#[tokio::test]
async fn test_nothing_to_commit_is_tolerated() {
    let mut h = Harness::new();
    h.vcs = FakeVcs::new(h.log.clone()).with_code("commit", 1);

    let outcome = run(&h).await.unwrap();

    assert!(matches!(outcome, Outcome::Published { committed: false, pushed: true, .. }));
    assert!(h.log.contains("git push origin main"));
    assert!(h.log.contains("gh release create v2.0.0"));
}

#[tokio::test]
async fn test_other_commit_failures_abort_with_their_code() {
    let mut h = Harness::new();
    h.vcs = FakeVcs::new(h.log.clone()).with_code("commit", 128);

    let err = run(&h).await.unwrap_err();

    assert_eq!(err.stage, Stage::VersionControl);
    assert_eq!(err.exit_code(), 128);
    assert!(!h.log.contains("gh auth status"));
    assert!(!h.log.contains("git push"));
    assert!(!h.log.contains("gh release create"));
    assert_eq!(h.working_trees_left(), 0);
}

#[tokio::test]
async fn test_failed_push_does_not_stop_release() {
    let mut h = Harness::new();
    h.vcs = FakeVcs::new(h.log.clone()).with_code("push", 1);

    let outcome = run(&h).await.unwrap();

    assert!(matches!(outcome, Outcome::Published { committed: true, pushed: false, .. }));
    assert!(h.log.contains("gh release create v2.0.0"));
    assert_eq!(h.working_trees_left(), 0);
}

#[tokio::test]
async fn test_unauthenticated_release_host_aborts_before_push() {
    let mut h = Harness::new();
    h.releases = FakeReleaseClient::new(h.log.clone()).with_auth_code(4);

    let err = run(&h).await.unwrap_err();

    assert_eq!(err.stage, Stage::VersionControl);
    assert_eq!(err.exit_code(), 4);
    assert!(!h.log.contains("git push"));
    assert_eq!(h.working_trees_left(), 0);
}

#[tokio::test]
async fn test_failed_add_aborts_with_its_code() {
    let mut h = Harness::new();
    h.vcs = FakeVcs::new(h.log.clone()).with_code("add", 128);

    let err = run(&h).await.unwrap_err();

    assert_eq!(err.exit_code(), 128);
    assert!(!h.log.contains("git commit"));
}

#[tokio::test]
async fn test_release_creation_failure_is_fatal() {
    let mut h = Harness::new();
    h.releases = FakeReleaseClient::new(h.log.clone()).with_create_code(1);

    let err = run(&h).await.unwrap_err();

    assert_eq!(err.stage, Stage::Release);
    assert_eq!(err.exit_code(), 1);
    assert!(matches!(err.error, MirrorError::CommandFailed { .. }));
    assert_eq!(h.working_trees_left(), 0);
}

#[tokio::test]
async fn test_second_run_after_release_is_a_no_op() {
    let h = Harness::new();
    run(&h).await.unwrap();

    let mut again = Harness::new();
    again.releases = FakeReleaseClient::new(again.log.clone()).with_view_code(0);
    let outcome = run(&again).await.unwrap();
    assert!(matches!(outcome, Outcome::AlreadyReleased { .. }));
    assert!(!again.log.contains("download"));
}
