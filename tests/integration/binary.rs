//! The `plugin-mirror` executable.

use assert_cmd::Command;
use predicates::prelude::*;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::PRODUCT_ID;

const INPUT_VARS: [&str; 4] = [
    "INPUT_WOO-ACCESS-TOKEN",
    "INPUT_WOO-ACCESS-TOKEN-SECRET",
    "INPUT_WOO-PRODUCT-ID",
    "INPUT_PLUGIN-BASENAME",
];

fn mirror() -> Command {
    let mut cmd = Command::cargo_bin("plugin-mirror").unwrap();
    for var in INPUT_VARS {
        cmd.env_remove(var);
    }
    cmd.env_remove("PLUGIN_MIRROR_UPDATE_CHECK_URL").env_remove("RUST_LOG").env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_missing_product_id_fails() {
    mirror()
        .env("INPUT_WOO-ACCESS-TOKEN", "ck_token")
        .env("INPUT_WOO-ACCESS-TOKEN-SECRET", "cs_secret")
        .env("INPUT_PLUGIN-BASENAME", "foo/foo.php")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Input required and not supplied"))
        .stderr(predicate::str::contains("woo-product-id"));
}

#[test]
fn test_inputs_are_checked_in_order() {
    mirror()
        .args(["--woo-product-id", PRODUCT_ID, "--plugin-basename", "foo/foo.php"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("woo-access-token"))
        .stderr(predicate::str::contains("woo-product-id").not());
}

#[test]
fn test_empty_token_counts_as_missing() {
    mirror()
        .env("INPUT_WOO-ACCESS-TOKEN", "")
        .env("INPUT_WOO-ACCESS-TOKEN-SECRET", "cs_secret")
        .env("INPUT_WOO-PRODUCT-ID", PRODUCT_ID)
        .env("INPUT_PLUGIN-BASENAME", "foo/foo.php")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Input required and not supplied"))
        .stderr(predicate::str::contains("woo-access-token"));
}

#[test]
fn test_basename_without_directory_is_rejected() {
    mirror()
        .args([
            "--woo-access-token",
            "ck_token",
            "--woo-access-token-secret",
            "cs_secret",
            "--woo-product-id",
            PRODUCT_ID,
            "--plugin-basename",
            "foo.php",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("plugin-basename"));
}

#[test]
fn test_help_lists_action_inputs() {
    mirror()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("INPUT_WOO-PRODUCT-ID"))
        .stdout(predicate::str::contains("--plugin-basename"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_product_fails_the_run() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;
    let repo = tempfile::tempdir().unwrap();

    mirror()
        .env("INPUT_WOO-ACCESS-TOKEN", "ck_token")
        .env("INPUT_WOO-ACCESS-TOKEN-SECRET", "cs_secret")
        .env("INPUT_WOO-PRODUCT-ID", PRODUCT_ID)
        .env("INPUT_PLUGIN-BASENAME", "foo/foo.php")
        .env("PLUGIN_MIRROR_UPDATE_CHECK_URL", format!("{}/update-check", server.uri()))
        .arg("--repo-dir")
        .arg(repo.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains(format!(
            "No update information for product ID: {PRODUCT_ID}"
        )));

    assert_eq!(std::fs::read_dir(repo.path()).unwrap().count(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_inputs_never_reach_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(0)
        .mount(&server)
        .await;

    mirror()
        .env("INPUT_WOO-ACCESS-TOKEN", "ck_token")
        .env("PLUGIN_MIRROR_UPDATE_CHECK_URL", format!("{}/update-check", server.uri()))
        .assert()
        .code(1);
}
