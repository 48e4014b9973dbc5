//! Update-check client against a mock vendor API.

use plugin_mirror::core::MirrorError;
use plugin_mirror::models::{Credentials, ProductReference};
use plugin_mirror::oracle::{UpdateCheckClient, UpdateCheckPayload, UpdateOracle};
use plugin_mirror::signing::SignedRequest;
use reqwest::Method;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{PACKAGE_URL, PRODUCT_ID, VERSION};

const CHECK_PATH: &str = "/wp-json/wccom/updates/1.0/update-check";

fn credentials() -> Credentials {
    Credentials::new("ck_token", "cs_secret")
}

fn product() -> ProductReference {
    ProductReference::new(PRODUCT_ID, "foo/foo.php").unwrap()
}

fn found_body() -> String {
    format!(r#"{{"{PRODUCT_ID}":{{"version":"{VERSION}","package":"{PACKAGE_URL}"}}}}"#)
}

#[tokio::test]
async fn test_request_is_signed_and_record_parsed() {
    let server = MockServer::start().await;
    let endpoint = format!("{}{CHECK_PATH}", server.uri());

    let body = UpdateCheckPayload::new([PRODUCT_ID]).to_body().unwrap();
    let expected = SignedRequest::new(&endpoint, Method::POST, body.clone(), "cs_secret").unwrap();

    Mock::given(method("POST"))
        .and(path(CHECK_PATH))
        .and(query_param("token", "ck_token"))
        .and(query_param("signature", expected.signature()))
        .and(header("authorization", "Bearer ck_token"))
        .and(header("x-woo-signature", expected.signature()))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string(body))
        .respond_with(ResponseTemplate::new(200).set_body_string(found_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = UpdateCheckClient::new(&endpoint);
    let record = client.check(&credentials(), &product()).await.unwrap();

    assert_eq!(record.version, VERSION);
    assert_eq!(record.package_url, PACKAGE_URL);
    assert_eq!(record.release_tag().as_str(), "v2.0.0");
}

#[tokio::test]
async fn test_missing_product_entry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CHECK_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"99":{"version":"1.0"}}"#))
        .mount(&server)
        .await;

    let client = UpdateCheckClient::new(format!("{}{CHECK_PATH}", server.uri()));
    let err = client.check(&credentials(), &product()).await.unwrap_err();

    assert!(matches!(err, MirrorError::ProductNotFound { ref product_id } if product_id == PRODUCT_ID));
}

#[tokio::test]
async fn test_html_error_page_reports_unsigned_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><body>Forbidden</body></html>"),
        )
        .mount(&server)
        .await;

    let endpoint = format!("{}{CHECK_PATH}", server.uri());
    let client = UpdateCheckClient::new(&endpoint);
    let err = client.check(&credentials(), &product()).await.unwrap_err();

    match err {
        MirrorError::UnexpectedResponseKind {
            url,
        } => {
            assert_eq!(url, endpoint);
            assert!(!url.contains("ck_token"));
        }
        other => panic!("expected UnexpectedResponseKind, got {other:?}"),
    }
}

#[tokio::test]
async fn test_error_status_body_is_still_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string(found_body()))
        .mount(&server)
        .await;

    let client = UpdateCheckClient::new(format!("{}{CHECK_PATH}", server.uri()));
    let record = client.check(&credentials(), &product()).await.unwrap();

    assert_eq!(record.version, VERSION);
}

#[tokio::test]
async fn test_unreachable_endpoint_is_a_network_error() {
    let server = MockServer::start().await;
    let endpoint = format!("{}{CHECK_PATH}", server.uri());
    drop(server);

    let client = UpdateCheckClient::new(endpoint);
    let err = client.check(&credentials(), &product()).await.unwrap_err();

    assert!(matches!(err, MirrorError::Network { .. }));
    assert_eq!(err.exit_code(), 1);
}
