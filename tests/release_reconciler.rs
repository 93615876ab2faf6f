//! Integration tests for release reconciliation against a mock control
//! plane: create-when-absent, extend-when-missing-architecture, and the
//! idempotent no-op, plus the hard failures of the metadata-extraction
//! step.

use mockito::Matcher;
use pretty_assertions::assert_eq;
use serde_json::json;
use yba_client::{Error, YbaClient};

const CUSTOMER: &str = "c1";
const PACKAGE_URL: &str = "https://downloads.example.com/yugabyte-9.9.9.9-b1-linux-aarch64.tar.gz";

fn client(server: &mockito::ServerGuard) -> YbaClient {
    YbaClient::builder()
        .base_url(server.url())
        .api_token("test-token")
        .customer_id(CUSTOMER)
        .build()
        .unwrap()
}

/// Mock the extraction job: submission returns a job id, the first status
/// fetch is already terminal with the given architecture.
async fn mock_extraction(
    server: &mut mockito::ServerGuard,
    architecture: &str,
) -> (mockito::Mock, mockito::Mock) {
    let submit = server
        .mock("POST", "/api/v1/customers/c1/ybdb_release/extract_metadata")
        .match_body(Matcher::Json(json!({"url": PACKAGE_URL})))
        .with_header("content-type", "application/json")
        .with_body(json!({"resourceUUID": "job-1"}).to_string())
        .create_async()
        .await;
    let status = server
        .mock(
            "GET",
            "/api/v1/customers/c1/ybdb_release/extract_metadata/job-1",
        )
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "status": "success",
                "version": "9.9.9.9",
                "yb_type": "YBDB",
                "platform": "linux",
                "architecture": architecture,
                "release_type": "LTS",
                "release_date_msecs": 1_700_000_000_000_i64
            })
            .to_string(),
        )
        .create_async()
        .await;
    (submit, status)
}

#[tokio::test]
async fn unknown_version_creates_a_new_release() {
    let mut server = mockito::Server::new_async().await;
    let (submit, status) = mock_extraction(&mut server, "aarch64").await;
    let listing = server
        .mock("GET", "/api/v1/customers/c1/ybdb_release")
        .with_header("content-type", "application/json")
        .with_body(json!([{"release_uuid": "r-old", "version": "2.18.0.0", "artifacts": []}]).to_string())
        .create_async()
        .await;
    let create = server
        .mock("POST", "/api/v1/customers/c1/ybdb_release")
        .match_body(Matcher::PartialJson(json!({
            "version": "9.9.9.9",
            "artifacts": [{"package_url": PACKAGE_URL, "architecture": "aarch64"}]
        })))
        .expect(1)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "release_uuid": "r-new",
                "version": "9.9.9.9",
                "artifacts": [{"package_url": PACKAGE_URL, "platform": "linux", "architecture": "aarch64"}]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let release = client(&server).ensure_release(PACKAGE_URL).await.unwrap();

    submit.assert_async().await;
    status.assert_async().await;
    listing.assert_async().await;
    create.assert_async().await;
    assert_eq!(release.version, "9.9.9.9");
    assert_eq!(release.release_uuid, "r-new");
}

#[tokio::test]
async fn new_architecture_extends_the_existing_release_once() {
    let mut server = mockito::Server::new_async().await;
    let _extraction = mock_extraction(&mut server, "aarch64").await;
    server
        .mock("GET", "/api/v1/customers/c1/ybdb_release")
        .with_header("content-type", "application/json")
        .with_body(
            json!([{
                "release_uuid": "r-1",
                "version": "9.9.9.9",
                "state": "ACTIVE",
                "artifacts": [{"package_url": "https://downloads.example.com/x86.tar.gz", "platform": "linux", "architecture": "x86_64"}]
            }])
            .to_string(),
        )
        .create_async()
        .await;
    let update = server
        .mock("PUT", "/api/v1/customers/c1/ybdb_release/r-1")
        .match_body(Matcher::PartialJson(json!({
            "release_uuid": "r-1",
            "version": "9.9.9.9",
            "state": "ACTIVE",
            "artifacts": [
                {"architecture": "x86_64"},
                {"package_url": PACKAGE_URL, "platform": "linux", "architecture": "aarch64"}
            ]
        })))
        .expect(1)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "release_uuid": "r-1",
                "version": "9.9.9.9",
                "state": "ACTIVE",
                "artifacts": [
                    {"package_url": "https://downloads.example.com/x86.tar.gz", "platform": "linux", "architecture": "x86_64"},
                    {"package_url": PACKAGE_URL, "platform": "linux", "architecture": "aarch64"}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let release = client(&server).ensure_release(PACKAGE_URL).await.unwrap();

    update.assert_async().await;
    // Prior artifacts are preserved order-stable, the new one appended.
    assert_eq!(release.artifacts.len(), 2);
    assert_eq!(release.artifacts[0].architecture, "x86_64");
    assert_eq!(release.artifacts[1].architecture, "aarch64");
}

#[tokio::test]
async fn existing_architecture_is_a_no_op() {
    let mut server = mockito::Server::new_async().await;
    let _extraction = mock_extraction(&mut server, "x86_64").await;
    server
        .mock("GET", "/api/v1/customers/c1/ybdb_release")
        .with_header("content-type", "application/json")
        .with_body(
            json!([{
                "release_uuid": "r-1",
                "version": "9.9.9.9",
                "artifacts": [{"package_url": "https://downloads.example.com/x86.tar.gz", "platform": "linux", "architecture": "x86_64"}]
            }])
            .to_string(),
        )
        .create_async()
        .await;
    let update = server
        .mock("PUT", Matcher::Regex("/ybdb_release/".to_string()))
        .expect(0)
        .create_async()
        .await;
    let create = server
        .mock("POST", "/api/v1/customers/c1/ybdb_release")
        .expect(0)
        .create_async()
        .await;

    let release = client(&server).ensure_release(PACKAGE_URL).await.unwrap();

    update.assert_async().await;
    create.assert_async().await;
    assert_eq!(release.release_uuid, "r-1");
    assert_eq!(release.artifacts.len(), 1);
}

#[tokio::test]
async fn missing_job_id_fails_with_the_raw_response() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/v1/customers/c1/ybdb_release/extract_metadata")
        .with_header("content-type", "application/json")
        .with_body(json!({"unexpected": "shape"}).to_string())
        .create_async()
        .await;

    let err = client(&server).ensure_release(PACKAGE_URL).await.unwrap_err();
    match err {
        Error::Protocol { message, payload } => {
            assert!(message.contains("resourceUUID"));
            assert_eq!(payload["unexpected"], "shape");
        },
        other => panic!("expected protocol error, got {other:?}"),
    }
}

#[tokio::test]
async fn terminal_metadata_without_a_version_fails() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/v1/customers/c1/ybdb_release/extract_metadata")
        .with_header("content-type", "application/json")
        .with_body(json!({"resourceUUID": "job-1"}).to_string())
        .create_async()
        .await;
    server
        .mock(
            "GET",
            "/api/v1/customers/c1/ybdb_release/extract_metadata/job-1",
        )
        .with_header("content-type", "application/json")
        .with_body(json!({"status": "failure"}).to_string())
        .create_async()
        .await;

    let err = client(&server).ensure_release(PACKAGE_URL).await.unwrap_err();
    match err {
        Error::Protocol { message, payload } => {
            assert!(message.contains("version"));
            assert_eq!(payload["status"], "failure");
        },
        other => panic!("expected protocol error, got {other:?}"),
    }
}
