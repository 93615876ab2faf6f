//! Integration tests for universe replication: the two-phase
//! configure/create protocol, credential restoration after the configure
//! phase redacts passwords, preview mode, and the business-rule guards
//! that fire before anything mutating happens.

use std::time::Duration;

use mockito::Matcher;
use serde_json::json;
use yba_client::{
    ReplicateUniverse, ReplicationOutcome, TaskOutcome, UniverseCredentials, WaitConfig, YbaClient,
};

const CUSTOMER: &str = "c1";

fn client(server: &mockito::ServerGuard) -> YbaClient {
    YbaClient::builder()
        .base_url(server.url())
        .api_token("test-token")
        .customer_id(CUSTOMER)
        .build()
        .unwrap()
}

fn request() -> ReplicateUniverse {
    ReplicateUniverse::new(
        "src",
        "dst",
        UniverseCredentials {
            ysql_password: "fresh-ysql-pw".into(),
            ycql_password: "fresh-ycql-pw".into(),
        },
    )
    .with_wait(
        WaitConfig::default()
            .with_timeout(Duration::from_secs(5))
            .with_interval(Duration::from_millis(50)),
    )
}

fn source_universe() -> serde_json::Value {
    json!({
        "universeUUID": "u-src",
        "name": "src",
        "universeDetails": {
            "universeUUID": "u-src",
            "nodePrefix": "yb-admin-src",
            "sequenceNumber": 7,
            "ybcInstalled": true,
            "communicationPorts": {"masterHttpPort": 7000, "tserverHttpPort": 9000},
            "extraDependencies": {"installNodeExporter": true},
            "creatingUser": {"email": "admin@example.com"},
            "encryptionAtRestConfig": {"encryptionAtRestEnabled": false},
            "clusters": [{
                "uuid": "cl-1",
                "clusterType": "PRIMARY",
                "userIntent": {
                    "universeName": "src",
                    "provider": "p-1",
                    "replicationFactor": 3,
                    "masterK8SNodeResourceSpec": {"cpuCoreCount": 2.0, "memoryGib": 4.0},
                    "tserverK8SNodeResourceSpec": {"cpuCoreCount": 4.0, "memoryGib": 8.0},
                    "deviceInfo": {"volumeSize": 100, "numVolumes": 1}
                },
                "placementInfo": {"cloudList": []}
            }],
            "nodeDetailsSet": [
                {
                    "nodeIdx": 1,
                    "isMaster": true,
                    "isTserver": true,
                    "state": "Live",
                    "masterState": "Running",
                    "cloudInfo": {"private_ip": "10.0.0.4", "kubernetesPodName": "yb-master-0", "az": "a"}
                },
                {
                    "nodeIdx": 2,
                    "isMaster": false,
                    "isTserver": true,
                    "state": "Live",
                    "cloudInfo": {"private_ip": "10.0.0.5", "az": "b"}
                },
                {
                    "nodeIdx": 3,
                    "isMaster": false,
                    "isTserver": true,
                    "state": "Live",
                    "cloudInfo": {"private_ip": "10.0.0.6", "az": "c"}
                }
            ]
        }
    })
}

/// The configure phase expands the document server-side and hands back the
/// result with credential fields redacted.
fn configure_response() -> serde_json::Value {
    json!({
        "universeUUID": "u-new",
        "nodePrefix": "yb-admin-dst",
        "sequenceNumber": -1,
        "ybcInstalled": false,
        "clusterOperation": "CREATE",
        "expectedUniverseVersion": -1,
        "arch": "x86_64",
        "communicationPorts": {"masterHttpPort": 7000, "tserverHttpPort": 9000},
        "clusters": [{
            "uuid": "cl-1",
            "clusterType": "PRIMARY",
            "userIntent": {
                "universeName": "dst",
                "provider": "p-1",
                "replicationFactor": 3,
                "ysqlPassword": "REDACTED",
                "ycqlPassword": "REDACTED",
                "masterK8SNodeResourceSpec": {"cpuCoreCount": 2.0, "memoryGib": 4.0},
                "tserverK8SNodeResourceSpec": {"cpuCoreCount": 4.0, "memoryGib": 8.0},
                "deviceInfo": {"volumeSize": 100, "numVolumes": 1}
            },
            "placementInfo": {"cloudList": []}
        }],
        "nodeDetailsSet": [
            {"nodeIdx": 1, "isMaster": true, "isTserver": true, "state": "ToBeAdded", "masterState": "ToStart"},
            {"nodeIdx": 2, "isMaster": false, "isTserver": true, "state": "ToBeAdded"},
            {"nodeIdx": 3, "isMaster": false, "isTserver": true, "state": "ToBeAdded"}
        ]
    })
}

async fn mock_lookup(
    server: &mut mockito::ServerGuard,
    name: &str,
    matches: serde_json::Value,
) -> mockito::Mock {
    server
        .mock("GET", "/api/v1/customers/c1/universes")
        .match_query(Matcher::UrlEncoded("name".into(), name.into()))
        .with_header("content-type", "application/json")
        .with_body(matches.to_string())
        .create_async()
        .await
}

#[tokio::test]
async fn replication_restores_credentials_and_awaits_the_create_task() {
    let mut server = mockito::Server::new_async().await;
    let src_lookup = mock_lookup(&mut server, "src", json!([{"universeUUID": "u-src", "name": "src"}])).await;
    let dst_lookup = mock_lookup(&mut server, "dst", json!([])).await;
    let fetch = server
        .mock("GET", "/api/v1/customers/c1/universes/u-src")
        .with_header("content-type", "application/json")
        .with_body(source_universe().to_string())
        .create_async()
        .await;
    let configure = server
        .mock("POST", "/api/v1/customers/c1/universe_configure")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({
                "nodePrefix": "yb-admin-dst",
                "sequenceNumber": -1,
                "ybcInstalled": false,
                "clusterOperation": "CREATE"
            })),
            // The caller's credentials ride in from the start.
            Matcher::Regex("fresh-ysql-pw".to_string()),
        ]))
        .expect(1)
        .with_header("content-type", "application/json")
        .with_body(configure_response().to_string())
        .create_async()
        .await;
    // The create call only matches when the redacted passwords have been
    // overwritten with the caller's plaintext and the fields the configure
    // phase added survived the round trip.
    let create = server
        .mock("POST", "/api/v1/customers/c1/universes")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("fresh-ysql-pw".to_string()),
            Matcher::Regex("fresh-ycql-pw".to_string()),
            Matcher::PartialJson(json!({
                "expectedUniverseVersion": -1,
                "arch": "x86_64"
            })),
        ]))
        .expect(1)
        .with_header("content-type", "application/json")
        .with_body(json!({"taskUUID": "t1", "resourceUUID": "u-new"}).to_string())
        .create_async()
        .await;
    let task = server
        .mock("GET", "/api/v1/customers/c1/tasks/t1")
        .with_header("content-type", "application/json")
        .with_body(json!({"percent": 100, "status": "Success"}).to_string())
        .create_async()
        .await;

    let outcome = client(&server).replicate_universe(&request()).await.unwrap();

    src_lookup.assert_async().await;
    dst_lookup.assert_async().await;
    fetch.assert_async().await;
    configure.assert_async().await;
    create.assert_async().await;
    task.assert_async().await;

    match outcome {
        ReplicationOutcome::Submitted(TaskOutcome::Completed(task)) => {
            assert_eq!(task.percent, 100);
        },
        other => panic!("expected a completed creation task, got {other:?}"),
    }
}

#[tokio::test]
async fn preview_returns_the_expanded_document_without_creating() {
    let mut server = mockito::Server::new_async().await;
    mock_lookup(&mut server, "src", json!([{"universeUUID": "u-src", "name": "src"}])).await;
    mock_lookup(&mut server, "dst", json!([])).await;
    server
        .mock("GET", "/api/v1/customers/c1/universes/u-src")
        .with_header("content-type", "application/json")
        .with_body(source_universe().to_string())
        .create_async()
        .await;
    server
        .mock("POST", "/api/v1/customers/c1/universe_configure")
        .with_header("content-type", "application/json")
        .with_body(configure_response().to_string())
        .create_async()
        .await;
    let create = server
        .mock("POST", "/api/v1/customers/c1/universes")
        .expect(0)
        .create_async()
        .await;

    let outcome = client(&server)
        .replicate_universe(&request().preview())
        .await
        .unwrap();

    create.assert_async().await;
    match outcome {
        ReplicationOutcome::Preview(definition) => {
            let intent = &definition.clusters[0].user_intent;
            assert_eq!(intent.ysql_password.as_deref(), Some("fresh-ysql-pw"));
            assert_eq!(intent.ycql_password.as_deref(), Some("fresh-ycql-pw"));
            assert_eq!(definition.cluster_operation.as_deref(), Some("CREATE"));
        },
        other => panic!("expected a preview document, got {other:?}"),
    }
}

#[tokio::test]
async fn destination_name_collision_fails_before_any_mutation() {
    let mut server = mockito::Server::new_async().await;
    mock_lookup(&mut server, "src", json!([{"universeUUID": "u-src", "name": "src"}])).await;
    mock_lookup(&mut server, "dst", json!([{"universeUUID": "u-dst", "name": "dst"}])).await;
    let configure = server
        .mock("POST", "/api/v1/customers/c1/universe_configure")
        .expect(0)
        .create_async()
        .await;
    let create = server
        .mock("POST", "/api/v1/customers/c1/universes")
        .expect(0)
        .create_async()
        .await;

    let err = client(&server).replicate_universe(&request()).await.unwrap_err();

    configure.assert_async().await;
    create.assert_async().await;
    assert!(err.is_business_rule());
    assert!(err.to_string().contains("dst"));
}

#[tokio::test]
async fn ambiguous_source_resolution_fails() {
    let mut server = mockito::Server::new_async().await;
    mock_lookup(
        &mut server,
        "src",
        json!([
            {"universeUUID": "u-1", "name": "src"},
            {"universeUUID": "u-2", "name": "src"}
        ]),
    )
    .await;

    let err = client(&server).replicate_universe(&request()).await.unwrap_err();
    assert!(err.is_business_rule());
    assert!(err.to_string().contains("exactly one"));
}

#[tokio::test]
async fn absent_source_fails_the_same_way_as_ambiguity() {
    let mut server = mockito::Server::new_async().await;
    mock_lookup(&mut server, "src", json!([])).await;

    let err = client(&server).replicate_universe(&request()).await.unwrap_err();
    assert!(err.is_business_rule());
    assert!(err.to_string().contains("src"));
}
