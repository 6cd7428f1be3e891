use std::collections::BTreeMap;
use std::net::TcpListener;
use std::time::Duration;

use edgedeploy_registry::{
    Configuration, ConfigurationContent, ConnectionString, HttpRegistryClient, HttpRegistryConfig,
    RegistryClient, RegistryError, PROPERTIES_DESIRED,
};
use mockito::{Matcher, Server};
use serde_json::json;

const CONNECTION_STRING: &str = "HostName=myhub.azure-devices.net;SharedAccessKeyName=iothubowner;SharedAccessKey=MDEyMzQ1Njc4OWFiY2RlZjAxMjM0NTY3ODlhYmNkZWY=";

fn client_for(server: &Server) -> HttpRegistryClient {
    let connection: ConnectionString = CONNECTION_STRING.parse().expect("valid connection string");
    HttpRegistryClient::new(HttpRegistryConfig::new(connection).with_endpoint(server.url()))
        .expect("failed to build registry client")
}

fn sample_configuration() -> Configuration {
    let mut modules = BTreeMap::new();
    modules.insert(
        "asaModule".to_string(),
        BTreeMap::from([(PROPERTIES_DESIRED.to_string(), json!({ "foo": "bar" }))]),
    );

    let mut configuration = Configuration::new("config01");
    configuration.target_condition = "*".to_string();
    configuration.content = ConfigurationContent {
        modules_content: Some(modules),
        device_content: None,
    };
    configuration
}

fn stored_payload(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "schemaVersion": "1.0",
        "labels": {},
        "content": {
            "modulesContent": {
                "asaModule": { "properties.desired": { "foo": "bar" } }
            }
        },
        "contentType": "assignment",
        "targetCondition": "*",
        "createdTimeUtc": "2024-05-01T10:00:00.000Z",
        "lastUpdatedTimeUtc": "2024-05-01T10:00:00.000Z",
        "priority": 0,
        "etag": "MQ=="
    })
}

#[tokio::test]
async fn create_puts_configuration_with_sas_authorization() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PUT", "/configurations/config01")
        .match_query(Matcher::UrlEncoded(
            "api-version".into(),
            "2021-04-12".into(),
        ))
        .match_header(
            "authorization",
            Matcher::Regex(
                r"^SharedAccessSignature sr=myhub\.azure-devices\.net&sig=[^&]+&se=\d+&skn=iothubowner$"
                    .into(),
            ),
        )
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(json!({
            "id": "config01",
            "targetCondition": "*",
            "content": {
                "modulesContent": {
                    "asaModule": { "properties.desired": { "foo": "bar" } }
                }
            }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(stored_payload("config01").to_string())
        .create_async()
        .await;

    let stored = client_for(&server)
        .create_configuration(&sample_configuration())
        .await
        .expect("create should succeed");

    mock.assert_async().await;
    assert_eq!(stored.id, "config01");
    assert_eq!(stored.schema_version.as_deref(), Some("1.0"));
    assert_eq!(stored.etag.as_deref(), Some("MQ=="));
    assert_eq!(stored.content, sample_configuration().content);
}

#[tokio::test]
async fn create_maps_conflict_to_existing_id() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("PUT", "/configurations/config01")
        .match_query(Matcher::Any)
        .with_status(409)
        .with_body(r#"{"Message":"ErrorCode:ConfigurationAlreadyExists"}"#)
        .create_async()
        .await;

    let err = client_for(&server)
        .create_configuration(&sample_configuration())
        .await
        .unwrap_err();

    assert!(matches!(err, RegistryError::Conflict { ref id } if id == "config01"));
}

#[tokio::test]
async fn create_maps_unauthorized_to_auth_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("PUT", "/configurations/config01")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body("IotHubUnauthorizedAccess")
        .create_async()
        .await;

    let err = client_for(&server)
        .create_configuration(&sample_configuration())
        .await
        .unwrap_err();

    assert!(matches!(err, RegistryError::Auth(ref body) if body.contains("Unauthorized")));
}

#[tokio::test]
async fn list_requests_top_and_enforces_bound() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/configurations")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("top".into(), "2".into()),
            Matcher::UrlEncoded("api-version".into(), "2021-04-12".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!([
                stored_payload("first"),
                stored_payload("second"),
                stored_payload("third")
            ])
            .to_string(),
        )
        .create_async()
        .await;

    let listed = client_for(&server)
        .list_configurations(2)
        .await
        .expect("list should succeed");

    mock.assert_async().await;
    assert_eq!(
        listed.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(),
        ["first", "second"]
    );
}

#[tokio::test]
async fn list_returns_fewer_when_registry_holds_fewer() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/configurations")
        .match_query(Matcher::UrlEncoded("top".into(), "5".into()))
        .with_status(200)
        .with_body(json!([stored_payload("only")]).to_string())
        .create_async()
        .await;

    let listed = client_for(&server)
        .list_configurations(5)
        .await
        .expect("list should succeed");

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, "only");
}

#[tokio::test]
async fn list_maps_service_unavailable_to_transient() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/configurations")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("ServerBusy")
        .create_async()
        .await;

    let err = client_for(&server)
        .list_configurations(1)
        .await
        .unwrap_err();

    assert!(err.is_transient(), "expected transient error, got {err:?}");
}

#[tokio::test]
async fn list_rejects_malformed_payload() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/configurations")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("{ not json")
        .create_async()
        .await;

    let err = client_for(&server)
        .list_configurations(1)
        .await
        .unwrap_err();

    assert!(matches!(err, RegistryError::Decode(_)));
}

#[tokio::test]
async fn unreachable_registry_is_transient() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        listener.local_addr().expect("local addr").port()
    };
    let connection: ConnectionString = CONNECTION_STRING.parse().expect("valid connection string");
    let mut config =
        HttpRegistryConfig::new(connection).with_endpoint(format!("http://127.0.0.1:{port}"));
    config.request_timeout = Duration::from_secs(5);
    let client = HttpRegistryClient::new(config).expect("failed to build registry client");

    let err = client.list_configurations(1).await.unwrap_err();
    assert!(err.is_transient(), "expected transient error, got {err:?}");

    let err = client
        .create_configuration(&sample_configuration())
        .await
        .unwrap_err();
    assert!(err.is_transient(), "expected transient error, got {err:?}");
}
