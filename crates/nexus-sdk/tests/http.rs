//! Transport behaviour against a mock server.

mod common;

use nexus_sdk::{NexusError, RequestOptions};
use nexus_link::{Method, ParseAs};
use serde_json::{json, Value};
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_get_prefixes_base_url_and_sends_default_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/orgs/kenny"))
        .and(header("Content-Type", "application/json"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"_label": "kenny"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client(&server);
    let org: Value = client.get("/orgs/kenny").await.unwrap();
    assert_eq!(org["_label"], "kenny");
}

#[tokio::test]
async fn test_token_is_read_at_request_time() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/orgs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = common::client(&server);
    let _: Value = client.get("/orgs").await.unwrap();
    client.store().set_token("tok-1").unwrap();
    let _: Value = client.get("/orgs").await.unwrap();
    client.store().remove_token();
    let _: Value = client.get("/orgs").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let auth: Vec<Option<String>> = requests
        .iter()
        .map(|r| {
            r.headers
                .get("authorization")
                .map(|v| v.to_str().unwrap().to_string())
        })
        .collect();
    assert_eq!(auth, vec![None, Some("bearer tok-1".to_string()), None]);
}

#[tokio::test]
async fn test_empty_token_is_rejected_without_mutation() {
    let server = MockServer::start().await;
    let client = common::client(&server);
    client.store().set_token("kept").unwrap();

    assert!(matches!(
        client.store().set_token(""),
        Err(NexusError::InvalidToken)
    ));
    assert_eq!(client.store().snapshot().access_token.as_deref(), Some("kept"));
}

#[tokio::test]
async fn test_absolute_url_skips_base() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/elsewhere"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client(&server);
    let value: Value = client
        .get_url(&format!("{}/elsewhere", server.uri()))
        .await
        .unwrap();
    assert_eq!(value["ok"], true);
}

#[tokio::test]
async fn test_non_success_status_carries_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/orgs/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "@type": "OrganizationNotFound",
            "reason": "The organization 'missing' was not found."
        })))
        .mount(&server)
        .await;

    let client = common::client(&server);
    let err = client.get::<Value>("/orgs/missing").await.unwrap_err();
    match err {
        NexusError::Transport { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body["@type"], "OrganizationNotFound");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn test_parse_as_controls_body_handling() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/version"))
        .respond_with(ResponseTemplate::new(200).set_body_string("nexus 1.4"))
        .mount(&server)
        .await;

    let client = common::client(&server);
    let err = client.get::<Value>("/version").await.unwrap_err();
    assert!(matches!(err, NexusError::Parse(_)));

    let text = client
        .request(Method::Get, "/version", None, RequestOptions::default().text())
        .await
        .unwrap();
    assert_eq!(text, json!("nexus 1.4"));
    assert_eq!(RequestOptions::default().text().parse_as, ParseAs::Text);
}

#[tokio::test]
async fn test_post_text_sends_plain_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/views/org/proj/v/sparql"))
        .and(header("Content-Type", "text/plain"))
        .and(body_string("SELECT * WHERE { ?s ?p ?o }"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"head": {"vars": []}})))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client(&server);
    let value: Value = client
        .post_text("/views/org/proj/v/sparql", "SELECT * WHERE { ?s ?p ?o }")
        .await
        .unwrap();
    assert_eq!(value["head"]["vars"], json!([]));
}

#[tokio::test]
async fn test_unreachable_server_is_a_network_error() {
    let store = nexus_sdk::ConfigStore::new("http://127.0.0.1:9/v1");
    let fetch = nexus_link::ReqwestFetch::new(std::time::Duration::from_secs(2)).unwrap();
    let client = nexus_sdk::HttpClient::new(store, std::sync::Arc::new(fetch));

    let err = client.get::<Value>("/orgs").await.unwrap_err();
    assert!(matches!(err, NexusError::Network(_)));
}
