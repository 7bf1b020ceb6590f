//! End-to-end tests running link chains against a mock HTTP server.

use futures::StreamExt;
use nexus_link::{links, Body, Chain, LinkError, Method, Operation, ParseAs, ReqwestFetch};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher() -> Arc<ReqwestFetch> {
    Arc::new(ReqwestFetch::new(Duration::from_secs(5)).unwrap())
}

fn authenticated_chain(verb: Method, token: &str) -> Chain {
    Chain::builder()
        .link(links::set_method(verb))
        .link(links::set_token(token))
        .link(links::trigger_fetch(fetcher()))
        .build()
}

#[tokio::test]
async fn test_token_and_method_reach_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orgs/bbp"))
        .and(header("Authorization", "bearer abc123"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"_label": "bbp"})))
        .expect(1)
        .mount(&server)
        .await;

    let chain = authenticated_chain(Method::Get, "abc123");
    let op = Operation::new(format!("{}/orgs/bbp", server.uri())).with_method(Method::Delete);
    let values: Vec<_> = chain.execute(op).unwrap().collect().await;

    assert_eq!(values.len(), 1);
    assert_eq!(values[0].as_ref().unwrap()["_label"], "bbp");
}

#[tokio::test]
async fn test_text_body_and_text_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/echo"))
        .and(header("Content-Type", "text/plain"))
        .and(body_string("SELECT ?s WHERE { ?s ?p ?o }"))
        .respond_with(ResponseTemplate::new(200).set_body_string("plain answer"))
        .mount(&server)
        .await;

    let chain = authenticated_chain(Method::Post, "t");
    let op = Operation::new(format!("{}/echo", server.uri()))
        .with_header("Content-Type", "text/plain")
        .with_body(Body::Text("SELECT ?s WHERE { ?s ?p ?o }".into()))
        .parse_as(ParseAs::Text);

    let mut stream = chain.execute(op).unwrap();
    assert_eq!(stream.next().await.unwrap().unwrap(), json!("plain answer"));
}

#[tokio::test]
async fn test_http_error_surfaces_through_stream() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"@type": "AuthorizationFailed"})),
        )
        .mount(&server)
        .await;

    let chain = authenticated_chain(Method::Get, "expired");
    let mut stream = chain
        .execute(Operation::new(format!("{}/acls", server.uri())))
        .unwrap();

    match stream.next().await.unwrap() {
        Err(LinkError::Http { status, body }) => {
            assert_eq!(status, 401);
            assert_eq!(body["@type"], "AuthorizationFailed");
        }
        other => panic!("unexpected item: {other:?}"),
    }
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn test_network_failure() {
    let chain = authenticated_chain(Method::Get, "t");
    let mut stream = chain
        .execute(Operation::new("http://127.0.0.1:9/unreachable"))
        .unwrap();

    assert!(matches!(
        stream.next().await.unwrap(),
        Err(LinkError::Network(_))
    ));
}

#[tokio::test]
async fn test_poll_repeats_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .and(header("Authorization", "bearer poller"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let chain = Chain::builder()
        .link(links::set_method(Method::Get))
        .link(links::set_token("poller"))
        .link(links::poll(Duration::from_millis(20)))
        .link(links::trigger_fetch(fetcher()))
        .build();

    let stream = chain
        .execute(Operation::new(format!("{}/status", server.uri())))
        .unwrap();
    let values: Vec<_> = stream.take(3).collect().await;

    assert_eq!(values.len(), 3);
    assert!(values.iter().all(|v| v.as_ref().unwrap()["ok"] == true));
    assert!(server.received_requests().await.unwrap().len() >= 3);
}
