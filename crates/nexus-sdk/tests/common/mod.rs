//! Shared fixtures for the SDK integration tests.

#![allow(dead_code)]

use nexus_link::ReqwestFetch;
use nexus_sdk::{ConfigStore, HttpClient};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use wiremock::MockServer;

/// Route SDK events to the test writer when `RUST_LOG` is set.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Client pointed at `{server}/v1`.
pub fn client(server: &MockServer) -> HttpClient {
    init_tracing();
    let store = ConfigStore::new(format!("{}/v1", server.uri()));
    let fetch = ReqwestFetch::new(Duration::from_secs(5)).unwrap();
    HttpClient::new(store, Arc::new(fetch))
}

pub fn self_url(server: &MockServer, org: &str, project: &str, name: &str) -> String {
    format!("{}/v1/resources/{org}/{project}/_/{name}", server.uri())
}

/// A resource document as served by Nexus.
pub fn resource_json(server: &MockServer, org: &str, project: &str, name: &str) -> Value {
    json!({
        "@context": "https://bluebrain.github.io/nexus/contexts/resource.json",
        "@id": format!("https://example.com/ids/{name}"),
        "@type": "Person",
        "name": name,
        "_self": self_url(server, org, project, name),
        "_constrainedBy": "https://bluebrain.github.io/nexus/schemas/unconstrained.json",
        "_project": format!("{}/v1/projects/{org}/{project}", server.uri()),
        "_rev": 1,
        "_deprecated": false,
        "_createdAt": "2019-02-11T10:23:45.123Z",
        "_createdBy": format!("{}/v1/realms/local/users/kenny", server.uri()),
        "_updatedAt": "2019-02-11T10:23:45.123Z",
        "_updatedBy": format!("{}/v1/realms/local/users/kenny", server.uri())
    })
}

pub fn sparql_view_json() -> Value {
    json!({
        "@id": "https://bluebrain.github.io/nexus/vocabulary/defaultSparqlIndex",
        "@type": ["View", "SparqlView"],
        "_uuid": "a0f2c1d4-1c0b-4a57-9e0d-2b6f6c6e3c3d",
        "_rev": 1,
        "_deprecated": false
    })
}
