//! SPARQL views.

use super::ViewResponse;
use crate::error::Result;
use crate::http::HttpClient;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `@id` of the SPARQL view every project gets.
pub const DEFAULT_SPARQL_VIEW_ID: &str = "nxv:defaultSparqlIndex";

/// SPARQL 1.1 JSON results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparqlQueryResponse {
    pub head: SparqlHead,
    pub results: SparqlResults,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparqlHead {
    #[serde(default)]
    pub vars: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparqlResults {
    #[serde(default)]
    pub bindings: Vec<HashMap<String, Binding>>,
}

/// A single bound variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SparqlView {
    pub org_label: String,
    pub project_label: String,
    pub id: String,
    pub types: Vec<String>,
    pub uuid: Option<String>,
    pub rev: u64,
    pub deprecated: bool,
}

impl SparqlView {
    pub(crate) fn from_response(
        org_label: &str,
        project_label: &str,
        response: ViewResponse,
    ) -> Self {
        Self {
            org_label: org_label.to_string(),
            project_label: project_label.to_string(),
            id: response.id,
            types: response.types,
            uuid: response.uuid,
            rev: response.rev,
            deprecated: response.deprecated,
        }
    }

    /// Fetch the project's default SPARQL view.
    pub async fn get_default(
        client: &HttpClient,
        org_label: &str,
        project_label: &str,
    ) -> Result<SparqlView> {
        let path = super::view_path(org_label, project_label, DEFAULT_SPARQL_VIEW_ID);
        let response: ViewResponse = client.get(&path).await?;
        Ok(Self::from_response(org_label, project_label, response))
    }

    /// Relative URL of the query endpoint.
    pub fn query_url(&self) -> String {
        format!(
            "{}/sparql",
            super::view_path(&self.org_label, &self.project_label, &self.id)
        )
    }

    /// Run a query. The body is sent as `text/plain`.
    pub async fn query(&self, client: &HttpClient, query: &str) -> Result<SparqlQueryResponse> {
        client.post_text(&self.query_url(), query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_url_encodes_id() {
        let response: ViewResponse = serde_json::from_value(json!({
            "@id": "https://bluebrain.github.io/nexus/vocabulary/defaultSparqlIndex",
            "@type": ["View", "SparqlView"],
            "_uuid": "c1b4d5f0",
            "_rev": 1,
            "_deprecated": false
        }))
        .unwrap();
        let view = SparqlView::from_response("org", "proj", response);

        assert_eq!(
            view.query_url(),
            "/views/org/proj/https%3A%2F%2Fbluebrain.github.io%2Fnexus%2Fvocabulary%2FdefaultSparqlIndex/sparql"
        );
    }

    #[test]
    fn test_parse_query_response() {
        let response: SparqlQueryResponse = serde_json::from_value(json!({
            "head": { "vars": ["total"] },
            "results": { "bindings": [
                { "total": {
                    "datatype": "http://www.w3.org/2001/XMLSchema#integer",
                    "type": "literal",
                    "value": "2"
                } }
            ] }
        }))
        .unwrap();

        let total = &response.results.bindings[0]["total"];
        assert_eq!(total.kind, "literal");
        assert_eq!(total.value, "2");
    }
}
