//! Views: SPARQL and Elasticsearch indexes over a project.

pub mod elastic;
pub mod sparql;

pub use elastic::{ElasticSearchView, ElasticSearchViewKind};
pub use sparql::{SparqlQueryResponse, SparqlView, DEFAULT_SPARQL_VIEW_ID};

use crate::error::Result;
use crate::http::HttpClient;
use crate::pagination::ListResponse;
use crate::types::{encode_segment, one_or_many};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields shared by every view payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewResponse {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type", default, deserialize_with = "one_or_many")]
    pub types: Vec<String>,
    #[serde(rename = "_uuid", default)]
    pub uuid: Option<String>,
    #[serde(rename = "_rev")]
    pub rev: u64,
    #[serde(rename = "_deprecated", default)]
    pub deprecated: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A view, dispatched on its `@type`.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Sparql(SparqlView),
    ElasticSearch(ElasticSearchView),
    /// A view type this client does not model.
    Other(ViewResponse),
}

impl View {
    pub fn from_response(
        org_label: &str,
        project_label: &str,
        response: ViewResponse,
    ) -> Result<View> {
        let has_type = |suffix: &str| response.types.iter().any(|t| t.ends_with(suffix));

        if has_type("AggregateElasticSearchView") {
            ElasticSearchView::from_response(org_label, project_label, response, true)
                .map(View::ElasticSearch)
        } else if has_type("ElasticSearchView") {
            ElasticSearchView::from_response(org_label, project_label, response, false)
                .map(View::ElasticSearch)
        } else if has_type("SparqlView") {
            Ok(View::Sparql(SparqlView::from_response(
                org_label,
                project_label,
                response,
            )))
        } else {
            Ok(View::Other(response))
        }
    }

    pub fn id(&self) -> &str {
        match self {
            View::Sparql(view) => &view.id,
            View::ElasticSearch(view) => &view.id,
            View::Other(response) => &response.id,
        }
    }

    /// Fetch a view by `@id`.
    pub async fn get(
        client: &HttpClient,
        org_label: &str,
        project_label: &str,
        view_id: &str,
    ) -> Result<View> {
        let response: ViewResponse = client
            .get(&view_path(org_label, project_label, view_id))
            .await?;
        View::from_response(org_label, project_label, response)
    }

    /// Every view of a project.
    pub async fn list(
        client: &HttpClient,
        org_label: &str,
        project_label: &str,
    ) -> Result<Vec<View>> {
        let path = format!(
            "/views/{}/{}",
            encode_segment(org_label),
            encode_segment(project_label)
        );
        let page: ListResponse<ViewResponse> = client.get(&path).await?;
        page.results
            .into_iter()
            .map(|response| View::from_response(org_label, project_label, response))
            .collect()
    }
}

pub(crate) fn view_path(org_label: &str, project_label: &str, view_id: &str) -> String {
    format!(
        "/views/{}/{}/{}",
        encode_segment(org_label),
        encode_segment(project_label),
        encode_segment(view_id)
    )
}
