//! Elasticsearch views.

use super::ViewResponse;
use crate::error::{NexusError, Result};
use crate::http::HttpClient;
use crate::pagination::{build_query_params, PaginatedList, PaginationSettings};
use crate::resource::Resource;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::debug;

/// A view inside an aggregate view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewRef {
    pub project: String,
    #[serde(rename = "viewId")]
    pub view_id: String,
}

/// Fields specific to single and aggregate views.
#[derive(Debug, Clone, PartialEq)]
pub enum ElasticSearchViewKind {
    Single {
        include_metadata: bool,
        /// Elasticsearch mapping.
        mapping: Value,
        source_as_text: bool,
    },
    Aggregate {
        views: Vec<ViewRef>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElasticSearchView {
    pub org_label: String,
    pub project_label: String,
    pub id: String,
    pub types: Vec<String>,
    pub uuid: Option<String>,
    pub rev: u64,
    pub deprecated: bool,
    pub kind: ElasticSearchViewKind,
}

/// Raw search response.
#[derive(Debug, Clone, Deserialize)]
pub struct ElasticSearchQueryResponse {
    pub hits: Hits,
    #[serde(default)]
    pub took: u64,
    #[serde(default)]
    pub timed_out: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Hits {
    pub total: HitsTotal,
    #[serde(default)]
    pub hits: Vec<Hit>,
    #[serde(default)]
    pub max_score: Option<f64>,
}

/// Elasticsearch 6 reports a number, 7 and later an object.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum HitsTotal {
    Count(u64),
    Object { value: u64 },
}

impl HitsTotal {
    pub fn value(self) -> u64 {
        match self {
            HitsTotal::Count(value) | HitsTotal::Object { value } => value,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Hit {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source")]
    pub source: HitSource,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HitSource {
    #[serde(rename = "_self")]
    pub self_url: String,
    #[serde(rename = "_original_source", default)]
    pub original_source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Bucket {
    pub key: Value,
    pub doc_count: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Aggregation {
    #[serde(default)]
    pub doc_count_error_upper_bound: u64,
    #[serde(default)]
    pub sum_other_doc_count: u64,
    #[serde(default)]
    pub buckets: Vec<Bucket>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ElasticSearchAggregationResponse {
    #[serde(default)]
    pub aggregations: HashMap<String, Aggregation>,
}

impl ElasticSearchView {
    pub(crate) fn from_response(
        org_label: &str,
        project_label: &str,
        response: ViewResponse,
        aggregate: bool,
    ) -> Result<Self> {
        let kind = if aggregate {
            let views = response
                .extra
                .get("views")
                .cloned()
                .map(serde_json::from_value)
                .transpose()
                .map_err(NexusError::Decode)?
                .unwrap_or_default();
            ElasticSearchViewKind::Aggregate { views }
        } else {
            let flag = |name: &str| response.extra.get(name).and_then(Value::as_bool);
            ElasticSearchViewKind::Single {
                include_metadata: flag("includeMetadata").unwrap_or(false),
                mapping: response.extra.get("mapping").cloned().unwrap_or(Value::Null),
                source_as_text: flag("sourceAsText").unwrap_or(true),
            }
        };

        Ok(Self {
            org_label: org_label.to_string(),
            project_label: project_label.to_string(),
            id: response.id,
            types: response.types,
            uuid: response.uuid,
            rev: response.rev,
            deprecated: response.deprecated,
            kind,
        })
    }

    /// Relative URL of the search endpoint.
    pub fn query_url(&self) -> String {
        format!(
            "{}/_search",
            super::view_path(&self.org_label, &self.project_label, &self.id)
        )
    }

    /// Search and dereference every hit into a [`Resource`].
    pub async fn query(
        &self,
        client: &HttpClient,
        query: &Value,
        pagination: Option<PaginationSettings>,
    ) -> Result<PaginatedList<Resource>> {
        let params = pagination
            .map(|p| build_query_params(&p.query_pairs()))
            .unwrap_or_default();
        let response: ElasticSearchQueryResponse =
            client.post(&format!("{}{params}", self.query_url()), query).await?;
        debug!(view = %self.id, hits = response.hits.hits.len(), "expanding search hits");

        let results = try_join_all(response.hits.hits.iter().map(|hit| {
            Resource::get_self_in(
                client,
                &hit.source.self_url,
                &self.org_label,
                &self.project_label,
            )
        }))
        .await?;

        Ok(PaginatedList::new(
            response.hits.total.value(),
            pagination.map(|p| p.from),
            results,
        ))
    }

    /// Search and return the raw response.
    pub async fn raw_query(&self, client: &HttpClient, query: &Value) -> Result<Value> {
        client.post(&self.query_url(), query).await
    }

    /// Run an aggregation query. Aggregations are not paginated.
    pub async fn aggregation(
        &self,
        client: &HttpClient,
        query: &Value,
    ) -> Result<ElasticSearchAggregationResponse> {
        client.post(&self.query_url(), query).await
    }

    /// Resources carrying every one of `types`.
    pub async fn filter_by_types(
        &self,
        client: &HttpClient,
        types: &[&str],
        pagination: Option<PaginationSettings>,
    ) -> Result<PaginatedList<Resource>> {
        self.query(client, &types_query(types), pagination).await
    }

    /// Resources validated against `schema`.
    pub async fn filter_by_constrained_by(
        &self,
        client: &HttpClient,
        schema: &str,
        pagination: Option<PaginationSettings>,
    ) -> Result<PaginatedList<Resource>> {
        self.query(client, &constrained_by_query(schema), pagination)
            .await
    }
}

fn types_query(types: &[&str]) -> Value {
    let filters: Vec<Value> = types
        .iter()
        .map(|t| json!({ "term": { "@type": t } }))
        .collect();
    json!({ "query": { "bool": { "filter": filters } } })
}

fn constrained_by_query(schema: &str) -> Value {
    json!({ "query": { "term": { "_constrainedBy": schema } } })
}
