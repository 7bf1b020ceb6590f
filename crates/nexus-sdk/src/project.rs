//! Projects.

use crate::error::Result;
use crate::http::HttpClient;
use crate::pagination::{build_query_params, ListResponse, PaginatedList, PaginationSettings};
use crate::resource::{GetResourceOptions, ListResourceOptions, Resource};
use crate::types::encode_segment;
use crate::view::{ElasticSearchView, SparqlView, View};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefixMapping {
    pub prefix: String,
    pub namespace: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectResponse {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    /// Newer servers report the label as metadata.
    #[serde(rename = "_label", default)]
    pub meta_label: Option<String>,
    #[serde(rename = "_organizationLabel", default)]
    pub organization_label: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub vocab: Option<String>,
    #[serde(rename = "_uuid", default)]
    pub uuid: Option<String>,
    #[serde(rename = "_rev")]
    pub rev: u64,
    #[serde(rename = "_deprecated", default)]
    pub deprecated: bool,
    #[serde(rename = "_createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "_updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(rename = "prefixMappings", alias = "apiMappings", default)]
    pub prefix_mappings: Vec<PrefixMapping>,
    #[serde(rename = "resourceNumber", default)]
    pub resource_number: Option<u64>,
}

/// Options for [`Project::list`].
#[derive(Debug, Clone, Default)]
pub struct ListProjectOptions {
    pub pagination: PaginationSettings,
    pub deprecated: Option<bool>,
}

/// A project inside an organization.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub org_label: String,
    pub label: String,
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub base: Option<String>,
    pub vocab: Option<String>,
    pub uuid: Option<String>,
    pub rev: u64,
    pub deprecated: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub prefix_mappings: Vec<PrefixMapping>,
    pub resource_number: Option<u64>,
}

impl Project {
    pub fn from_response(org_label: &str, response: ProjectResponse) -> Self {
        Self {
            org_label: response
                .organization_label
                .unwrap_or_else(|| org_label.to_string()),
            label: response
                .meta_label
                .or(response.label)
                .unwrap_or_default(),
            id: response.id,
            name: response.name,
            description: response.description,
            base: response.base,
            vocab: response.vocab,
            uuid: response.uuid,
            rev: response.rev,
            deprecated: response.deprecated,
            created_at: response.created_at,
            updated_at: response.updated_at,
            prefix_mappings: response.prefix_mappings,
            resource_number: response.resource_number,
        }
    }

    pub async fn get(client: &HttpClient, org_label: &str, project_label: &str) -> Result<Project> {
        let path = format!(
            "/projects/{}/{}",
            encode_segment(org_label),
            encode_segment(project_label)
        );
        let response: ProjectResponse = client.get(&path).await?;
        Ok(Project::from_response(org_label, response))
    }

    /// Projects of an organization.
    pub async fn list(
        client: &HttpClient,
        org_label: &str,
        options: ListProjectOptions,
    ) -> Result<PaginatedList<Project>> {
        let mut pairs = options.pagination.query_pairs();
        if let Some(deprecated) = options.deprecated {
            pairs.push(("deprecated", deprecated.to_string()));
        }
        let path = format!(
            "/projects/{}{}",
            encode_segment(org_label),
            build_query_params(&pairs)
        );
        let page: ListResponse<ProjectResponse> = client.get(&path).await?;

        Ok(PaginatedList::new(
            page.total,
            Some(options.pagination.from),
            page.results
                .into_iter()
                .map(|response| Project::from_response(org_label, response))
                .collect(),
        ))
    }

    pub async fn list_resources(
        &self,
        client: &HttpClient,
        options: ListResourceOptions,
    ) -> Result<PaginatedList<Resource>> {
        Resource::list(client, &self.org_label, &self.label, options).await
    }

    pub async fn get_resource(
        &self,
        client: &HttpClient,
        resource_id: &str,
        options: GetResourceOptions,
    ) -> Result<Resource> {
        Resource::get(client, &self.org_label, &self.label, resource_id, options).await
    }

    pub async fn views(&self, client: &HttpClient) -> Result<Vec<View>> {
        View::list(client, &self.org_label, &self.label).await
    }

    /// Single and aggregate Elasticsearch views of this project.
    pub async fn elastic_search_views(
        &self,
        client: &HttpClient,
    ) -> Result<Vec<ElasticSearchView>> {
        Ok(self
            .views(client)
            .await?
            .into_iter()
            .filter_map(|view| match view {
                View::ElasticSearch(view) => Some(view),
                _ => None,
            })
            .collect())
    }

    /// The default SPARQL view.
    pub async fn sparql_view(&self, client: &HttpClient) -> Result<SparqlView> {
        SparqlView::get_default(client, &self.org_label, &self.label).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_response() {
        let response: ProjectResponse = serde_json::from_value(json!({
            "@id": "https://nexus.example.com/v1/projects/kenny/what-a-project",
            "@context": "https://bluebrain.github.io/nexus/contexts/resource.json",
            "@type": "nxv:Project",
            "label": "what-a-project",
            "name": "What a project",
            "base": "https://nexus.example.com/v1/resources/kenny/what-a-project/_/",
            "_rev": 4,
            "_deprecated": false,
            "_createdAt": "2019-01-28T15:21:44.622Z",
            "_updatedAt": "2019-01-28T15:21:44.622Z",
            "prefixMappings": [{
                "prefix": "nxv",
                "namespace": "https://bluebrain.github.io/nexus/vocabulary/"
            }],
            "resourceNumber": 12
        }))
        .unwrap();
        let project = Project::from_response("kenny", response);

        assert_eq!(project.org_label, "kenny");
        assert_eq!(project.label, "what-a-project");
        assert_eq!(project.rev, 4);
        assert_eq!(project.prefix_mappings.len(), 1);
        assert_eq!(project.resource_number, Some(12));
    }

    #[test]
    fn test_organization_label_from_payload_wins() {
        let response: ProjectResponse = serde_json::from_value(json!({
            "@id": "p",
            "_label": "proj",
            "_organizationLabel": "real-org",
            "_rev": 1
        }))
        .unwrap();
        assert_eq!(Project::from_response("guess", response).org_label, "real-org");
    }
}
