//! Entry point bundling the configuration store and the transport.

use crate::config::{ConfigStore, NexusSettings};
use crate::error::{NexusError, Result};
use crate::http::{decode, HttpClient, RequestOptions};
use crate::organization::{ListOrgOptions, Organization, OrganizationPayload};
use crate::pagination::{PaginatedList, PaginationSettings};
use crate::project::{ListProjectOptions, Project};
use crate::resource::{
    get_incoming_links, get_outgoing_links, infer_labels, GetResourceOptions,
    ListResourceOptions, Resource, ResourceLink, ResourceResponse,
};
use crate::view::{sparql::SparqlQueryResponse, view_path, View};
use futures::stream::{BoxStream, StreamExt};
use nexus_link::{Fetch, ReqwestFetch};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// A query against a view.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewQuery {
    /// Sent as `text/plain` to `/sparql`.
    Sparql(String),
    /// Sent as JSON to `/_search`.
    Elastic(Value),
}

/// Result of [`Nexus::query_view`].
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResponse {
    Sparql(SparqlQueryResponse),
    Elastic(Value),
}

/// Nexus client.
///
/// ```rust,ignore
/// use nexus_sdk::{Nexus, NexusSettings, PaginationSettings};
///
/// let nexus = Nexus::new(NexusSettings::new("https://nexus.example.com/v1").with_token("t"))?;
/// let page = nexus.list_resources("org", "project", PaginationSettings::default()).await?;
/// println!("{} of {}", page.len(), page.total);
/// ```
#[derive(Debug, Clone)]
pub struct Nexus {
    client: HttpClient,
}

impl Nexus {
    /// Build a client over `reqwest` with the configured timeout.
    pub fn new(settings: NexusSettings) -> Result<Self> {
        let fetch = ReqwestFetch::new(settings.timeout())?;
        Self::with_fetch(settings, Arc::new(fetch))
    }

    /// Build a client from `NEXUS_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(NexusSettings::from_env()?)
    }

    /// Build a client over a custom transport.
    pub fn with_fetch(settings: NexusSettings, fetch: Arc<dyn Fetch>) -> Result<Self> {
        let store = ConfigStore::new(settings.environment.clone());
        if let Some(token) = &settings.token {
            store.set_token(token)?;
        }
        info!(environment = %settings.environment, "nexus client configured");
        Ok(Self {
            client: HttpClient::new(store, fetch),
        })
    }

    /// Transport shared with the models.
    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    pub fn store(&self) -> &ConfigStore {
        self.client.store()
    }

    pub fn set_environment(&self, environment: impl Into<String>) {
        self.store().set_environment(environment);
    }

    /// Fails with [`NexusError::InvalidToken`] on an empty token.
    pub fn set_token(&self, token: &str) -> Result<()> {
        self.store().set_token(token)
    }

    pub fn remove_token(&self) {
        self.store().remove_token();
    }

    pub async fn fetch_resource(&self, self_url: &str) -> Result<Resource> {
        Resource::get_self(&self.client, self_url).await
    }

    pub async fn get_resource(
        &self,
        org_label: &str,
        project_label: &str,
        resource_id: &str,
        options: GetResourceOptions,
    ) -> Result<Resource> {
        Resource::get(&self.client, org_label, project_label, resource_id, options).await
    }

    pub async fn list_resources(
        &self,
        org_label: &str,
        project_label: &str,
        pagination: PaginationSettings,
    ) -> Result<PaginatedList<Resource>> {
        Resource::list(
            &self.client,
            org_label,
            project_label,
            ListResourceOptions::new(pagination),
        )
        .await
    }

    pub async fn query_view(
        &self,
        org_label: &str,
        project_label: &str,
        view_id: &str,
        query: ViewQuery,
    ) -> Result<QueryResponse> {
        let base = view_path(org_label, project_label, view_id);
        match query {
            ViewQuery::Sparql(query) => {
                let response = self
                    .client
                    .post_text(&format!("{base}/sparql"), &query)
                    .await?;
                Ok(QueryResponse::Sparql(response))
            }
            ViewQuery::Elastic(query) => {
                let response = self.client.post(&format!("{base}/_search"), &query).await?;
                Ok(QueryResponse::Elastic(response))
            }
        }
    }

    pub async fn get_view(
        &self,
        org_label: &str,
        project_label: &str,
        view_id: &str,
    ) -> Result<View> {
        View::get(&self.client, org_label, project_label, view_id).await
    }

    pub async fn get_incoming_links(
        &self,
        org_label: &str,
        project_label: &str,
        resource_id: &str,
        pagination: PaginationSettings,
    ) -> Result<PaginatedList<ResourceLink>> {
        get_incoming_links(&self.client, org_label, project_label, resource_id, pagination).await
    }

    pub async fn get_outgoing_links(
        &self,
        org_label: &str,
        project_label: &str,
        resource_id: &str,
        pagination: PaginationSettings,
    ) -> Result<PaginatedList<ResourceLink>> {
        get_outgoing_links(&self.client, org_label, project_label, resource_id, pagination).await
    }

    pub async fn get_organization(&self, label: &str) -> Result<Organization> {
        Organization::get(&self.client, label).await
    }

    pub async fn list_organizations(
        &self,
        options: ListOrgOptions,
    ) -> Result<PaginatedList<Organization>> {
        Organization::list(&self.client, options).await
    }

    pub async fn create_organization(
        &self,
        label: &str,
        payload: &OrganizationPayload,
    ) -> Result<Organization> {
        Organization::create(&self.client, label, payload).await
    }

    pub async fn update_organization(
        &self,
        label: &str,
        rev: u64,
        payload: &OrganizationPayload,
    ) -> Result<Organization> {
        Organization::update(&self.client, label, rev, payload).await
    }

    pub async fn deprecate_organization(&self, label: &str, rev: u64) -> Result<Organization> {
        Organization::deprecate(&self.client, label, rev).await
    }

    pub async fn get_project(&self, org_label: &str, project_label: &str) -> Result<Project> {
        Project::get(&self.client, org_label, project_label).await
    }

    pub async fn list_projects(
        &self,
        org_label: &str,
        options: ListProjectOptions,
    ) -> Result<PaginatedList<Project>> {
        Project::list(&self.client, org_label, options).await
    }

    /// Re-fetch a resource every `interval` while the stream is alive.
    ///
    /// A failed tick yields an `Err` and polling carries on.
    pub fn poll_resource(
        &self,
        self_url: &str,
        interval: Duration,
    ) -> Result<BoxStream<'static, Result<Resource>>> {
        let stream = self
            .client
            .poll(self_url, interval, RequestOptions::absolute())?;
        Ok(stream
            .map(|item| -> Result<Resource> {
                let response: ResourceResponse = decode(item?)?;
                let (org_label, project_label) = infer_labels(&response).ok_or_else(|| {
                    NexusError::InvalidResponse(format!(
                        "cannot infer organization and project of `{}`",
                        response.self_url
                    ))
                })?;
                Ok(Resource::from_response(org_label, project_label, response))
            })
            .boxed())
    }
}
