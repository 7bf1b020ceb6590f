//! Resources: JSON-LD documents stored in a project.

pub mod links;

pub use links::{get_incoming_links, get_outgoing_links, LinkDirection, LinkTarget, ResourceLink};

use crate::error::{NexusError, Result};
use crate::http::{decode, HttpClient};
use crate::pagination::{build_query_params, ListResponse, PaginatedList, PaginationSettings};
use crate::types::{encode_segment, merge_objects, one_or_many};
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// A resource as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceResponse {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    #[serde(rename = "@type", default, deserialize_with = "one_or_many")]
    pub types: Vec<String>,
    #[serde(rename = "_self")]
    pub self_url: String,
    #[serde(rename = "_constrainedBy", default, skip_serializing_if = "Option::is_none")]
    pub constrained_by: Option<String>,
    #[serde(rename = "_project", default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(rename = "_rev")]
    pub rev: u64,
    #[serde(rename = "_deprecated", default)]
    pub deprecated: bool,
    #[serde(rename = "_createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "_createdBy", default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(rename = "_updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(rename = "_updatedBy", default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    /// Every other field of the document.
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

/// List entry; only the self link is needed to dereference it.
#[derive(Debug, Deserialize)]
struct ResourceRef {
    #[serde(rename = "_self")]
    self_url: String,
}

/// Options for [`Resource::get`]. `rev` and `tag` are mutually exclusive.
#[derive(Debug, Clone, Default)]
pub struct GetResourceOptions {
    pub rev: Option<u64>,
    pub tag: Option<String>,
}

impl GetResourceOptions {
    fn query(&self) -> Result<String> {
        match (&self.rev, &self.tag) {
            (Some(_), Some(_)) => Err(NexusError::InvalidArgument(
                "rev and tag cannot be combined".to_string(),
            )),
            (Some(rev), None) => Ok(build_query_params(&[("rev", rev.to_string())])),
            (None, Some(tag)) => Ok(build_query_params(&[("tag", tag.as_str())])),
            (None, None) => Ok(String::new()),
        }
    }
}

/// Options for [`Resource::list`].
#[derive(Debug, Clone, Default)]
pub struct ListResourceOptions {
    pub pagination: PaginationSettings,
    pub deprecated: Option<bool>,
    /// Restrict to one `@type`.
    pub resource_type: Option<String>,
}

impl ListResourceOptions {
    pub fn new(pagination: PaginationSettings) -> Self {
        Self {
            pagination,
            ..Default::default()
        }
    }

    fn query(&self) -> String {
        let mut pairs = self.pagination.query_pairs();
        if let Some(deprecated) = self.deprecated {
            pairs.push(("deprecated", deprecated.to_string()));
        }
        if let Some(resource_type) = &self.resource_type {
            pairs.push(("type", resource_type.clone()));
        }
        build_query_params(&pairs)
    }
}

/// A resource owned by an organization and project.
///
/// Instances are immutable. [`Resource::update`] and [`Resource::deprecate`]
/// return a new instance carrying the server's revision.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    org_label: String,
    project_label: String,
    response: ResourceResponse,
}

impl Resource {
    /// Wrap an API payload. Performs no I/O.
    pub fn from_response(
        org_label: impl Into<String>,
        project_label: impl Into<String>,
        response: ResourceResponse,
    ) -> Self {
        Self {
            org_label: org_label.into(),
            project_label: project_label.into(),
            response,
        }
    }

    pub fn org_label(&self) -> &str {
        &self.org_label
    }

    pub fn project_label(&self) -> &str {
        &self.project_label
    }

    /// The `@id`.
    pub fn id(&self) -> &str {
        &self.response.id
    }

    /// Absolute URL of this resource.
    pub fn self_url(&self) -> &str {
        &self.response.self_url
    }

    pub fn types(&self) -> &[String] {
        &self.response.types
    }

    pub fn context(&self) -> Option<&Value> {
        self.response.context.as_ref()
    }

    pub fn constrained_by(&self) -> Option<&str> {
        self.response.constrained_by.as_deref()
    }

    pub fn rev(&self) -> u64 {
        self.response.rev
    }

    pub fn deprecated(&self) -> bool {
        self.response.deprecated
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.response.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.response.updated_at
    }

    pub fn created_by(&self) -> Option<&str> {
        self.response.created_by.as_deref()
    }

    pub fn updated_by(&self) -> Option<&str> {
        self.response.updated_by.as_deref()
    }

    /// Non-metadata fields of the document.
    pub fn data(&self) -> &Map<String, Value> {
        &self.response.data
    }

    /// The raw payload.
    pub fn response(&self) -> &ResourceResponse {
        &self.response
    }

    /// Fetch a resource by `@id`, optionally at a revision or tag.
    pub async fn get(
        client: &HttpClient,
        org_label: &str,
        project_label: &str,
        id: &str,
        options: GetResourceOptions,
    ) -> Result<Resource> {
        let path = format!(
            "{}{}",
            resource_path(org_label, project_label, id),
            options.query()?
        );
        let response: ResourceResponse = client.get(&path).await?;
        Ok(Resource::from_response(org_label, project_label, response))
    }

    /// Fetch a resource from its absolute self URL. The owning org and
    /// project are read from `_project`, or from the URL itself.
    pub async fn get_self(client: &HttpClient, self_url: &str) -> Result<Resource> {
        fetch_self(client, self_url, None).await
    }

    /// Like [`Resource::get_self`], falling back to the given labels when
    /// they cannot be inferred.
    pub async fn get_self_in(
        client: &HttpClient,
        self_url: &str,
        org_label: &str,
        project_label: &str,
    ) -> Result<Resource> {
        fetch_self(client, self_url, Some((org_label, project_label))).await
    }

    /// List a project's resources.
    ///
    /// Every entry is dereferenced through its self URL concurrently; one
    /// failure fails the page.
    pub async fn list(
        client: &HttpClient,
        org_label: &str,
        project_label: &str,
        options: ListResourceOptions,
    ) -> Result<PaginatedList<Resource>> {
        let path = format!(
            "/resources/{}/{}{}",
            encode_segment(org_label),
            encode_segment(project_label),
            options.query()
        );
        let page: ListResponse<ResourceRef> = client.get(&path).await?;
        let size = usize::try_from(options.pagination.size).unwrap_or(usize::MAX);
        debug!(total = page.total, entries = page.results.len(), "expanding resource list");

        let results = try_join_all(
            page.results
                .iter()
                .take(size)
                .map(|entry| {
                    Resource::get_self_in(client, &entry.self_url, org_label, project_label)
                }),
        )
        .await?;

        Ok(PaginatedList::new(
            page.total,
            Some(options.pagination.from),
            results,
        ))
    }

    /// Create a resource, optionally validated against `schema_id`.
    pub async fn create(
        client: &HttpClient,
        org_label: &str,
        project_label: &str,
        schema_id: Option<&str>,
        payload: &Value,
    ) -> Result<Resource> {
        let path = format!(
            "/resources/{}/{}/{}",
            encode_segment(org_label),
            encode_segment(project_label),
            encode_segment(schema_id.unwrap_or("_"))
        );
        let metadata: Value = client.post(&path, payload).await?;
        let response = decode(merge_objects(payload.clone(), metadata))?;
        Ok(Resource::from_response(org_label, project_label, response))
    }

    /// Replace the document. Returns the new revision.
    pub async fn update(&self, client: &HttpClient, payload: &Value) -> Result<Resource> {
        let path = format!(
            "{}{}",
            resource_path(&self.org_label, &self.project_label, self.id()),
            build_query_params(&[("rev", self.rev().to_string())])
        );
        let metadata: Value = client.put(&path, payload).await?;
        let response = decode(merge_objects(payload.clone(), metadata))?;
        Ok(Resource::from_response(
            self.org_label.clone(),
            self.project_label.clone(),
            response,
        ))
    }

    /// Deprecate this revision. Returns the deprecated instance.
    pub async fn deprecate(&self, client: &HttpClient) -> Result<Resource> {
        let path = format!(
            "{}{}",
            resource_path(&self.org_label, &self.project_label, self.id()),
            build_query_params(&[("rev", self.rev().to_string())])
        );
        let metadata: Value = client.delete(&path).await?;
        let current = serde_json::to_value(&self.response).map_err(NexusError::Decode)?;
        let response = decode(merge_objects(current, metadata))?;
        Ok(Resource::from_response(
            self.org_label.clone(),
            self.project_label.clone(),
            response,
        ))
    }

    /// Resources that reference this one.
    pub async fn get_incoming_links(
        &self,
        client: &HttpClient,
        pagination: PaginationSettings,
    ) -> Result<PaginatedList<ResourceLink>> {
        get_incoming_links(client, &self.org_label, &self.project_label, self.id(), pagination)
            .await
    }

    /// Resources and external IRIs this one references.
    pub async fn get_outgoing_links(
        &self,
        client: &HttpClient,
        pagination: PaginationSettings,
    ) -> Result<PaginatedList<ResourceLink>> {
        get_outgoing_links(client, &self.org_label, &self.project_label, self.id(), pagination)
            .await
    }
}

fn resource_path(org_label: &str, project_label: &str, id: &str) -> String {
    format!(
        "/resources/{}/{}/_/{}",
        encode_segment(org_label),
        encode_segment(project_label),
        encode_segment(id)
    )
}

async fn fetch_self(
    client: &HttpClient,
    self_url: &str,
    fallback: Option<(&str, &str)>,
) -> Result<Resource> {
    let response: ResourceResponse = client.get_url(self_url).await?;
    let (org_label, project_label) = match infer_labels(&response) {
        Some(labels) => labels,
        None => match fallback {
            Some((org, project)) => (org.to_string(), project.to_string()),
            None => {
                return Err(NexusError::InvalidResponse(format!(
                    "cannot infer organization and project of `{self_url}`"
                )))
            }
        },
    };
    Ok(Resource::from_response(org_label, project_label, response))
}

/// Owning labels from `_project` (`.../projects/{org}/{project}`), else from
/// the self URL (`.../resources/{org}/{project}/...`).
pub(crate) fn infer_labels(response: &ResourceResponse) -> Option<(String, String)> {
    if let Some(project) = &response.project {
        if let Some(labels) = labels_after(project, "projects") {
            return Some(labels);
        }
    }
    labels_after(&response.self_url, "resources")
}

fn labels_after(url: &str, marker: &str) -> Option<(String, String)> {
    let parsed = url::Url::parse(url).ok()?;
    let mut segments = parsed.path_segments()?.skip_while(|s| *s != marker).skip(1);
    let org = segments.next().filter(|s| !s.is_empty())?;
    let project = segments.next().filter(|s| !s.is_empty())?;
    Some((decode_label(org), decode_label(project)))
}

fn decode_label(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_response() -> Value {
        json!({
            "@context": "https://bluebrain.github.io/nexus/contexts/resource.json",
            "@id": "https://example.com/ids/fred",
            "@type": "Person",
            "name": "Fred",
            "_self": "https://nexus.example.com/v1/resources/kenny/what-a-project/_/fred",
            "_constrainedBy": "https://bluebrain.github.io/nexus/schemas/unconstrained.json",
            "_project": "https://nexus.example.com/v1/projects/kenny/what-a-project",
            "_rev": 3,
            "_deprecated": false,
            "_createdAt": "2019-02-11T10:23:45.123Z",
            "_createdBy": "https://nexus.example.com/v1/realms/local/users/kenny",
            "_updatedAt": "2019-02-12T08:00:00Z",
            "_updatedBy": "https://nexus.example.com/v1/realms/local/users/kenny"
        })
    }

    #[test]
    fn test_from_response() {
        let response: ResourceResponse = serde_json::from_value(sample_response()).unwrap();
        let resource = Resource::from_response("kenny", "what-a-project", response);

        assert_eq!(resource.id(), "https://example.com/ids/fred");
        assert_eq!(resource.types(), ["Person".to_string()]);
        assert_eq!(resource.rev(), 3);
        assert!(!resource.deprecated());
        assert_eq!(resource.data().get("name"), Some(&json!("Fred")));
        assert!(resource.created_at().is_some());
        assert!(!resource.data().contains_key("_rev"));
    }

    #[test]
    fn test_malformed_payload_is_rejected() {
        let result: std::result::Result<ResourceResponse, _> =
            serde_json::from_value(json!({"@id": "x", "_rev": "three"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_infer_labels_from_project() {
        let response: ResourceResponse = serde_json::from_value(sample_response()).unwrap();
        assert_eq!(
            infer_labels(&response),
            Some(("kenny".to_string(), "what-a-project".to_string()))
        );
    }

    #[test]
    fn test_infer_labels_from_self_url() {
        let mut value = sample_response();
        value.as_object_mut().unwrap().remove("_project");
        let response: ResourceResponse = serde_json::from_value(value).unwrap();
        assert_eq!(
            infer_labels(&response),
            Some(("kenny".to_string(), "what-a-project".to_string()))
        );
    }

    #[test]
    fn test_infer_labels_missing() {
        let response: ResourceResponse = serde_json::from_value(json!({
            "@id": "x",
            "_self": "https://elsewhere.example.com/thing",
            "_rev": 1
        }))
        .unwrap();
        assert_eq!(infer_labels(&response), None);
    }

    #[test]
    fn test_get_options_are_exclusive() {
        let both = GetResourceOptions {
            rev: Some(2),
            tag: Some("v1".to_string()),
        };
        assert!(matches!(both.query(), Err(NexusError::InvalidArgument(_))));

        let rev = GetResourceOptions {
            rev: Some(2),
            tag: None,
        };
        assert_eq!(rev.query().unwrap(), "?rev=2");
    }

    #[test]
    fn test_list_options_query() {
        let options = ListResourceOptions {
            pagination: PaginationSettings::new(40, 20),
            deprecated: Some(false),
            resource_type: Some("Person".to_string()),
        };
        assert_eq!(options.query(), "?from=40&size=20&deprecated=false&type=Person");
    }

    #[test]
    fn test_resource_path_encodes_id() {
        assert_eq!(
            resource_path("org", "proj", "https://example.com/ids/fred"),
            "/resources/org/proj/_/https%3A%2F%2Fexample.com%2Fids%2Ffred"
        );
    }
}
