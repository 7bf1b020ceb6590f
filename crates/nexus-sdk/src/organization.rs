//! Organizations.

use crate::error::Result;
use crate::http::{decode, HttpClient};
use crate::pagination::{build_query_params, ListResponse, PaginatedList, PaginationSettings};
use crate::project::{ListProjectOptions, Project};
use crate::types::{encode_segment, merge_objects};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationResponse {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "_label", alias = "label")]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "_uuid", default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(rename = "_rev")]
    pub rev: u64,
    #[serde(rename = "_deprecated", default)]
    pub deprecated: bool,
    #[serde(rename = "_createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "_updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of create and update calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrganizationPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Options for [`Organization::list`].
#[derive(Debug, Clone, Default)]
pub struct ListOrgOptions {
    pub pagination: PaginationSettings,
    pub deprecated: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Organization {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
    pub uuid: Option<String>,
    pub rev: u64,
    pub deprecated: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<OrganizationResponse> for Organization {
    fn from(response: OrganizationResponse) -> Self {
        Self {
            id: response.id,
            label: response.label,
            description: response.description,
            uuid: response.uuid,
            rev: response.rev,
            deprecated: response.deprecated,
            created_at: response.created_at,
            updated_at: response.updated_at,
        }
    }
}

impl Organization {
    pub async fn get(client: &HttpClient, label: &str) -> Result<Organization> {
        let response: OrganizationResponse = client.get(&org_path(label)).await?;
        Ok(response.into())
    }

    pub async fn list(
        client: &HttpClient,
        options: ListOrgOptions,
    ) -> Result<PaginatedList<Organization>> {
        let mut pairs = options.pagination.query_pairs();
        if let Some(deprecated) = options.deprecated {
            pairs.push(("deprecated", deprecated.to_string()));
        }
        let page: ListResponse<OrganizationResponse> =
            client.get(&format!("/orgs{}", build_query_params(&pairs))).await?;

        Ok(PaginatedList::new(
            page.total,
            Some(options.pagination.from),
            page.results.into_iter().map(Organization::from).collect(),
        ))
    }

    pub async fn create(
        client: &HttpClient,
        label: &str,
        payload: &OrganizationPayload,
    ) -> Result<Organization> {
        let metadata: Value = client.put(&org_path(label), payload).await?;
        with_payload(label, payload, metadata)
    }

    /// Update the organization at revision `rev`.
    pub async fn update(
        client: &HttpClient,
        label: &str,
        rev: u64,
        payload: &OrganizationPayload,
    ) -> Result<Organization> {
        let path = format!(
            "{}{}",
            org_path(label),
            build_query_params(&[("rev", rev.to_string())])
        );
        let metadata: Value = client.put(&path, payload).await?;
        with_payload(label, payload, metadata)
    }

    /// Deprecate the organization at revision `rev`.
    pub async fn deprecate(client: &HttpClient, label: &str, rev: u64) -> Result<Organization> {
        let path = format!(
            "{}{}",
            org_path(label),
            build_query_params(&[("rev", rev.to_string())])
        );
        let metadata: Value = client.delete(&path).await?;
        let response: OrganizationResponse =
            decode(merge_objects(serde_json::json!({ "_label": label }), metadata))?;
        Ok(response.into())
    }

    /// Projects of this organization.
    pub async fn projects(
        &self,
        client: &HttpClient,
        options: ListProjectOptions,
    ) -> Result<PaginatedList<Project>> {
        Project::list(client, &self.label, options).await
    }

    pub async fn project(&self, client: &HttpClient, project_label: &str) -> Result<Project> {
        Project::get(client, &self.label, project_label).await
    }
}

fn org_path(label: &str) -> String {
    format!("/orgs/{}", encode_segment(label))
}

/// Write calls answer with metadata only; fold the payload back in.
fn with_payload(
    label: &str,
    payload: &OrganizationPayload,
    metadata: Value,
) -> Result<Organization> {
    let mut base = serde_json::json!({ "_label": label });
    if let Some(description) = &payload.description {
        base["description"] = Value::String(description.clone());
    }
    let response: OrganizationResponse = decode(merge_objects(base, metadata))?;
    Ok(response.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_with_payload_merges_metadata() {
        let org = with_payload(
            "kenny",
            &OrganizationPayload {
                description: Some("Kenny's org".to_string()),
            },
            json!({
                "@id": "https://nexus.example.com/v1/orgs/kenny",
                "_label": "kenny",
                "_rev": 2,
                "_deprecated": false
            }),
        )
        .unwrap();

        assert_eq!(org.label, "kenny");
        assert_eq!(org.rev, 2);
        assert_eq!(org.description.as_deref(), Some("Kenny's org"));
    }

    #[test]
    fn test_label_alias() {
        let response: OrganizationResponse =
            serde_json::from_value(json!({"@id": "o", "label": "legacy", "_rev": 1})).unwrap();
        assert_eq!(response.label, "legacy");
    }
}
