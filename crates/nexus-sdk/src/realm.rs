//! Identity realms.

use crate::error::Result;
use crate::http::{decode, HttpClient};
use crate::pagination::{build_query_params, ListResponse, PaginatedList, PaginationSettings};
use crate::types::{encode_segment, merge_objects};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealmResponse {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "_label", default)]
    pub label: Option<String>,
    pub name: String,
    #[serde(rename = "openIdConfig", alias = "openidConfig")]
    pub openid_config: String,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(rename = "grantTypes", default)]
    pub grant_types: Vec<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(rename = "_rev")]
    pub rev: u64,
    #[serde(rename = "_deprecated", default)]
    pub deprecated: bool,
}

/// Body of [`Realm::create`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateRealmPayload {
    pub name: String,
    #[serde(rename = "openIdConfig")]
    pub openid_config: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Realm {
    pub id: String,
    pub label: String,
    pub name: String,
    pub openid_config: String,
    pub issuer: Option<String>,
    pub grant_types: Vec<String>,
    pub logo: Option<String>,
    pub rev: u64,
    pub deprecated: bool,
}

impl Realm {
    fn from_response(label: Option<&str>, response: RealmResponse) -> Self {
        let label = response
            .label
            .or_else(|| label.map(str::to_string))
            .unwrap_or_default();
        Self {
            id: response.id,
            label,
            name: response.name,
            openid_config: response.openid_config,
            issuer: response.issuer,
            grant_types: response.grant_types,
            logo: response.logo,
            rev: response.rev,
            deprecated: response.deprecated,
        }
    }

    /// Fetch a realm, optionally at revision `rev`.
    pub async fn get(client: &HttpClient, label: &str, rev: Option<u64>) -> Result<Realm> {
        let query = rev
            .map(|rev| build_query_params(&[("rev", rev.to_string())]))
            .unwrap_or_default();
        let response: RealmResponse = client
            .get(&format!("{}{query}", realm_path(label)))
            .await?;
        Ok(Realm::from_response(Some(label), response))
    }

    pub async fn list(
        client: &HttpClient,
        pagination: PaginationSettings,
    ) -> Result<PaginatedList<Realm>> {
        let path = format!("/realms{}", build_query_params(&pagination.query_pairs()));
        let page: ListResponse<RealmResponse> = client.get(&path).await?;
        Ok(PaginatedList::new(
            page.total,
            Some(pagination.from),
            page.results
                .into_iter()
                .map(|response| Realm::from_response(None, response))
                .collect(),
        ))
    }

    pub async fn create(
        client: &HttpClient,
        label: &str,
        payload: &CreateRealmPayload,
    ) -> Result<Realm> {
        let metadata: Value = client.put(&realm_path(label), payload).await?;
        let body = serde_json::to_value(payload).map_err(crate::error::NexusError::Decode)?;
        let response: RealmResponse = decode(merge_objects(body, metadata))?;
        Ok(Realm::from_response(Some(label), response))
    }
}

fn realm_path(label: &str) -> String {
    format!("/realms/{}", encode_segment(label))
}
