//! Access control lists.

use crate::error::Result;
use crate::http::HttpClient;
use crate::pagination::{build_query_params, ListResponse, PaginatedList};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentityType {
    User,
    Group,
    Authenticated,
    Anonymous,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(rename = "@id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "@type")]
    pub kind: IdentityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// Permissions granted to one identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AclEntry {
    pub permissions: Vec<String>,
    pub identity: Identity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Acl {
    #[serde(rename = "@id", default)]
    pub id: Option<String>,
    #[serde(rename = "_path")]
    pub path: String,
    #[serde(default)]
    pub acl: Vec<AclEntry>,
    #[serde(rename = "_rev")]
    pub rev: u64,
    #[serde(rename = "_createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "_createdBy", default)]
    pub created_by: Option<String>,
    #[serde(rename = "_updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(rename = "_updatedBy", default)]
    pub updated_by: Option<String>,
}

/// Options for [`Acl::list`].
#[derive(Debug, Clone, Default)]
pub struct ListAclOptions {
    /// Include ACLs of parent paths.
    pub ancestors: bool,
    /// Only ACLs applying to the caller.
    pub self_only: Option<bool>,
    pub rev: Option<u64>,
}

impl ListAclOptions {
    fn query(&self) -> String {
        let mut pairs = Vec::new();
        if self.ancestors {
            pairs.push(("ancestors", "true".to_string()));
        }
        if let Some(self_only) = self.self_only {
            pairs.push(("self", self_only.to_string()));
        }
        if let Some(rev) = self.rev {
            pairs.push(("rev", rev.to_string()));
        }
        build_query_params(&pairs)
    }
}

impl Acl {
    /// ACLs on `path`, e.g. `/`, `org` or `org/project`. `*` segments match
    /// any child.
    pub async fn list(
        client: &HttpClient,
        path: &str,
        options: ListAclOptions,
    ) -> Result<PaginatedList<Acl>> {
        let path = path.trim_matches('/');
        let url = if path.is_empty() {
            format!("/acls{}", options.query())
        } else {
            format!("/acls/{path}{}", options.query())
        };
        let page: ListResponse<Acl> = client.get(&url).await?;
        Ok(PaginatedList::new(page.total, None, page.results))
    }
}
