//! Incoming and outgoing link resolution.
//!
//! Resolution runs in two phases. A generated SPARQL query against the
//! project's default SPARQL view returns one page of `(predicate, target,
//! self)` rows plus a count-only row. Every row with a `self` binding is then
//! dereferenced concurrently. A single failed dereference fails the page.

use super::Resource;
use crate::error::{NexusError, Result};
use crate::http::HttpClient;
use crate::pagination::{PaginatedList, PaginationSettings};
use crate::view::sparql::{SparqlQueryResponse, SparqlView};
use futures::future::{self, try_join_all, BoxFuture, FutureExt};
use std::collections::HashMap;
use tracing::{debug, warn};

const NXV_PREFIX: &str = "prefix nxv: <https://bluebrain.github.io/nexus/vocabulary/>";

/// Which side of the relationship the resource sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkDirection {
    /// Other resources point at this one.
    Incoming,
    /// This resource points elsewhere.
    Outgoing,
}

impl LinkDirection {
    /// SPARQL variable bound to the other end of the link.
    fn target_var(self) -> &'static str {
        match self {
            LinkDirection::Incoming => "s",
            LinkDirection::Outgoing => "o",
        }
    }
}

/// The far end of a link.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkTarget {
    /// A resource stored in Nexus, fully dereferenced.
    Resource(Box<Resource>),
    /// An IRI with no Nexus resource behind it.
    External(String),
}

impl LinkTarget {
    pub fn as_resource(&self) -> Option<&Resource> {
        match self {
            LinkTarget::Resource(resource) => Some(resource),
            LinkTarget::External(_) => None,
        }
    }
}

/// A predicate and the resource (or IRI) it connects to.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceLink {
    pub predicate: String,
    pub link: LinkTarget,
}

/// Resources in `org/project` that reference `resource_id`.
pub async fn get_incoming_links(
    client: &HttpClient,
    org_label: &str,
    project_label: &str,
    resource_id: &str,
    pagination: PaginationSettings,
) -> Result<PaginatedList<ResourceLink>> {
    resolve_links(
        client,
        org_label,
        project_label,
        resource_id,
        LinkDirection::Incoming,
        pagination,
    )
    .await
}

/// Resources and external IRIs that `resource_id` references.
pub async fn get_outgoing_links(
    client: &HttpClient,
    org_label: &str,
    project_label: &str,
    resource_id: &str,
    pagination: PaginationSettings,
) -> Result<PaginatedList<ResourceLink>> {
    resolve_links(
        client,
        org_label,
        project_label,
        resource_id,
        LinkDirection::Outgoing,
        pagination,
    )
    .await
}

async fn resolve_links(
    client: &HttpClient,
    org_label: &str,
    project_label: &str,
    resource_id: &str,
    direction: LinkDirection,
    pagination: PaginationSettings,
) -> Result<PaginatedList<ResourceLink>> {
    let query = links_query(resource_id, direction, pagination)?;
    let view = SparqlView::get_default(client, org_label, project_label).await?;
    let response = view.query(client, &query).await?;

    let page = LinkPage::from_response(&response, direction)?;
    debug!(
        ?direction,
        total = page.total,
        rows = page.rows.len(),
        "dereferencing links"
    );

    let pending: Vec<BoxFuture<'_, Result<ResourceLink>>> = page
        .rows
        .into_iter()
        .map(|row| dereference(client, row, org_label, project_label))
        .collect();
    let results = try_join_all(pending).await?;

    Ok(PaginatedList::new(page.total, Some(pagination.from), results))
}

fn dereference<'a>(
    client: &'a HttpClient,
    row: LinkRow,
    org_label: &'a str,
    project_label: &'a str,
) -> BoxFuture<'a, Result<ResourceLink>> {
    let LinkRow {
        predicate,
        target,
        self_url,
    } = row;

    match self_url {
        None => future::ready(Ok(ResourceLink {
            predicate,
            link: LinkTarget::External(target),
        }))
        .boxed(),
        Some(self_url) => async move {
            match Resource::get_self_in(client, &self_url, org_label, project_label).await {
                Ok(resource) => Ok(ResourceLink {
                    predicate,
                    link: LinkTarget::Resource(Box::new(resource)),
                }),
                Err(err) => {
                    warn!(url = %self_url, error = %err, "link dereference failed");
                    Err(NexusError::LinkResolution(Box::new(err)))
                }
            }
        }
        .boxed(),
    }
}

/// One relationship row, before dereferencing.
#[derive(Debug, Clone, PartialEq)]
struct LinkRow {
    predicate: String,
    target: String,
    self_url: Option<String>,
}

#[derive(Debug)]
struct LinkPage {
    total: u64,
    rows: Vec<LinkRow>,
}

impl LinkPage {
    fn from_response(response: &SparqlQueryResponse, direction: LinkDirection) -> Result<Self> {
        let mut total = None;
        let mut rows = Vec::new();

        for binding in &response.results.bindings {
            let self_url = value_of(binding, "self");
            if self_url.is_none() {
                if let Some(count) = value_of(binding, "total") {
                    total = Some(count.parse::<u64>().map_err(|e| {
                        NexusError::InvalidResponse(format!("link count `{count}`: {e}"))
                    })?);
                    continue;
                }
                if direction == LinkDirection::Incoming {
                    continue;
                }
            }

            let predicate = value_of(binding, "p").ok_or_else(|| {
                NexusError::InvalidResponse("link row without a predicate".to_string())
            })?;
            let target = value_of(binding, direction.target_var()).ok_or_else(|| {
                NexusError::InvalidResponse("link row without a target".to_string())
            })?;
            rows.push(LinkRow {
                predicate: predicate.to_string(),
                target: target.to_string(),
                self_url: self_url.map(str::to_string),
            });
        }

        Ok(Self {
            total: total.unwrap_or(rows.len() as u64),
            rows,
        })
    }
}

fn value_of<'a>(
    binding: &'a HashMap<String, crate::view::sparql::Binding>,
    var: &str,
) -> Option<&'a str> {
    binding.get(var).map(|b| b.value.as_str())
}

/// Build the relationship query for one page.
pub(crate) fn links_query(
    resource_id: &str,
    direction: LinkDirection,
    pagination: PaginationSettings,
) -> Result<String> {
    let iri = iri_ref(resource_id)?;
    let (select, pattern) = match direction {
        LinkDirection::Incoming => (
            "?s ?p ?self",
            format!("?s ?p {iri} .\n      ?s nxv:self ?self ."),
        ),
        LinkDirection::Outgoing => (
            "?o ?p ?self",
            format!(
                "{iri} ?p ?o .\n      FILTER(isIRI(?o))\n      OPTIONAL {{ ?o nxv:self ?self }}"
            ),
        ),
    };
    let order = direction.target_var();

    Ok(format!(
        "{NXV_PREFIX}
SELECT ?total {select}
WITH {{
  SELECT DISTINCT {select} {{
      {pattern}
  }}
}} AS %resultSet
WHERE {{
  {{
    SELECT (COUNT(*) AS ?total) {{ INCLUDE %resultSet }}
  }}
  UNION
  {{
    SELECT * {{ INCLUDE %resultSet }}
    ORDER BY ?{order}
    LIMIT {limit}
    OFFSET {offset}
  }}
}}",
        limit = pagination.size,
        offset = pagination.from,
    ))
}

fn iri_ref(iri: &str) -> Result<String> {
    let illegal = |c: char| c.is_whitespace() || c.is_control() || "<>\"{}|^`\\".contains(c);
    if iri.is_empty() || iri.chars().any(illegal) {
        return Err(NexusError::InvalidArgument(format!(
            "`{iri}` cannot be used as an IRI"
        )));
    }
    Ok(format!("<{iri}>"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(bindings: serde_json::Value) -> SparqlQueryResponse {
        serde_json::from_value(json!({
            "head": { "vars": ["total", "s", "o", "p", "self"] },
            "results": { "bindings": bindings }
        }))
        .unwrap()
    }

    fn uri(value: &str) -> serde_json::Value {
        json!({ "type": "uri", "value": value })
    }

    fn literal(value: &str) -> serde_json::Value {
        json!({ "type": "literal", "value": value })
    }

    fn count(total: &str) -> serde_json::Value {
        json!({
            "datatype": "http://www.w3.org/2001/XMLSchema#integer",
            "type": "literal",
            "value": total
        })
    }

    #[test]
    fn test_incoming_page_uses_count_row() {
        let page = LinkPage::from_response(
            &response(json!([
                { "total": count("12") },
                {
                    "s": uri("https://n/_/fred"),
                    "p": uri("https://v/buddy"),
                    "self": literal("https://n/_/fred")
                },
                {
                    "s": uri("https://n/_/jeff"),
                    "p": uri("https://v/buddy"),
                    "self": literal("https://n/_/jeff")
                }
            ])),
            LinkDirection::Incoming,
        )
        .unwrap();

        assert_eq!(page.total, 12);
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.rows[0].target, "https://n/_/fred");
    }

    #[test]
    fn test_outgoing_page_keeps_external_targets() {
        let page = LinkPage::from_response(
            &response(json!([
                { "total": { "type": "literal", "value": "3" } },
                {
                    "o": uri("https://n/_/fred"),
                    "p": uri("https://v/buddy"),
                    "self": literal("https://n/_/fred")
                },
                { "o": uri("https://google.com"), "p": uri("https://v/site") }
            ])),
            LinkDirection::Outgoing,
        )
        .unwrap();

        assert_eq!(page.total, 3);
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.rows[1].self_url, None);
        assert_eq!(page.rows[1].target, "https://google.com");
    }

    #[test]
    fn test_incoming_page_drops_rows_without_self() {
        let page = LinkPage::from_response(
            &response(json!([
                { "s": uri("https://elsewhere/x"), "p": uri("https://v/buddy") }
            ])),
            LinkDirection::Incoming,
        )
        .unwrap();
        assert!(page.rows.is_empty());
        assert_eq!(page.total, 0);
    }

    #[test]
    fn test_bad_count_is_rejected() {
        let result = LinkPage::from_response(
            &response(json!([{ "total": { "type": "literal", "value": "many" } }])),
            LinkDirection::Incoming,
        );
        assert!(matches!(result, Err(NexusError::InvalidResponse(_))));
    }

    #[test]
    fn test_query_swaps_positions() {
        let settings = PaginationSettings::new(40, 20);
        let incoming = links_query("https://n/_/fred", LinkDirection::Incoming, settings).unwrap();
        assert!(incoming.contains("?s ?p <https://n/_/fred> ."));
        assert!(incoming.contains("ORDER BY ?s"));
        assert!(incoming.contains("LIMIT 20"));
        assert!(incoming.contains("OFFSET 40"));

        let outgoing = links_query("https://n/_/fred", LinkDirection::Outgoing, settings).unwrap();
        assert!(outgoing.contains("<https://n/_/fred> ?p ?o ."));
        assert!(outgoing.contains("FILTER(isIRI(?o))"));
        assert!(outgoing.contains("OPTIONAL { ?o nxv:self ?self }"));
        assert!(outgoing.contains("ORDER BY ?o"));
    }

    #[test]
    fn test_query_rejects_unsafe_iri() {
        for iri in ["", "https://n/a b", "https://n/>} DROP ALL", "x\"y"] {
            let result = links_query(iri, LinkDirection::Incoming, PaginationSettings::default());
            assert!(matches!(result, Err(NexusError::InvalidArgument(_))), "{iri}");
        }
    }
}
