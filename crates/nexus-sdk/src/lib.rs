//! # Nexus SDK
//!
//! Typed client for Nexus knowledge-graph services.
//!
//! Requests go through a [`nexus_link::Chain`] built per call from a snapshot
//! of the [`ConfigStore`]. On top of that transport sit the models
//! ([`Organization`], [`Project`], [`Resource`], views, [`Realm`], [`Acl`])
//! and the link resolution algorithm, which finds the resources pointing to
//! or from a resource and dereferences them concurrently.
//!
//! ## Example
//!
//! ```rust,ignore
//! use nexus_sdk::{Nexus, NexusSettings, PaginationSettings, LinkTarget};
//!
//! let nexus = Nexus::new(NexusSettings::from_env()?)?;
//! let fred = nexus
//!     .fetch_resource("https://nexus.example.com/v1/resources/kenny/proj/_/fred")
//!     .await?;
//!
//! let links = fred
//!     .get_incoming_links(nexus.client(), PaginationSettings::default())
//!     .await?;
//! for link in links.results {
//!     if let LinkTarget::Resource(resource) = link.link {
//!         println!("{} --{}--> fred", resource.id(), link.predicate);
//!     }
//! }
//! ```
//!
//! The library emits `tracing` events and never installs a subscriber.

pub mod acl;
pub mod config;
pub mod error;
pub mod http;
pub mod nexus;
pub mod organization;
pub mod pagination;
pub mod project;
pub mod realm;
pub mod resource;
mod types;
pub mod view;

pub use acl::{Acl, AclEntry, Identity, IdentityType, ListAclOptions};
pub use config::{ConfigState, ConfigStore, NexusSettings};
pub use error::{NexusError, Result};
pub use http::{HttpClient, RequestOptions};
pub use nexus::{Nexus, QueryResponse, ViewQuery};
pub use organization::{ListOrgOptions, Organization, OrganizationPayload};
pub use pagination::{PaginatedList, PaginationSettings, DEFAULT_LIST_SIZE};
pub use project::{ListProjectOptions, Project};
pub use realm::{CreateRealmPayload, Realm};
pub use resource::{
    get_incoming_links, get_outgoing_links, GetResourceOptions, LinkDirection, LinkTarget,
    ListResourceOptions, Resource, ResourceLink, ResourceResponse,
};
pub use view::{ElasticSearchView, SparqlQueryResponse, SparqlView, View};

/// SDK version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
