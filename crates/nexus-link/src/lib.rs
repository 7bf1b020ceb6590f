//! # Nexus Link
//!
//! Composable request pipeline for the Nexus client SDK.
//!
//! A request starts life as an [`Operation`] and travels through an ordered
//! [`Chain`] of [`Link`]s. Each link either derives a new operation and
//! delegates to the next link, or terminates the chain by performing the
//! network call.
//!
//! ## Links
//!
//! - [`links::SetToken`]: adds `Authorization: bearer <token>`
//! - [`links::SetMethod`]: overrides the HTTP verb
//! - [`links::Poll`]: re-runs the rest of the chain on an interval
//! - [`links::TriggerFetch`]: terminal link, dispatches through a [`Fetch`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use nexus_link::{links, Chain, Method, Operation, ReqwestFetch};
//! use std::{sync::Arc, time::Duration};
//!
//! let fetch = Arc::new(ReqwestFetch::new(Duration::from_secs(30))?);
//! let chain = Chain::builder()
//!     .link(links::set_method(Method::Get))
//!     .link(links::set_token("my-token"))
//!     .link(links::poll(Duration::from_secs(5)))
//!     .link(links::trigger_fetch(fetch))
//!     .build();
//!
//! let mut updates = chain.execute(Operation::new("https://nexus.example.com/v1/orgs"))?;
//! while let Some(value) = updates.next().await {
//!     println!("{value:?}");
//! }
//! ```

pub mod error;
pub mod fetch;
pub mod link;
pub mod links;
pub mod operation;
pub mod subscription;

pub use error::{LinkError, Result};
pub use fetch::{Fetch, FetchRequest, FetchResponse, ReqwestFetch};
pub use link::{from_fn, require_next, Chain, ChainBuilder, Link, LinkRef, LinkStream};
pub use operation::{Body, Context, Method, Operation, ParseAs};
pub use subscription::{subscribe, Subscription};
