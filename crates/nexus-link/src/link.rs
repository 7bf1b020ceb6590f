//! Link trait and chain composition.
//!
//! A link receives an [`Operation`] plus an optional downstream link and
//! returns a [`LinkStream`]. Streams are cold: nothing happens until they are
//! polled, and every call to [`Link::request`] yields an independent stream.
//! Dropping a stream cancels it.

use crate::error::{LinkError, Result};
use crate::operation::Operation;
use futures::stream::BoxStream;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Stream of results produced by a link.
pub type LinkStream = BoxStream<'static, Result<Value>>;

/// Shared handle to a link.
pub type LinkRef = Arc<dyn Link>;

/// A composable request-transformation unit.
pub trait Link: Send + Sync {
    /// Short name used in errors and traces.
    fn name(&self) -> &'static str;

    /// Handle an operation, optionally delegating to `next`.
    ///
    /// Links that need a downstream link return [`LinkError::MissingNext`]
    /// synchronously when `next` is `None`.
    fn request(&self, operation: Operation, next: Option<LinkRef>) -> Result<LinkStream>;
}

/// Require a downstream link, failing with [`LinkError::MissingNext`].
pub fn require_next(link: &'static str, next: Option<LinkRef>) -> Result<LinkRef> {
    next.ok_or(LinkError::MissingNext { link })
}

/// A link backed by a closure.
pub struct FnLink<F> {
    name: &'static str,
    f: F,
}

/// Build a link from a closure.
pub fn from_fn<F>(name: &'static str, f: F) -> FnLink<F>
where
    F: Fn(Operation, Option<LinkRef>) -> Result<LinkStream> + Send + Sync,
{
    FnLink { name, f }
}

impl<F> Link for FnLink<F>
where
    F: Fn(Operation, Option<LinkRef>) -> Result<LinkStream> + Send + Sync,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn request(&self, operation: Operation, next: Option<LinkRef>) -> Result<LinkStream> {
        (self.f)(operation, next)
    }
}

/// A link with its downstream link fixed at composition time.
struct Bound {
    link: LinkRef,
    next: Option<LinkRef>,
}

impl Link for Bound {
    fn name(&self) -> &'static str {
        self.link.name()
    }

    fn request(&self, operation: Operation, _next: Option<LinkRef>) -> Result<LinkStream> {
        self.link.request(operation, self.next.clone())
    }
}

/// An ordered list of links composed right-to-left.
///
/// `[a, b, c]` evaluates as `a(op, b(op, c))`. Composition performs no I/O.
#[derive(Clone, Default)]
pub struct Chain {
    root: Option<LinkRef>,
    names: Vec<&'static str>,
}

impl Chain {
    /// Compose the given links, first link outermost.
    pub fn new(links: Vec<LinkRef>) -> Self {
        let names = links.iter().map(|l| l.name()).collect();
        let root = links.into_iter().rev().fold(None, |next, link| {
            Some(Arc::new(Bound { link, next }) as LinkRef)
        });
        Self { root, names }
    }

    /// Start an empty chain builder.
    pub fn builder() -> ChainBuilder {
        ChainBuilder::default()
    }

    /// Names of the composed links, outermost first.
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    /// Run an operation through the chain.
    ///
    /// Construction errors surface here, before any I/O. Transport errors
    /// surface later through the returned stream.
    pub fn execute(&self, operation: Operation) -> Result<LinkStream> {
        match &self.root {
            Some(root) => root.request(operation, None),
            None => Err(LinkError::MissingNext { link: "chain" }),
        }
    }

    /// The composed chain as a single link.
    pub fn into_link(self) -> Option<LinkRef> {
        self.root
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain").field("links", &self.names).finish()
    }
}

/// Incremental chain construction.
#[derive(Default)]
pub struct ChainBuilder {
    links: Vec<LinkRef>,
}

impl ChainBuilder {
    /// Append a link after the ones already added.
    pub fn link(mut self, link: impl Link + 'static) -> Self {
        self.links.push(Arc::new(link));
        self
    }

    /// Append an already shared link.
    pub fn shared(mut self, link: LinkRef) -> Self {
        self.links.push(link);
        self
    }

    /// Append a link only when `link` is `Some`.
    pub fn maybe(self, link: Option<impl Link + 'static>) -> Self {
        match link {
            Some(link) => self.link(link),
            None => self,
        }
    }

    /// Compose the chain.
    pub fn build(self) -> Chain {
        Chain::new(self.links)
    }
}
