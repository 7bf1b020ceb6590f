//! HTTP transport built on a link chain.
//!
//! Every call snapshots the [`ConfigStore`], builds an [`Operation`] and runs
//! it through `[set_method, set_token?, trigger_fetch]`. The token link is
//! only present when a token is configured, and the header is fixed once the
//! chain is built.

use crate::config::{ConfigState, ConfigStore};
use crate::error::{NexusError, Result};
use futures::StreamExt;
use nexus_link::{links, Body, Chain, Fetch, LinkStream, Method, Operation, ParseAs};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Per-request transport options.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// Prefix the path with the configured base URL.
    pub use_base: bool,
    /// Response parsing directive.
    pub parse_as: ParseAs,
    /// Extra headers; these override the defaults.
    pub headers: BTreeMap<String, String>,
    /// Send no default headers at all.
    pub no_default_header: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            use_base: true,
            parse_as: ParseAs::Json,
            headers: BTreeMap::new(),
            no_default_header: false,
        }
    }
}

impl RequestOptions {
    /// Treat the path as an absolute URL.
    pub fn absolute() -> Self {
        Self {
            use_base: false,
            ..Default::default()
        }
    }

    /// Parse the response as text.
    pub fn text(mut self) -> Self {
        self.parse_as = ParseAs::Text;
        self
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Disable the default headers.
    pub fn without_default_headers(mut self) -> Self {
        self.no_default_header = true;
        self
    }
}

/// Transport primitive shared by all models.
#[derive(Clone)]
pub struct HttpClient {
    store: ConfigStore,
    fetch: Arc<dyn Fetch>,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Create a client reading configuration from `store`.
    pub fn new(store: ConfigStore, fetch: Arc<dyn Fetch>) -> Self {
        Self { store, fetch }
    }

    /// The configuration store.
    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Resolve a path against the base URL and check the result parses.
    pub fn resolve_url(state: &ConfigState, path: &str, use_base: bool) -> Result<String> {
        let url = if use_base {
            match (state.base_url.ends_with('/'), path.starts_with('/')) {
                (true, true) => format!("{}{}", state.base_url, &path[1..]),
                (false, false) if !path.is_empty() => format!("{}/{}", state.base_url, path),
                _ => format!("{}{}", state.base_url, path),
            }
        } else {
            path.to_string()
        };

        url::Url::parse(&url)
            .map_err(|e| NexusError::InvalidArgument(format!("invalid url `{url}`: {e}")))?;
        Ok(url)
    }

    fn operation(
        state: &ConfigState,
        path: &str,
        body: Option<Body>,
        options: &RequestOptions,
    ) -> Result<Operation> {
        let url = Self::resolve_url(state, path, options.use_base)?;
        let mut operation = Operation::new(url).parse_as(options.parse_as);
        for (name, value) in &options.headers {
            operation = operation.with_header(name.clone(), value.clone());
        }
        if let Some(body) = body {
            operation = operation.with_body(body);
        }
        if options.no_default_header {
            operation = operation.without_default_headers();
        }
        Ok(operation)
    }

    fn chain(&self, state: &ConfigState, method: Method, poll: Option<Duration>) -> Chain {
        Chain::builder()
            .link(links::set_method(method))
            .maybe(state.access_token.as_deref().map(links::set_token))
            .maybe(poll.map(links::poll))
            .link(links::trigger_fetch(self.fetch.clone()))
            .build()
    }

    /// Perform one request and return the parsed body.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Body>,
        options: RequestOptions,
    ) -> Result<Value> {
        let state = self.store.snapshot();
        let operation = Self::operation(&state, path, body, &options)?;
        debug!(%method, url = %operation.path, "sending request");

        let mut stream = self.chain(&state, method, None).execute(operation)?;
        match stream.next().await {
            Some(result) => Ok(result?),
            None => Err(NexusError::InvalidResponse(
                "request completed without a response".to_string(),
            )),
        }
    }

    /// GET a path relative to the base URL.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let value = self
            .request(Method::Get, path, None, RequestOptions::default())
            .await?;
        decode(value)
    }

    /// GET an absolute URL.
    pub async fn get_url<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let value = self
            .request(Method::Get, url, None, RequestOptions::absolute())
            .await?;
        decode(value)
    }

    /// POST a JSON body.
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let body = serde_json::to_value(body).map_err(NexusError::Decode)?;
        let value = self
            .request(Method::Post, path, Some(Body::Json(body)), RequestOptions::default())
            .await?;
        decode(value)
    }

    /// POST a `text/plain` body.
    pub async fn post_text<T: DeserializeOwned>(&self, path: &str, text: &str) -> Result<T> {
        let options = RequestOptions::default().with_header("Content-Type", "text/plain");
        let value = self
            .request(Method::Post, path, Some(Body::Text(text.to_string())), options)
            .await?;
        decode(value)
    }

    /// PUT a JSON body.
    pub async fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let body = serde_json::to_value(body).map_err(NexusError::Decode)?;
        let value = self
            .request(Method::Put, path, Some(Body::Json(body)), RequestOptions::default())
            .await?;
        decode(value)
    }

    /// DELETE a path relative to the base URL.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let value = self
            .request(Method::Delete, path, None, RequestOptions::default())
            .await?;
        decode(value)
    }

    /// GET `path` every `interval` while the returned stream is alive.
    pub fn poll(
        &self,
        path: &str,
        interval: Duration,
        options: RequestOptions,
    ) -> Result<LinkStream> {
        let state = self.store.snapshot();
        let operation = Self::operation(&state, path, None, &options)?;
        debug!(url = %operation.path, ?interval, "starting poll");
        Ok(self
            .chain(&state, Method::Get, Some(interval))
            .execute(operation)?)
    }
}

/// Decode a JSON value into a typed model.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(NexusError::Decode)
}
