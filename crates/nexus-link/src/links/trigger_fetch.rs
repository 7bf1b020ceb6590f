use crate::error::{LinkError, Result};
use crate::fetch::{Fetch, FetchRequest, FetchResponse};
use crate::link::{Link, LinkRef, LinkStream};
use crate::operation::{Method, Operation, ParseAs};
use futures::{stream, StreamExt};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, trace};

pub const CONTENT_TYPE: &str = "Content-Type";
pub const ACCEPT: &str = "Accept";
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Terminal link: performs one fetch per subscription.
///
/// The fetch runs on its own task once the stream is first polled. Dropping
/// the stream detaches that task instead of aborting it; the response is
/// discarded when it arrives.
#[derive(Clone)]
pub struct TriggerFetch {
    fetch: Arc<dyn Fetch>,
}

impl TriggerFetch {
    pub fn new(fetch: Arc<dyn Fetch>) -> Self {
        Self { fetch }
    }
}

impl Link for TriggerFetch {
    fn name(&self) -> &'static str {
        "trigger_fetch"
    }

    fn request(&self, operation: Operation, _next: Option<LinkRef>) -> Result<LinkStream> {
        let fetch = self.fetch.clone();
        let call = async move {
            match tokio::spawn(dispatch(fetch, operation)).await {
                Ok(result) => result,
                Err(e) => Err(LinkError::Dispatch(e.to_string())),
            }
        };
        Ok(stream::once(call).boxed())
    }
}

fn request_headers(operation: &Operation) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    if !operation.context.no_default_header {
        headers.insert(CONTENT_TYPE.to_string(), JSON_MEDIA_TYPE.to_string());
        headers.insert(ACCEPT.to_string(), JSON_MEDIA_TYPE.to_string());
    }
    for (name, value) in &operation.headers {
        headers.retain(|k: &String, _| !k.eq_ignore_ascii_case(name));
        headers.insert(name.clone(), value.clone());
    }
    headers
}

async fn dispatch(fetch: Arc<dyn Fetch>, operation: Operation) -> Result<Value> {
    let request = FetchRequest {
        method: operation.method.unwrap_or(Method::Get),
        url: operation.path.clone(),
        headers: request_headers(&operation),
        body: operation.body.as_ref().map(|b| b.to_wire()),
    };

    debug!(method = %request.method, url = %request.url, "dispatching request");
    let response = fetch.fetch(request).await?;
    trace!(status = response.status, "received response");

    parse_response(response, operation.context.parse_as)
}

fn parse_response(response: FetchResponse, parse_as: ParseAs) -> Result<Value> {
    if !response.is_success() {
        let body = serde_json::from_str(&response.body).unwrap_or(Value::String(response.body));
        return Err(LinkError::Http {
            status: response.status,
            body,
        });
    }

    match parse_as {
        ParseAs::Json => Ok(serde_json::from_str(&response.body)?),
        ParseAs::Text => Ok(Value::String(response.body)),
    }
}
