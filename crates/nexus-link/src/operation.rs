//! The in-flight representation of a request.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// HTTP verb of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Uppercase wire name of the verb.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            other => Err(format!("unsupported method: {other}")),
        }
    }
}

/// How the terminal link interprets a response body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseAs {
    #[default]
    Json,
    Text,
}

/// Request body of an operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Serialized as JSON.
    Json(Value),
    /// Sent verbatim.
    Text(String),
}

impl Body {
    /// Render the body as the bytes that go on the wire.
    pub fn to_wire(&self) -> String {
        match self {
            Body::Json(value) => value.to_string(),
            Body::Text(text) => text.clone(),
        }
    }
}

/// Per-operation directives read by the links.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    /// Response parsing directive.
    pub parse_as: ParseAs,
    /// Skip the default `Content-Type` / `Accept` headers.
    pub no_default_header: bool,
    /// Free-form entries for custom links.
    pub extra: Map<String, Value>,
}

/// One logical request before transport.
///
/// Links never mutate an operation they receive; the `with_*` builders
/// consume `self` and hand back the derived operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Operation {
    /// Absolute URL or path of the request.
    pub path: String,
    /// Verb; the terminal link falls back to `GET`.
    pub method: Option<Method>,
    /// Explicit headers. These win over defaults.
    pub headers: BTreeMap<String, String>,
    /// Optional request body.
    pub body: Option<Body>,
    /// Link directives.
    pub context: Context,
}

impl Operation {
    /// Create an operation for a path.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Set the verb.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Merge a header, replacing any existing header with the same name.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|k, _| !k.eq_ignore_ascii_case(&name));
        self.headers.insert(name, value.into());
        self
    }

    /// Attach a body.
    pub fn with_body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    /// Replace the context.
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Set the parse directive.
    pub fn parse_as(mut self, parse_as: ParseAs) -> Self {
        self.context.parse_as = parse_as;
        self
    }

    /// Disable the default headers.
    pub fn without_default_headers(mut self) -> Self {
        self.context.no_default_header = true;
        self
    }

    /// Look up a header by name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
