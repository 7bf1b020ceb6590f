//! Error types for SDK operations.

use nexus_link::LinkError;
use serde_json::Value;
use thiserror::Error;

/// SDK errors.
#[derive(Debug, Error)]
pub enum NexusError {
    /// Empty token handed to the configuration store.
    #[error("Token is invalid")]
    InvalidToken,

    /// Settings could not be loaded or a URL could not be built.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An argument cannot be used to build a request.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The link chain was assembled incorrectly.
    #[error("Chain construction error: {0}")]
    Chain(String),

    /// Non-2xx HTTP response.
    #[error("Request failed with status {status}: {body}")]
    Transport {
        /// HTTP status code.
        status: u16,
        /// Parsed error body.
        body: Value,
    },

    /// Network failure.
    #[error("Network error: {0}")]
    Network(String),

    /// Response body did not match the requested format.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Response is valid JSON but does not match the expected model.
    #[error("Invalid response format: {0}")]
    Decode(#[source] serde_json::Error),

    /// Response is structurally unusable.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A dereference in a link resolution batch failed.
    #[error("Link resolution failed: {0}")]
    LinkResolution(#[source] Box<NexusError>),
}

impl NexusError {
    /// HTTP status of a transport error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            NexusError::Transport { status, .. } => Some(*status),
            NexusError::LinkResolution(inner) => inner.status(),
            _ => None,
        }
    }
}

impl From<LinkError> for NexusError {
    fn from(err: LinkError) -> Self {
        match err {
            LinkError::MissingNext { .. } => NexusError::Chain(err.to_string()),
            LinkError::Http { status, body } => NexusError::Transport { status, body },
            LinkError::Network(msg) => NexusError::Network(msg),
            LinkError::Parse(e) => NexusError::Parse(e),
            LinkError::Dispatch(msg) => NexusError::Network(msg),
            LinkError::InvalidInterval => NexusError::InvalidArgument(err.to_string()),
        }
    }
}

impl From<config::ConfigError> for NexusError {
    fn from(err: config::ConfigError) -> Self {
        NexusError::InvalidConfig(err.to_string())
    }
}

/// Result type for SDK operations.
pub type Result<T> = std::result::Result<T, NexusError>;
