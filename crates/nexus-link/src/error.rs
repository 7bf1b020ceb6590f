//! Error types for link chains.

use serde_json::Value;
use thiserror::Error;

/// Errors produced while assembling or running a link chain.
#[derive(Debug, Error)]
pub enum LinkError {
    /// A non-terminal link was invoked without a downstream link.
    #[error("link `{link}` requires a next link")]
    MissingNext {
        /// Name of the link that was misused.
        link: &'static str,
    },

    /// The server answered with a non-2xx status.
    #[error("request failed with status {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error body, parsed as JSON when possible.
        body: Value,
    },

    /// The request could not be sent or the response could not be read.
    #[error("network error: {0}")]
    Network(String),

    /// The response body did not match the requested format.
    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// A poll link was built with a zero interval.
    #[error("poll interval must be greater than zero")]
    InvalidInterval,

    /// The background fetch task did not run to completion.
    #[error("dispatch failed: {0}")]
    Dispatch(String),
}

impl LinkError {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            LinkError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for link operations.
pub type Result<T> = std::result::Result<T, LinkError>;
