use crate::error::Result;
use crate::link::{require_next, Link, LinkRef, LinkStream};
use crate::operation::Operation;
use std::fmt;

/// Adds a bearer `Authorization` header and delegates.
#[derive(Clone)]
pub struct SetToken {
    token: String,
}

impl SetToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    fn header_value(&self) -> String {
        format!("bearer {}", self.token)
    }
}

impl fmt::Debug for SetToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetToken").field("token", &"<redacted>").finish()
    }
}

impl Link for SetToken {
    fn name(&self) -> &'static str {
        "set_token"
    }

    fn request(&self, operation: Operation, next: Option<LinkRef>) -> Result<LinkStream> {
        let next = require_next(self.name(), next)?;
        next.request(
            operation.with_header("Authorization", self.header_value()),
            None,
        )
    }
}
