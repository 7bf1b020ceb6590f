//! Built-in links.
//!
//! - [`SetToken`] / [`SetMethod`]: derive a new operation and delegate.
//! - [`Poll`]: re-invoke the downstream link on a fixed interval.
//! - [`TriggerFetch`]: terminal link performing the network call.

mod poll;
mod set_method;
mod set_token;
mod trigger_fetch;

pub use poll::Poll;
pub use set_method::SetMethod;
pub use set_token::SetToken;
pub use trigger_fetch::{TriggerFetch, ACCEPT, CONTENT_TYPE, JSON_MEDIA_TYPE};

use crate::operation::Method;
use crate::Fetch;
use std::sync::Arc;
use std::time::Duration;

/// Link adding `Authorization: bearer <token>`.
pub fn set_token(token: impl Into<String>) -> SetToken {
    SetToken::new(token)
}

/// Link overriding the operation method.
pub fn set_method(method: Method) -> SetMethod {
    SetMethod::new(method)
}

/// Link re-invoking its downstream link every `interval`.
pub fn poll(interval: Duration) -> Poll {
    Poll::new(interval)
}

/// Terminal link dispatching through `fetch`.
pub fn trigger_fetch(fetch: Arc<dyn Fetch>) -> TriggerFetch {
    TriggerFetch::new(fetch)
}
