//! Callback-style consumption of a [`LinkStream`].

use crate::error::Result;
use crate::link::LinkStream;
use futures::StreamExt;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::trace;

/// Handle to a stream being driven in the background.
///
/// Dropping the handle leaves the subscription running; call
/// [`Subscription::unsubscribe`] to cancel it.
#[derive(Debug)]
pub struct Subscription {
    task: JoinHandle<()>,
}

impl Subscription {
    /// Stop delivering values. Work scheduled by the stream stops with it.
    pub fn unsubscribe(&self) {
        trace!("unsubscribing");
        self.task.abort();
    }

    /// Whether the stream completed or was cancelled.
    pub fn is_closed(&self) -> bool {
        self.task.is_finished()
    }
}

/// Drive `stream` on a background task, handing every item to `on_next`.
pub fn subscribe<F>(mut stream: LinkStream, mut on_next: F) -> Subscription
where
    F: FnMut(Result<Value>) + Send + 'static,
{
    let task = tokio::spawn(async move {
        while let Some(item) = stream.next().await {
            on_next(item);
        }
    });
    Subscription { task }
}
