use crate::error::{LinkError, Result};
use crate::link::{require_next, Link, LinkRef, LinkStream};
use crate::operation::Operation;
use futures::channel::mpsc;
use futures::{stream, StreamExt};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, trace};

/// Re-invokes the downstream link every `interval` while subscribed.
///
/// The first invocation happens one interval after the stream is first
/// polled. A tick that fires while the previous invocation is still running
/// is skipped. Errors from an invocation are forwarded and polling carries
/// on. A zero interval is rejected with [`LinkError::InvalidInterval`]
/// before anything is scheduled. Dropping the stream stops future ticks; an invocation already in
/// flight runs to completion and its values are discarded.
#[derive(Debug, Clone, Copy)]
pub struct Poll {
    interval: Duration,
}

impl Poll {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Link for Poll {
    fn name(&self) -> &'static str {
        "poll"
    }

    fn request(&self, operation: Operation, next: Option<LinkRef>) -> Result<LinkStream> {
        let next = require_next(self.name(), next)?;
        if self.interval.is_zero() {
            return Err(LinkError::InvalidInterval);
        }
        let interval = self.interval;
        let started = stream::once(async move { start_ticker(interval, operation, next) });
        Ok(started.flatten().boxed())
    }
}

fn start_ticker(
    interval: Duration,
    operation: Operation,
    next: LinkRef,
) -> mpsc::UnboundedReceiver<Result<Value>> {
    let (tx, rx) = mpsc::unbounded();

    tokio::spawn(async move {
        let mut ticker = time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let busy = Arc::new(AtomicBool::new(false));

        loop {
            ticker.tick().await;
            if tx.is_closed() {
                debug!(path = %operation.path, "poll unsubscribed");
                break;
            }
            if busy.swap(true, Ordering::AcqRel) {
                trace!(path = %operation.path, "previous poll still running, skipping tick");
                continue;
            }

            let mut results = match next.request(operation.clone(), None) {
                Ok(results) => results,
                Err(e) => {
                    let _ = tx.unbounded_send(Err(e));
                    break;
                }
            };

            let tx = tx.clone();
            let busy = busy.clone();
            tokio::spawn(async move {
                while let Some(item) = results.next().await {
                    if tx.unbounded_send(item).is_err() {
                        trace!("dropping poll result after unsubscribe");
                    }
                }
                busy.store(false, Ordering::Release);
            });
        }
    });

    rx
}
