//! One-shot invocation outside of a broadcast.
//!
//! The handler runs synchronously up to its first suspension point. If it
//! suspends, the remainder is continued on the current tokio runtime; with no
//! runtime available the remainder is dropped and a warning is logged.

use std::fmt;
use std::future::Future;
use std::task::{Context, Poll};

use futures::task::noop_waker_ref;
use tokio::runtime::Handle;
use tracing::{error, warn};

use crate::core::invoke;
use crate::error::HandlerError;
use crate::handlers::Handler;

/// Outcome of [`invoke_detached`], mostly useful for diagnostics and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Detached {
    /// The handler finished without suspending.
    Completed(Result<(), HandlerError>),
    /// The handler suspended and was handed to the runtime.
    Spawned,
    /// The handler suspended and no runtime was available.
    Dropped,
}

pub(super) fn invoke_detached<P, K>(name: &str, key: &K, handler: &Handler<P>, arg: P) -> Detached
where
    P: Send + 'static,
    K: fmt::Debug,
{
    let handler = handler.clone();
    let mut fut = Box::pin(async move { invoke(&handler, arg).await });

    let mut cx = Context::from_waker(noop_waker_ref());
    let outcome = match fut.as_mut().poll(&mut cx) {
        Poll::Ready(result) => Detached::Completed(result),
        Poll::Pending => match Handle::try_current() {
            Ok(rt) => {
                let owner = name.to_string();
                rt.spawn(async move {
                    if let Err(err) = fut.await {
                        log_failure(&owner, &err);
                    }
                });
                Detached::Spawned
            }
            Err(_) => {
                warn!(core = name, key = ?key, "no runtime to continue late handler; dropped after first suspension");
                Detached::Dropped
            }
        },
    };

    if let Detached::Completed(Err(err)) = &outcome {
        log_failure(name, err);
    }
    outcome
}

fn log_failure(name: &str, err: &HandlerError) {
    if err.is_panic() {
        error!(core = name, label = err.as_label(), "late handler: {}", err.as_message());
    } else {
        warn!(core = name, label = err.as_label(), "late handler: {}", err.as_message());
    }
}
