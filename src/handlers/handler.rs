//! # Function-backed handler (`Handler`)
//!
//! [`Handler`] wraps a closure `F: Fn(A) -> Fut`, producing a fresh future per
//! invocation. Handlers are shared (`Arc`) and immutable; cloning one is cheap
//! and keeps its identity.
//!
//! ## Identity
//! Duplicate detection compares handlers by **identity**, not by behavior:
//! clones of one `Handler` are the same handler, while two handlers built from
//! identical closures are different handlers.
//!
//! ## Example
//! ```rust
//! use broadcaster::{Handler, HandlerError};
//!
//! let h: Handler<()> = Handler::unit(|| async { Ok::<_, HandlerError>(()) });
//! let same = h.clone();
//! assert_eq!(h.id(), same.id());
//!
//! let other: Handler<()> = Handler::unit(|| async { Ok::<_, HandlerError>(()) });
//! assert_ne!(h.id(), other.id());
//! ```

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::HandlerError;
use crate::handlers::payload::{Payload, downcast};

/// Boxed future returned by every handler invocation.
pub type BoxHandlerFuture = BoxFuture<'static, Result<(), HandlerError>>;

type HandlerFn<A> = dyn Fn(A) -> BoxHandlerFuture + Send + Sync;

/// Stable identity of a [`Handler`] (address of its shared allocation).
///
/// Valid for as long as any clone of the handler is alive; the registry keeps
/// a clone per entry, so ids of live entries never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(usize);

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handler-{:#x}", self.0)
    }
}

/// Shared async callable taking one argument of type `A`.
///
/// Zero-argument handlers are `Handler<()>`, built with [`Handler::unit`].
pub struct Handler<A> {
    f: Arc<HandlerFn<A>>,
}

impl<A> Clone for Handler<A> {
    fn clone(&self) -> Self {
        Self {
            f: Arc::clone(&self.f),
        }
    }
}

impl<A> fmt::Debug for Handler<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handler").field(&self.id()).finish()
    }
}

impl<A: 'static> Handler<A> {
    /// Creates a handler from a closure that builds a new future per call.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static, // Fn, not FnMut
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        Self {
            f: Arc::new(move |arg: A| -> BoxHandlerFuture { Box::pin(f(arg)) }),
        }
    }
}

impl<A> Handler<A> {
    /// Returns this handler's identity.
    pub fn id(&self) -> HandlerId {
        HandlerId(Arc::as_ptr(&self.f) as *const () as usize)
    }

    /// Invokes the handler, producing its future.
    ///
    /// Does not catch panics; the dispatch loop does.
    pub(crate) fn call(&self, arg: A) -> BoxHandlerFuture {
        (self.f)(arg)
    }
}

impl Handler<()> {
    /// Creates a zero-argument handler.
    pub fn unit<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        Self::new(move |()| f())
    }
}

impl<T: Any + Send + Sync> Handler<Arc<T>> {
    /// Wraps this handler so it accepts an erased [`Payload`].
    ///
    /// The payload is narrowed to `T` on every call; a mismatch resolves the
    /// future to [`HandlerError::PayloadMismatch`] without calling `self`.
    /// The returned handler has a new identity, so callers that deduplicate
    /// must keep using [`Handler::id`] of the original.
    pub(crate) fn erase(&self) -> Handler<Payload> {
        let inner = self.clone();
        Handler::new(move |payload: Payload| {
            let narrowed = downcast::<T>(&payload).map(|typed| inner.call(typed));
            async move {
                match narrowed {
                    Ok(fut) => fut.await,
                    Err(e) => Err(e),
                }
            }
        })
    }
}
