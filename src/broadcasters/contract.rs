//! # Listen / Broadcast / Dispose contract.
//!
//! Owners of a broadcaster usually expose the [`Listen`] side and keep
//! [`Broadcast`] to themselves; code that only subscribes can accept
//! `&impl Listen<K, A>` and work with either the broadcaster or a
//! [`Listener`](crate::Listener).
//!
//! ## Example
//! ```rust
//! use broadcaster::{Broadcaster, Handler, Listen, Token};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! enum Doc { Saved }
//!
//! fn watch(source: &impl Listen<Doc, ()>) -> Option<Token> {
//!     source.listen(Doc::Saved, &Handler::unit(|| async { Ok(()) }))
//! }
//!
//! let b = Broadcaster::new();
//! let t1 = watch(&b);
//! let t2 = watch(&b.listener());
//! assert!(t1.is_some() && t2.is_some());
//! assert_eq!(b.len(), 2);
//! ```

use async_trait::async_trait;

use crate::core::Token;
use crate::handlers::Handler;

/// Registration side of a broadcaster.
pub trait Listen<K, A> {
    /// Subscribes `handler` to `key`.
    ///
    /// Returns `None` if the handler is already subscribed to `key`, or if
    /// the underlying broadcaster is gone.
    fn listen(&self, key: K, handler: &Handler<A>) -> Option<Token>;
}

/// Publishing side of a broadcaster.
#[async_trait]
pub trait Broadcast<K, A>: Send + Sync {
    /// Invokes every handler subscribed to `key`, in subscription order.
    ///
    /// Handler failures are logged and skipped; this never fails.
    async fn broadcast(&self, key: K, arg: A);
}

/// Teardown of a broadcaster.
pub trait Dispose {
    /// Removes every current subscription. Safe to call more than once.
    fn dispose(&self);
}
