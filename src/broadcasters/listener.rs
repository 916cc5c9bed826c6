//! # Weak registration views.
//!
//! A [`Listener`] lets a consumer subscribe to a broadcaster without owning
//! it. Once the broadcaster is dropped, `listen` quietly returns `None`.
//!
//! ## Rules
//! - A listener never extends the broadcaster's lifetime.
//! - A dead target is not an error: `listen` returns `None`. A disposed but
//!   live target keeps accepting registrations.
//! - Tokens issued through a listener behave exactly like tokens issued by
//!   the broadcaster itself.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

use tracing::trace;

use crate::broadcasters::contract::Listen;
use crate::core::{Key, MessageKind, Shared, Token};
use crate::handlers::{Handler, Payload};

/// Non-owning registration view of a broadcaster keyed by `K`.
///
/// `A` is the handler argument: `()` for [`Broadcaster`](crate::Broadcaster),
/// [`Payload`] for [`PayloadBroadcaster`](crate::PayloadBroadcaster).
pub struct Listener<K, A = ()> {
    target: Weak<Shared<K, A>>,
}

/// Listener for a [`PayloadBroadcaster`](crate::PayloadBroadcaster).
pub type PayloadListener<K> = Listener<K, Payload>;

impl<K, A> Listener<K, A> {
    pub(crate) fn new(target: Weak<Shared<K, A>>) -> Self {
        Self { target }
    }

    /// True while the broadcaster this view was taken from still exists.
    pub fn is_alive(&self) -> bool {
        self.target.strong_count() > 0
    }
}

impl<K: MessageKind, A: Clone + Send + Sync + 'static> Listener<K, A> {
    /// Subscribes `handler` to `key` if the broadcaster is still alive.
    ///
    /// Returns `None` if the broadcaster is gone, or if the handler is
    /// already subscribed to `key`.
    pub fn listen(&self, key: K, handler: &Handler<A>) -> Option<Token> {
        let Some(target) = self.target.upgrade() else {
            trace!(key = ?key, "listener target dropped");
            return None;
        };
        target.register(Key::Literal(key), handler.id(), handler.clone())
    }
}

impl<K: MessageKind> Listener<K, Payload> {
    /// Subscribes a handler that expects payloads of type `T`.
    ///
    /// See [`PayloadBroadcaster::listen_as`](crate::PayloadBroadcaster::listen_as).
    pub fn listen_as<T: Any + Send + Sync>(&self, key: K, handler: &Handler<Arc<T>>) -> Option<Token> {
        let target = self.target.upgrade()?;
        target.register(Key::Literal(key), handler.id(), handler.erase())
    }
}

impl<K: MessageKind, A: Clone + Send + Sync + 'static> Listen<K, A> for Listener<K, A> {
    fn listen(&self, key: K, handler: &Handler<A>) -> Option<Token> {
        Listener::listen(self, key, handler)
    }
}

impl<K, A> Clone for Listener<K, A> {
    fn clone(&self) -> Self {
        Self {
            target: Weak::clone(&self.target),
        }
    }
}

impl<K, A> fmt::Debug for Listener<K, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("alive", &self.is_alive())
            .finish()
    }
}
