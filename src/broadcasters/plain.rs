//! # Broadcaster without payloads.
//!
//! [`Broadcaster`] dispatches zero-argument handlers keyed by a literal,
//! typically a fieldless enum specific to the owning component.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use broadcaster::{Broadcaster, Handler};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! enum Simple { One, Two, Three }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let b = Broadcaster::new();
//! let counter = Arc::new(AtomicUsize::new(0));
//! let c = Arc::clone(&counter);
//! let h = Handler::unit(move || {
//!     let c = Arc::clone(&c);
//!     async move {
//!         c.fetch_add(1, Ordering::SeqCst);
//!         Ok(())
//!     }
//! });
//!
//! let mut token = b.listen(Simple::One, &h).unwrap();
//! b.broadcast(Simple::One).await;
//! b.broadcast(Simple::One).await;
//! b.broadcast(Simple::Two).await;
//! assert_eq!(counter.load(Ordering::SeqCst), 2);
//!
//! token.release();
//! b.broadcast(Simple::One).await;
//! assert_eq!(counter.load(Ordering::SeqCst), 2);
//! # }
//! ```

use async_trait::async_trait;

use crate::broadcasters::contract::{Broadcast, Dispose, Listen};
use crate::broadcasters::listener::Listener;
use crate::core::{Config, DispatchCore, Key, MessageKind, Token};
use crate::handlers::Handler;

/// Dispatches zero-argument handlers keyed by `K`.
#[derive(Debug)]
pub struct Broadcaster<K> {
    core: DispatchCore<K, ()>,
}

impl<K: MessageKind> Broadcaster<K> {
    /// Creates an empty broadcaster.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an empty broadcaster with `config`.
    pub fn with_config(config: Config) -> Self {
        Self {
            core: DispatchCore::with_config(config),
        }
    }

    /// Subscribes `handler` to `key`; `None` if already subscribed.
    pub fn listen(&self, key: K, handler: &Handler<()>) -> Option<Token> {
        self.core.register(Key::Literal(key), handler)
    }

    /// Invokes every handler subscribed to `key`, awaiting each in turn.
    pub async fn broadcast(&self, key: K) {
        self.core.broadcast(Key::Literal(key), ()).await;
    }

    /// Weak registration view that does not keep this broadcaster alive.
    pub fn listener(&self) -> Listener<K> {
        Listener::new(self.core.downgrade())
    }

    /// Removes every subscription. Idempotent.
    pub fn dispose(&self) {
        self.core.dispose();
    }

    /// True once disposed.
    pub fn is_disposed(&self) -> bool {
        self.core.is_disposed()
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.core.len()
    }

    /// True if nothing is subscribed.
    pub fn is_empty(&self) -> bool {
        self.core.is_empty()
    }
}

impl<K: MessageKind> Default for Broadcaster<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: MessageKind> Listen<K, ()> for Broadcaster<K> {
    fn listen(&self, key: K, handler: &Handler<()>) -> Option<Token> {
        self.core.register(Key::Literal(key), handler)
    }
}

#[async_trait]
impl<K: MessageKind> Broadcast<K, ()> for Broadcaster<K> {
    async fn broadcast(&self, key: K, _arg: ()) {
        self.core.broadcast(Key::Literal(key), ()).await;
    }
}

impl<K: MessageKind> Dispose for Broadcaster<K> {
    fn dispose(&self) {
        self.core.dispose();
    }
}
