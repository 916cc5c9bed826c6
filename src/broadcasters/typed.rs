//! # Broadcaster keyed by message class.
//!
//! [`TypedBroadcaster`] keys subscriptions on the message type itself rather
//! than on a literal. Each [`Message`] binds one payload type at compile time,
//! and [`TypedBroadcaster::get`] returns a [`MessageFacade`] through which
//! handlers are registered and payloads published without naming the key.
//!
//! ## Rules
//! - Matching is by exact type: two message classes never share handlers,
//!   even if they carry the same payload type.
//! - Every handler receives a clone of the `Arc` passed to `broadcast`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use broadcaster::{Handler, Message, TypedBroadcaster};
//!
//! struct Renamed;
//! impl Message for Renamed {
//!     type Payload = String;
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let b = TypedBroadcaster::new();
//! let h = Handler::new(|name: Arc<String>| async move {
//!     assert_eq!(name.as_str(), "draft.txt");
//!     Ok(())
//! });
//!
//! let _token = b.get::<Renamed>().listen(&h).unwrap();
//! b.get::<Renamed>().broadcast(Arc::new("draft.txt".to_string())).await;
//! # }
//! ```

use std::convert::Infallible;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::broadcasters::contract::Dispose;
use crate::core::{Config, DispatchCore, Key, MessageClass, Token};
use crate::handlers::{Handler, Payload};

/// A message class: a marker type that binds its payload type.
pub trait Message: 'static {
    /// The payload every broadcast of this message carries.
    type Payload: Send + Sync + 'static;
}

type ClassCore = DispatchCore<Infallible, Payload>;

/// Dispatches handlers keyed by message class.
#[derive(Debug)]
pub struct TypedBroadcaster {
    core: ClassCore,
}

impl TypedBroadcaster {
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

    /// Returns the facade for message class `M`, bound to this broadcaster.
    pub fn get<M: Message>(&self) -> MessageFacade<'_, M> {
        MessageFacade {
            core: &self.core,
            _message: PhantomData,
        }
    }

    /// Removes every subscription. Idempotent.
    pub fn dispose(&self) {
        self.core.dispose();
    }

    /// True once disposed.
    pub fn is_disposed(&self) -> bool {
        self.core.is_disposed()
    }

    /// Number of live subscriptions across all message classes.
    pub fn len(&self) -> usize {
        self.core.len()
    }

    /// True if nothing is subscribed.
    pub fn is_empty(&self) -> bool {
        self.core.is_empty()
    }
}

impl Default for TypedBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispose for TypedBroadcaster {
    fn dispose(&self) {
        self.core.dispose();
    }
}

/// Per-message view of a [`TypedBroadcaster`].
pub struct MessageFacade<'a, M> {
    core: &'a ClassCore,
    _message: PhantomData<fn() -> M>,
}

impl<M: Message> MessageFacade<'_, M> {
    /// Identity this facade registers and broadcasts under.
    pub fn class(&self) -> MessageClass {
        MessageClass::of::<M>()
    }

    /// Subscribes `handler` to this message; `None` if already subscribed.
    pub fn listen(&self, handler: &Handler<Arc<M::Payload>>) -> Option<Token> {
        self.core
            .register_as(Key::Class(self.class()), handler.id(), handler.erase())
    }

    /// Invokes every handler of this message with `payload`, awaiting each in turn.
    pub async fn broadcast(&self, payload: Arc<M::Payload>) {
        let payload: Payload = payload;
        self.core.broadcast(Key::Class(self.class()), payload).await;
    }
}

impl<M: Message> fmt::Debug for MessageFacade<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MessageFacade").field(&self.class()).finish()
    }
}
