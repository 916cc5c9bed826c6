//! # Broadcaster with loosely typed payloads.
//!
//! [`PayloadBroadcaster`] is keyed by a literal like [`Broadcaster`](crate::Broadcaster),
//! but every handler receives a [`Payload`]. The concrete type is agreed on
//! out of band; a handler narrows it with [`downcast`](crate::downcast), or
//! is registered through [`listen_as`](PayloadBroadcaster::listen_as) which
//! narrows for it.
//!
//! ## Type mismatches
//! A payload of the wrong type is an ordinary handler failure: it is logged,
//! and the remaining handlers of the same broadcast still run.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;

use crate::broadcasters::contract::{Broadcast, Dispose, Listen};
use crate::broadcasters::listener::PayloadListener;
use crate::core::{Config, DispatchCore, Key, MessageKind, Token};
use crate::handlers::{Handler, Payload};

/// Dispatches payload-carrying handlers keyed by `K`.
#[derive(Debug)]
pub struct PayloadBroadcaster<K> {
    core: DispatchCore<K, Payload>,
}

impl<K: MessageKind> PayloadBroadcaster<K> {
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
    pub fn listen(&self, key: K, handler: &Handler<Payload>) -> Option<Token> {
        self.core.register(Key::Literal(key), handler)
    }

    /// Subscribes a handler that expects payloads of type `T`.
    ///
    /// The payload is narrowed before `handler` runs; a payload of another
    /// type fails this handler only. Duplicate detection uses `handler`'s
    /// own identity.
    ///
    /// # Example
    /// ```
    /// use std::sync::Arc;
    /// use broadcaster::{Handler, PayloadBroadcaster, payload};
    ///
    /// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// enum Job { Done }
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let b = PayloadBroadcaster::new();
    /// let h = Handler::new(|code: Arc<i32>| async move {
    ///     assert_eq!(*code, 0);
    ///     Ok(())
    /// });
    /// let _t = b.listen_as(Job::Done, &h).unwrap();
    /// b.broadcast(Job::Done, payload(0_i32)).await;
    /// # }
    /// ```
    pub fn listen_as<T: Any + Send + Sync>(&self, key: K, handler: &Handler<Arc<T>>) -> Option<Token> {
        self.core
            .register_as(Key::Literal(key), handler.id(), handler.erase())
    }

    /// Invokes every handler subscribed to `key` with `payload`, awaiting each in turn.
    ///
    /// Every handler receives a clone of the same `Arc`.
    pub async fn broadcast(&self, key: K, payload: Payload) {
        self.core.broadcast(Key::Literal(key), payload).await;
    }

    /// Weak registration view that does not keep this broadcaster alive.
    pub fn listener(&self) -> PayloadListener<K> {
        PayloadListener::new(self.core.downgrade())
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

impl<K: MessageKind> Default for PayloadBroadcaster<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: MessageKind> Listen<K, Payload> for PayloadBroadcaster<K> {
    fn listen(&self, key: K, handler: &Handler<Payload>) -> Option<Token> {
        self.core.register(Key::Literal(key), handler)
    }
}

#[async_trait]
impl<K: MessageKind> Broadcast<K, Payload> for PayloadBroadcaster<K> {
    async fn broadcast(&self, key: K, arg: Payload) {
        self.core.broadcast(Key::Literal(key), arg).await;
    }
}

impl<K: MessageKind> Dispose for PayloadBroadcaster<K> {
    fn dispose(&self) {
        self.core.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerError;
    use crate::handlers::{downcast, payload};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Simple {
        One,
        Two,
    }

    struct Marker;

    type Seen = Arc<Mutex<Option<Payload>>>;

    fn capture(seen: &Seen, fired: &Arc<AtomicUsize>) -> Handler<Payload> {
        let (seen, fired) = (Arc::clone(seen), Arc::clone(fired));
        Handler::new(move |p: Payload| {
            let (seen, fired) = (Arc::clone(&seen), Arc::clone(&fired));
            async move {
                fired.fetch_add(1, Ordering::SeqCst);
                *seen.lock().unwrap() = Some(p);
                Ok(())
            }
        })
    }

    fn same(a: &Option<Payload>, b: &Payload) -> bool {
        a.as_ref().is_some_and(|a| Arc::ptr_eq(a, b))
    }

    #[tokio::test]
    async fn test_payload_reaches_handler_unchanged() {
        let b = PayloadBroadcaster::new();
        let seen: Seen = Arc::default();
        let fired = Arc::new(AtomicUsize::new(0));
        let _t = b.listen(Simple::Two, &capture(&seen, &fired)).unwrap();

        let to_send = payload(Marker);
        b.broadcast(Simple::Two, Arc::clone(&to_send)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(same(&seen.lock().unwrap(), &to_send));

        *seen.lock().unwrap() = None;
        b.broadcast(Simple::Two, Arc::clone(&to_send)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 2);
        assert!(same(&seen.lock().unwrap(), &to_send));

        *seen.lock().unwrap() = None;
        b.broadcast(Simple::One, Arc::clone(&to_send)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 2);
        assert!(seen.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unsubscribe_keeps_last_payload() {
        let b = PayloadBroadcaster::new();
        let seen: Seen = Arc::default();
        let fired = Arc::new(AtomicUsize::new(0));
        let mut token = b.listen(Simple::Two, &capture(&seen, &fired)).unwrap();

        let to_send = payload(Marker);
        b.broadcast(Simple::Two, Arc::clone(&to_send)).await;
        b.broadcast(Simple::Two, Arc::clone(&to_send)).await;
        token.release();

        b.broadcast(Simple::Two, payload(Marker)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 2);
        assert!(same(&seen.lock().unwrap(), &to_send));
    }

    #[tokio::test]
    async fn test_type_mismatch_is_isolated() {
        let b = PayloadBroadcaster::new();
        let after = Arc::new(AtomicUsize::new(0));
        let strict = Handler::new(|p: Payload| async move {
            let _n: Arc<u64> = downcast(&p)?;
            Ok::<_, HandlerError>(())
        });
        let typed = Handler::new(|_s: Arc<u64>| async { Ok(()) });
        let seen: Seen = Arc::default();

        let _t1 = b.listen(Simple::One, &strict).unwrap();
        let _t2 = b.listen_as(Simple::One, &typed).unwrap();
        let _t3 = b.listen(Simple::One, &capture(&seen, &after)).unwrap();

        b.broadcast(Simple::One, payload("not a number")).await;
        assert_eq!(after.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_listen_as_dedups_on_original_handler() {
        let b = PayloadBroadcaster::new();
        let typed = Handler::new(|_s: Arc<String>| async { Ok(()) });
        let first = b.listen_as(Simple::One, &typed);
        let second = b.listen_as(Simple::One, &typed.clone());
        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(b.len(), 1);

        drop(first);
        assert!(b.is_empty());
    }
}
