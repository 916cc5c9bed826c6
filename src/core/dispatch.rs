//! # Dispatch core: registration, ordered broadcast, disposal.
//!
//! [`DispatchCore`] owns the subscription [`Registry`] of one key domain and
//! runs the broadcast loop shared by every broadcaster variant.
//!
//! ## Architecture
//! ```text
//! register(key, handler) ──► [Mutex<Registry>] ◄── Token::release (Weak)
//!                                   │
//! broadcast(key, payload) ── snapshot(key) ──► h1 ─await─► h2 ─await─► hN
//!                                              │           │           │
//!                                              └── Err / panic ──► tracing
//! ```
//!
//! ## Rules
//! - **Ordered**: matching handlers run one at a time, in registration order.
//! - **Snapshot**: a broadcast works on the entries matching at call time;
//!   registrations and releases during the loop affect later broadcasts only.
//! - **Isolation**: a handler error or panic is logged and the loop continues;
//!   `broadcast` itself never fails.
//! - **Short lock**: the registry lock is never held across an `.await`, and
//!   removed entries are dropped outside it (a handler may own tokens into the
//!   same core).
//! - **Disposal clears**: `dispose` removes every entry present at the call.
//!   Calling it again is safe, and the core keeps accepting registrations.

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use futures::FutureExt;
use tracing::{debug, error, trace, warn};

use crate::core::config::Config;
use crate::core::key::{Key, MessageKind};
use crate::core::registry::Registry;
use crate::core::token::Token;
use crate::error::HandlerError;
use crate::handlers::{Handler, HandlerId};

/// State shared between a core, its tokens and its listeners.
///
/// Only the owning [`DispatchCore`] holds it strongly.
pub(crate) struct Shared<K, P> {
    config: Config,
    registry: Mutex<Registry<K, P>>,
    disposed: AtomicBool,
}

impl<K, P> Shared<K, P> {
    fn lock(&self) -> MutexGuard<'_, Registry<K, P>> {
        // Handlers never run under this lock, so a poisoned guard still holds a consistent list.
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn remove(&self, ordinal: u64) {
        let removed = self.lock().remove(ordinal);
        if removed.is_some() {
            trace!(core = %self.config.name, ordinal, "unsubscribed");
        }
        drop(removed);
    }

    fn dispose(&self) {
        let drained = self.lock().drain();
        let first = !self.disposed.swap(true, Ordering::AcqRel);
        if first || !drained.is_empty() {
            debug!(core = %self.config.name, cleared = drained.len(), "disposed");
        }
        drop(drained);
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}

impl<K: MessageKind, P: Clone + Send + Sync + 'static> Shared<K, P> {
    fn new(config: Config) -> Self {
        let capacity = config.capacity_hint().unwrap_or(0);
        Self {
            config,
            registry: Mutex::new(Registry::with_capacity(capacity)),
            disposed: AtomicBool::new(false),
        }
    }

    /// Registers `handler` under `key`, deduplicating on `(key, id)`.
    pub(crate) fn register(
        self: &Arc<Self>,
        key: Key<K>,
        id: HandlerId,
        handler: Handler<P>,
    ) -> Option<Token> {
        match self.register_if(key, id, handler, || true) {
            Registration::Added(token) => Some(token),
            Registration::Duplicate | Registration::Refused => None,
        }
    }

    /// Same as [`register`](Self::register), but `admit` is evaluated under
    /// the registry lock and a `false` leaves the registry untouched.
    pub(crate) fn register_if(
        self: &Arc<Self>,
        key: Key<K>,
        id: HandlerId,
        handler: Handler<P>,
        admit: impl FnOnce() -> bool,
    ) -> Registration {
        let ordinal = {
            let mut registry = self.lock();
            if !admit() {
                drop(registry);
                trace!(core = %self.config.name, key = ?key, handler = %id, "registration refused");
                return Registration::Refused;
            }
            registry.insert(key.clone(), id, handler)
        };

        let Some(ordinal) = ordinal else {
            debug!(core = %self.config.name, key = ?key, handler = %id, "already subscribed");
            return Registration::Duplicate;
        };
        trace!(core = %self.config.name, key = ?key, handler = %id, ordinal, "subscribed");

        let weak: Weak<Self> = Arc::downgrade(self);
        Registration::Added(Token::from_fn(move || {
            if let Some(shared) = weak.upgrade() {
                shared.remove(ordinal);
            }
        }))
    }

    async fn broadcast(&self, key: Key<K>, payload: P) {
        let targets = self.lock().snapshot(&key);
        if targets.is_empty() {
            trace!(core = %self.config.name, key = ?key, "no subscribers");
            return;
        }

        for (ordinal, handler) in targets {
            if let Err(err) = invoke(&handler, payload.clone()).await {
                report(&self.config.name, &key, ordinal, &err);
            }
        }
    }
}

/// Outcome of a conditional registration.
pub(crate) enum Registration {
    Added(Token),
    Duplicate,
    Refused,
}

/// Invokes one handler with panic isolation.
///
/// A panic while building or polling the handler's future is converted into
/// [`HandlerError::Panicked`].
pub(crate) async fn invoke<P>(handler: &Handler<P>, arg: P) -> Result<(), HandlerError> {
    let fut = async move { handler.call(arg).await };
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => Err(HandlerError::from_panic(panic)),
    }
}

/// Reports a contained handler failure to the diagnostic channel.
pub(crate) fn report<K: fmt::Debug>(name: &str, key: &K, ordinal: u64, err: &HandlerError) {
    if err.is_panic() {
        error!(core = name, key = ?key, ordinal, label = err.as_label(), "{}", err.as_message());
    } else {
        warn!(core = name, key = ?key, ordinal, label = err.as_label(), "{}", err.as_message());
    }
}

/// Subscription registry plus the ordered, failure-isolated broadcast loop.
///
/// `K` is the literal key type, `P` the argument every handler receives
/// (`()` when there is no payload). The core is the single strong owner of
/// its state; [`Token`]s and listeners only hold weak references, so dropping
/// the core disposes it and turns them into no-ops.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use broadcaster::{DispatchCore, Handler, Key};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let core: DispatchCore<&'static str, ()> = DispatchCore::new();
/// let hits = Arc::new(AtomicUsize::new(0));
/// let h = {
///     let hits = Arc::clone(&hits);
///     Handler::unit(move || {
///         let hits = Arc::clone(&hits);
///         async move {
///             hits.fetch_add(1, Ordering::SeqCst);
///             Ok(())
///         }
///     })
/// };
///
/// let _token = core.register(Key::Literal("saved"), &h).unwrap();
/// assert!(core.register(Key::Literal("saved"), &h).is_none());
///
/// core.broadcast(Key::Literal("saved"), ()).await;
/// core.broadcast(Key::Literal("loaded"), ()).await;
/// assert_eq!(hits.load(Ordering::SeqCst), 1);
/// # }
/// ```
pub struct DispatchCore<K, P> {
    shared: Arc<Shared<K, P>>,
}

impl<K: MessageKind, P: Clone + Send + Sync + 'static> DispatchCore<K, P> {
    /// Creates an empty core with the default [`Config`].
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an empty core with `config`.
    pub fn with_config(config: Config) -> Self {
        Self {
            shared: Arc::new(Shared::new(config)),
        }
    }

    /// Subscribes `handler` to `key`.
    ///
    /// Returns `None` if this exact handler is already subscribed to `key`.
    /// A disposed core still accepts new subscriptions. The returned
    /// [`Token`] removes exactly this subscription when released or dropped.
    pub fn register(&self, key: Key<K>, handler: &Handler<P>) -> Option<Token> {
        self.shared.register(key, handler.id(), handler.clone())
    }

    /// Subscribes a boundary wrapper while deduplicating on the original handler `id`.
    pub(crate) fn register_as(&self, key: Key<K>, id: HandlerId, handler: Handler<P>) -> Option<Token> {
        self.shared.register(key, id, handler)
    }

    /// Invokes every handler subscribed to `key`, in subscription order.
    ///
    /// Each handler is awaited before the next one starts. Failures are logged
    /// and skipped; this future always completes.
    pub async fn broadcast(&self, key: Key<K>, payload: P) {
        self.shared.broadcast(key, payload).await;
    }

    /// Removes every current subscription. Safe to call more than once.
    pub fn dispose(&self) {
        self.shared.dispose();
    }

    /// True once [`dispose`](Self::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.shared.is_disposed()
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.shared.len()
    }

    /// True if there are no live subscriptions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configuration this core was created with.
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    pub(crate) fn downgrade(&self) -> Weak<Shared<K, P>> {
        Arc::downgrade(&self.shared)
    }

    #[cfg(feature = "mediator")]
    pub(crate) fn register_if(
        &self,
        key: Key<K>,
        handler: &Handler<P>,
        admit: impl FnOnce() -> bool,
    ) -> Registration {
        self.shared.register_if(key, handler.id(), handler.clone(), admit)
    }

    /// Runs `f` while holding the registry lock, serializing it with every
    /// registration.
    #[cfg(feature = "mediator")]
    pub(crate) fn exclusive<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.shared.lock();
        f()
    }
}

impl<K: MessageKind, P: Clone + Send + Sync + 'static> Default for DispatchCore<K, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, P> Drop for DispatchCore<K, P> {
    fn drop(&mut self) {
        self.shared.dispose();
    }
}

impl<K, P> fmt::Debug for DispatchCore<K, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchCore")
            .field("name", &self.shared.config.name)
            .field("disposed", &self.shared.disposed.load(Ordering::Relaxed))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Simple {
        One,
        Two,
        Three,
    }

    type Log = Arc<Mutex<Vec<&'static str>>>;

    fn recorder(log: &Log, name: &'static str) -> Handler<()> {
        let log = Arc::clone(log);
        Handler::unit(move || {
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().push(name);
                Ok(())
            }
        })
    }

    fn counter(hits: &Arc<AtomicUsize>) -> Handler<()> {
        let hits = Arc::clone(hits);
        Handler::unit(move || {
            let hits = Arc::clone(&hits);
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
    }

    async fn explode() -> Result<(), HandlerError> {
        panic!("boom")
    }

    fn explode_on_call() -> std::future::Ready<Result<(), HandlerError>> {
        panic!("before the future exists")
    }

    #[tokio::test]
    async fn test_handlers_fire_in_subscription_order() {
        let core: DispatchCore<Simple, ()> = DispatchCore::new();
        let log: Log = Arc::default();
        let _a = core.register(Key::Literal(Simple::One), &recorder(&log, "a"));
        let _x = core.register(Key::Literal(Simple::Two), &recorder(&log, "x"));
        let _b = core.register(Key::Literal(Simple::One), &recorder(&log, "b"));
        let _c = core.register(Key::Literal(Simple::One), &recorder(&log, "c"));

        for _ in 0..3 {
            core.broadcast(Key::Literal(Simple::One), ()).await;
        }

        assert_eq!(
            *log.lock().unwrap(),
            vec!["a", "b", "c", "a", "b", "c", "a", "b", "c"]
        );
    }

    #[tokio::test]
    async fn test_duplicate_registration_is_rejected() {
        let core: DispatchCore<Simple, ()> = DispatchCore::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = counter(&hits);

        let first = core.register(Key::Literal(Simple::One), &h);
        let second = core.register(Key::Literal(Simple::One), &h.clone());
        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(core.len(), 1);

        core.broadcast(Key::Literal(Simple::One), ()).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_identical_closures_are_not_duplicates() {
        let core: DispatchCore<Simple, ()> = DispatchCore::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let _a = core.register(Key::Literal(Simple::One), &counter(&hits));
        let _b = core.register(Key::Literal(Simple::One), &counter(&hits));
        assert_eq!(core.len(), 2);

        core.broadcast(Key::Literal(Simple::One), ()).await;
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_release_removes_only_its_entry() {
        let core: DispatchCore<Simple, ()> = DispatchCore::new();
        let log: Log = Arc::default();
        let mut a = core.register(Key::Literal(Simple::One), &recorder(&log, "a")).unwrap();
        let _b = core.register(Key::Literal(Simple::One), &recorder(&log, "b")).unwrap();

        a.release();
        a.release();
        assert_eq!(core.len(), 1);

        core.broadcast(Key::Literal(Simple::One), ()).await;
        assert_eq!(*log.lock().unwrap(), vec!["b"]);
    }

    #[tokio::test]
    async fn test_failing_handler_does_not_stop_broadcast() {
        let core: DispatchCore<Simple, ()> = DispatchCore::new();
        let log: Log = Arc::default();
        let failing = Handler::unit(|| async { Err(HandlerError::fail("nope")) });
        let panicking = Handler::unit(explode);
        let panics_on_call = Handler::unit(explode_on_call);

        let _t1 = core.register(Key::Literal(Simple::Three), &recorder(&log, "first"));
        let _t2 = core.register(Key::Literal(Simple::Three), &failing);
        let _t3 = core.register(Key::Literal(Simple::Three), &panicking);
        let _t4 = core.register(Key::Literal(Simple::Three), &panics_on_call);
        let _t5 = core.register(Key::Literal(Simple::Three), &recorder(&log, "last"));

        core.broadcast(Key::Literal(Simple::Three), ()).await;
        core.broadcast(Key::Literal(Simple::Three), ()).await;
        assert_eq!(*log.lock().unwrap(), vec!["first", "last", "first", "last"]);
    }

    #[tokio::test]
    async fn test_dispose_clears_and_is_idempotent() {
        let core: DispatchCore<Simple, ()> = DispatchCore::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let token = core.register(Key::Literal(Simple::One), &counter(&hits));

        core.dispose();
        core.dispose();
        assert!(core.is_disposed());
        assert!(core.is_empty());

        core.broadcast(Key::Literal(Simple::One), ()).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        // a token outliving its entry releases quietly
        drop(token);
    }

    #[tokio::test]
    async fn test_registration_after_dispose_is_delivered() {
        let core: DispatchCore<Simple, ()> = DispatchCore::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = counter(&hits);
        let _before = core.register(Key::Literal(Simple::One), &h).unwrap();

        core.dispose();
        let after = core.register(Key::Literal(Simple::One), &h);
        assert!(after.is_some());
        assert_eq!(core.len(), 1);

        core.broadcast(Key::Literal(Simple::One), ()).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        // a second dispose clears what was added since
        core.dispose();
        assert!(core.is_empty());
        core.broadcast(Key::Literal(Simple::One), ()).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_registration_during_broadcast_applies_next_time() {
        let core = Arc::new(DispatchCore::<Simple, ()>::new());
        let late_hits = Arc::new(AtomicUsize::new(0));
        let late = counter(&late_hits);
        let parked: Arc<Mutex<Vec<Token>>> = Arc::default();

        let subscriber = {
            let core = Arc::downgrade(&core);
            let late = late.clone();
            let parked = Arc::clone(&parked);
            Handler::unit(move || {
                let core = core.clone();
                let late = late.clone();
                let parked = Arc::clone(&parked);
                async move {
                    if let Some(core) = core.upgrade() {
                        if let Some(t) = core.register(Key::Literal(Simple::One), &late) {
                            parked.lock().unwrap().push(t);
                        }
                    }
                    Ok(())
                }
            })
        };
        let _t = core.register(Key::Literal(Simple::One), &subscriber);

        core.broadcast(Key::Literal(Simple::One), ()).await;
        assert_eq!(late_hits.load(Ordering::SeqCst), 0);

        core.broadcast(Key::Literal(Simple::One), ()).await;
        assert_eq!(late_hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_handler_may_release_its_own_token() {
        let core: DispatchCore<Simple, ()> = DispatchCore::new();
        let slot: Arc<Mutex<Option<Token>>> = Arc::default();
        let hits = Arc::new(AtomicUsize::new(0));

        let once = {
            let slot = Arc::clone(&slot);
            let hits = Arc::clone(&hits);
            Handler::unit(move || {
                let slot = Arc::clone(&slot);
                let hits = Arc::clone(&hits);
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    let token = slot.lock().unwrap().take();
                    drop(token);
                    Ok(())
                }
            })
        };
        *slot.lock().unwrap() = core.register(Key::Literal(Simple::Two), &once);

        core.broadcast(Key::Literal(Simple::Two), ()).await;
        core.broadcast(Key::Literal(Simple::Two), ()).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(core.is_empty());
    }

    #[test]
    fn test_dropping_core_turns_tokens_into_noops() {
        let core: DispatchCore<Simple, ()> = DispatchCore::with_config(Config::named("dropped"));
        let hits = Arc::new(AtomicUsize::new(0));
        let mut token = core.register(Key::Literal(Simple::One), &counter(&hits)).unwrap();
        assert_eq!(core.config().name, "dropped");

        drop(core);
        token.release();
        assert!(token.is_released());
    }
}
