//! # Mediator: lock-guarded dispatch with a dispose event.
//!
//! [`Mediator`] is a dispatch core keyed by any comparable event `E`, carrying
//! an optional [`Payload`], with one event designated as the dispose event.
//!
//! ## Lifecycle
//! ```text
//! Active ──dispose()──► Disposing ──────────────────────► Disposed
//!                        │ fire(dispose_event,             │ register(evt, h):
//!                        │      Some(mediator))            │   h(None) once,
//!                        │ then clear all subscriptions    │   no-op token
//! ```
//!
//! ## Rules
//! - Registration and removal are serialized by one lock; `fire` iterates a
//!   copy taken at call time, so handlers may register or release freely.
//! - `dispose()` runs once: it fires the dispose event with the mediator
//!   itself as payload, clears, and becomes terminal.
//! - Registering on a disposing or disposed mediator runs the handler once
//!   with `None`, synchronously up to its first suspension point, and
//!   returns a no-op token.
//! - Dropping a mediator without calling `dispose()` clears it silently.
//! - Registration and the `Active → Disposing` transition take the same
//!   lock, so a handler either receives the dispose event or the late `None`
//!   call, never both.

mod detached;
mod state;

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::core::{Config, DispatchCore, Key, MessageKind, Registration, Token};
use crate::handlers::{Handler, Payload};

use detached::invoke_detached;
use state::StateCell;

pub use state::MediatorState;

/// Handler signature accepted by a [`Mediator`].
pub type MediatorHandler = Handler<Option<Payload>>;

/// Event dispatcher with a designated dispose event.
///
/// The dispose event fires only from an explicit [`dispose`](Self::dispose).
/// Dropping the last `Arc` clears the subscriptions without firing it:
/// the payload is the mediator itself, which is gone by then, and `Drop`
/// cannot await handlers.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use broadcaster::{Handler, Mediator, MediatorState, Payload};
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// enum Evt { Changed, Closing }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mediator = Mediator::new(Evt::Closing);
/// let closed = Arc::new(AtomicBool::new(false));
/// let c = Arc::clone(&closed);
/// let on_close = Handler::new(move |p: Option<Payload>| {
///     let c = Arc::clone(&c);
///     async move {
///         c.store(p.is_some(), Ordering::SeqCst);
///         Ok(())
///     }
/// });
///
/// let _token = mediator.register(Evt::Closing, &on_close).unwrap();
/// mediator.dispose().await;
///
/// assert!(closed.load(Ordering::SeqCst));
/// assert_eq!(mediator.state(), MediatorState::Disposed);
/// # }
/// ```
pub struct Mediator<E> {
    core: DispatchCore<E, Option<Payload>>,
    dispose_event: E,
    state: StateCell,
}

impl<E: MessageKind> Mediator<E> {
    /// Creates an active mediator that fires `dispose_event` when disposed.
    pub fn new(dispose_event: E) -> Arc<Self> {
        Self::with_config(dispose_event, Config::named("mediator"))
    }

    /// Same as [`new`](Self::new) with an explicit [`Config`].
    pub fn with_config(dispose_event: E, config: Config) -> Arc<Self> {
        Arc::new(Self {
            core: DispatchCore::with_config(config),
            dispose_event,
            state: StateCell::new(),
        })
    }

    /// Subscribes `handler` to `evt`.
    ///
    /// - Active: returns a token, or `None` if this handler already follows `evt`.
    /// - Disposing / disposed: invokes `handler(None)` once and returns a no-op token.
    pub fn register(&self, evt: E, handler: &MediatorHandler) -> Option<Token> {
        let admitted = self.core.register_if(Key::Literal(evt.clone()), handler, || {
            self.state() == MediatorState::Active
        });
        match admitted {
            Registration::Added(token) => return Some(token),
            Registration::Duplicate => return None,
            Registration::Refused => {}
        }

        debug!(core = %self.core.config().name, event = ?evt, "registration after dispose; invoking once");
        invoke_detached(&self.core.config().name, &evt, handler, None);
        Some(Token::noop())
    }

    /// Invokes every handler subscribed to `evt` with `payload`, in subscription order.
    ///
    /// Works on a copy of the subscriptions taken at call time. Failures are
    /// logged and skipped.
    pub async fn fire(&self, evt: E, payload: Option<Payload>) {
        self.core.broadcast(Key::Literal(evt), payload).await;
    }

    /// Fires the dispose event, then clears every subscription. Runs once.
    ///
    /// The dispose event's payload is this mediator (`Arc<Mediator<E>>`).
    pub async fn dispose(self: &Arc<Self>) {
        let began = self
            .core
            .exclusive(|| self.state.transition(MediatorState::Active, MediatorState::Disposing));
        if !began {
            return;
        }

        let me: Payload = Arc::<Self>::clone(self);
        self.core
            .broadcast(Key::Literal(self.dispose_event.clone()), Some(me))
            .await;
        self.core.dispose();
        self.state
            .transition(MediatorState::Disposing, MediatorState::Disposed);
        debug!(core = %self.core.config().name, "mediator disposed");
    }

    /// Current lifecycle state.
    pub fn state(&self) -> MediatorState {
        self.state.get()
    }

    /// The event fired by [`dispose`](Self::dispose).
    pub fn dispose_event(&self) -> &E {
        &self.dispose_event
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

impl<E: fmt::Debug> fmt::Debug for Mediator<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mediator")
            .field("dispose_event", &self.dispose_event)
            .field("state", &self.state.get())
            .finish()
    }
}
