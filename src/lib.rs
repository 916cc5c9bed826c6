//! # broadcaster
//!
//! **broadcaster** is an in-process publish/subscribe library for async Rust.
//!
//! Components register handlers against a typed message key, and publishers
//! notify every matching handler in subscription order. Producers and
//! consumers stay decoupled: consumers only need a registration capability
//! (possibly a weak one), never a reference to the producer.
//!
//! ## Architecture
//! ```text
//!   Broadcaster<K>     PayloadBroadcaster<K>     TypedBroadcaster     Mediator<E>
//!   (K → ())           (K → Payload)             (M → Arc<M::Payload>) (E → Option<Payload>)
//!        │                    │                         │                   │
//!        └────────────────────┴────────────┬────────────┴───────────────────┘
//!                                          ▼
//! ┌───────────────────────────────────────────────────────────────────────────┐
//! │  DispatchCore<K, P>                                                       │
//! │  - Registry (ordered entries, dedup on (key, handler identity))           │
//! │  - broadcast: snapshot → await h1 → await h2 → ... (failures isolated)    │
//! │  - dispose: clear current entries                                         │
//! └──────────────▲──────────────────────────────────▲─────────────────────────┘
//!                │ Weak                             │ Weak
//!             Token (release = remove one entry)   Listener (register if alive)
//! ```
//!
//! ## Guarantees
//! - Handlers for one broadcast run **sequentially**, in subscription order.
//! - A failing or panicking handler is logged via `tracing` and skipped;
//!   `broadcast` always completes.
//! - Registering the same handler twice for one key yields `None`.
//! - Tokens and listeners never keep a broadcaster alive.
//!
//! ## Features
//! | Area              | Description                                              | Key types                                   |
//! |-------------------|----------------------------------------------------------|---------------------------------------------|
//! | **Core**          | Registry, ordered dispatch, disposal                     | [`DispatchCore`], [`Token`], [`Key`]        |
//! | **Variants**      | Literal, literal + payload, message-class keyed          | [`Broadcaster`], [`PayloadBroadcaster`], [`TypedBroadcaster`] |
//! | **Weak views**    | Register without ownership                               | [`Listener`], [`PayloadListener`]           |
//! | **Handlers**      | Async callables with identity, erased payloads           | [`Handler`], [`Payload`]                    |
//! | **Errors**        | Per-handler failures                                     | [`HandlerError`]                            |
//! | **Configuration** | Diagnostic name and preallocation                        | [`Config`]                                  |
//!
//! ## Optional features
//! - `mediator` _(default)_: exposes [`Mediator`], a lock-guarded dispatcher
//!   with a designated dispose event.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use broadcaster::{Broadcaster, Handler, Listener};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! enum DocEvent { Saved, Closed }
//!
//! struct Document {
//!     events: Broadcaster<DocEvent>,
//! }
//!
//! impl Document {
//!     fn listener(&self) -> Listener<DocEvent> {
//!         self.events.listener()
//!     }
//!
//!     async fn save(&self) {
//!         // ... write to disk ...
//!         self.events.broadcast(DocEvent::Saved).await;
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let doc = Document { events: Broadcaster::new() };
//!     let saves = Arc::new(AtomicUsize::new(0));
//!
//!     let s = Arc::clone(&saves);
//!     let on_save = Handler::unit(move || {
//!         let s = Arc::clone(&s);
//!         async move {
//!             s.fetch_add(1, Ordering::SeqCst);
//!             Ok(())
//!         }
//!     });
//!     let token = doc.listener().listen(DocEvent::Saved, &on_save);
//!
//!     doc.save().await;
//!     doc.save().await;
//!     assert_eq!(saves.load(Ordering::SeqCst), 2);
//!
//!     drop(token);
//!     doc.save().await;
//!     assert_eq!(saves.load(Ordering::SeqCst), 2);
//! }
//! ```

mod broadcasters;
mod core;
mod error;
mod handlers;

// ---- Public re-exports ----

pub use crate::core::{Config, DispatchCore, Key, MessageClass, MessageKind, Token};
pub use broadcasters::{
    Broadcast, Broadcaster, Dispose, Listen, Listener, Message, MessageFacade,
    PayloadBroadcaster, PayloadListener, TypedBroadcaster,
};
pub use error::HandlerError;
pub use handlers::{BoxHandlerFuture, Handler, HandlerId, Payload, downcast, payload};

// Optional: lock-guarded mediator with a dispose event.
// Enabled by default; disable with `default-features = false`.
#[cfg(feature = "mediator")]
mod mediator;
#[cfg(feature = "mediator")]
pub use mediator::{Mediator, MediatorHandler, MediatorState};
