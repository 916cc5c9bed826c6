//! # Broadcaster variants over the dispatch core.
//!
//! Each variant is the [`DispatchCore`](crate::DispatchCore) keyed on a
//! different identity:
//!
//! | Variant                | Key                   | Handler argument         |
//! |------------------------|-----------------------|--------------------------|
//! | [`Broadcaster`]        | literal `K`           | none (`()`)              |
//! | [`PayloadBroadcaster`] | literal `K`           | erased [`Payload`]       |
//! | [`TypedBroadcaster`]   | message class `M`     | `Arc<M::Payload>`        |
//!
//! [`Listener`] / [`PayloadListener`] are weak views that register without
//! keeping the broadcaster alive. The [`Listen`], [`Broadcast`] and
//! [`Dispose`] traits are the seams callers can be generic over.
//!
//! [`Payload`]: crate::Payload

mod contract;
mod listener;
mod payload;
mod plain;
mod typed;

pub use contract::{Broadcast, Dispose, Listen};
pub use listener::{Listener, PayloadListener};
pub use payload::PayloadBroadcaster;
pub use plain::Broadcaster;
pub use typed::{Message, MessageFacade, TypedBroadcaster};
