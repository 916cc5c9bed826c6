//! # Handler abstractions and erased payloads.
//!
//! This module provides the callable side of a subscription:
//! - [`Handler`] - shared async callable, the unit that is registered and invoked
//! - [`HandlerId`] - identity of a handler, used for duplicate detection
//! - [`Payload`] - type-erased payload carried by loosely typed broadcasts
//! - [`payload()`] / [`downcast()`] - boundary helpers for erasing and narrowing payloads

mod handler;
mod payload;

pub use handler::{BoxHandlerFuture, Handler, HandlerId};
pub use payload::{Payload, downcast, payload};
