//! Dispatch core: the registry and broadcast loop shared by every variant.
//!
//! Public API from this module:
//! - [`DispatchCore`]: ordered, deduplicated, failure-isolated dispatch;
//! - [`Token`]: scoped release of one subscription;
//! - [`Key`], [`MessageClass`], [`MessageKind`]: what subscriptions are keyed on;
//! - [`Config`]: per-core settings.
//!
//! Internal modules:
//! - [`entry`]: one live subscription;
//! - [`registry`]: the ordered entry list behind the core's lock.

mod config;
mod dispatch;
mod entry;
mod key;
mod registry;
mod token;

pub use config::Config;
pub use dispatch::DispatchCore;
pub use key::{Key, MessageClass, MessageKind};
pub use token::Token;

pub(crate) use dispatch::Shared;
#[cfg(feature = "mediator")]
pub(crate) use dispatch::{Registration, invoke};
