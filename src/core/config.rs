//! # Dispatch core configuration.
//!
//! Provides [`Config`] settings shared by every broadcaster variant.
//!
//! ## Sentinel values
//! - `capacity = 0` → no preallocation of the entry list

use std::borrow::Cow;

/// Settings for one dispatch core.
///
/// ## Field semantics
/// - `name`: label attached to every diagnostic emitted by the core
/// - `capacity`: initial capacity of the entry list (`0` = grow on demand)
#[derive(Clone, Debug)]
pub struct Config {
    /// Label used as the `core` field in `tracing` records.
    ///
    /// Give each owning component its own name so handler failures can be
    /// traced back to the broadcaster that dispatched them.
    pub name: Cow<'static, str>,

    /// Number of subscriptions to preallocate room for.
    pub capacity: usize,
}

impl Config {
    /// Default configuration with a custom name.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns the preallocation hint as an `Option`.
    ///
    /// - `None` → grow on demand
    /// - `Some(n)` → reserve room for `n` entries up front
    #[inline]
    pub fn capacity_hint(&self) -> Option<usize> {
        if self.capacity == 0 {
            None
        } else {
            Some(self.capacity)
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `name = "broadcaster"`
    /// - `capacity = 0` (grow on demand)
    fn default() -> Self {
        Self {
            name: Cow::Borrowed("broadcaster"),
            capacity: 0,
        }
    }
}
