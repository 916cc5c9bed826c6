//! # Ordered subscription registry.
//!
//! Owns the live [`Entry`] list of one dispatch core.
//!
//! ## Rules
//! - Entries are kept in registration order; removal never reorders the rest.
//! - No two entries share `(key, handler id)`.
//! - Ordinals are assigned monotonically and never reused.
//! - Removed entries are handed back to the caller so they can be dropped
//!   after the lock guarding the registry is released.

use crate::core::entry::Entry;
use crate::core::key::Key;
use crate::handlers::{Handler, HandlerId};

pub(crate) struct Registry<K, P> {
    entries: Vec<Entry<K, P>>,
    next_ordinal: u64,
}

impl<K, P> Registry<K, P> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            next_ordinal: 0,
        }
    }

    /// Removes the entry with `ordinal`, preserving the order of the others.
    pub fn remove(&mut self, ordinal: u64) -> Option<Entry<K, P>> {
        let pos = self.entries.iter().position(|e| e.ordinal == ordinal)?;
        Some(self.entries.remove(pos))
    }

    /// Takes every entry out, leaving the registry empty.
    pub fn drain(&mut self) -> Vec<Entry<K, P>> {
        std::mem::take(&mut self.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<K: PartialEq, P> Registry<K, P> {
    /// Appends an entry, or returns `None` if `(key, id)` is already live.
    pub fn insert(&mut self, key: Key<K>, id: HandlerId, handler: Handler<P>) -> Option<u64> {
        if self.entries.iter().any(|e| e.is_same(&key, id)) {
            return None;
        }
        let ordinal = self.next_ordinal;
        self.next_ordinal += 1;
        self.entries.push(Entry {
            key,
            handler_id: id,
            ordinal,
            handler,
        });
        Some(ordinal)
    }

    /// Clones the handlers registered for `key`, in dispatch order.
    pub fn snapshot(&self, key: &Key<K>) -> Vec<(u64, Handler<P>)> {
        self.entries
            .iter()
            .filter(|e| e.key == *key)
            .map(|e| (e.ordinal, e.handler.clone()))
            .collect()
    }
}
