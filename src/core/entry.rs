//! A single live subscription.

use crate::core::key::Key;
use crate::handlers::{Handler, HandlerId};

/// One subscription: `(key, handler identity, ordinal, callable)`.
///
/// `ordinal` is unique per core and is what a [`Token`](crate::Token) removes
/// by. `handler_id` is the identity of the handler the caller registered,
/// which may differ from `handler` when the payload is narrowed at the
/// boundary.
pub(crate) struct Entry<K, P> {
    pub key: Key<K>,
    pub handler_id: HandlerId,
    pub ordinal: u64,
    pub handler: Handler<P>,
}

impl<K: PartialEq, P> Entry<K, P> {
    /// True if this entry was registered for `key` by the handler `id`.
    pub fn is_same(&self, key: &Key<K>, id: HandlerId) -> bool {
        self.handler_id == id && self.key == *key
    }
}
